//! Compile use case: parse → propagate → emit.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::application::dump::{to_raw, to_xml};
use crate::application::script::{render, ScriptGenerator, ScriptStyle};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{propagate, DomainParser, ParseFailure, ParseWarning};

/// What the compiler emits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Runtime command script
    #[default]
    Script,
    /// Structural XML dump of the propagated tree
    Xml,
    /// Parsed tree before propagation, for diagnostics
    Raw,
}

#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    pub format: OutputFormat,
    pub style: ScriptStyle,
    /// Report parse warnings while compiling
    pub verbose: bool,
}

/// Result of one compilation run.
#[derive(Debug)]
pub struct Compilation {
    pub output: String,
    pub warnings: Vec<ParseWarning>,
}

/// Runs the whole pipeline on one input; every run starts from scratch.
#[derive(Debug, Clone, Default)]
pub struct Compiler {
    options: CompileOptions,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self { options }
    }

    pub fn compile<R: BufRead>(&self, reader: R) -> ApplicationResult<Compilation> {
        self.compile_reporting(reader, |_| {})
    }

    /// Compile, handing warnings to `report` as they are found when verbose.
    /// Warnings seen before a failure are reported too.
    #[instrument(level = "debug", skip_all, fields(format = ?self.options.format))]
    pub fn compile_reporting<R, F>(
        &self,
        reader: R,
        mut report: F,
    ) -> ApplicationResult<Compilation>
    where
        R: BufRead,
        F: FnMut(&ParseWarning),
    {
        let verbose = self.options.verbose;
        let outcome = DomainParser::new()
            .parse_reader_with(reader, |warning| {
                if verbose {
                    report(warning)
                }
            })
            .map_err(|failure| match failure {
                ParseFailure::Domain(e) => ApplicationError::Domain(e),
                ParseFailure::Read(source) => ApplicationError::Read { source },
            })?;
        let mut tree = outcome.tree;
        info!(nodes = tree.len(), "parsed domain description");

        let output = match self.options.format {
            OutputFormat::Raw => to_raw(&tree),
            OutputFormat::Xml => {
                propagate(&mut tree)?;
                to_xml(&tree)?
            }
            OutputFormat::Script => {
                propagate(&mut tree)?;
                let scripts = ScriptGenerator::new(&tree).generate();
                debug!(domains = scripts.len(), "generated script");
                render(&scripts, &self.options.style)
            }
        };

        Ok(Compilation {
            output,
            warnings: outcome.warnings,
        })
    }

    pub fn compile_str(&self, input: &str) -> ApplicationResult<Compilation> {
        self.compile(input.as_bytes())
    }
}
