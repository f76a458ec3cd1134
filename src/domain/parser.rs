//! Indentation-tree builder: turns a stream of lines into a [`DomainTree`].

use std::io::BufRead;

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::domain::classifier::{LineClass, LineClassifier, SkipReason};
use crate::domain::error::{DomainError, ParseWarning};
use crate::domain::tree::DomainTree;

/// Parsed tree plus the warnings collected on the way.
#[derive(Debug)]
pub struct ParseOutcome {
    pub tree: DomainTree,
    pub warnings: Vec<ParseWarning>,
}

/// Failure while parsing a stream.
#[derive(Debug)]
pub enum ParseFailure {
    Domain(DomainError),
    Read(std::io::Error),
}

impl From<DomainError> for ParseFailure {
    fn from(e: DomainError) -> Self {
        ParseFailure::Domain(e)
    }
}

/// Builds a tree from tab-indented lines; one tab per nesting level.
pub struct DomainParser {
    classifier: LineClassifier,
    /// open ancestors, root at index 0
    stack: Vec<Index>,
    previous_rank: usize,
    tree: DomainTree,
    warnings: Vec<ParseWarning>,
}

impl Default for DomainParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainParser {
    pub fn new() -> Self {
        let tree = DomainTree::new();
        Self {
            classifier: LineClassifier::new(),
            stack: vec![tree.root()],
            previous_rank: 0,
            tree,
            warnings: Vec::new(),
        }
    }

    /// Parse a whole stream.
    pub fn parse_reader<R: BufRead>(self, reader: R) -> Result<ParseOutcome, ParseFailure> {
        self.parse_reader_with(reader, |_| {})
    }

    /// Parse a whole stream, handing each warning to `report` as soon as its
    /// line is read.
    #[instrument(level = "debug", skip_all)]
    pub fn parse_reader_with<R, F>(
        mut self,
        reader: R,
        mut report: F,
    ) -> Result<ParseOutcome, ParseFailure>
    where
        R: BufRead,
        F: FnMut(&ParseWarning),
    {
        let mut reported = 0;
        for (num, line) in reader.lines().enumerate() {
            let line = line.map_err(ParseFailure::Read)?;
            let fed = self.feed(&line, num + 1);
            for warning in &self.warnings[reported..] {
                report(warning);
            }
            reported = self.warnings.len();
            fed?;
        }
        Ok(self.finish())
    }

    /// Parse an in-memory description.
    pub fn parse_str(mut self, input: &str) -> Result<ParseOutcome, DomainError> {
        for (num, line) in input.lines().enumerate() {
            self.feed(line, num + 1)?;
        }
        Ok(self.finish())
    }

    pub fn finish(self) -> ParseOutcome {
        debug!(
            nodes = self.tree.len(),
            warnings = self.warnings.len(),
            "parse finished"
        );
        ParseOutcome {
            tree: self.tree,
            warnings: self.warnings,
        }
    }

    /// Process one physical line, `number` is 1-based.
    pub fn feed(&mut self, line: &str, number: usize) -> Result<(), DomainError> {
        let split = line
            .find(|c: char| c != '\t' && c != ' ')
            .unwrap_or(line.len());
        let (indent, rest) = line.split_at(split);

        if rest.is_empty() {
            self.warn(ParseWarning::EmptyLine {
                line: line.to_string(),
                number,
            });
            return Ok(());
        }
        if indent.contains(' ') {
            return Err(DomainError::SpaceInIndentation {
                line: line.to_string(),
                number,
            });
        }
        let rank = indent.len() + 1;

        let (kind, options) = match self.classifier.classify(rest) {
            LineClass::Node(kind, options) => (kind, options),
            LineClass::Skip(SkipReason::EmptyLine) => {
                self.warn(ParseWarning::EmptyLine {
                    line: line.to_string(),
                    number,
                });
                return Ok(());
            }
            LineClass::Skip(SkipReason::Comment) => {
                self.warn(ParseWarning::Comment {
                    line: line.to_string(),
                    number,
                });
                return Ok(());
            }
            LineClass::Unrecognized => {
                return Err(DomainError::UnknownElementType {
                    line: line.to_string(),
                    number,
                })
            }
        };

        if rank > self.previous_rank + 1 {
            return Err(DomainError::IndentationTooDeep {
                line: line.to_string(),
                number,
            });
        }
        self.previous_rank = rank;

        self.stack.truncate(rank);
        let parent = self.stack.last().copied().unwrap_or(self.tree.root());
        let idx = self
            .tree
            .attach(parent, kind, options)
            .map_err(|e| DomainError::ChildNotPermitted {
                line: line.to_string(),
                number,
                parent: e.parent.tag(),
                child: e.child.tag(),
            })?;
        trace!(number, rank, tag = kind.tag(), "attached");
        self.stack.push(idx);
        Ok(())
    }

    fn warn(&mut self, warning: ParseWarning) {
        debug!("{}", warning);
        self.warnings.push(warning);
    }
}

/// Parse an in-memory description with a fresh parser.
pub fn parse_str(input: &str) -> Result<ParseOutcome, DomainError> {
    DomainParser::new().parse_str(input)
}
