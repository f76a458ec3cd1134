//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum, ValueHint};

use crate::application::{Layout, OutputFormat};

/// Compile a parameter-framework domain description into a runtime command script
#[derive(Parser, Debug)]
#[command(name = "pfwgen")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("format").args(["pfw", "xml", "raw"])))]
pub struct Cli {
    /// Domain description (default: stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    pub input: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Debug logging, repeat for more (-d -d -d); implies --verbose
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub debug: u8,

    /// Print warnings for skipped lines
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit the command script
    #[arg(long)]
    pub pfw: bool,

    /// Emit the propagated tree as XML
    #[arg(long)]
    pub xml: bool,

    /// Emit the parsed tree before propagation
    #[arg(long)]
    pub raw: bool,

    /// Script layout
    #[arg(long, value_enum)]
    pub layout: Option<LayoutArg>,

    /// Show merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print a config template and exit
    #[arg(long)]
    pub config_template: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    pub completions: Option<clap_complete::Shell>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LayoutArg {
    Flat,
    Indented,
}

impl From<LayoutArg> for Layout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::Flat => Layout::Flat,
            LayoutArg::Indented => Layout::Indented,
        }
    }
}

impl Cli {
    /// Format chosen by flag, if any.
    pub fn format(&self) -> Option<OutputFormat> {
        if self.pfw {
            Some(OutputFormat::Script)
        } else if self.xml {
            Some(OutputFormat::Xml)
        } else if self.raw {
            Some(OutputFormat::Raw)
        } else {
            None
        }
    }

    /// Warnings are shown with -v or any -d.
    pub fn wants_warnings(&self) -> bool {
        self.verbose || self.debug > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from(["pfwgen", "--xml", "--raw"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_no_format_flag_defers_to_settings() {
        let cli = Cli::try_parse_from(["pfwgen", "in.pfw"]).unwrap();
        assert_eq!(cli.format(), None);
        assert_eq!(cli.input, Some(PathBuf::from("in.pfw")));
    }

    #[test]
    fn test_debug_count_implies_warnings() {
        let cli = Cli::try_parse_from(["pfwgen", "-dd", "--xml"]).unwrap();
        assert_eq!(cli.debug, 2);
        assert!(cli.wants_warnings());
        assert_eq!(cli.format(), Some(OutputFormat::Xml));
    }

    #[test]
    fn test_layout_flag_maps_to_layout() {
        let cli = Cli::try_parse_from(["pfwgen", "--layout", "indented"]).unwrap();
        assert_eq!(cli.layout.map(Layout::from), Some(Layout::Indented));
    }
}
