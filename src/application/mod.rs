//! Application layer: generators and the compile use case
//!
//! This layer turns parsed domain trees into output text.

pub mod compiler;
pub mod dump;
pub mod error;
pub mod script;

pub use compiler::{Compilation, CompileOptions, Compiler, OutputFormat};
pub use dump::{to_raw, to_xml};
pub use error::{ApplicationError, ApplicationResult};
pub use script::{render, Command, DomainScript, Layout, RuleExpr, ScriptGenerator, ScriptStyle};
