//! Domain layer: node tree, parsing and propagation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod classifier;
pub mod error;
pub mod options;
pub mod parser;
pub mod propagation;
pub mod tree;

pub use classifier::{LineClass, LineClassifier, SkipReason};
pub use error::{DomainError, ParseWarning};
pub use options::{OptionTable, OptionValue};
pub use parser::{parse_str, DomainParser, ParseFailure, ParseOutcome};
pub use propagation::{propagate, PropagationContext};
pub use tree::{DomainNode, DomainTree, NodeKind, SEQUENCE_AWARE};
