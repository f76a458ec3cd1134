//! Infrastructure layer: stream I/O for the CLI
//!
//! This layer opens and closes the input and output streams.

pub mod error;
pub mod io;

pub use error::{InfraError, InfraResult};
pub use io::{open_input, open_output, write_output, IoResultExt};
