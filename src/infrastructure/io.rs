//! Input and output stream acquisition.
//!
//! A missing path means the standard stream. Streams are closed when the
//! returned boxes drop, on success and on early return alike.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::infrastructure::{InfraError, InfraResult};

/// Extension trait for converting `io::Result` to `InfraResult` with context.
pub trait IoResultExt<T> {
    fn with_context(self, action: &str) -> InfraResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_context(self, action: &str) -> InfraResult<T> {
        self.map_err(|e| InfraError::io(action, e))
    }
}

/// Open the input file, or stdin when `path` is None.
pub fn open_input(path: Option<&Path>) -> InfraResult<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "opening input");
            let file = File::open(path).map_err(|source| InfraError::OpenInput {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(io::stdin()))),
    }
}

/// Create the output file, or use stdout when `path` is None.
pub fn open_output(path: Option<&Path>) -> InfraResult<Box<dyn Write>> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "creating output");
            let file = File::create(path).map_err(|source| InfraError::CreateOutput {
                path: path.to_path_buf(),
                source,
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}

/// Write `text` and flush.
pub fn write_output(sink: &mut dyn Write, text: &str) -> InfraResult<()> {
    sink.write_all(text.as_bytes()).with_context("write output")?;
    sink.flush().with_context("flush output")
}
