//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl CliError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        let CliError::Infra(infra) = self;
        match infra {
            InfraError::Application(app) => match app {
                ApplicationError::Domain(e) if e.is_parse_error() => exitcode::PARSE,
                ApplicationError::Domain(_) => exitcode::PROPAGATION,
                ApplicationError::Config { .. } => exitcode::CONFIG,
                ApplicationError::Read { .. } => exitcode::IOERR,
                ApplicationError::Xml { .. } => exitcode::SOFTWARE,
            },
            InfraError::OpenInput { .. } => exitcode::NOINPUT,
            InfraError::CreateOutput { .. } => exitcode::CANTCREAT,
            InfraError::Io { .. } => exitcode::IOERR,
        }
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
