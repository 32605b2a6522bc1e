use thiserror::Error;

/// Errors caused by what the user asked for rather than by the server or the
/// network. They are reported as `ERROR: <message>` and map to their own exit
/// codes so scripts can tell them apart from success and from faults.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    NotFound(String),
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        CliError::Usage(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CliError::NotFound(message.into())
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Usage(_) => 2,
            CliError::NotFound(_) => 3,
        }
    }
}
