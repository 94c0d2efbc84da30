use thiserror::Error;

/// Exit status for failures caused by how the tool was invoked
pub const EXIT_USAGE: u8 = 2;
/// Exit status for failures at runtime (database, configuration, output)
pub const EXIT_FAILURE: u8 = 1;

/// Students CLI unified error type
#[derive(Error, Debug)]
pub enum StudentsError {
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: connection not established within {seconds}s")]
    ConnectTimeout { seconds: u64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Output error: {0}")]
    Output(String),
}

impl StudentsError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidCommand(_) | Self::InvalidArguments(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }

    /// Whether the error originated in the database or the connection to it
    pub fn is_database(&self) -> bool {
        matches!(self, Self::Database(_) | Self::ConnectTimeout { .. })
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

pub type StudentsResult<T> = Result<T, StudentsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_with_two() {
        assert_eq!(StudentsError::InvalidCommand("nope".into()).exit_code(), 2);
        assert_eq!(StudentsError::InvalidArguments("bad id".into()).exit_code(), 2);
    }

    #[test]
    fn test_runtime_errors_exit_with_one() {
        assert_eq!(StudentsError::config("missing PGUSER").exit_code(), 1);
        assert_eq!(StudentsError::ConnectTimeout { seconds: 3 }.exit_code(), 1);
        assert_eq!(StudentsError::Database(sqlx::Error::RowNotFound).exit_code(), 1);
        assert_eq!(StudentsError::Output("closed pipe".into()).exit_code(), 1);
    }

    #[test]
    fn test_timeout_counts_as_database_error() {
        assert!(StudentsError::ConnectTimeout { seconds: 10 }.is_database());
        assert!(StudentsError::Database(sqlx::Error::PoolClosed).is_database());
        assert!(!StudentsError::config("x").is_database());
    }
}
