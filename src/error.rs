use thiserror::Error;

use crate::types::IsolationLevel;

/// Boxed error returned by a transport implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RdsDataError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("invalid DSN scheme {found:?}, expected {expected:?}")]
    InvalidDsnScheme { expected: String, found: String },

    #[error("please do not mix ordinal and named parameters")]
    MixedParameters,

    #[error("{name} is unsupported type: {value}")]
    UnsupportedType { name: String, value: String },

    #[error("parameter {name} overflows a signed 64-bit integer: {value}")]
    Overflow { name: String, value: u64 },

    #[error("convertValue(col={column}): {message}")]
    DecodeError { column: usize, message: String },

    #[error("this connection is closed")]
    Closed,

    #[error("transaction has already been committed or rolled back")]
    TxDone,

    #[error("a transaction is already open on this connection")]
    TransactionAlreadyOpen,

    #[error("bad connection: an open transaction was rolled back during session reset")]
    BadConnection,

    #[error("isolation level {0} not supported")]
    IsolationNotSupported(IsolationLevel),

    #[error("transport error: {0}")]
    Transport(#[source] BoxError),

    #[error("remote call cancelled")]
    Cancelled,

    #[error("after {attempts} attempts, last error: {last_error}")]
    WakeupFailed {
        attempts: u32,
        #[source]
        last_error: Box<RdsDataError>,
    },

    #[error("invalid response to version request")]
    InvalidVersionResponse,
}

impl RdsDataError {
    /// Wrap any transport failure.
    pub fn transport<E>(err: E) -> Self
    where
        E: Into<BoxError>,
    {
        RdsDataError::Transport(err.into())
    }

    pub(crate) fn decode(column: usize, message: impl Into<String>) -> Self {
        RdsDataError::DecodeError {
            column,
            message: message.into(),
        }
    }
}

pub type Result<T, E = RdsDataError> = std::result::Result<T, E>;
