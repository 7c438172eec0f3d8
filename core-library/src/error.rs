use bridge_traits::error::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    /// The backend answered `success: false`.
    #[error("Backend rejected request on {table}: {message}")]
    Service { table: String, message: String },

    /// At least one record in a batch failed with a message.
    #[error("{message}")]
    BatchFailed {
        table: String,
        message: String,
        failed: usize,
    },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Failed to decode {table} record: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    /// Declared operation without a backing relation store yet.
    #[error("{operation} is not supported until a persistent relation store exists")]
    Unsupported { operation: &'static str },
}

impl LibraryError {
    pub(crate) fn invalid_id(field: &str, raw: impl std::fmt::Display) -> Self {
        LibraryError::InvalidInput {
            field: field.to_string(),
            message: format!("'{}' is not a record id", raw),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
