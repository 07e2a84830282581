//! Error types for Tileworld.

use thiserror::Error;

use crate::ids::WorldId;

/// Errors raised by a World Store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// A write was rejected or failed part-way
    #[error("Store write failed: {0}")]
    WriteFailure(String),

    /// No server record with this id
    #[error("World not found: {0}")]
    NotFound(WorldId),

    /// A tile batch exceeded the transport limit
    #[error("Tile batch of {len} records exceeds limit of {max}")]
    BatchTooLarge {
        /// Records in the rejected batch
        len: usize,
        /// Largest accepted batch
        max: usize,
    },

    /// The access key does not match the store
    #[error("Store access denied")]
    AccessDenied,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record encoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors raised while generating or composing worlds.
#[derive(Debug, Error)]
pub enum GenError {
    /// Width or height is zero
    #[error("Invalid dimensions {width}x{height}: width and height must be positive")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// A terrain label the store does not know
    #[error("Unknown terrain label: {0}")]
    UnknownTerrainLabel(String),

    /// Generation was cancelled between stages
    #[error("Generation cancelled")]
    Cancelled,

    /// A store call failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type alias for generation operations.
pub type GenResult<T> = Result<T, GenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_converts() {
        let err: GenError = StoreError::Unavailable("offline".into()).into();
        assert!(matches!(err, GenError::Store(StoreError::Unavailable(_))));
        assert_eq!(err.to_string(), "Store error: Store unavailable: offline");
    }

    #[test]
    fn test_invalid_dimensions_message() {
        let err = GenError::InvalidDimensions { width: 0, height: 5 };
        assert!(err.to_string().contains("0x5"));
    }
}
