//! # Index Errors

use thiserror::Error;

use crate::events::Hash;

/// Errors raised while folding events into the index.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    /// A creation record for an escrow that is already indexed.
    #[error("Escrow already indexed: {0}")]
    DuplicateEscrow(String),

    /// A settlement record for an escrow with no creation record.
    #[error("Unknown escrow: {0}")]
    UnknownEscrow(String),

    /// A second settlement record for the same escrow.
    #[error("Escrow already settled: {0}")]
    AlreadySettled(String),

    /// A withdrawal whose secret does not hash to the escrow's hashlock.
    #[error("Secret does not match hashlock {}", hex::encode(.0))]
    SecretMismatch(Hash),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_mismatch_shows_hashlock() {
        let err = IndexError::SecretMismatch([0xab; 32]);
        assert!(err.to_string().contains("abababab"));
    }

    #[test]
    fn test_unknown_escrow_error() {
        let err = IndexError::UnknownEscrow("CESCROW".to_string());
        assert_eq!(err.to_string(), "Unknown escrow: CESCROW");
    }
}
