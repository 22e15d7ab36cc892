use thiserror::Error;

use super::models::{AccountId, TransactionId};

/// Terminal outcomes of a read message request. Anything else degrades to a
/// missing field in the response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReadMessageError {
    #[error("\"transaction\" not specified")]
    MissingParameter,
    #[error("Incorrect \"transaction\": {0}")]
    MalformedParameter(String),
    #[error("Unknown transaction {0}")]
    TransactionNotFound(TransactionId),
    #[error("No attached message found in transaction {0}")]
    NoMessagePresent(TransactionId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataStorageError {
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Decryption failed")]
    DecryptionFailed,
    #[error("Encryption failed")]
    EncryptionFailed,
}

#[derive(Error, Debug)]
pub enum SeedError {
    #[error("Failed to read seed file")]
    FailedToReadSeed(#[from] std::io::Error),
    #[error("Failed to parse seed file")]
    FailedToParseSeed(#[from] serde_json::Error),
}
