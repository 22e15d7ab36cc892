use super::errors::{CryptoError, DataStorageError};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

pub type TransactionId = u64;
pub type AccountId = u64;

/// A 32 byte Curve25519 public key, hex encoded on the wire.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicKey(#[serde(with = "hex")] pub [u8; 32]);

impl PublicKey {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

/// Unencrypted payload attached to a transaction.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct PlainMessage {
    /// Raw payload bytes
    #[serde(with = "hex")]
    pub message: Vec<u8>,
    /// Whether the payload is UTF-8 text or arbitrary binary
    pub is_text: bool,
}

/// Ciphertext together with the nonce it was sealed with.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct EncryptedData {
    #[serde(with = "hex")]
    pub data: Vec<u8>,
    #[serde(with = "hex")]
    pub nonce: [u8; 32],
}

/// Encrypted payload attached to a transaction, either to the recipient or to the sender itself.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct EncryptedMessage {
    pub data: EncryptedData,
    /// Whether the *decrypted* payload is UTF-8 text or arbitrary binary
    pub is_text: bool,
}

/// Represents a transaction as stored by the node.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Unique identifier for the transaction
    pub id: TransactionId,
    /// Account id of the transaction sender
    pub sender_id: AccountId,
    /// Account id of the transaction recipient, `0` when there is none
    #[serde(default)]
    pub recipient_id: AccountId,
    #[serde(default)]
    pub message: Option<PlainMessage>,
    #[serde(default)]
    pub encrypted_message: Option<EncryptedMessage>,
    #[serde(default)]
    pub encrypt_to_self_message: Option<EncryptedMessage>,
}

impl Transaction {
    pub fn has_messages(&self) -> bool {
        self.message.is_some()
            || self.encrypted_message.is_some()
            || self.encrypt_to_self_message.is_some()
    }
}

/// Represents an account known to the node.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    /// Announced public key, unknown until the account first sends a transaction
    #[serde(default)]
    pub public_key: Option<PublicKey>,
}

/// Messages readable from a transaction. Fields that could not be resolved are left out.
#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decrypted_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decrypted_message_to_self: Option<String>,
}

/// Initial content for a store, as read from a seed file.
#[derive(Clone, Serialize, Deserialize, Debug, Default)]
pub struct SeedData {
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub accounts: Vec<Account>,
}

/// Read access to confirmed transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TransactionStore {
    /// Retrieves a specific transaction by its ID.
    async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, DataStorageError>;
}

/// Read access to accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AccountStore {
    /// Retrieves a specific account by its ID.
    async fn get_account(&self, id: AccountId) -> Result<Account, DataStorageError>;
}

#[async_trait::async_trait]
impl<T> TransactionStore for Arc<T>
where
    T: TransactionStore + Send + Sync + ?Sized,
{
    async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, DataStorageError> {
        self.as_ref().get_transaction(id).await
    }
}

#[async_trait::async_trait]
impl<T> AccountStore for Arc<T>
where
    T: AccountStore + Send + Sync + ?Sized,
{
    async fn get_account(&self, id: AccountId) -> Result<Account, DataStorageError> {
        self.as_ref().get_account(id).await
    }
}

/// Key derivation and message decryption for account secrets.
#[cfg_attr(test, mockall::automock)]
pub trait MessageCrypto {
    /// Derives the public key belonging to a secret phrase.
    fn public_key(&self, secret_phrase: &str) -> PublicKey;

    /// Derives the account id owning a public key.
    fn account_id(&self, public_key: &PublicKey) -> AccountId;

    /// Decrypts `data` shared between the owner of `secret_phrase` and the owner of `public_key`.
    fn decrypt_from(
        &self,
        data: &EncryptedData,
        public_key: &PublicKey,
        secret_phrase: &str,
    ) -> Result<Vec<u8>, CryptoError>;
}
