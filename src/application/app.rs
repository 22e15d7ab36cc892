use std::sync::Arc;

use super::reader::MessageReader;
use crate::domain::errors::ReadMessageError;
use crate::domain::models::{AccountStore, MessageCrypto, MessageResponse, TransactionStore};
use crate::infrastructure::crypto::Curve25519Crypto;
use crate::infrastructure::memory::InMemoryDatabase;

#[async_trait::async_trait]
pub trait Application {
    /// Reads the messages attached to `transaction`, decrypting them for the owner of
    /// `secret_phrase` when one is given.
    async fn read_message(
        &self,
        transaction: Option<&str>,
        secret_phrase: Option<&str>,
    ) -> Result<MessageResponse, ReadMessageError>;
}

#[derive(Clone)]
pub struct App<D, C> {
    reader: MessageReader<Arc<D>, Arc<D>, C>,
}

impl App<InMemoryDatabase, Curve25519Crypto> {
    pub fn new(database: Arc<InMemoryDatabase>) -> Self {
        Self::with_database(database, Curve25519Crypto)
    }
}

impl<D, C> App<D, C> {
    pub fn with_database(database: Arc<D>, crypto: C) -> Self {
        let reader = MessageReader::builder()
            .transactions(database.clone())
            .accounts(database)
            .crypto(crypto)
            .build();
        Self { reader }
    }
}

#[async_trait::async_trait]
impl<D, C> Application for App<D, C>
where
    D: TransactionStore + AccountStore + Send + Sync + 'static,
    C: MessageCrypto + Send + Sync + 'static,
{
    async fn read_message(
        &self,
        transaction: Option<&str>,
        secret_phrase: Option<&str>,
    ) -> Result<MessageResponse, ReadMessageError> {
        tracing::info!(
            "Reading messages of transaction {:?} ({} secret phrase)",
            transaction,
            if secret_phrase.is_some() { "with" } else { "without" }
        );
        self.reader.resolve(transaction, secret_phrase).await
    }
}
