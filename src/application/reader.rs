use crate::domain::{
    errors::ReadMessageError,
    models::{
        AccountStore, EncryptedMessage, MessageCrypto, MessageResponse, PublicKey, Transaction,
        TransactionId, TransactionStore,
    },
};
use typed_builder::TypedBuilder;

/// Resolves the messages attached to a transaction, decrypting the encrypted ones when the
/// caller proves an account with its secret phrase.
#[derive(Clone, TypedBuilder)]
pub struct MessageReader<T, A, C> {
    transactions: T,
    accounts: A,
    crypto: C,
}

impl<T, A, C> MessageReader<T, A, C>
where
    T: TransactionStore + Send + Sync,
    A: AccountStore + Send + Sync,
    C: MessageCrypto + Send + Sync,
{
    pub async fn resolve(
        &self,
        transaction: Option<&str>,
        secret_phrase: Option<&str>,
    ) -> Result<MessageResponse, ReadMessageError> {
        let transaction_id = parse_transaction_id(transaction)?;
        let transaction = self
            .transactions
            .get_transaction(transaction_id)
            .await
            .map_err(|_| ReadMessageError::TransactionNotFound(transaction_id))?;

        if !transaction.has_messages() {
            return Err(ReadMessageError::NoMessagePresent(transaction_id));
        }

        let mut response = MessageResponse {
            message: transaction
                .message
                .as_ref()
                .map(|m| encode_payload(&m.message, m.is_text)),
            ..Default::default()
        };

        let Some(secret_phrase) = secret_phrase.filter(|s| !s.is_empty()) else {
            return Ok(response);
        };

        let public_key = self.crypto.public_key(secret_phrase);
        if let Some(encrypted) = &transaction.encrypted_message {
            response.decrypted_message = self
                .read_to_recipient(&transaction, encrypted, &public_key, secret_phrase)
                .await;
        }
        if let Some(encrypted) = &transaction.encrypt_to_self_message {
            response.decrypted_message_to_self = self
                .read_to_self(transaction.id, encrypted, &public_key, secret_phrase)
                .await;
        }

        Ok(response)
    }

    async fn read_to_recipient(
        &self,
        transaction: &Transaction,
        encrypted: &EncryptedMessage,
        public_key: &PublicKey,
        secret_phrase: &str,
    ) -> Option<String> {
        // The reader decrypts against whichever side of the transfer it is not
        let reader_id = self.crypto.account_id(public_key);
        let counterparty_id = if reader_id == transaction.sender_id {
            transaction.recipient_id
        } else {
            transaction.sender_id
        };

        let counterparty = match self.accounts.get_account(counterparty_id).await {
            Ok(account) => account,
            Err(e) => {
                tracing::debug!(
                    "Skipping message to recipient of transaction {}: {}",
                    transaction.id,
                    e
                );
                return None;
            }
        };

        self.decrypt(
            transaction.id,
            "message to recipient",
            encrypted,
            counterparty.public_key,
            secret_phrase,
        )
    }

    async fn read_to_self(
        &self,
        transaction_id: TransactionId,
        encrypted: &EncryptedMessage,
        public_key: &PublicKey,
        secret_phrase: &str,
    ) -> Option<String> {
        let account_id = self.crypto.account_id(public_key);
        let account = match self.accounts.get_account(account_id).await {
            Ok(account) if account.public_key.is_some_and(|stored| stored != *public_key) => {
                tracing::debug!(
                    "Skipping message to self of transaction {}: account {} announced another key",
                    transaction_id,
                    account_id
                );
                return None;
            }
            Ok(account) => account,
            Err(e) => {
                tracing::debug!(
                    "Skipping message to self of transaction {}: {}",
                    transaction_id,
                    e
                );
                return None;
            }
        };

        self.decrypt(
            transaction_id,
            "message to self",
            encrypted,
            account.public_key,
            secret_phrase,
        )
    }

    fn decrypt(
        &self,
        transaction_id: TransactionId,
        slot: &str,
        encrypted: &EncryptedMessage,
        counterparty_key: Option<PublicKey>,
        secret_phrase: &str,
    ) -> Option<String> {
        let Some(counterparty_key) = counterparty_key else {
            tracing::debug!(
                "Skipping {} of transaction {}: counterparty has no public key",
                slot,
                transaction_id
            );
            return None;
        };

        match self
            .crypto
            .decrypt_from(&encrypted.data, &counterparty_key, secret_phrase)
        {
            Ok(decrypted) => Some(encode_payload(&decrypted, encrypted.is_text)),
            Err(e) => {
                tracing::debug!(
                    "Decryption of {} of transaction {} failed: {}",
                    slot,
                    transaction_id,
                    e
                );
                None
            }
        }
    }
}

fn parse_transaction_id(transaction: Option<&str>) -> Result<TransactionId, ReadMessageError> {
    let transaction = transaction
        .filter(|s| !s.is_empty())
        .ok_or(ReadMessageError::MissingParameter)?;
    parse_unsigned(transaction)
        .ok_or_else(|| ReadMessageError::MalformedParameter(transaction.to_string()))
}

/// Parses a decimal unsigned id the way node clients send them: surrounding control
/// characters and spaces are ignored, and a negative sign is only allowed on zero.
fn parse_unsigned(value: &str) -> Option<TransactionId> {
    let value = value.trim_matches(|c: char| c <= ' ');
    match value.strip_prefix('-') {
        Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b == b'0') => Some(0),
        Some(_) => None,
        None => value.parse().ok(),
    }
}

fn encode_payload(payload: &[u8], is_text: bool) -> String {
    if is_text {
        String::from_utf8_lossy(payload).into_owned()
    } else {
        hex::encode(payload)
    }
}
