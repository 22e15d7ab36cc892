use crate::domain::{
    errors::{DataStorageError, SeedError},
    models::{
        Account, AccountId, AccountStore, SeedData, Transaction, TransactionId, TransactionStore,
    },
};
use dashmap::{mapref::entry::Entry, DashMap};
use std::path::Path;

#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    transactions: DashMap<TransactionId, Transaction>,
    accounts: DashMap<AccountId, Account>,
}

impl InMemoryDatabase {
    pub fn store_transaction(&self, transaction: Transaction) {
        match self.transactions.entry(transaction.id) {
            Entry::Occupied(existing) => {
                tracing::warn!("Transaction already exists: {}", existing.key());
            }
            Entry::Vacant(slot) => {
                slot.insert(transaction);
            }
        }
    }

    pub fn store_account(&self, account: Account) {
        if let Some(ref mut existing_account) = self.accounts.get_mut(&account.id) {
            // A key, once announced, stays
            if account.public_key.is_some() {
                existing_account.public_key = account.public_key;
            }
        } else {
            self.accounts.insert(account.id, account);
        }
    }

    pub fn load_seed(&self, seed: SeedData) {
        let (transactions, accounts) = (seed.transactions.len(), seed.accounts.len());
        seed.transactions
            .into_iter()
            .for_each(|transaction| self.store_transaction(transaction));
        seed.accounts
            .into_iter()
            .for_each(|account| self.store_account(account));
        tracing::info!(
            "Loaded {} transactions and {} accounts",
            transactions,
            accounts
        );
    }

    pub fn load_seed_file(&self, path: &Path) -> Result<(), SeedError> {
        let contents = std::fs::read_to_string(path)?;
        let seed: SeedData = serde_json::from_str(&contents)?;
        self.load_seed(seed);
        Ok(())
    }
}

#[async_trait::async_trait]
impl TransactionStore for InMemoryDatabase {
    async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, DataStorageError> {
        self.transactions
            .get(&id)
            .map(|v| v.value().clone())
            .ok_or(DataStorageError::TransactionNotFound(id))
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryDatabase {
    async fn get_account(&self, id: AccountId) -> Result<Account, DataStorageError> {
        self.accounts
            .get(&id)
            .map(|v| v.value().clone())
            .ok_or(DataStorageError::AccountNotFound(id))
    }
}
