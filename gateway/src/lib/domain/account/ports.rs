use async_trait::async_trait;

use crate::domain::account::errors::StoreError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountCreate;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountName;
use crate::domain::account::models::AccountUpdate;

/// Persistence operations for the account aggregate.
///
/// Operations run inside the transactional scope that owns the repository;
/// nothing is visible to other scopes until that scope commits.
#[async_trait]
pub trait AccountRepository: Send {
    /// Persist a new account.
    ///
    /// # Arguments
    /// * `data` - Name, password hash and attributes of the new account
    ///
    /// # Returns
    /// Created account with its store-assigned ID and timestamps
    ///
    /// # Errors
    /// * `Conflict` - A uniqueness constraint (the account name) was violated
    /// * `Database` - Database operation failed
    async fn create(&mut self, data: AccountCreate) -> Result<Account, StoreError>;

    /// Retrieve an account by primary key.
    ///
    /// # Errors
    /// * `NotFound` - No account has this ID
    /// * `Database` - Database operation failed
    async fn get_by_pk(&mut self, pk: AccountId) -> Result<Account, StoreError>;

    /// Retrieve an account by its exact, case-sensitive name.
    ///
    /// # Errors
    /// * `NotFound` - No account has this name
    /// * `Database` - Database operation failed
    async fn get_by_name(&mut self, name: &AccountName) -> Result<Account, StoreError>;

    /// Apply the `Some` fields of `data` and return the refreshed account.
    ///
    /// # Errors
    /// * `NotFound` - No account has this ID
    /// * `Conflict` - The new name is held by another account
    /// * `Database` - Database operation failed
    async fn update_by_pk(
        &mut self,
        pk: AccountId,
        data: AccountUpdate,
    ) -> Result<Account, StoreError>;

    /// Remove an account.
    ///
    /// # Errors
    /// * `NotFound` - No account has this ID
    /// * `Database` - Database operation failed
    async fn delete_by_pk(&mut self, pk: AccountId) -> Result<(), StoreError>;
}

/// A transactional scope over the account store.
///
/// Writes become durable only through `commit`. Dropping the scope without
/// committing rolls back, so every early return discards uncommitted work.
#[async_trait]
pub trait AccountTransaction: AccountRepository + Sized {
    /// Make all writes of this scope durable.
    async fn commit(self) -> Result<(), StoreError>;

    /// Discard all writes of this scope.
    async fn rollback(self) -> Result<(), StoreError>;
}

/// Entry point to the account store: opens transactional scopes.
#[async_trait]
pub trait AccountStore: Send + Sync + 'static {
    type Transaction: AccountTransaction + 'static;

    /// Open a new transactional scope.
    ///
    /// # Errors
    /// * `Database` - No connection or transaction could be acquired
    async fn begin(&self) -> Result<Self::Transaction, StoreError>;
}
