use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tokio::sync::OwnedMutexGuard;

use crate::domain::account::errors::ConflictCause;
use crate::domain::account::errors::StoreError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountCreate;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountName;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::AccountStore;
use crate::domain::account::ports::AccountTransaction;

#[derive(Debug, Clone, Default)]
struct MemoryState {
    next_id: i64,
    accounts: BTreeMap<AccountId, Account>,
}

impl MemoryState {
    fn name_taken(&self, name: &AccountName, except: Option<AccountId>) -> bool {
        self.accounts
            .values()
            .any(|account| &account.name == name && Some(account.id) != except)
    }
}

/// In-process account store for tests and local runs.
///
/// Transactions are serialised: `begin` waits until the previous scope has
/// committed or rolled back. Clones share the same accounts.
///
/// Login and password changes verify the password while their transaction is
/// open, so requests served from this store run one at a time, each holding
/// the lock through a full PBKDF2 derivation. Not for load testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountStore {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    type Transaction = InMemoryAccountTransaction;

    async fn begin(&self) -> Result<InMemoryAccountTransaction, StoreError> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let snapshot = guard.clone();
        Ok(InMemoryAccountTransaction {
            guard,
            snapshot: Some(snapshot),
        })
    }
}

/// Exclusive scope over the in-memory state.
///
/// Writes apply to the shared state directly; the snapshot taken at `begin`
/// is restored on drop unless the scope committed.
pub struct InMemoryAccountTransaction {
    guard: OwnedMutexGuard<MemoryState>,
    snapshot: Option<MemoryState>,
}

impl Drop for InMemoryAccountTransaction {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.guard = snapshot;
        }
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountTransaction {
    async fn create(&mut self, data: AccountCreate) -> Result<Account, StoreError> {
        if data.password_hash.is_empty() {
            return Err(StoreError::Conflict(ConflictCause::Other(
                "password hash must not be empty".to_string(),
            )));
        }
        if self.guard.name_taken(&data.name, None) {
            return Err(StoreError::Conflict(ConflictCause::DuplicateName(
                data.name.to_string(),
            )));
        }

        self.guard.next_id += 1;
        let now = Utc::now();
        let account = Account {
            id: AccountId(self.guard.next_id),
            name: data.name,
            password_hash: data.password_hash,
            attributes: data.attributes,
            created_at: now,
            updated_at: now,
        };

        self.guard.accounts.insert(account.id, account.clone());

        Ok(account)
    }

    async fn get_by_pk(&mut self, pk: AccountId) -> Result<Account, StoreError> {
        self.guard
            .accounts
            .get(&pk)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_by_name(&mut self, name: &AccountName) -> Result<Account, StoreError> {
        self.guard
            .accounts
            .values()
            .find(|account| &account.name == name)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_by_pk(
        &mut self,
        pk: AccountId,
        data: AccountUpdate,
    ) -> Result<Account, StoreError> {
        if let Some(name) = &data.name {
            if self.guard.name_taken(name, Some(pk)) {
                return Err(StoreError::Conflict(ConflictCause::DuplicateName(
                    name.to_string(),
                )));
            }
        }
        if data.password_hash.as_deref() == Some("") {
            return Err(StoreError::Conflict(ConflictCause::Other(
                "password hash must not be empty".to_string(),
            )));
        }

        let is_empty = data.is_empty();
        let account = self
            .guard
            .accounts
            .get_mut(&pk)
            .ok_or(StoreError::NotFound)?;

        if let Some(name) = data.name {
            account.name = name;
        }
        if let Some(password_hash) = data.password_hash {
            account.password_hash = password_hash;
        }
        if let Some(attributes) = data.attributes {
            account.attributes = attributes;
        }
        if !is_empty {
            account.updated_at = Utc::now();
        }

        Ok(account.clone())
    }

    async fn delete_by_pk(&mut self, pk: AccountId) -> Result<(), StoreError> {
        self.guard
            .accounts
            .remove(&pk)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[async_trait]
impl AccountTransaction for InMemoryAccountTransaction {
    async fn commit(mut self) -> Result<(), StoreError> {
        self.snapshot = None;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::account::models::AccountAttribute;
    use crate::domain::account::models::AttributeSet;

    fn name(value: &str) -> AccountName {
        AccountName::new(value.to_string()).unwrap()
    }

    fn new_account(value: &str) -> AccountCreate {
        AccountCreate {
            name: name(value),
            password_hash: "73616c74:6b6579".to_string(),
            attributes: AttributeSet::new(),
        }
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let store = InMemoryAccountStore::new();
        let mut tx = store.begin().await.unwrap();

        let first = tx.create(new_account("alice")).await.unwrap();
        let second = tx.create(new_account("bob")).await.unwrap();
        tx.commit().await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn test_commit_makes_writes_visible() {
        let store = InMemoryAccountStore::new();

        let mut tx = store.begin().await.unwrap();
        let created = tx.create(new_account("alice")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.get_by_pk(created.id).await.unwrap(), created);
        assert_eq!(tx.get_by_name(&name("alice")).await.unwrap(), created);
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let store = InMemoryAccountStore::new();

        {
            let mut tx = store.begin().await.unwrap();
            tx.create(new_account("alice")).await.unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert_eq!(
            tx.get_by_name(&name("alice")).await.unwrap_err(),
            StoreError::NotFound
        );
    }

    #[tokio::test]
    async fn test_explicit_rollback_discards_update() {
        let store = InMemoryAccountStore::new();

        let mut tx = store.begin().await.unwrap();
        let created = tx.create(new_account("alice")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        tx.update_by_pk(created.id, AccountUpdate::name(name("alicia")))
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.get_by_pk(created.id).await.unwrap().name, name("alice"));
    }

    #[tokio::test]
    async fn test_duplicate_name_conflicts() {
        let store = InMemoryAccountStore::new();
        let mut tx = store.begin().await.unwrap();

        tx.create(new_account("alice")).await.unwrap();
        let bob = tx.create(new_account("bob")).await.unwrap();

        assert_eq!(
            tx.create(new_account("alice")).await.unwrap_err(),
            StoreError::Conflict(ConflictCause::DuplicateName("alice".to_string()))
        );
        assert_eq!(
            tx.update_by_pk(bob.id, AccountUpdate::name(name("alice")))
                .await
                .unwrap_err(),
            StoreError::Conflict(ConflictCause::DuplicateName("alice".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_applies_only_given_fields() {
        let store = InMemoryAccountStore::new();
        let mut tx = store.begin().await.unwrap();

        let created = tx.create(new_account("alice")).await.unwrap();

        let mut attributes = AttributeSet::new();
        attributes.insert(AccountAttribute::Admin);
        let updated = tx
            .update_by_pk(
                created.id,
                AccountUpdate {
                    attributes: Some(attributes),
                    ..AccountUpdate::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.is_admin());
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.password_hash, created.password_hash);
        assert_eq!(updated.created_at, created.created_at);

        // Renaming to the current name is not a conflict.
        let same = tx
            .update_by_pk(created.id, AccountUpdate::name(name("alice")))
            .await
            .unwrap();
        assert_eq!(same.name, name("alice"));
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let store = InMemoryAccountStore::new();
        let mut tx = store.begin().await.unwrap();

        assert_eq!(
            tx.get_by_pk(AccountId(1)).await.unwrap_err(),
            StoreError::NotFound
        );
        assert_eq!(
            tx.update_by_pk(AccountId(1), AccountUpdate::password_hash("a:b".to_string()))
                .await
                .unwrap_err(),
            StoreError::NotFound
        );
        assert_eq!(
            tx.delete_by_pk(AccountId(1)).await.unwrap_err(),
            StoreError::NotFound
        );
    }

    #[tokio::test]
    async fn test_delete_by_pk() {
        let store = InMemoryAccountStore::new();
        let mut tx = store.begin().await.unwrap();

        let created = tx.create(new_account("alice")).await.unwrap();
        tx.delete_by_pk(created.id).await.unwrap();

        assert_eq!(
            tx.get_by_pk(created.id).await.unwrap_err(),
            StoreError::NotFound
        );
    }

    #[tokio::test]
    async fn test_begin_waits_for_open_transaction() {
        let store = InMemoryAccountStore::new();
        let tx = store.begin().await.unwrap();

        let waiting = tokio::time::timeout(Duration::from_millis(50), store.begin()).await;
        assert!(waiting.is_err());

        drop(tx);
        let next = tokio::time::timeout(Duration::from_secs(1), store.begin()).await;
        assert!(next.is_ok());
    }
}
