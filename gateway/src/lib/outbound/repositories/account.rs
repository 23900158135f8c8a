use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::Postgres;
use sqlx::Transaction;

use crate::domain::account::errors::ConflictCause;
use crate::domain::account::errors::StoreError;
use crate::domain::account::models::parse_attributes;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountCreate;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountName;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::models::AttributeSet;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::AccountStore;
use crate::domain::account::ports::AccountTransaction;

const NAME_UNIQUE_CONSTRAINT: &str = "accounts_name_key";

/// Account store backed by PostgreSQL.
#[derive(Clone)]
pub struct PostgresAccountStore {
    pool: PgPool,
}

impl PostgresAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PostgresAccountStore {
    type Transaction = PostgresAccountTransaction;

    async fn begin(&self) -> Result<PostgresAccountTransaction, StoreError> {
        let tx = self.pool.begin().await.map_err(database_error)?;
        Ok(PostgresAccountTransaction { tx })
    }
}

/// A database transaction. sqlx rolls it back when dropped uncommitted.
pub struct PostgresAccountTransaction {
    tx: Transaction<'static, Postgres>,
}

#[derive(sqlx::FromRow)]
struct AccountRow {
    id: i64,
    name: String,
    password_hash: String,
    attributes: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        let attributes = parse_attributes(&row.attributes)
            .map_err(|e| StoreError::Database(format!("Corrupt account {}: {}", row.id, e)))?;

        Ok(Account {
            id: AccountId(row.id),
            name: AccountName::from_stored(row.name),
            password_hash: row.password_hash,
            attributes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn attributes_to_row(attributes: &AttributeSet) -> Vec<String> {
    attributes.iter().map(|a| a.as_str().to_string()).collect()
}

fn database_error(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

/// Integrity violations become conflicts; the constraint name tells which.
fn write_error(e: sqlx::Error, name: Option<&AccountName>) -> StoreError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(NAME_UNIQUE_CONSTRAINT) {
            let name = name.map(|n| n.to_string()).unwrap_or_default();
            return StoreError::Conflict(ConflictCause::DuplicateName(name));
        }
        if db_err.is_unique_violation() || db_err.is_check_violation() {
            return StoreError::Conflict(ConflictCause::Other(db_err.message().to_string()));
        }
    }
    database_error(e)
}

const ACCOUNT_COLUMNS: &str = "id, name, password_hash, attributes, created_at, updated_at";

#[async_trait]
impl AccountRepository for PostgresAccountTransaction {
    async fn create(&mut self, data: AccountCreate) -> Result<Account, StoreError> {
        let query = format!(
            r#"
            INSERT INTO accounts (name, password_hash, attributes)
            VALUES ($1, $2, $3)
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(data.name.as_str())
            .bind(&data.password_hash)
            .bind(attributes_to_row(&data.attributes))
            .fetch_one(&mut *self.tx)
            .await
            .map_err(|e| write_error(e, Some(&data.name)))?;

        row.try_into()
    }

    async fn get_by_pk(&mut self, pk: AccountId) -> Result<Account, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");

        sqlx::query_as::<_, AccountRow>(&query)
            .bind(pk.0)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(database_error)?
            .ok_or(StoreError::NotFound)?
            .try_into()
    }

    async fn get_by_name(&mut self, name: &AccountName) -> Result<Account, StoreError> {
        let query = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE name = $1");

        sqlx::query_as::<_, AccountRow>(&query)
            .bind(name.as_str())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(database_error)?
            .ok_or(StoreError::NotFound)?
            .try_into()
    }

    async fn update_by_pk(
        &mut self,
        pk: AccountId,
        data: AccountUpdate,
    ) -> Result<Account, StoreError> {
        if data.is_empty() {
            return self.get_by_pk(pk).await;
        }

        let query = format!(
            r#"
            UPDATE accounts
            SET name = COALESCE($2, name),
                password_hash = COALESCE($3, password_hash),
                attributes = COALESCE($4, attributes),
                updated_at = now()
            WHERE id = $1
            RETURNING {ACCOUNT_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, AccountRow>(&query)
            .bind(pk.0)
            .bind(data.name.as_ref().map(|n| n.as_str()))
            .bind(data.password_hash.as_deref())
            .bind(data.attributes.as_ref().map(attributes_to_row))
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| write_error(e, data.name.as_ref()))?
            .ok_or(StoreError::NotFound)?;

        row.try_into()
    }

    async fn delete_by_pk(&mut self, pk: AccountId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(pk.0)
            .execute(&mut *self.tx)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }
}

#[async_trait]
impl AccountTransaction for PostgresAccountTransaction {
    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await.map_err(database_error)
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await.map_err(database_error)
    }
}
