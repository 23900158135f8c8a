use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::account::errors::ConflictCause;
use crate::domain::account::errors::StoreError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountCreate;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::ports::AccountRepository;
use crate::domain::account::ports::AccountStore;
use crate::domain::account::ports::AccountTransaction;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::AuthToken;
use crate::domain::auth::models::AuthTokenData;
use crate::domain::auth::models::ChangePasswordCommand;
use crate::domain::auth::models::ChangeUsernameCommand;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::RegisterOutcome;
use crate::domain::auth::models::TokenSubject;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::TokenProvider;

/// Domain service implementing the authentication use cases.
///
/// Every use case runs inside one store transaction. Early returns drop the
/// transaction, which rolls it back; success paths commit explicitly.
pub struct AuthService<S, T>
where
    S: AccountStore,
    T: TokenProvider,
{
    store: Arc<S>,
    tokens: Arc<T>,
    password_hasher: auth::PasswordHasher,
}

impl<S, T> AuthService<S, T>
where
    S: AccountStore,
    T: TokenProvider,
{
    /// Create a new auth service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Account persistence implementation
    /// * `tokens` - Token minting and validation implementation
    pub fn new(store: Arc<S>, tokens: Arc<T>) -> Self {
        Self {
            store,
            tokens,
            password_hasher: auth::PasswordHasher::new(),
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        self.password_hasher
            .hash(password)
            .map_err(|e| AuthError::Password(e.to_string()))
    }

    async fn begin(&self) -> Result<S::Transaction, AuthError> {
        self.store.begin().await.map_err(store_failure)
    }
}

fn require_password(password: &str) -> Result<(), AuthError> {
    if password.is_empty() {
        return Err(AuthError::InvalidPassword("must not be empty".to_string()));
    }
    Ok(())
}

fn store_failure(error: StoreError) -> AuthError {
    tracing::error!(error = %error, "Account store operation failed");
    AuthError::Storage(error)
}

/// An ID taken from a validated token must resolve; if it does not, the
/// token is treated as forged.
fn token_account_missing(account_id: AccountId) -> AuthError {
    tracing::warn!(account_id = %account_id, "Token subject does not resolve to an account");
    AuthError::Unauthorized("Could not validate credentials".to_string())
}

async fn resolve_token_account<Tx>(tx: &mut Tx, account_id: AccountId) -> Result<Account, AuthError>
where
    Tx: AccountTransaction,
{
    match tx.get_by_pk(account_id).await {
        Ok(account) => Ok(account),
        Err(StoreError::NotFound) => Err(token_account_missing(account_id)),
        Err(e) => Err(store_failure(e)),
    }
}

#[async_trait]
impl<S, T> AuthServicePort for AuthService<S, T>
where
    S: AccountStore,
    T: TokenProvider,
{
    async fn register(&self, command: RegisterCommand) -> Result<RegisterOutcome, AuthError> {
        require_password(&command.password)?;
        let password_hash = self.hash_password(&command.password)?;

        let mut tx = self.begin().await?;

        match tx.get_by_name(&command.name).await {
            Ok(_) => {
                tracing::warn!(name = %command.name, "Registration rejected: name already exists");
                return Err(AuthError::UserAlreadyExists(command.name.to_string()));
            }
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(store_failure(e)),
        }

        // A concurrent registration can win between the lookup and the insert.
        let account = tx
            .create(AccountCreate {
                name: command.name.clone(),
                password_hash,
                attributes: command.attributes,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(cause) => {
                    tracing::warn!(
                        name = %command.name,
                        cause = %cause,
                        "Registration rejected by store conflict"
                    );
                    AuthError::UserAlreadyExists(command.name.to_string())
                }
                other => store_failure(other),
            })?;

        tx.commit().await.map_err(store_failure)?;

        tracing::info!(
            account_id = %account.id,
            name = %account.name,
            admin = account.is_admin(),
            "Account registered"
        );

        let token = self
            .tokens
            .generate_token(&TokenSubject::from(&account), None)?;

        Ok(RegisterOutcome { account, token })
    }

    async fn login(&self, command: LoginCommand) -> Result<AuthToken, AuthError> {
        let mut tx = self.begin().await?;

        let account = match tx.get_by_name(&command.name).await {
            Ok(account) => account,
            Err(StoreError::NotFound) => {
                tracing::warn!(name = %command.name, reason = "unknown name", "Login rejected");
                return Err(AuthError::invalid_credentials());
            }
            Err(e) => return Err(store_failure(e)),
        };

        if !self
            .password_hasher
            .validate(&account.password_hash, &command.password)
        {
            tracing::warn!(name = %command.name, reason = "wrong password", "Login rejected");
            return Err(AuthError::invalid_credentials());
        }

        tx.commit().await.map_err(store_failure)?;

        tracing::debug!(account_id = %account.id, "Login succeeded");

        let token = self
            .tokens
            .generate_token(&TokenSubject::from(&account), None)?;

        Ok(token)
    }

    async fn change_password(
        &self,
        command: ChangePasswordCommand,
        account_id: AccountId,
    ) -> Result<(), AuthError> {
        require_password(&command.new_password)?;

        let mut tx = self.begin().await?;

        let account = resolve_token_account(&mut tx, account_id).await?;

        if !self
            .password_hasher
            .validate(&account.password_hash, &command.current_password)
        {
            tracing::warn!(account_id = %account_id, "Password change rejected: current password mismatch");
            return Err(AuthError::Unauthorized(
                "Current password is incorrect".to_string(),
            ));
        }

        let password_hash = self.hash_password(&command.new_password)?;

        tx.update_by_pk(account_id, AccountUpdate::password_hash(password_hash))
            .await
            .map_err(|e| match e {
                StoreError::NotFound => token_account_missing(account_id),
                other => store_failure(other),
            })?;

        tx.commit().await.map_err(store_failure)?;

        tracing::info!(account_id = %account_id, "Password changed");

        Ok(())
    }

    async fn change_username(
        &self,
        command: ChangeUsernameCommand,
        account_id: AccountId,
    ) -> Result<Account, AuthError> {
        let mut tx = self.begin().await?;

        let account = resolve_token_account(&mut tx, account_id).await?;

        let updated = tx
            .update_by_pk(account_id, AccountUpdate::name(command.new_name.clone()))
            .await
            .map_err(|e| match e {
                StoreError::Conflict(ConflictCause::DuplicateName(name)) => {
                    tracing::warn!(account_id = %account_id, name = %name, "Rename rejected: name taken");
                    AuthError::UsernameTaken(name)
                }
                StoreError::NotFound => token_account_missing(account_id),
                other => store_failure(other),
            })?;

        tx.commit().await.map_err(store_failure)?;

        tracing::info!(
            account_id = %account_id,
            previous = %account.name,
            name = %updated.name,
            "Account renamed"
        );

        Ok(updated)
    }

    fn parse_token(&self, raw_token: &str) -> Result<AuthTokenData, AuthError> {
        self.tokens.validate_token(raw_token).map_err(|e| {
            tracing::warn!(error = %e, "Token rejected");
            AuthError::Unauthorized("Could not validate credentials".to_string())
        })
    }

    async fn get_account(&self, account_id: AccountId) -> Result<Account, AuthError> {
        let mut tx = self.begin().await?;

        let account = tx.get_by_pk(account_id).await.map_err(|e| match e {
            StoreError::NotFound => AuthError::AccountNotFound(account_id),
            other => store_failure(other),
        })?;

        tx.commit().await.map_err(store_failure)?;

        Ok(account)
    }
}
