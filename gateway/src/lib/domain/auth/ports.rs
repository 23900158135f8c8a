use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::TokenError;
use crate::domain::auth::models::AuthToken;
use crate::domain::auth::models::AuthTokenData;
use crate::domain::auth::models::ChangePasswordCommand;
use crate::domain::auth::models::ChangeUsernameCommand;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::RegisterOutcome;
use crate::domain::auth::models::TokenSubject;

/// Issues and validates self-contained bearer tokens.
///
/// Stateless: nothing is looked up in storage, and the same token validates
/// the same way until the clock passes its expiry.
pub trait TokenProvider: Send + Sync + 'static {
    /// Mint a token for `subject`.
    ///
    /// # Arguments
    /// * `subject` - Account identity and attributes to embed
    /// * `expire_at` - Expiry instant; `None` means now plus the configured TTL
    ///
    /// # Errors
    /// * `EncodingFailed` - Token could not be produced
    fn generate_token(
        &self,
        subject: &TokenSubject,
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<AuthToken, TokenError>;

    /// Validate a raw token and recover its claims.
    ///
    /// # Errors
    /// * `Expired` - Current time is past the token's expiry
    /// * `Invalid` - Any other reason the token is not acceptable
    fn validate_token(&self, raw: &str) -> Result<AuthTokenData, TokenError>;
}

/// Authentication use cases.
///
/// This is the surface inbound adapters depend on.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Create an account and mint its first token.
    ///
    /// # Errors
    /// * `UserAlreadyExists` - Name is taken (pre-check or store conflict)
    /// * `Password` - Hashing failed
    /// * `Token` - Token could not be minted
    /// * `Storage` - Store failure
    async fn register(&self, command: RegisterCommand) -> Result<RegisterOutcome, AuthError>;

    /// Exchange a name and password for a token.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown name or wrong password, indistinguishably
    async fn login(&self, command: LoginCommand) -> Result<AuthToken, AuthError>;

    /// Replace the password of the account identified by a validated token.
    ///
    /// # Errors
    /// * `Unauthorized` - Account gone, or current password incorrect
    async fn change_password(
        &self,
        command: ChangePasswordCommand,
        account_id: AccountId,
    ) -> Result<(), AuthError>;

    /// Rename the account identified by a validated token.
    ///
    /// # Errors
    /// * `Unauthorized` - Account gone
    /// * `UsernameTaken` - Another account holds the new name
    async fn change_username(
        &self,
        command: ChangeUsernameCommand,
        account_id: AccountId,
    ) -> Result<Account, AuthError>;

    /// Validate a bearer token. Every failure is `Unauthorized`.
    fn parse_token(&self, raw_token: &str) -> Result<AuthTokenData, AuthError>;

    /// Look up an account for administrative reads.
    ///
    /// # Errors
    /// * `AccountNotFound` - No account has this ID
    async fn get_account(&self, account_id: AccountId) -> Result<Account, AuthError>;
}
