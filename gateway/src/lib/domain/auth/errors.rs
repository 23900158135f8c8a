use thiserror::Error;

use crate::domain::account::errors::AccountNameError;
use crate::domain::account::errors::StoreError;
use crate::domain::account::models::AccountId;

/// Token provider errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Bad signature, undecodable payload, missing claim or unknown attribute.
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token has expired")]
    Expired,

    #[error("Token encoding failed: {0}")]
    EncodingFailed(String),
}

/// Errors of the authentication use cases.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Bad credentials, bad token or missing privilege.
    #[error("{0}")]
    Unauthorized(String),

    #[error("User '{0}' already exists")]
    UserAlreadyExists(String),

    #[error("Username '{0}' already exists")]
    UsernameTaken(String),

    #[error("Account {0} not found")]
    AccountNotFound(AccountId),

    #[error("Invalid account name: {0}")]
    InvalidAccountName(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Password hashing failed: {0}")]
    Password(String),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<AccountNameError> for AuthError {
    fn from(err: AccountNameError) -> Self {
        AuthError::InvalidAccountName(err.to_string())
    }
}

impl AuthError {
    pub fn invalid_credentials() -> Self {
        AuthError::Unauthorized("Invalid credentials".to_string())
    }
}
