use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use crate::domain::account::models::Account;
use crate::domain::account::models::AccountAttribute;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountName;
use crate::domain::account::models::AttributeSet;

/// Token type label returned with every issued token.
pub const TOKEN_TYPE_BEARER: &str = "Bearer";

/// Identity a token is minted for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub account_id: AccountId,
    pub attributes: AttributeSet,
}

impl From<&Account> for TokenSubject {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            attributes: account.attributes.clone(),
        }
    }
}

/// Claims recovered from a validated token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthTokenData {
    pub account_id: AccountId,
    pub attributes: AttributeSet,
    pub expires_at: DateTime<Utc>,
}

impl AuthTokenData {
    pub fn is_admin(&self) -> bool {
        self.attributes.contains(&AccountAttribute::Admin)
    }
}

/// An issued bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthToken {
    pub access_token: String,
    pub token_type: String,
}

impl AuthToken {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }
}

/// Command to register a new account.
#[derive(Debug, Clone)]
pub struct RegisterCommand {
    pub name: AccountName,
    pub password: String,
    pub attributes: AttributeSet,
}

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub struct RegisterOutcome {
    pub account: Account,
    pub token: AuthToken,
}

/// Command to exchange credentials for a token.
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub name: AccountName,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Clone)]
pub struct ChangeUsernameCommand {
    pub new_name: AccountName,
}
