use thiserror::Error;

/// Error for AccountId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountIdError {
    #[error("Invalid account ID: {0}")]
    InvalidFormat(String),
}

/// Error for AccountName validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountNameError {
    #[error("Account name must not be empty")]
    Empty,

    #[error("Account name too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Account name must not contain whitespace or control characters")]
    InvalidCharacters,
}

/// Error for attribute parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccountAttributeError {
    #[error("Unknown account attribute: {0}")]
    Unknown(String),
}

/// Which uniqueness rule a write violated.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConflictCause {
    /// Another account already holds this name.
    #[error("name '{0}' is already taken")]
    DuplicateName(String),

    /// Any other integrity violation, with the store's description.
    #[error("{0}")]
    Other(String),
}

/// Account store errors.
///
/// Never shown to callers as-is: each use case reinterprets `NotFound` and
/// `Conflict` into its own error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Account not found")]
    NotFound,

    #[error("Account can't be created or changed: {0}")]
    Conflict(ConflictCause),

    #[error("Database error: {0}")]
    Database(String),
}
