use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::account::errors::AccountAttributeError;
use crate::domain::account::errors::AccountIdError;
use crate::domain::account::errors::AccountNameError;

/// Account aggregate entity.
///
/// The only identity record of the gateway. `password_hash` is opaque here;
/// it is produced and checked by `auth::PasswordHasher`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub name: AccountName,
    pub password_hash: String,
    pub attributes: AttributeSet,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_admin(&self) -> bool {
        self.attributes.contains(&AccountAttribute::Admin)
    }
}

/// Store-assigned account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub i64);

impl AccountId {
    /// Parse an account ID from its decimal string form (the token subject).
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a decimal integer
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        s.parse::<i64>()
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(format!("{}: {}", s, e)))
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Account name value type
///
/// Case-sensitive. 1-64 characters, no whitespace or control characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccountName(String);

impl AccountName {
    const MAX_LENGTH: usize = 64;

    /// Create a new valid account name.
    ///
    /// # Errors
    /// * `Empty` - Name is empty
    /// * `TooLong` - Name longer than 64 characters
    /// * `InvalidCharacters` - Contains whitespace or control characters
    pub fn new(name: String) -> Result<Self, AccountNameError> {
        let length = name.chars().count();
        if length == 0 {
            return Err(AccountNameError::Empty);
        }
        if length > Self::MAX_LENGTH {
            return Err(AccountNameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(AccountNameError::InvalidCharacters);
        }
        Ok(Self(name))
    }

    /// Wrap a name read back from storage without re-validating it.
    ///
    /// Rows written before the current naming rules may hold names that
    /// `new` would now refuse; those accounts must stay readable.
    pub(crate) fn from_stored(name: String) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Privilege tag from a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountAttribute {
    Admin,
}

impl AccountAttribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountAttribute::Admin => "admin",
        }
    }
}

impl FromStr for AccountAttribute {
    type Err = AccountAttributeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(AccountAttribute::Admin),
            other => Err(AccountAttributeError::Unknown(other.to_string())),
        }
    }
}

impl fmt::Display for AccountAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered so that encoded scopes are deterministic.
pub type AttributeSet = BTreeSet<AccountAttribute>;

/// Parse attribute values, rejecting the whole input on the first unknown one.
pub fn parse_attributes<I, S>(values: I) -> Result<AttributeSet, AccountAttributeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    values
        .into_iter()
        .map(|value| value.as_ref().parse::<AccountAttribute>())
        .collect()
}

/// Write-side projection for a new account.
#[derive(Debug, Clone)]
pub struct AccountCreate {
    pub name: AccountName,
    pub password_hash: String,
    pub attributes: AttributeSet,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct AccountUpdate {
    pub name: Option<AccountName>,
    pub password_hash: Option<String>,
    pub attributes: Option<AttributeSet>,
}

impl AccountUpdate {
    pub fn name(name: AccountName) -> Self {
        Self {
            name: Some(name),
            ..Self::default()
        }
    }

    pub fn password_hash(password_hash: String) -> Self {
        Self {
            password_hash: Some(password_hash),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.password_hash.is_none() && self.attributes.is_none()
    }
}
