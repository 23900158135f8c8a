use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::account::models::parse_attributes;
use crate::domain::account::models::AccountId;
use crate::domain::auth::errors::TokenError;
use crate::domain::auth::models::AuthToken;
use crate::domain::auth::models::AuthTokenData;
use crate::domain::auth::models::TokenSubject;
use crate::domain::auth::ports::TokenProvider;

/// Unsigned, human-readable tokens: `<id>:<attr,attr>:<exp unix>`.
///
/// Anyone can forge these. Only for tests and local tooling.
#[derive(Debug, Clone)]
pub struct FakeTokenProvider {
    ttl: Duration,
}

impl FakeTokenProvider {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl }
    }
}

impl Default for FakeTokenProvider {
    fn default() -> Self {
        Self::new(Duration::hours(1))
    }
}

impl TokenProvider for FakeTokenProvider {
    fn generate_token(
        &self,
        subject: &TokenSubject,
        expire_at: Option<DateTime<Utc>>,
    ) -> Result<AuthToken, TokenError> {
        let expires_at = match expire_at {
            Some(at) => at,
            None => Utc::now().checked_add_signed(self.ttl).ok_or_else(|| {
                TokenError::EncodingFailed(format!("lifetime {} overflows expiry", self.ttl))
            })?,
        };
        let attributes = subject
            .attributes
            .iter()
            .map(|a| a.as_str())
            .collect::<Vec<_>>()
            .join(",");

        Ok(AuthToken::bearer(format!(
            "{}:{}:{}",
            subject.account_id,
            attributes,
            expires_at.timestamp()
        )))
    }

    fn validate_token(&self, raw: &str) -> Result<AuthTokenData, TokenError> {
        let parts: Vec<&str> = raw.split(':').collect();
        let [id, attributes, exp] = parts.as_slice() else {
            return Err(TokenError::Invalid(format!(
                "expected 3 fields, got {}",
                parts.len()
            )));
        };

        let account_id =
            AccountId::from_string(id).map_err(|e| TokenError::Invalid(e.to_string()))?;
        let attributes = parse_attributes(attributes.split(',').filter(|a| !a.is_empty()))
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        let exp: i64 = exp
            .parse()
            .map_err(|_| TokenError::Invalid(format!("bad expiry '{}'", exp)))?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| TokenError::Invalid(format!("expiry out of range: {}", exp)))?;

        if Utc::now().timestamp() > exp {
            return Err(TokenError::Expired);
        }

        Ok(AuthTokenData {
            account_id,
            attributes,
            expires_at,
        })
    }
}
