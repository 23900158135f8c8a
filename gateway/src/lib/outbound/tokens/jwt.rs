use auth::Claims;
use auth::JwtError;
use auth::JwtHandler;
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

/// Signed HS256 tokens carrying `sub`, `scope` and `exp`.
pub struct JwtTokenProvider {
    handler: JwtHandler,
    ttl: Duration,
}

impl JwtTokenProvider {
    /// Create a provider.
    ///
    /// # Arguments
    /// * `secret` - Server-held signing key
    /// * `ttl` - Lifetime of tokens minted without an explicit expiry
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            ttl,
        }
    }
}

impl TokenProvider for JwtTokenProvider {
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
        let claims = Claims::for_subject(
            subject.account_id,
            subject.attributes.iter().map(|a| a.as_str()),
            expires_at,
        );

        let token = self
            .handler
            .encode(&claims)
            .map_err(|e| TokenError::EncodingFailed(e.to_string()))?;

        Ok(AuthToken::bearer(token))
    }

    fn validate_token(&self, raw: &str) -> Result<AuthTokenData, TokenError> {
        let claims: Claims = self.handler.decode(raw).map_err(|e| match e {
            JwtError::TokenExpired => TokenError::Expired,
            other => TokenError::Invalid(other.to_string()),
        })?;

        token_data_from_claims(&claims, Utc::now())
    }
}

fn token_data_from_claims(
    claims: &Claims,
    now: DateTime<Utc>,
) -> Result<AuthTokenData, TokenError> {
    let sub = claims
        .sub
        .as_deref()
        .ok_or_else(|| TokenError::Invalid("missing 'sub' claim".to_string()))?;
    if claims.scope.is_none() {
        return Err(TokenError::Invalid("missing 'scope' claim".to_string()));
    }
    let exp = claims
        .exp
        .ok_or_else(|| TokenError::Invalid("missing 'exp' claim".to_string()))?;

    if claims.is_expired(now.timestamp()) {
        return Err(TokenError::Expired);
    }

    let account_id =
        AccountId::from_string(sub).map_err(|e| TokenError::Invalid(e.to_string()))?;
    let attributes =
        parse_attributes(claims.scopes()).map_err(|e| TokenError::Invalid(e.to_string()))?;
    let expires_at = DateTime::from_timestamp(exp, 0)
        .ok_or_else(|| TokenError::Invalid(format!("'exp' out of range: {}", exp)))?;

    Ok(AuthTokenData {
        account_id,
        attributes,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::models::AccountAttribute;
    use crate::domain::account::models::AttributeSet;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn provider() -> JwtTokenProvider {
        JwtTokenProvider::new(SECRET, Duration::hours(1))
    }

    fn admin_subject() -> TokenSubject {
        let mut attributes = AttributeSet::new();
        attributes.insert(AccountAttribute::Admin);
        TokenSubject {
            account_id: AccountId(42),
            attributes,
        }
    }

    #[test]
    fn test_generate_and_validate() {
        let provider = provider();
        let expires_at = Utc::now() + Duration::minutes(10);

        let token = provider
            .generate_token(&admin_subject(), Some(expires_at))
            .unwrap();
        assert_eq!(token.token_type, "Bearer");

        let data = provider.validate_token(&token.access_token).unwrap();
        assert_eq!(data.account_id, AccountId(42));
        assert!(data.is_admin());
        assert_eq!(data.expires_at.timestamp(), expires_at.timestamp());
    }

    #[test]
    fn test_default_expiry_uses_ttl() {
        let provider = provider();
        let before = Utc::now();

        let token = provider.generate_token(&admin_subject(), None).unwrap();
        let data = provider.validate_token(&token.access_token).unwrap();

        let lifetime = data.expires_at - before;
        assert!(lifetime > Duration::minutes(59));
        assert!(lifetime <= Duration::hours(1) + Duration::seconds(1));
    }

    #[test]
    fn test_empty_attributes_round_trip() {
        let provider = provider();
        let subject = TokenSubject {
            account_id: AccountId(7),
            attributes: AttributeSet::new(),
        };

        let token = provider.generate_token(&subject, None).unwrap();
        let data = provider.validate_token(&token.access_token).unwrap();

        assert_eq!(data.account_id, AccountId(7));
        assert!(data.attributes.is_empty());
        assert!(!data.is_admin());
    }

    #[test]
    fn test_expired_token() {
        let provider = provider();
        let token = provider
            .generate_token(&admin_subject(), Some(Utc::now() - Duration::seconds(5)))
            .unwrap();

        assert_eq!(
            provider.validate_token(&token.access_token).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_wrong_secret() {
        let token = provider().generate_token(&admin_subject(), None).unwrap();
        let other = JwtTokenProvider::new(b"another_secret_key_of_32_bytes!!", Duration::hours(1));

        assert!(matches!(
            other.validate_token(&token.access_token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_garbage_token() {
        assert!(matches!(
            provider().validate_token("not.a.token"),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(
            provider().validate_token(""),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_claims_are_rejected() {
        let handler = JwtHandler::new(SECRET);
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let provider = provider();

        let cases = [
            Claims::new().with_scopes(["admin"]).with_expiration(exp),
            Claims::new().with_subject(1).with_expiration(exp),
            Claims::new().with_subject(1).with_scopes(["admin"]),
        ];

        for claims in cases {
            let token = handler.encode(&claims).unwrap();
            assert!(
                matches!(provider.validate_token(&token), Err(TokenError::Invalid(_))),
                "accepted {:?}",
                claims
            );
        }
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let handler = JwtHandler::new(SECRET);
        let claims = Claims::for_subject(1, ["admin", "root"], Utc::now() + Duration::hours(1));
        let token = handler.encode(&claims).unwrap();

        assert!(matches!(
            provider().validate_token(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_malformed_scope_separators_are_rejected() {
        let handler = JwtHandler::new(SECRET);
        let exp = (Utc::now() + Duration::hours(1)).timestamp();

        for scope in ["admin  admin", " admin", "admin ", "admin\tadmin"] {
            let claims = Claims {
                scope: Some(scope.to_string()),
                ..Claims::new().with_subject(1).with_expiration(exp)
            };
            let token = handler.encode(&claims).unwrap();

            assert!(
                matches!(provider().validate_token(&token), Err(TokenError::Invalid(_))),
                "accepted scope {:?}",
                scope
            );
        }
    }

    #[test]
    fn test_non_numeric_subject_is_rejected() {
        let handler = JwtHandler::new(SECRET);
        let claims = Claims::for_subject("alice", ["admin"], Utc::now() + Duration::hours(1));
        let token = handler.encode(&claims).unwrap();

        assert!(matches!(
            provider().validate_token(&token),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_oversized_ttl_fails_instead_of_panicking() {
        let provider = JwtTokenProvider::new(SECRET, Duration::seconds(10_000_000_000_000));

        assert!(matches!(
            provider.generate_token(&admin_subject(), None),
            Err(TokenError::EncodingFailed(_))
        ));

        let expires_at = Utc::now() + Duration::minutes(10);
        assert!(provider
            .generate_token(&admin_subject(), Some(expires_at))
            .is_ok());
    }

    #[test]
    fn test_expiry_has_no_leeway() {
        let now = Utc::now();
        let at_expiry = Claims::for_subject(1, Vec::<String>::new(), now);
        let past_expiry =
            Claims::for_subject(1, Vec::<String>::new(), now - Duration::seconds(1));

        assert!(token_data_from_claims(&at_expiry, now).is_ok());
        assert_eq!(
            token_data_from_claims(&past_expiry, now).unwrap_err(),
            TokenError::Expired
        );
    }
}
