use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Access token claims.
///
/// The wire format carries exactly three claims. All of them are optional on
/// decode so that callers can reject a token that lacks one with their own
/// error instead of a generic decoding failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (stringified account identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Space-separated privilege attributes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create claims for an account.
    ///
    /// # Arguments
    /// * `subject` - Account identifier
    /// * `scopes` - Attribute values, joined with single spaces
    /// * `expires_at` - Instant after which the token is rejected
    pub fn for_subject<I, S>(subject: impl ToString, scopes: I, expires_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new()
            .with_subject(subject)
            .with_scopes(scopes)
            .with_expiration(expires_at.timestamp())
    }

    /// Set subject.
    pub fn with_subject(mut self, sub: impl ToString) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    /// Set scope from individual values.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = scopes
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.scope = Some(joined);
        self
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Iterate over scope values, split on single spaces.
    ///
    /// An absent or empty claim yields nothing. Otherwise every fragment is
    /// yielded, so doubled, leading or trailing spaces show up as `""`.
    pub fn scopes(&self) -> impl Iterator<Item = &str> {
        self.scope
            .as_deref()
            .filter(|scope| !scope.is_empty())
            .into_iter()
            .flat_map(|scope| scope.split(' '))
    }

    /// Check if token is expired.
    ///
    /// Exact comparison, no leeway: a token is still valid at its `exp` second.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(false, |exp| current_timestamp > exp)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_new_claims() {
        let claims = Claims::new().with_subject("42");
        assert_eq!(claims.sub, Some("42".to_string()));
        assert!(claims.exp.is_none());
        assert!(claims.scope.is_none());
    }

    #[test]
    fn test_for_subject() {
        let expires_at = Utc.timestamp_opt(1_900_000_000, 0).unwrap();
        let claims = Claims::for_subject(7, ["admin"], expires_at);

        assert_eq!(claims.sub, Some("7".to_string()));
        assert_eq!(claims.scope, Some("admin".to_string()));
        assert_eq!(claims.exp, Some(1_900_000_000));
    }

    #[test]
    fn test_empty_scope_round_trips_as_no_values() {
        let claims = Claims::new().with_scopes(Vec::<String>::new());

        assert_eq!(claims.scope, Some(String::new()));
        assert_eq!(claims.scopes().count(), 0);
    }

    #[test]
    fn test_scopes_split_on_spaces() {
        let claims = Claims::new().with_scopes(["admin", "operator"]);

        assert_eq!(claims.scope.as_deref(), Some("admin operator"));
        assert_eq!(claims.scopes().collect::<Vec<_>>(), vec!["admin", "operator"]);
    }

    #[test]
    fn test_scopes_keep_empty_fragments() {
        let cases = [
            ("admin  operator", vec!["admin", "", "operator"]),
            (" admin", vec!["", "admin"]),
            ("admin ", vec!["admin", ""]),
            (" ", vec!["", ""]),
            ("admin\toperator", vec!["admin\toperator"]),
        ];

        for (scope, expected) in cases {
            let claims = Claims {
                scope: Some(scope.to_string()),
                ..Claims::new()
            };
            assert_eq!(claims.scopes().collect::<Vec<_>>(), expected, "scope {:?}", scope);
        }
    }

    #[test]
    fn test_serialized_shape_has_only_three_claims() {
        let expires_at = Utc.timestamp_opt(1_900_000_000, 0).unwrap();
        let claims = Claims::for_subject(1, ["admin"], expires_at);

        let value = serde_json::to_value(&claims).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object.len(), 3);
        assert_eq!(object["sub"], "1");
        assert_eq!(object["scope"], "admin");
        assert_eq!(object["exp"], 1_900_000_000);
    }

    #[test]
    fn test_is_expired() {
        let claims = Claims::new().with_expiration(1000);

        assert!(!claims.is_expired(999)); // Not expired
        assert!(!claims.is_expired(1000)); // Exactly at expiration
        assert!(claims.is_expired(1001)); // Expired
    }

    #[test]
    fn test_is_expired_no_exp_claim() {
        let claims = Claims::new();
        assert!(!claims.is_expired(9999999999));
    }
}
