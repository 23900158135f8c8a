use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::AttributeSet;
use crate::domain::auth::models::AuthTokenData;
use crate::inbound::http::middleware::AuthenticatedAccount;

/// Echo the claims of the presented token. Does not touch the store.
pub async fn current_account(
    Extension(AuthenticatedAccount(claims)): Extension<AuthenticatedAccount>,
) -> Result<ApiSuccess<CurrentAccountResponseData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, (&claims).into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentAccountResponseData {
    pub id: i64,
    pub attributes: AttributeSet,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
}

impl From<&AuthTokenData> for CurrentAccountResponseData {
    fn from(claims: &AuthTokenData) -> Self {
        Self {
            id: claims.account_id.0,
            attributes: claims.attributes.clone(),
            is_admin: claims.is_admin(),
            expires_at: claims.expires_at,
        }
    }
}
