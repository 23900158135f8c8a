use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountName;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::ChangeUsernameCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::middleware::AuthenticatedAccount;
use crate::inbound::http::router::AppState;

pub async fn change_username(
    State(state): State<AppState>,
    Extension(AuthenticatedAccount(claims)): Extension<AuthenticatedAccount>,
    Json(body): Json<ChangeUsernameRequest>,
) -> Result<ApiSuccess<ChangeUsernameResponseData>, ApiError> {
    let new_name = AccountName::new(body.new_name).map_err(AuthError::from)?;

    state
        .auth_service
        .change_username(ChangeUsernameCommand { new_name }, claims.account_id)
        .await
        .map_err(ApiError::from)
        .map(|ref account| ApiSuccess::new(StatusCode::OK, account.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeUsernameRequest {
    new_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeUsernameResponseData {
    pub message: String,
    pub name: String,
}

impl From<&Account> for ChangeUsernameResponseData {
    fn from(account: &Account) -> Self {
        Self {
            message: "Username changed successfully".to_string(),
            name: account.name.as_str().to_string(),
        }
    }
}
