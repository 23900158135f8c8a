use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::AccountData;
use super::ApiError;
use super::ApiSuccess;
use super::TokenData;
use crate::domain::account::models::AccountName;
use crate::domain::account::models::AttributeSet;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::RegisterCommand;
use crate::domain::auth::models::RegisterOutcome;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<RegisterResponseData>, ApiError> {
    state
        .auth_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|ref outcome| ApiSuccess::new(StatusCode::CREATED, outcome.into()))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    name: String,
    password: String,
}

impl RegisterRequest {
    /// Public registration never grants attributes.
    fn try_into_command(self) -> Result<RegisterCommand, AuthError> {
        Ok(RegisterCommand {
            name: AccountName::new(self.name)?,
            password: self.password,
            attributes: AttributeSet::new(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterResponseData {
    pub user: AccountData,
    pub token: TokenData,
}

impl From<&RegisterOutcome> for RegisterResponseData {
    fn from(outcome: &RegisterOutcome) -> Self {
        Self {
            user: (&outcome.account).into(),
            token: (&outcome.token).into(),
        }
    }
}
