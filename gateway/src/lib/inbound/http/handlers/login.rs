use axum::extract::State;
use axum::http::StatusCode;
use axum::Form;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::TokenData;
use crate::domain::account::models::AccountName;
use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::LoginCommand;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::router::AppState;

/// OAuth2 password-grant style login.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<ApiSuccess<TokenData>, ApiError> {
    // A name that could never be registered gets the same answer as an unknown one.
    let name = AccountName::new(form.username)
        .map_err(|_| ApiError::from(AuthError::invalid_credentials()))?;

    state
        .auth_service
        .login(LoginCommand {
            name,
            password: form.password,
        })
        .await
        .map_err(ApiError::from)
        .map(|ref token| ApiSuccess::new(StatusCode::OK, token.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}
