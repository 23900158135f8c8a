use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use crate::domain::auth::models::AuthTokenData;
use crate::domain::auth::ports::AuthServicePort;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;

const BEARER_SCHEME: &str = "bearer";

/// Claims of the validated token, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount(pub AuthTokenData);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    Authenticated,
    Admin,
}

/// Middleware that validates the bearer token and adds its claims to request extensions
pub async fn authenticate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(&state, req, next, Requirement::Authenticated).await
}

/// Like `authenticate`, and additionally requires the `admin` attribute.
pub async fn authenticate_admin(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    guard(&state, req, next, Requirement::Admin).await
}

async fn guard(
    state: &AppState,
    mut req: Request,
    next: Next,
    requirement: Requirement,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())?;

    let claims = state
        .auth_service
        .parse_token(token)
        .map_err(ApiError::from)?;

    if requirement == Requirement::Admin && !claims.is_admin() {
        tracing::warn!(
            account_id = %claims.account_id,
            uri = %req.uri(),
            "Admin route refused"
        );
        return Err(ApiError::Unauthorized(
            "Admin privileges required".to_string(),
        ));
    }

    req.extensions_mut().insert(AuthenticatedAccount(claims));

    Ok(next.run(req).await)
}

/// Extract the credential from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".to_string()))?;

    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("Invalid Authorization header".to_string()))?;

    match value.trim().split_once(' ') {
        Some((scheme, token))
            if scheme.eq_ignore_ascii_case(BEARER_SCHEME) && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => Err(ApiError::Unauthorized(
            "Invalid Authorization header format. Expected: Bearer <token>".to_string(),
        )),
    }
}
