use std::sync::atomic::Ordering;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};

use crate::AppState;
use crate::error::ApiError;
use crate::tokens::AccessTokens;

fn authorization(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::MissingCredentials)
}

fn strip_scheme<'a>(value: &'a str, scheme: &str) -> Result<&'a str, ApiError> {
    value
        .strip_prefix(scheme)
        .and_then(|rest| rest.strip_prefix(' '))
        .map(str::trim)
        .filter(|credential| !credential.is_empty())
        .ok_or(ApiError::MissingCredentials)
}

/// `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    strip_scheme(authorization(headers)?, "Bearer")
}

/// `Authorization: ApiKey <key>`
pub fn api_key(headers: &HeaderMap) -> Result<&str, ApiError> {
    strip_scheme(authorization(headers)?, "ApiKey")
}

/// Extract and validate the access token, returning the caller's user id.
pub fn authenticated_user(headers: &HeaderMap, tokens: &AccessTokens) -> Result<u32, ApiError> {
    tokens.verify(bearer_token(headers)?)
}

/// Counts requests served by the static file server.
pub async fn count_hits(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let response = next.run(req).await;
    state.file_server_hits.fetch_add(1, Ordering::Relaxed);
    response
}
