use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use chirpy_types::api::{CredentialsRequest, LoginResponse, RefreshResponse};
use chirpy_types::models::User;

use crate::error::ApiError;
use crate::middleware::{authenticated_user, bearer_token};
use crate::{AppState, run_blocking};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = run_blocking(move || state.accounts.create_user(&req.email, &req.password)).await?;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let st = state.clone();
    let (user, refresh_token) = run_blocking(move || {
        // Don't tell callers which half of the pair was wrong.
        let user = st
            .accounts
            .authenticate(&req.email, &req.password)
            .map_err(|e| match e {
                ApiError::UserNotFound => ApiError::InvalidCredentials,
                other => other,
            })?;
        let refresh_token = st.accounts.issue_refresh_token(user.id)?;
        Ok((user, refresh_token))
    })
    .await?;

    let token = state.tokens.issue(user.id)?;

    Ok(Json(LoginResponse {
        user,
        token,
        refresh_token,
    }))
}

pub async fn update_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<User>, ApiError> {
    let user_id = authenticated_user(&headers, &state.tokens)?;

    let user = run_blocking(move || {
        state.accounts.update_user(user_id, &req.email, &req.password)
    })
    .await?;

    Ok(Json(user))
}

/// Exchange a refresh token for a new access token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let refresh_token = bearer_token(&headers)?.to_string();

    let st = state.clone();
    let user = run_blocking(move || {
        let user_id = st.accounts.verify_refresh_token(&refresh_token)?;
        st.accounts.user(user_id)
    })
    .await
    .map_err(ApiError::unknown_token_as_unauthorized)?;

    let token = state.tokens.issue(user.id)?;
    Ok(Json(RefreshResponse { token }))
}

pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let refresh_token = bearer_token(&headers)?.to_string();

    run_blocking(move || state.accounts.revoke_refresh_token(&refresh_token))
        .await
        .map_err(ApiError::unknown_token_as_unauthorized)?;

    Ok(StatusCode::NO_CONTENT)
}
