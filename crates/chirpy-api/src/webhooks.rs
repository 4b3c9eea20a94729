use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use tracing::debug;

use chirpy_types::api::{PolkaWebhook, USER_UPGRADED_EVENT};

use crate::error::ApiError;
use crate::middleware::api_key;
use crate::{AppState, run_blocking};

/// Payment provider callback. Only `user.upgraded` does anything; other
/// events are acknowledged and dropped.
///
/// The key is checked before the body is decoded, so unauthenticated callers
/// always get 401.
pub async fn polka(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    if api_key(&headers)? != state.polka_api_key {
        return Err(ApiError::InvalidToken("api key mismatch".into()));
    }

    let Json(hook) = Json::<PolkaWebhook>::from_bytes(&body)
        .map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))?;

    if hook.event != USER_UPGRADED_EVENT {
        debug!("Ignoring webhook event {}", hook.event);
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = hook.data.user_id;
    run_blocking(move || state.accounts.upgrade_user(user_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
