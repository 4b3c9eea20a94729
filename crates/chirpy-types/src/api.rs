use serde::{Deserialize, Serialize};

use crate::models::User;

// -- JWT Claims --

/// Access token claims. `sub` carries the user id as a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub user: User,
    pub token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub token: String,
}

// -- Chirps --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateChirpRequest {
    pub body: String,
}

/// Query string for `GET /api/chirps`. Both fields are kept raw so the
/// handler decides how lenient to be.
#[derive(Debug, Default, Deserialize)]
pub struct ChirpQuery {
    pub author_id: Option<String>,
    pub sort: Option<String>,
}

// -- Webhooks --

pub const USER_UPGRADED_EVENT: &str = "user.upgraded";

#[derive(Debug, Deserialize)]
pub struct PolkaWebhook {
    pub event: String,
    pub data: PolkaWebhookData,
}

#[derive(Debug, Deserialize)]
pub struct PolkaWebhookData {
    pub user_id: u32,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
