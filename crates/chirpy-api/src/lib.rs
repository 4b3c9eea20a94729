pub mod admin;
pub mod auth;
pub mod chirps;
pub mod error;
pub mod middleware;
pub mod service;
pub mod tokens;
pub mod webhooks;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{any, get, post},
};
use tower_http::services::ServeDir;
use tracing::error;

use chirpy_db::Database;

use crate::error::ApiError;
use crate::service::{Accounts, Chirps};
use crate::tokens::AccessTokens;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub accounts: Accounts,
    pub chirps: Chirps,
    pub tokens: AccessTokens,
    pub polka_api_key: String,
    pub file_server_hits: AtomicUsize,
}

impl AppStateInner {
    pub fn new(db: Arc<Database>, tokens: AccessTokens, polka_api_key: String) -> Self {
        Self {
            accounts: Accounts::new(db.clone()),
            chirps: Chirps::new(db),
            tokens,
            polka_api_key,
            file_server_hits: AtomicUsize::new(0),
        }
    }
}

/// All API routes plus the static file server under `/app`.
pub fn router(state: AppState, static_dir: &Path) -> Router {
    let files = Router::new()
        .nest_service("/app", ServeDir::new(static_dir))
        .layer(from_fn_with_state(state.clone(), middleware::count_hits));

    Router::new()
        .route("/api/healthz", get(admin::healthz))
        .route("/api/metrics", get(admin::metrics))
        .route("/api/reset", any(admin::reset))
        .route("/admin/metrics", get(admin::admin_metrics))
        .route("/api/users", post(auth::register).put(auth::update_user))
        .route("/api/login", post(auth::login))
        .route("/api/refresh", post(auth::refresh))
        .route("/api/revoke", post(auth::revoke))
        .route("/api/chirps", get(chirps::list_chirps).post(chirps::create_chirp))
        .route(
            "/api/chirps/{id}",
            get(chirps::get_chirp).delete(chirps::delete_chirp),
        )
        .route("/api/polka/webhooks", post(webhooks::polka))
        .with_state(state)
        .merge(files)
}

/// Run blocking store work (file I/O, password hashing) off the async runtime.
pub(crate) async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(e.to_string())
    })?
}
