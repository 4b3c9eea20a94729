use std::sync::atomic::Ordering;

use axum::{extract::State, http::StatusCode, response::Html};

use crate::AppState;

pub async fn healthz() -> &'static str {
    "OK"
}

pub async fn metrics(State(state): State<AppState>) -> String {
    format!("Hits: {}", state.file_server_hits.load(Ordering::Relaxed))
}

pub async fn reset(State(state): State<AppState>) -> StatusCode {
    state.file_server_hits.store(0, Ordering::Relaxed);
    StatusCode::OK
}

pub async fn admin_metrics(State(state): State<AppState>) -> Html<String> {
    let hits = state.file_server_hits.load(Ordering::Relaxed);
    Html(format!(
        "<html>\n\n<body>\n    <h1>Welcome, Chirpy Admin</h1>\n    <p>Chirpy has been visited {hits} times!</p>\n</body>\n\n</html>"
    ))
}
