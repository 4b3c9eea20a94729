use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use chirpy_types::api::{ChirpQuery, CreateChirpRequest};
use chirpy_types::models::Chirp;

use crate::error::ApiError;
use crate::middleware::authenticated_user;
use crate::service::SortOrder;
use crate::{AppState, run_blocking};

pub async fn create_chirp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = authenticated_user(&headers, &state.tokens)?;

    let chirp = run_blocking(move || state.chirps.create(author_id, &req.body)).await?;

    Ok((StatusCode::CREATED, Json(chirp)))
}

pub async fn list_chirps(
    State(state): State<AppState>,
    Query(query): Query<ChirpQuery>,
) -> Result<Json<Vec<Chirp>>, ApiError> {
    let author_id = match query.author_id.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<u32>()
                .map_err(|_| ApiError::InvalidInput(format!("invalid author_id '{raw}'")))?,
        ),
    };
    let order = SortOrder::from_query(query.sort.as_deref());

    let chirps = run_blocking(move || state.chirps.list(author_id, order)).await?;
    Ok(Json(chirps))
}

pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<u32>,
) -> Result<Json<Chirp>, ApiError> {
    let chirp = run_blocking(move || state.chirps.get(chirp_id)).await?;
    Ok(Json(chirp))
}

pub async fn delete_chirp(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(chirp_id): Path<u32>,
) -> Result<StatusCode, ApiError> {
    let user_id = authenticated_user(&headers, &state.tokens)?;

    run_blocking(move || state.chirps.delete(chirp_id, user_id)).await?;

    Ok(StatusCode::NO_CONTENT)
}
