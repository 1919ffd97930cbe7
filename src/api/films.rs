//! Film catalogue endpoints (`/api/films`)

use axum::{
    Json,
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::Value;
use tracing::{debug, info};

use super::error::{ApiError, internal};
use super::models::{FilmCreatedResponse, ListQuery, MessageResponse};
use super::state::AppState;
use super::utils::read_json_object;
use super::validation::validate_film;
use crate::store::{SortDirection, StoreError};

pub const COLLECTION: &str = "film";
pub const DEFAULT_SORT_FIELD: &str = "annee";

const FILM_NOT_FOUND: &str = "film not found";

/// Film listing (GET /api/films?tri=&ordre=)
///
/// `tri` names the sort field (default `annee`) and is handed to the store
/// as is; films lacking that field are left out. `ordre` is `asc` (default)
/// or `desc`; anything else is a failed query.
pub async fn list_films(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let field = query
        .tri
        .filter(|tri| !tri.is_empty())
        .unwrap_or_else(|| DEFAULT_SORT_FIELD.to_string());
    let direction = match query.ordre.as_deref() {
        None | Some("") => SortDirection::default(),
        Some(ordre) => ordre
            .parse::<SortDirection>()
            .map_err(internal("A server error occurred while listing films"))?,
    };

    let films: Vec<Value> = state
        .store
        .list_ordered(COLLECTION, &field, direction)
        .await
        .map_err(internal("A server error occurred while listing films"))?
        .into_iter()
        .map(|doc| doc.into_json_with_id())
        .collect();

    Ok((StatusCode::OK, Json(films)))
}

/// Film retrieval (GET /api/films/{id}); the id is attached as in listings
pub async fn get_film(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let film = state
        .store
        .get(COLLECTION, &id)
        .await
        .map_err(internal("A server error occurred while fetching the film"))?
        .ok_or_else(|| ApiError::NotFound(FILM_NOT_FOUND.to_string()))?;

    Ok((StatusCode::OK, Json(film.into_json_with_id())))
}

/// Film creation (POST /api/films)
pub async fn create_film(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, ApiError> {
    let payload = read_json_object(&headers, body, state.max_payload_bytes()).await?;
    let film = validate_film(&payload, &state.config.validation).map_err(ApiError::Validation)?;

    let film_id = state
        .store
        .insert(COLLECTION, film)
        .await
        .map_err(internal("Error while adding the film"))?;

    state.metrics.film_created();
    info!(%film_id, "Film created");

    let response = FilmCreatedResponse {
        message: "Film added successfully".to_string(),
        film_id,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Film update (PUT /api/films/{id})
///
/// Only the validated film fields are written; other keys of the body are
/// ignored. Updating an unknown id is a 404.
pub async fn update_film(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, ApiError> {
    let payload = read_json_object(&headers, body, state.max_payload_bytes()).await?;
    let film = validate_film(&payload, &state.config.validation).map_err(ApiError::Validation)?;

    match state.store.update(COLLECTION, &id, film).await {
        Ok(()) => {}
        Err(StoreError::DocumentNotFound { .. }) => {
            return Err(ApiError::NotFound(FILM_NOT_FOUND.to_string()));
        }
        Err(err) => return Err(internal("An error occurred while updating the film")(err)),
    }

    state.metrics.film_updated();
    info!(film_id = %id, "Film updated");

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Film updated successfully")),
    ))
}

/// Film deletion (DELETE /api/films/{id}); succeeds whether or not the id existed
pub async fn delete_film(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state
        .store
        .delete(COLLECTION, &id)
        .await
        .map_err(internal("Error while deleting the film"))?;

    if deleted {
        state.metrics.film_deleted();
        info!(film_id = %id, "Film deleted");
    } else {
        debug!(film_id = %id, "Delete of unknown film ignored");
    }

    Ok((
        StatusCode::OK,
        Json(MessageResponse::new("Film deleted successfully")),
    ))
}
