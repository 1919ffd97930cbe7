//! Account endpoints (`/api/utilisateurs`)

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::Value;
use tracing::{info, warn};

use super::error::{ApiError, internal};
use super::models::UserResponse;
use super::password::{hash_password, verify_password};
use super::state::AppState;
use super::utils::read_json_object;
use super::validation::{login_credentials, validate_registration};
use crate::store::{Document, Fields, StoreError};

pub const COLLECTION: &str = "utilisateurs";
pub const EMAIL_FIELD: &str = "courriel";
pub const PASSWORD_FIELD: &str = "mdp";

/// User document as returned to clients: id attached, password hash removed
fn public_user(doc: Document) -> Value {
    let mut user = doc.into_json_with_id();
    if let Value::Object(fields) = &mut user {
        fields.remove(PASSWORD_FIELD);
    }
    user
}

/// Registration (POST /api/utilisateurs/inscription)
///
/// The email is unique through the store's index on `courriel`, so the
/// duplicate check and the insert cannot interleave with a concurrent
/// registration.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, ApiError> {
    let payload = read_json_object(&headers, body, state.max_payload_bytes()).await?;
    let credentials =
        validate_registration(&payload, &state.config.validation).map_err(ApiError::Validation)?;

    let password = credentials.mdp;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(internal("Registration failed"))?
        .map_err(internal("Registration failed"))?;

    let mut fields = Fields::new();
    fields.insert(EMAIL_FIELD.to_string(), Value::String(credentials.courriel));
    fields.insert(PASSWORD_FIELD.to_string(), Value::String(hash));

    let id = match state.store.insert(COLLECTION, fields.clone()).await {
        Ok(id) => id,
        Err(StoreError::UniqueViolation { .. }) => {
            return Err(ApiError::Conflict("email already exists".to_string()));
        }
        Err(err) => return Err(internal("Registration failed")(err)),
    };

    state.metrics.user_registered();
    info!(user_id = %id, "User registered");

    let response = UserResponse {
        message: "Registration successful".to_string(),
        utilisateur: public_user(Document { id, fields }),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Login (POST /api/utilisateurs/connexion)
///
/// Duplicates cannot exist under the unique index; should a store hold
/// several matches anyway, the first one is checked.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Body,
) -> Result<impl IntoResponse, ApiError> {
    let payload = read_json_object(&headers, body, state.max_payload_bytes()).await?;
    let credentials = login_credentials(&payload);

    let user = state
        .store
        .query(
            COLLECTION,
            EMAIL_FIELD,
            &Value::String(credentials.courriel.clone()),
        )
        .await
        .map_err(internal("Login failed"))?
        .into_iter()
        .next();

    let Some(user) = user else {
        state.metrics.login_failed();
        return Err(ApiError::Auth("invalid email".to_string()));
    };

    let hash = user
        .fields
        .get(PASSWORD_FIELD)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| internal("Login failed")(format!("user {} has no password hash", user.id)))?;

    let password = credentials.mdp;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(internal("Login failed"))?
        .map_err(internal("Login failed"))?;

    if !verified {
        state.metrics.login_failed();
        warn!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::Auth("invalid password".to_string()));
    }

    state.metrics.login_succeeded();
    info!(user_id = %user.id, "User logged in");

    let response = UserResponse {
        message: "Login successful".to_string(),
        utilisateur: public_user(user),
    };

    Ok((StatusCode::OK, Json(response)))
}
