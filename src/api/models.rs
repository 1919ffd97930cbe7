//! Request and response bodies of the HTTP API.
//!
//! Film and user documents travel as plain JSON objects (see
//! [`crate::store::Document`]); only the envelopes around them are typed here.
//!
//! ```json
//! POST /api/films
//! {
//!   "titre": "Inception",
//!   "description": "A thief who steals corporate secrets through dreams.",
//!   "annee": "2010",
//!   "realisation": "Christopher Nolan",
//!   "titreVignette": "inception.jpg"
//! }
//!
//! 201 Created
//! { "message": "Film added successfully", "filmId": "0192f0c4..." }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::validation::FieldError;
use crate::observability::MetricsSnapshot;

/// Sorting parameters of `GET /api/films`
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub tri: Option<String>,
    pub ordre: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FilmCreatedResponse {
    pub message: String,
    #[serde(rename = "filmId")]
    pub film_id: String,
}

/// Registration and login answer; `utilisateur` never carries `mdp`
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserResponse {
    pub message: String,
    pub utilisateur: Value,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub metrics: MetricsSnapshot,
}
