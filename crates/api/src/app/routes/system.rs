use axum::{Json, http::StatusCode};

use crate::app::openapi::document;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn openapi() -> Json<serde_json::Value> {
    Json(document())
}
