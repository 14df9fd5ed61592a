use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::errors::AppError;
use crate::store::attachments::{content_type_for, parse_key};
use crate::AppState;

/// GET /uploads/*key: bytes of a stored attachment
pub async fn get_upload(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    if parse_key(&key).is_err() {
        return Err(AppError::Validation(format!("invalid attachment path: {}", key)));
    }

    tracing::debug!(key = %key, "serving attachment");
    match state.attachments.get(&key).await.map_err(AppError::Storage)? {
        Some(bytes) => Ok(([(header::CONTENT_TYPE, content_type_for(&key))], bytes).into_response()),
        None => Ok(StatusCode::NOT_FOUND.into_response()),
    }
}
