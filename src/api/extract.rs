use axum::extract::FromRequest;

use crate::errors::AppError;

/// `Json` whose rejections render as `AppError::Validation` (400 with the
/// usual error envelope) instead of axum's plain-text 4xx.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
