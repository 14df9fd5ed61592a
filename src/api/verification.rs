use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::extract::AppJson;
use crate::errors::AppError;
use crate::AppState;

#[derive(Deserialize)]
pub struct SendCodeRequest {
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub email: Option<String>,
    pub code: Option<CodeInput>,
}

/// Forms post the code as a string; some clients send a number.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum CodeInput {
    Number(u64),
    Text(String),
}

impl CodeInput {
    fn into_string(self) -> String {
        match self {
            CodeInput::Number(n) => n.to_string(),
            CodeInput::Text(s) => s,
        }
    }
}

/// POST /api/send-verification-code: {email}
pub async fn send_verification_code(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<SendCodeRequest>,
) -> Result<Json<Value>, AppError> {
    state
        .verification
        .request_code(payload.email.as_deref())
        .await?;
    Ok(Json(json!({ "message": "Verification code sent" })))
}

/// POST /api/verify-code: {email, code}
pub async fn verify_code(
    State(state): State<Arc<AppState>>,
    AppJson(payload): AppJson<VerifyCodeRequest>,
) -> Result<Json<Value>, AppError> {
    let code = payload.code.map(CodeInput::into_string);
    state
        .verification
        .verify_code(payload.email.as_deref(), code.as_deref())?;
    Ok(Json(json!({ "message": "Email verified successfully" })))
}
