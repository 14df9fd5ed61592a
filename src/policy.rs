//! Address rules shared by code requests and idea submission.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::AppError;

static EMAIL_SHAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

/// Restricts which addresses may request codes and submit ideas.
#[derive(Debug, Clone, Default)]
pub struct EmailPolicy {
    /// Required suffix, compared case-insensitively (e.g. `@royalcyber.com`).
    domain: Option<String>,
}

impl EmailPolicy {
    pub fn new(domain: Option<String>) -> Self {
        let domain = domain
            .map(|d| d.trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .map(|d| if d.starts_with('@') { d } else { format!("@{}", d) });
        Self { domain }
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// Validates `raw` and returns the normalized (trimmed, lower-cased) address.
    pub fn check(&self, raw: Option<&str>) -> Result<String, AppError> {
        let email = normalize(raw.unwrap_or_default());
        if email.is_empty() {
            return Err(AppError::validation("Email is required"));
        }
        if !EMAIL_SHAPE.is_match(&email) {
            return Err(AppError::validation("Email address is malformed"));
        }
        if let Some(domain) = &self.domain {
            if !email.ends_with(domain.as_str()) {
                return Err(AppError::Validation(format!(
                    "Email must be from {} domain.",
                    domain
                )));
            }
        }
        Ok(email)
    }
}

/// Registry key for an address.
pub fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}
