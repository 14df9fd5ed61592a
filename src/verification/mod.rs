//! Email one-time-code flow: issue a code, mail it, check it.

pub mod registry;

use std::sync::Arc;

use crate::errors::AppError;
use crate::notification::mailer::{MailMessage, MailSender};
use crate::policy::EmailPolicy;

pub use registry::{PendingCode, VerificationRegistry, CODE_TTL_SECS};

pub struct VerificationService {
    registry: VerificationRegistry,
    mailer: Arc<dyn MailSender>,
    policy: EmailPolicy,
    rollback_on_delivery_failure: bool,
}

impl VerificationService {
    pub fn new(
        registry: VerificationRegistry,
        mailer: Arc<dyn MailSender>,
        policy: EmailPolicy,
        rollback_on_delivery_failure: bool,
    ) -> Self {
        Self {
            registry,
            mailer,
            policy,
            rollback_on_delivery_failure,
        }
    }

    pub fn registry(&self) -> &VerificationRegistry {
        &self.registry
    }

    /// Issue a fresh code for `email` and mail it.
    ///
    /// The code stays issued when delivery fails unless rollback is enabled.
    pub async fn request_code(&self, email: Option<&str>) -> Result<(), AppError> {
        let email = self.policy.check(email)?;
        let issued = self.registry.issue(&email);

        let message = MailMessage::verification_code(&email, &issued.code);
        if let Err(e) = self.mailer.send(&message).await {
            tracing::warn!(email = %email, error = %e, "verification code delivery failed");
            if self.rollback_on_delivery_failure && self.registry.retract(&email, &issued) {
                tracing::debug!(email = %email, "retracted undelivered verification code");
            }
            return Err(AppError::Delivery(e.to_string()));
        }

        tracing::info!(email = %email, expires_at = %issued.expires_at, "verification code sent");
        Ok(())
    }

    pub fn verify_code(&self, email: Option<&str>, code: Option<&str>) -> Result<(), AppError> {
        let (email, code) = match (email.map(str::trim), code.map(str::trim)) {
            (Some(e), Some(c)) if !e.is_empty() && !c.is_empty() => (e, c),
            _ => return Err(AppError::validation("Email and code are required")),
        };

        match self.registry.verify(email, code) {
            Ok(()) => {
                tracing::info!(email = %email, "email verified");
                Ok(())
            }
            Err(e) => {
                tracing::debug!(email = %email, reason = %e, "verification rejected");
                Err(e)
            }
        }
    }
}
