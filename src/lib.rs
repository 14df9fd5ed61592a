//! Ideabox: idea submission portal.
//!
//! Employees submit proposals through a form gated by an emailed one-time
//! code; administrators triage them by status, priority and comment.

pub mod api;
pub mod cli;
pub mod clock;
pub mod config;
pub mod errors;
pub mod jobs;
pub mod models;
pub mod notification;
pub mod policy;
pub mod service;
pub mod store;
pub mod verification;

use std::sync::Arc;

use clock::Clock;
use notification::mailer::MailSender;
use policy::EmailPolicy;
use service::IdeaService;
use store::attachments::AttachmentStore;
use store::postgres::PgStore;
use store::IdeaStore;
use verification::{VerificationRegistry, VerificationService};

/// Shared application state passed to handlers and middleware.
pub struct AppState {
    pub ideas: IdeaService,
    pub verification: VerificationService,
    pub attachments: Arc<AttachmentStore>,
    pub config: config::Config,
    /// Present when running on Postgres; used by the readiness probe.
    pub db: Option<PgStore>,
}

impl AppState {
    pub fn new(
        config: config::Config,
        store: Arc<dyn IdeaStore>,
        attachments: Arc<AttachmentStore>,
        mailer: Arc<dyn MailSender>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let policy = EmailPolicy::new(config.email_domain.clone());
        let registry = VerificationRegistry::new(
            clock.clone(),
            // capped at a year
            chrono::Duration::seconds(config.verified_ttl_secs.min(31_536_000) as i64),
        );

        let mut ideas = IdeaService::new(store, attachments.clone(), policy.clone(), clock);
        if config.require_verified_email {
            ideas = ideas.require_verified(registry.clone());
        }

        let verification = VerificationService::new(
            registry,
            mailer,
            policy,
            config.rollback_on_delivery_failure,
        );

        Self {
            ideas,
            verification,
            attachments,
            config,
            db: None,
        }
    }

    pub fn with_database(mut self, db: PgStore) -> Self {
        self.db = Some(db);
        self
    }
}
