use std::sync::Arc;

use bytes::Bytes;
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::AppError;
use crate::models::idea::{Idea, IdeaChanges, IdeaPriority, IdeaStatus, NewIdea};
use crate::policy::EmailPolicy;
use crate::service::board::PriorityBoard;
use crate::store::attachments::AttachmentStore;
use crate::store::IdeaStore;
use crate::verification::VerificationRegistry;

/// Raw submission as it arrives from the form. Whitespace-only counts as absent.
#[derive(Debug, Default, Clone)]
pub struct Submission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub description: Option<String>,
    pub attachment: Option<Attachment>,
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Any subset of the triage fields, each validated like its single-field update.
#[derive(Debug, Default, Clone)]
pub struct IdeaPatch {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub comment: Option<String>,
}

pub struct IdeaService {
    store: Arc<dyn IdeaStore>,
    attachments: Arc<AttachmentStore>,
    policy: EmailPolicy,
    /// Set when submissions require a recently verified address.
    verified_only: Option<VerificationRegistry>,
    clock: Arc<dyn Clock>,
}

impl IdeaService {
    pub fn new(
        store: Arc<dyn IdeaStore>,
        attachments: Arc<AttachmentStore>,
        policy: EmailPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            attachments,
            policy,
            verified_only: None,
            clock,
        }
    }

    /// Only accept submissions from addresses `registry` holds as verified.
    pub fn require_verified(mut self, registry: VerificationRegistry) -> Self {
        self.verified_only = Some(registry);
        self
    }

    pub async fn submit(&self, submission: Submission) -> Result<Idea, AppError> {
        let name = required(submission.name, "Name is required")?;
        let description = required(submission.description, "Idea description is required")?;
        let email = self.policy.check(submission.email.as_deref())?;

        if let Some(registry) = &self.verified_only {
            if !registry.is_verified(&email) {
                return Err(AppError::validation("Email address has not been verified"));
            }
        }

        let attachment_path = match submission.attachment {
            // Browsers post an empty file part when nothing was chosen.
            Some(file) if !file.data.is_empty() => self
                .attachments
                .put(file.file_name.as_deref(), file.data)
                .await
                .map_err(AppError::Storage)?,
            _ => String::new(),
        };

        let orphan = (!attachment_path.is_empty()).then(|| attachment_path.clone());
        let new_idea = NewIdea::pending(name, email, description, attachment_path, self.clock.now());
        let idea = self.store.insert(new_idea).await.map_err(|e| {
            if let Some(path) = &orphan {
                tracing::warn!(attachment = %path, "idea insert failed, attachment left orphaned");
            }
            AppError::Persistence(e)
        })?;

        tracing::info!(idea_id = %idea.id, email = %idea.email, "idea submitted");
        Ok(idea)
    }

    pub async fn list_all(&self) -> Result<Vec<Idea>, AppError> {
        self.store.list().await.map_err(AppError::Persistence)
    }

    pub async fn get(&self, id: &str) -> Result<Idea, AppError> {
        let id = parse_id(id)?;
        self.store
            .get(id)
            .await
            .map_err(AppError::Persistence)?
            .ok_or(AppError::IdeaNotFound)
    }

    pub async fn set_status(&self, id: &str, status: Option<&str>) -> Result<Idea, AppError> {
        let id = parse_id(id)?;
        let status: IdeaStatus = status
            .ok_or_else(|| AppError::validation("Status is required"))?
            .parse()?;
        self.apply(
            id,
            IdeaChanges {
                status: Some(status),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn set_priority(&self, id: &str, priority: Option<&str>) -> Result<Idea, AppError> {
        let id = parse_id(id)?;
        let priority: IdeaPriority = priority
            .ok_or_else(|| AppError::validation("Priority is required"))?
            .parse()?;
        self.apply(
            id,
            IdeaChanges {
                priority: Some(priority),
                ..Default::default()
            },
        )
        .await
    }

    /// An empty comment clears it; an absent one is rejected.
    pub async fn set_comment(&self, id: &str, comment: Option<&str>) -> Result<Idea, AppError> {
        let id = parse_id(id)?;
        let comment = comment.ok_or_else(|| AppError::validation("Comment is required"))?;
        self.apply(
            id,
            IdeaChanges {
                comment: Some(comment.to_string()),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn patch(&self, id: &str, patch: IdeaPatch) -> Result<Idea, AppError> {
        let id = parse_id(id)?;
        let changes = IdeaChanges {
            status: patch.status.as_deref().map(str::parse::<IdeaStatus>).transpose()?,
            priority: patch.priority.as_deref().map(str::parse::<IdeaPriority>).transpose()?,
            comment: patch.comment,
        };
        if changes.is_empty() {
            return Err(AppError::validation(
                "At least one of status, priority or comment is required",
            ));
        }
        self.apply(id, changes).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), AppError> {
        let id = parse_id(id)?;
        let deleted = self.store.delete(id).await.map_err(AppError::Persistence)?;
        if !deleted {
            return Err(AppError::IdeaNotFound);
        }
        tracing::info!(idea_id = %id, "idea deleted");
        Ok(())
    }

    pub async fn priority_board(&self) -> Result<PriorityBoard, AppError> {
        Ok(PriorityBoard::from_ideas(self.list_all().await?))
    }

    async fn apply(&self, id: Uuid, changes: IdeaChanges) -> Result<Idea, AppError> {
        let idea = self
            .store
            .update(id, &changes)
            .await
            .map_err(AppError::Persistence)?
            .ok_or(AppError::IdeaNotFound)?;

        tracing::info!(
            idea_id = %id,
            status = ?changes.status,
            priority = ?changes.priority,
            comment_updated = changes.comment.is_some(),
            "idea updated"
        );
        Ok(idea)
    }
}

/// Ids are UUIDs; anything else is rejected before the store is touched.
pub fn parse_id(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::Validation(format!("Invalid ID format: {}", id)))
}

fn required(value: Option<String>, msg: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::validation(msg))
}
