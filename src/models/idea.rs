use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// A submitted proposal plus its triage metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "ideaDesc")]
    pub description: String,
    /// Public path of the stored upload, empty when nothing was attached.
    pub attachment_path: String,
    pub status: IdeaStatus,
    pub priority: IdeaPriority,
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum IdeaStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl IdeaStatus {
    pub const ALL: [IdeaStatus; 3] = [IdeaStatus::Pending, IdeaStatus::Approved, IdeaStatus::Rejected];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaStatus::Pending => "Pending",
            IdeaStatus::Approved => "Approved",
            IdeaStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for IdeaStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdeaStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IdeaStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "invalid status '{}': expected one of Pending, Approved, Rejected",
                    s
                ))
            })
    }
}

/// Dashboard grouping tier. `Unset` travels as "Set Priority", the label the
/// dashboard shows before an administrator picks a tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "varchar")]
pub enum IdeaPriority {
    #[default]
    #[serde(rename = "Set Priority", alias = "Unset")]
    #[sqlx(rename = "Set Priority")]
    Unset,
    High,
    Medium,
    Low,
}

impl IdeaPriority {
    pub const ALL: [IdeaPriority; 4] = [
        IdeaPriority::Unset,
        IdeaPriority::High,
        IdeaPriority::Medium,
        IdeaPriority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IdeaPriority::Unset => "Set Priority",
            IdeaPriority::High => "High",
            IdeaPriority::Medium => "Medium",
            IdeaPriority::Low => "Low",
        }
    }
}

impl fmt::Display for IdeaPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdeaPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "Unset" {
            return Ok(IdeaPriority::Unset);
        }
        IdeaPriority::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| {
                AppError::Validation(format!(
                    "invalid priority '{}': expected one of Set Priority, High, Medium, Low",
                    s
                ))
            })
    }
}

/// Fields of a fresh record; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewIdea {
    pub name: String,
    pub email: String,
    pub description: String,
    pub attachment_path: String,
    pub status: IdeaStatus,
    pub priority: IdeaPriority,
    pub comment: String,
    pub submitted_at: DateTime<Utc>,
}

impl NewIdea {
    pub fn pending(
        name: String,
        email: String,
        description: String,
        attachment_path: String,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            email,
            description,
            attachment_path,
            status: IdeaStatus::Pending,
            priority: IdeaPriority::Unset,
            comment: String::new(),
            submitted_at,
        }
    }

    pub fn into_idea(self, id: Uuid) -> Idea {
        Idea {
            id,
            name: self.name,
            email: self.email,
            description: self.description,
            attachment_path: self.attachment_path,
            status: self.status,
            priority: self.priority,
            comment: self.comment,
            submitted_at: self.submitted_at,
        }
    }
}

/// The only mutable fields of a stored idea. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdeaChanges {
    pub status: Option<IdeaStatus>,
    pub priority: Option<IdeaPriority>,
    pub comment: Option<String>,
}

impl IdeaChanges {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.comment.is_none()
    }

    pub fn apply(&self, idea: &mut Idea) {
        if let Some(status) = self.status {
            idea.status = status;
        }
        if let Some(priority) = self.priority {
            idea.priority = priority;
        }
        if let Some(comment) = &self.comment {
            idea.comment = comment.clone();
        }
    }
}
