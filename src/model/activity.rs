use crate::core::{EntityKind, RecordId, Validate, ValidationErrors};
use crate::record::{FieldText, Record};
use crmdesk_derive::RecordFields;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The entity an activity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentRef {
    pub kind: EntityKind,
    pub id: RecordId,
}

impl ParentRef {
    pub fn new(kind: EntityKind, id: RecordId) -> Self {
        Self { kind, id }
    }

    pub fn lead(id: RecordId) -> Self {
        Self::new(EntityKind::Lead, id)
    }

    pub fn company(id: RecordId) -> Self {
        Self::new(EntityKind::Company, id)
    }

    pub fn deal(id: RecordId) -> Self {
        Self::new(EntityKind::Deal, id)
    }

    pub fn ticket(id: RecordId) -> Self {
        Self::new(EntityKind::Ticket, id)
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.collection(), self.id)
    }
}

impl FieldText for ParentRef {
    fn field_text(&self) -> Option<String> {
        Some(self.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Note,
    Email,
    Call,
    Task,
    Meeting,
}

/// Kind-specific content of an activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ActivityBody {
    Note {
        note: String,
    },
    /// A logged email, not an outbound send.
    Email {
        to: String,
        subject: String,
        body: String,
    },
    Call {
        outcome: String,
        date: String,
        time: String,
        note: String,
    },
    Task {
        name: String,
        due_date: String,
        time: String,
        task_type: String,
        priority: String,
        assigned_to: String,
        note: String,
    },
    Meeting {
        title: String,
        start_date: String,
        start_time: String,
        end_time: String,
        attendees: Vec<String>,
        location: String,
        reminder: String,
        note: String,
    },
}

impl ActivityBody {
    pub fn kind(&self) -> ActivityKind {
        match self {
            ActivityBody::Note { .. } => ActivityKind::Note,
            ActivityBody::Email { .. } => ActivityKind::Email,
            ActivityBody::Call { .. } => ActivityKind::Call,
            ActivityBody::Task { .. } => ActivityKind::Task,
            ActivityBody::Meeting { .. } => ActivityKind::Meeting,
        }
    }

    /// One-line headline for activity feeds.
    pub fn summary(&self) -> String {
        match self {
            ActivityBody::Note { note } => note.lines().next().unwrap_or_default().to_string(),
            ActivityBody::Email { subject, .. } => subject.clone(),
            ActivityBody::Call { outcome, .. } => format!("Call: {}", outcome),
            ActivityBody::Task { name, .. } => name.clone(),
            ActivityBody::Meeting { title, .. } => title.clone(),
        }
    }
}

impl FieldText for ActivityBody {
    fn field_text(&self) -> Option<String> {
        Some(self.summary())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, RecordFields)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[record(id)]
    pub id: RecordId,
    #[record(readonly)]
    pub parent: ParentRef,
    pub body: ActivityBody,
    #[record(readonly)]
    pub created: String,
}

impl Activity {
    pub fn kind(&self) -> ActivityKind {
        self.body.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityDraft {
    pub parent: ParentRef,
    pub body: ActivityBody,
}

impl ActivityDraft {
    pub fn new(parent: ParentRef, body: ActivityBody) -> Self {
        Self { parent, body }
    }
}

impl Validate for ActivityDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        match &self.body {
            ActivityBody::Note { note } => errors.require("note", note, "Note"),
            ActivityBody::Email { subject, body, .. } => {
                if subject.trim().is_empty() || body.trim().is_empty() {
                    errors.add("subject", "Subject and Message are required");
                }
            }
            ActivityBody::Call { outcome, date, .. } => {
                errors.require("outcome", outcome, "Call outcome");
                errors.require("date", date, "Date");
            }
            ActivityBody::Task { name, due_date, .. } => {
                errors.require("name", name, "Task name");
                errors.require("dueDate", due_date, "Due date");
            }
            ActivityBody::Meeting {
                title, start_date, ..
            } => {
                errors.require("title", title, "Meeting title");
                errors.require("startDate", start_date, "Start date");
            }
        }
        errors.into_result()
    }
}

impl Record for Activity {
    type Draft = ActivityDraft;

    const KIND: EntityKind = EntityKind::Activity;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created(&self) -> &str {
        &self.created
    }

    fn from_draft(id: RecordId, created: String, draft: ActivityDraft) -> Self {
        Self {
            id,
            parent: draft.parent,
            body: draft.body,
            created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordFields;

    #[test]
    fn test_draft_validation_per_kind() {
        let note = ActivityDraft::new(
            ParentRef::lead(RecordId(1)),
            ActivityBody::Note { note: " ".into() },
        );
        assert_eq!(
            note.validate().unwrap_err().get("note"),
            Some("Note is required")
        );

        let email = ActivityDraft::new(
            ParentRef::deal(RecordId(1)),
            ActivityBody::Email {
                to: "a@b.com".into(),
                subject: "Hello".into(),
                body: String::new(),
            },
        );
        assert_eq!(
            email.validate().unwrap_err().get("subject"),
            Some("Subject and Message are required")
        );
    }

    #[test]
    fn test_parent_and_body_text() {
        let activity = Activity::from_draft(
            RecordId(3),
            String::new(),
            ActivityDraft::new(
                ParentRef::deal(RecordId(9)),
                ActivityBody::Call {
                    outcome: "Connected".into(),
                    date: "2025-04-08".into(),
                    time: "10:00".into(),
                    note: String::new(),
                },
            ),
        );
        assert_eq!(activity.kind(), ActivityKind::Call);
        assert_eq!(activity.field_text("parent").as_deref(), Some("deals:9"));
        assert_eq!(activity.field_text("body").as_deref(), Some("Call: Connected"));
    }
}
