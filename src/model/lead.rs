use crate::core::{EntityKind, RecordId, Validate, ValidationErrors};
use crate::model::{crm_enum, looks_like_email};
use crate::record::Record;
use crmdesk_derive::RecordFields;
use serde::{Deserialize, Serialize};

crm_enum! {
    #[derive(Default)]
    pub enum LeadStatus {
        #[default]
        New => "New",
        Open => "Open",
        InProgress => "In Progress",
        Lost => "Lost",
        BadInfo => "Bad Info",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, RecordFields)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[record(id)]
    pub id: RecordId,
    pub first_name: String,
    pub last_name: String,
    /// Kept in sync with first/last name by whoever builds the patch.
    pub name: String,
    pub email: String,
    pub phone: String,
    pub title: String,
    pub role: String,
    pub owner: String,
    pub status: LeadStatus,
    pub city: String,
    #[record(readonly)]
    pub created: String,
}

impl Lead {
    pub fn full_name(first_name: &str, last_name: &str) -> String {
        format!("{} {}", first_name.trim(), last_name.trim())
            .trim()
            .to_string()
    }

    /// Patch that renames the lead and keeps `name` consistent.
    pub fn rename(first_name: &str, last_name: &str) -> LeadPatch {
        LeadPatch::default()
            .first_name(first_name.trim())
            .last_name(last_name.trim())
            .name(Self::full_name(first_name, last_name))
    }
}

/// Create-lead form input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub title: String,
    pub role: String,
    pub owner: String,
    pub status: Option<LeadStatus>,
    pub city: String,
}

impl Validate for LeadDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("email", &self.email, "Email");
        if !self.email.trim().is_empty() && !looks_like_email(&self.email) {
            errors.add("email", "Email is invalid");
        }
        errors.require("firstName", &self.first_name, "First name");
        errors.require("lastName", &self.last_name, "Last name");
        errors.require("phone", &self.phone, "Phone");
        errors.into_result()
    }
}

impl Record for Lead {
    type Draft = LeadDraft;

    const KIND: EntityKind = EntityKind::Lead;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created(&self) -> &str {
        &self.created
    }

    fn from_draft(id: RecordId, created: String, draft: LeadDraft) -> Self {
        let name = Lead::full_name(&draft.first_name, &draft.last_name);
        let role = if draft.role.trim().is_empty() {
            draft.title.clone()
        } else {
            draft.role
        };
        Self {
            id,
            first_name: draft.first_name.trim().to_string(),
            last_name: draft.last_name.trim().to_string(),
            name,
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            title: draft.title,
            role,
            owner: draft.owner,
            status: draft.status.unwrap_or_default(),
            city: draft.city,
            created,
        }
    }
}
