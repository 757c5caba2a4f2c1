use crate::core::{EntityKind, RecordId, Validate, ValidationErrors};
use crate::model::crm_enum;
use crate::record::{FieldText, Record};
use crmdesk_derive::RecordFields;
use serde::{Deserialize, Serialize};

crm_enum! {
    pub enum TicketStatus {
        New => "New",
        WaitingOnContact => "Waiting on contact",
        WaitingOnUs => "Waiting on us",
        Closed => "Closed",
    }
}

crm_enum! {
    pub enum TicketSource {
        Chat => "Chat",
        Email => "Email",
        Phone => "Phone",
        WebForm => "Web Form",
    }
}

crm_enum! {
    pub enum TicketPriority {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Critical => "Critical",
    }
}

/// A ticket is linked to at most one company or one deal, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum TicketAssociation {
    Company(RecordId),
    Deal(RecordId),
}

impl FieldText for TicketAssociation {
    fn field_text(&self) -> Option<String> {
        Some(match self {
            TicketAssociation::Company(id) => format!("company:{}", id),
            TicketAssociation::Deal(id) => format!("deal:{}", id),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationKind {
    #[default]
    Company,
    Deal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, RecordFields)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    #[record(id)]
    pub id: RecordId,
    pub title: String,
    pub status: TicketStatus,
    pub source: TicketSource,
    pub priority: TicketPriority,
    pub owner: String,
    pub description: String,
    pub association: Option<TicketAssociation>,
    #[record(readonly)]
    pub created: String,
}

impl Ticket {
    pub fn company_id(&self) -> Option<RecordId> {
        match self.association {
            Some(TicketAssociation::Company(id)) => Some(id),
            _ => None,
        }
    }

    pub fn deal_id(&self) -> Option<RecordId> {
        match self.association {
            Some(TicketAssociation::Deal(id)) => Some(id),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketDraft {
    pub title: String,
    pub description: String,
    pub status: Option<TicketStatus>,
    pub source: Option<TicketSource>,
    pub priority: Option<TicketPriority>,
    pub owner: String,
    pub association_type: AssociationKind,
    pub company_id: Option<RecordId>,
    pub deal_id: Option<RecordId>,
}

impl TicketDraft {
    /// The association selected by `association_type`; the other id is ignored.
    pub fn association(&self) -> Option<TicketAssociation> {
        match self.association_type {
            AssociationKind::Company => self.company_id.map(TicketAssociation::Company),
            AssociationKind::Deal => self.deal_id.map(TicketAssociation::Deal),
        }
    }
}

impl Validate for TicketDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("title", &self.title, "Ticket Name");
        errors.require_some("status", &self.status, "Status");
        errors.require_some("source", &self.source, "Source");
        errors.require_some("priority", &self.priority, "Priority");
        errors.require("owner", &self.owner, "Owner");
        match self.association_type {
            AssociationKind::Company => errors.require_some("companyId", &self.company_id, "Company"),
            AssociationKind::Deal => errors.require_some("dealId", &self.deal_id, "Deal"),
        }
        errors.into_result()
    }
}

impl Record for Ticket {
    type Draft = TicketDraft;

    const KIND: EntityKind = EntityKind::Ticket;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created(&self) -> &str {
        &self.created
    }

    fn from_draft(id: RecordId, created: String, draft: TicketDraft) -> Self {
        let association = draft.association();
        Self {
            id,
            title: draft.title.trim().to_string(),
            status: draft.status.unwrap_or(TicketStatus::New),
            source: draft.source.unwrap_or(TicketSource::WebForm),
            priority: draft.priority.unwrap_or(TicketPriority::Medium),
            owner: draft.owner,
            description: draft.description,
            association,
            created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> TicketDraft {
        TicketDraft {
            title: "Payment Failure Issue".into(),
            status: Some(TicketStatus::New),
            source: Some(TicketSource::Chat),
            priority: Some(TicketPriority::High),
            owner: "Jane Cooper".into(),
            company_id: Some(RecordId(1)),
            deal_id: Some(RecordId(2)),
            ..TicketDraft::default()
        }
    }

    #[test]
    fn test_association_is_exclusive() {
        let ticket = Ticket::from_draft(RecordId(1), String::new(), draft());
        assert_eq!(ticket.company_id(), Some(RecordId(1)));
        assert_eq!(ticket.deal_id(), None);

        let deal_draft = TicketDraft {
            association_type: AssociationKind::Deal,
            ..draft()
        };
        let ticket = Ticket::from_draft(RecordId(2), String::new(), deal_draft);
        assert_eq!(ticket.deal_id(), Some(RecordId(2)));
        assert_eq!(ticket.company_id(), None);
    }

    #[test]
    fn test_association_target_is_required() {
        let missing_company = TicketDraft {
            company_id: None,
            ..draft()
        };
        let errors = missing_company.validate().unwrap_err();
        assert_eq!(errors.get("companyId"), Some("Company is required"));

        let missing_deal = TicketDraft {
            association_type: AssociationKind::Deal,
            deal_id: None,
            ..draft()
        };
        let errors = missing_deal.validate().unwrap_err();
        assert_eq!(errors.get("dealId"), Some("Deal is required"));
        assert!(!errors.contains("companyId"));
    }

    #[test]
    fn test_association_serialization() {
        let json = serde_json::to_value(TicketAssociation::Deal(RecordId(4))).unwrap();
        assert_eq!(json, serde_json::json!({"type": "deal", "id": 4}));
    }
}
