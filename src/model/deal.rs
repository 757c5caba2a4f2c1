use crate::core::{EntityKind, RecordId, Validate, ValidationErrors};
use crate::model::crm_enum;
use crate::record::Record;
use crmdesk_derive::RecordFields;
use serde::{Deserialize, Serialize};

crm_enum! {
    /// Pipeline position of a deal, in funnel order.
    pub enum DealStage {
        AppointmentScheduled => "Appointment Scheduled",
        QualifiedToBuy => "Qualified to Buy",
        PresentationScheduled => "Presentation Scheduled",
        DecisionMakerBoughtIn => "Decision Maker Bought In",
        ContractSent => "Contract Sent",
        ClosedWon => "Closed Won",
        ClosedLost => "Closed Lost",
    }
}

impl DealStage {
    /// Stages a deal may only enter once it has recorded activity.
    pub const ACTIVITY_GATED: &'static [DealStage] = &[
        DealStage::ContractSent,
        DealStage::ClosedWon,
        DealStage::ClosedLost,
    ];

    pub fn requires_activity(&self) -> bool {
        Self::ACTIVITY_GATED.contains(self)
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, DealStage::ClosedWon | DealStage::ClosedLost)
    }
}

crm_enum! {
    pub enum DealPriority {
        Low => "Low",
        Medium => "Medium",
        High => "High",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, RecordFields)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    #[record(id)]
    pub id: RecordId,
    pub name: String,
    pub stage: DealStage,
    /// Currency-formatted, e.g. `$12,500`.
    pub amount: String,
    pub owner: String,
    pub close_date: String,
    pub priority: DealPriority,
    #[record(readonly)]
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealDraft {
    pub name: String,
    pub stage: Option<DealStage>,
    pub amount: String,
    pub owner: String,
    pub close_date: String,
    pub priority: Option<DealPriority>,
}

impl Validate for DealDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("name", &self.name, "Deal Name");
        errors.require_some("stage", &self.stage, "Stage");
        errors.require("amount", &self.amount, "Amount");
        errors.require("owner", &self.owner, "Owner");
        errors.require("closeDate", &self.close_date, "Close Date");
        errors.require_some("priority", &self.priority, "Priority");
        errors.into_result()
    }
}

impl Record for Deal {
    type Draft = DealDraft;

    const KIND: EntityKind = EntityKind::Deal;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created(&self) -> &str {
        &self.created
    }

    fn from_draft(id: RecordId, created: String, draft: DealDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            stage: draft.stage.unwrap_or(DealStage::AppointmentScheduled),
            amount: format_amount(&draft.amount),
            owner: draft.owner,
            close_date: draft.close_date,
            priority: draft.priority.unwrap_or(DealPriority::Medium),
            created,
        }
    }
}

/// Normalises a plain number such as `12500` or `12500.5` to `$12,500` /
/// `$12,500.50`. Anything that is not a plain number is kept as typed.
pub fn format_amount(raw: &str) -> String {
    let trimmed = raw.trim();
    let digits = trimmed.trim_start_matches('$').replace(',', "");
    let Ok(value) = digits.parse::<f64>() else {
        return trimmed.to_string();
    };
    if !value.is_finite() || value < 0.0 {
        return trimmed.to_string();
    }

    let cents = (value * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let whole_text = whole.to_string();
    let mut grouped = String::with_capacity(whole_text.len() + whole_text.len() / 3);
    for (index, ch) in whole_text.chars().enumerate() {
        if index > 0 && (whole_text.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if fraction == 0 {
        format!("${}", grouped)
    } else {
        format!("${}.{:02}", grouped, fraction)
    }
}
