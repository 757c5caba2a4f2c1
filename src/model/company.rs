use crate::core::{EntityKind, RecordId, Validate, ValidationErrors};
use crate::model::crm_enum;
use crate::record::Record;
use crmdesk_derive::RecordFields;
use serde::{Deserialize, Serialize};

crm_enum! {
    pub enum CompanyType {
        Public => "Public",
        Private => "Private",
        NonProfit => "Non-Profit",
        Government => "Government",
        Other => "Other",
    }
}

crm_enum! {
    #[derive(Default)]
    pub enum CompanyStatus {
        #[default]
        Active => "Active",
        Inactive => "Inactive",
        OnHold => "On Hold",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, RecordFields)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[record(id)]
    pub id: RecordId,
    pub name: String,
    pub domain: String,
    pub owner: String,
    pub phone: String,
    pub industry: String,
    #[serde(rename = "type")]
    #[record(name = "type")]
    pub company_type: CompanyType,
    pub city: String,
    pub country: String,
    /// Head-count band, e.g. `50-100`.
    pub employees: String,
    /// Revenue band, e.g. `1M-5M`.
    pub revenue: String,
    pub status: CompanyStatus,
    #[record(readonly)]
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDraft {
    pub domain: String,
    pub name: String,
    pub owner: String,
    pub industry: String,
    #[serde(rename = "type")]
    pub company_type: Option<CompanyType>,
    pub city: String,
    pub country: String,
    pub employees: String,
    pub revenue: String,
    pub phone: String,
    pub status: Option<CompanyStatus>,
}

impl Validate for CompanyDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("domain", &self.domain, "Domain Name");
        errors.require("name", &self.name, "Company Name");
        errors.require("owner", &self.owner, "Company Owner");
        errors.require("industry", &self.industry, "Industry");
        errors.require_some("type", &self.company_type, "Type");
        errors.require("phone", &self.phone, "Phone");
        errors.into_result()
    }
}

impl Record for Company {
    type Draft = CompanyDraft;

    const KIND: EntityKind = EntityKind::Company;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created(&self) -> &str {
        &self.created
    }

    fn from_draft(id: RecordId, created: String, draft: CompanyDraft) -> Self {
        Self {
            id,
            name: draft.name.trim().to_string(),
            domain: draft.domain.trim().to_lowercase(),
            owner: draft.owner,
            phone: draft.phone,
            industry: draft.industry,
            company_type: draft.company_type.unwrap_or(CompanyType::Other),
            city: draft.city,
            country: draft.country,
            employees: draft.employees,
            revenue: draft.revenue,
            status: draft.status.unwrap_or_default(),
            created,
        }
    }
}
