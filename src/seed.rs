//! Demo fixtures loaded into a fresh workspace.

use crate::core::RecordId;
use crate::model::{
    Company, CompanyStatus, CompanyType, Deal, DealPriority, DealStage, Lead, LeadStatus, Ticket,
    TicketPriority, TicketSource, TicketStatus,
};

const SEED_CREATED: &str = "Apr 8, 2025 2:35 PM";

pub fn leads() -> Vec<Lead> {
    let rows = [
        ("Jane", "Cooper", "janecooper@gmail.com", "078 5432 8505", "Jane Cooper", "Salesperson", "New York", LeadStatus::New),
        ("Wade", "Warren", "wadewarren@gmail.com", "077 5465 8785", "Wade Warren", "Developer", "London", LeadStatus::New),
        ("Brooklyn", "Simmons", "brooklynsimmons@gmail.com", "070 4531 9507", "Brooklyn Simmons", "Manager", "Sydney", LeadStatus::New),
        ("Leslie", "Alexander", "lesliealexander@gmail.com", "078 2824 3334", "Jane Cooper", "Designer", "Tokyo", LeadStatus::New),
        ("Jenny", "Wilson", "jennywilson@gmail.com", "079 8761 9681", "Wade Warren", "Director", "Paris", LeadStatus::New),
        ("Guy", "Hawkins", "guyhawkins@gmail.com", "078 5432 8505", "Brooklyn Simmons", "Sales", "Berlin", LeadStatus::New),
        ("Robert", "Fox", "robertfox@gmail.com", "077 5465 8785", "Jane Cooper", "Marketing", "Toronto", LeadStatus::New),
        ("Cameron", "Williamson", "cameronwilliamson@gmail.com", "078 2824 3334", "Wade Warren", "HR", "Dubai", LeadStatus::InProgress),
    ];

    rows.into_iter()
        .zip(1u64..)
        .map(|((first, last, email, phone, owner, title, city, status), id)| Lead {
            id: RecordId(id),
            first_name: first.to_string(),
            last_name: last.to_string(),
            name: Lead::full_name(first, last),
            email: email.to_string(),
            phone: phone.to_string(),
            title: title.to_string(),
            role: title.to_string(),
            owner: owner.to_string(),
            status,
            city: city.to_string(),
            created: SEED_CREATED.to_string(),
        })
        .collect()
}

pub fn companies() -> Vec<Company> {
    use CompanyStatus::*;
    use CompanyType::*;

    let rows = [
        ("ClientEdge", "clientedge.com", "Jane Cooper", "078 5432 8505", "Legal Services", Public, "Toronto", "Canada", "50-100", "1M-5M", Active),
        ("Relatia", "relatia.net", "Wade Warren", "077 5465 8785", "Healthcare", Private, "Amsterdam", "Netherlands", "100-200", "5M-10M", Active),
        ("TrustSphere", "trustsphere.io", "Brooklyn Simmons", "070 4531 9507", "Real Estate", Private, "Bangalore", "India", "10-50", "<1M", Inactive),
        ("SalesTrail", "salestrail.co", "Leslie Alexander", "078 2824 3334", "Financial Advisory", Public, "Zurich", "Switzerland", "500+", "50M+", Active),
        ("PipelineIQ", "pipelineiq.com", "Jenny Wilson", "079 8761 9681", "Retail & E-commerce", Private, "Austin", "USA", "200-500", "10M-50M", OnHold),
        ("Syncfolio", "syncfolio.net", "Guy Hawkins", "078 5432 8505", "Logistics & Supply Chain", Public, "Dubai", "UAE", "1000+", "100M+", Active),
        ("CustoLogic", "custologic.org", "Robert Fox", "077 5465 8785", "Marketing Agencies", Private, "Singapore", "Singapore", "50-100", "2M-5M", Active),
        ("EngageWare", "engageware.edu", "Cameron Williamson", "078 2824 3334", "Education Technology", NonProfit, "Cape Town", "South Africa", "100-200", "5M-10M", Inactive),
    ];

    rows.into_iter()
        .zip(1u64..)
        .map(
            |((name, domain, owner, phone, industry, company_type, city, country, employees, revenue, status), id)| Company {
                id: RecordId(id),
                name: name.to_string(),
                domain: domain.to_string(),
                owner: owner.to_string(),
                phone: phone.to_string(),
                industry: industry.to_string(),
                company_type,
                city: city.to_string(),
                country: country.to_string(),
                employees: employees.to_string(),
                revenue: revenue.to_string(),
                status,
                created: SEED_CREATED.to_string(),
            },
        )
        .collect()
}

pub fn deals() -> Vec<Deal> {
    use DealPriority::*;
    use DealStage::*;

    let rows = [
        ("Website Revamp - Atlas Corp", PresentationScheduled, "Jane Cooper", "$12,500", High),
        ("Mobile App for FitBuddy", QualifiedToBuy, "Wade Warren", "$25,000", Medium),
        ("HR Software License - ZenoHR", ContractSent, "Brooklyn Simmons", "$18,750", Low),
        ("CRM Onboarding - NexTech", ClosedWon, "Leslie Alexander", "$32,000", High),
        ("Marketing Suite - QuickAdz", AppointmentScheduled, "Jenny Wilson", "$14,800", Medium),
        ("Inventory Tool - GreenMart", DecisionMakerBoughtIn, "Guy Hawkins", "$9,300", Low),
        ("ERP Integration - BlueChip", QualifiedToBuy, "Robert Fox", "$41,000", High),
        ("Loyalty Program - FoodieFox", ClosedLost, "Cameron Williamson", "$11,000", Low),
    ];

    rows.into_iter()
        .zip(1u64..)
        .map(|((name, stage, owner, amount, priority), id)| Deal {
            id: RecordId(id),
            name: name.to_string(),
            stage,
            amount: amount.to_string(),
            owner: owner.to_string(),
            close_date: "Apr 8, 2025".to_string(),
            priority,
            created: "Apr 8, 2025".to_string(),
        })
        .collect()
}

pub fn tickets() -> Vec<Ticket> {
    use TicketPriority::*;
    use TicketSource::*;
    use TicketStatus::*;

    let rows = [
        ("Payment Failure Issue", WaitingOnContact, Chat, "Description goes here", "Jane Cooper", High, SEED_CREATED),
        ("Product Inquiry", WaitingOnUs, Email, "Customer asking about bulk pricing", "Wade Warren", Medium, SEED_CREATED),
        ("Subscription Upgrade", New, Chat, "Wants to upgrade to Enterprise plan", "Brooklyn Simmons", High, SEED_CREATED),
        ("Refund Request - Order #456", New, Phone, "Item arrived damaged", "Leslie Alexander", Low, SEED_CREATED),
        ("Pricing Clarification", Closed, Chat, "Clarification on hidden fees", "Jenny Wilson", Medium, SEED_CREATED),
        ("Login Not Working", WaitingOnUs, Phone, "Password reset email not delivering", "Guy Hawkins", Critical, "Apr 9, 2025 2:35 PM"),
        ("Feature Request: Reports", WaitingOnContact, Phone, "Wants custom PDF reports", "Robert Fox", High, SEED_CREATED),
        ("SLA Violation Complaint", Closed, Chat, "Response time exceeded 24h", "Cameron Williamson", Medium, SEED_CREATED),
    ];

    rows.into_iter()
        .zip(1u64..)
        .map(|((title, status, source, description, owner, priority, created), id)| Ticket {
            id: RecordId(id),
            title: title.to_string(),
            status,
            source,
            priority,
            owner: owner.to_string(),
            description: description.to_string(),
            association: None,
            created: created.to_string(),
        })
        .collect()
}
