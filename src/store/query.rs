//! Searched, filtered and paginated projections of a store's records.
//!
//! A projection owns no state: the same records and the same [`ListQuery`]
//! always yield the same [`Page`], in store order.

use crate::record::RecordFields;
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Field text equals the filter value.
    Exact,
    /// Field text contains the filter value, ignoring case. Used for
    /// date-like fields where the user types a fragment such as `Apr 8`.
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFilter {
    pub field: String,
    pub value: String,
    pub mode: MatchMode,
}

impl FieldFilter {
    fn matches<R: RecordFields>(&self, record: &R) -> bool {
        let wanted = self.value.trim();
        if wanted.is_empty() {
            return true;
        }
        let Some(text) = record.field_text(&self.field) else {
            return false;
        };
        match self.mode {
            MatchMode::Exact => text == wanted,
            MatchMode::Contains => text.to_lowercase().contains(&wanted.to_lowercase()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: String,
    pub search_fields: Vec<String>,
    pub filters: Vec<FieldFilter>,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            search_fields: Vec::new(),
            filters: Vec::new(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_in(mut self, fields: &[&str]) -> Self {
        self.search_fields = fields.iter().map(|field| field.to_string()).collect();
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn exact(self, field: &str, value: impl Into<String>) -> Self {
        self.filter(field, value, MatchMode::Exact)
    }

    pub fn contains(self, field: &str, value: impl Into<String>) -> Self {
        self.filter(field, value, MatchMode::Contains)
    }

    pub fn filter(mut self, field: &str, value: impl Into<String>, mode: MatchMode) -> Self {
        self.filters.push(FieldFilter {
            field: field.to_string(),
            value: value.into(),
            mode,
        });
        self
    }

    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    fn matches_search<R: RecordFields>(&self, record: &R) -> bool {
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.search_fields.iter().any(|field| {
            record
                .field_text(field)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
    }

    pub fn matches<R: RecordFields>(&self, record: &R) -> bool {
        self.matches_search(record) && self.filters.iter().all(|filter| filter.matches(record))
    }
}

/// One page of a projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<R> {
    pub rows: Vec<R>,
    pub page: usize,
    pub page_count: usize,
    /// Number of records matching the query across all pages.
    pub total: usize,
}

/// Applies `query` to `records`, keeping their order.
///
/// A page index of 0 is read as 1 and a page size of 0 as 1; a page past
/// the end is empty.
pub fn project<R: RecordFields + Clone>(records: &[R], query: &ListQuery) -> Page<R> {
    let page = query.page.max(1);
    let page_size = query.page_size.max(1);

    let matching = records
        .iter()
        .filter(|record| query.matches(*record))
        .collect::<Vec<_>>();
    let total = matching.len();

    let rows = matching
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    Page {
        rows,
        page,
        page_count: total.div_ceil(page_size),
        total,
    }
}

/// Search and filter wiring of one list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListPreset {
    pub search_fields: &'static [&'static str],
    pub exact_filters: &'static [&'static str],
    pub contains_filters: &'static [&'static str],
}

impl ListPreset {
    pub const LEADS: ListPreset = ListPreset {
        search_fields: &["name", "email", "phone"],
        exact_filters: &["status"],
        contains_filters: &["created"],
    };

    pub const COMPANIES: ListPreset = ListPreset {
        search_fields: &["name", "city", "owner", "phone"],
        exact_filters: &["industry", "city", "country", "status"],
        contains_filters: &["created"],
    };

    pub const DEALS: ListPreset = ListPreset {
        search_fields: &["name", "owner"],
        exact_filters: &["owner", "stage"],
        contains_filters: &["closeDate", "created"],
    };

    pub const TICKETS: ListPreset = ListPreset {
        search_fields: &["title", "owner"],
        exact_filters: &["owner", "status", "source", "priority"],
        contains_filters: &[],
    };

    /// Empty query searching this screen's fields.
    pub fn query(&self) -> ListQuery {
        ListQuery::new().search_in(self.search_fields)
    }

    pub fn mode_for(&self, field: &str) -> Option<MatchMode> {
        if self.exact_filters.contains(&field) {
            Some(MatchMode::Exact)
        } else if self.contains_filters.contains(&field) {
            Some(MatchMode::Contains)
        } else {
            None
        }
    }

    pub fn filterable(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.exact_filters
            .iter()
            .chain(self.contains_filters.iter())
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordId;
    use crate::model::{Lead, LeadStatus};

    fn lead(id: u64, name: &str, status: LeadStatus) -> Lead {
        Lead {
            id: RecordId(id),
            first_name: name.to_string(),
            last_name: String::new(),
            name: name.to_string(),
            email: format!("{}@x.com", name.to_lowercase()),
            phone: "078 5432 8505".into(),
            title: String::new(),
            role: String::new(),
            owner: "Jane Cooper".into(),
            status,
            city: String::new(),
            created: "Apr 8, 2025 2:35 PM".into(),
        }
    }

    #[test]
    fn test_empty_filter_values_pass_through() {
        let records = vec![lead(1, "Ann", LeadStatus::New), lead(2, "Bob", LeadStatus::Lost)];
        let page = project(&records, &ListPreset::LEADS.query().exact("status", " "));
        assert_eq!(page.total, 2);
    }

    #[test]
    fn test_search_and_filters_are_anded() {
        let records = vec![
            lead(1, "Ann", LeadStatus::New),
            lead(2, "Annie", LeadStatus::Lost),
            lead(3, "Bob", LeadStatus::New),
        ];
        let query = ListPreset::LEADS
            .query()
            .search("ANN")
            .exact("status", "New");
        let page = project(&records, &query);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].id, RecordId(1));
    }

    #[test]
    fn test_contains_filter_matches_fragment() {
        let records = vec![lead(1, "Ann", LeadStatus::New)];
        assert_eq!(
            project(&records, &ListQuery::new().contains("created", "apr 8")).total,
            1
        );
        assert_eq!(
            project(&records, &ListQuery::new().contains("created", "May")).total,
            0
        );
    }

    #[test]
    fn test_unknown_filter_field_matches_nothing() {
        let records = vec![lead(1, "Ann", LeadStatus::New)];
        assert_eq!(
            project(&records, &ListQuery::new().exact("nope", "x")).total,
            0
        );
    }

    #[test]
    fn test_zero_page_and_size_are_clamped() {
        let records = vec![lead(1, "Ann", LeadStatus::New), lead(2, "Bob", LeadStatus::New)];
        let page = project(&records, &ListQuery::new().page(0).page_size(0));
        assert_eq!(page.page, 1);
        assert_eq!(page.page_count, 2);
        assert_eq!(page.rows.len(), 1);
    }

    #[test]
    fn test_preset_modes() {
        assert_eq!(ListPreset::DEALS.mode_for("stage"), Some(MatchMode::Exact));
        assert_eq!(ListPreset::DEALS.mode_for("closeDate"), Some(MatchMode::Contains));
        assert_eq!(ListPreset::TICKETS.mode_for("created"), None);
    }
}
