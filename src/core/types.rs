use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identity of a record within its store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl RecordId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim().parse::<u64>().map(RecordId)
    }
}

impl From<u64> for RecordId {
    fn from(value: u64) -> Self {
        RecordId(value)
    }
}

/// Per-store id source. Successive calls never return the same id, even
/// when they happen within the same clock tick.
#[derive(Debug)]
pub struct IdSequence {
    next: AtomicU64,
}

impl IdSequence {
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first.max(1)),
        }
    }

    pub fn next_id(&self) -> RecordId {
        RecordId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Moves the sequence past `id` so seeded or remote ids are never reissued.
    pub fn observe(&self, id: RecordId) {
        self.next.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

/// Source of "now" for `created` stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

pub const CREATED_FORMAT: &str = "%b %-d, %Y %-I:%M %p";

/// Formats a `created` stamp the way list screens display it,
/// e.g. `Apr 8, 2025 2:35 PM`.
pub fn format_created(at: NaiveDateTime) -> String {
    at.format(CREATED_FORMAT).to_string()
}

/// The record kinds that own a store and can parent activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Lead,
    Company,
    Deal,
    Ticket,
    Activity,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Lead => "Lead",
            EntityKind::Company => "Company",
            EntityKind::Deal => "Deal",
            EntityKind::Ticket => "Ticket",
            EntityKind::Activity => "Activity",
        }
    }

    /// Collection segment used for REST paths.
    pub fn collection(&self) -> &'static str {
        match self {
            EntityKind::Lead => "leads",
            EntityKind::Company => "companies",
            EntityKind::Deal => "deals",
            EntityKind::Ticket => "tickets",
            EntityKind::Activity => "activities",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_id_sequence_is_unique_under_rapid_calls() {
        let seq = IdSequence::default();
        let ids: Vec<RecordId> = (0..1000).map(|_| seq.next_id()).collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_id_sequence_observe() {
        let seq = IdSequence::default();
        seq.observe(RecordId(8));
        assert_eq!(seq.next_id(), RecordId(9));
        seq.observe(RecordId(3));
        assert_eq!(seq.next_id(), RecordId(10));
    }

    #[test]
    fn test_record_id_parses_trimmed_strings() {
        assert_eq!(" 42 ".parse::<RecordId>().unwrap(), RecordId(42));
        assert!("abc".parse::<RecordId>().is_err());
    }

    #[test]
    fn test_format_created() {
        let at = NaiveDate::from_ymd_opt(2025, 4, 8)
            .unwrap()
            .and_hms_opt(14, 35, 0)
            .unwrap();
        assert_eq!(format_created(at), "Apr 8, 2025 2:35 PM");
    }
}
