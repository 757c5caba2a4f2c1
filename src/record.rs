//! Record contracts shared by every entity kind.
//!
//! `RecordFields` is normally derived (see `crmdesk_derive`); `Record` is
//! implemented by hand per entity and ties a record to its form draft.

use crate::core::{EntityKind, RecordId, Validate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

/// Typed partial updates plus by-name field access for list screens.
pub trait RecordFields {
    type Patch: Debug + Clone + Default + Send + Sync + Serialize + 'static;

    /// Lookup names accepted by [`RecordFields::field_text`].
    const FIELD_NAMES: &'static [&'static str];

    /// Display text of a field, `None` for unknown fields or empty optionals.
    fn field_text(&self, field: &str) -> Option<String>;

    /// Overwrites exactly the fields present in `patch`.
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Replaces the identity, used when the server assigns the id.
    fn assign_id(&mut self, id: RecordId);
}

/// One entity instance held by an `EntityStore`.
pub trait Record:
    RecordFields + Debug + Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Validated form input a new record is built from.
    type Draft: Validate + Debug + Clone + Send + Sync + Serialize;

    const KIND: EntityKind;

    fn id(&self) -> RecordId;

    fn created(&self) -> &str;

    fn from_draft(id: RecordId, created: String, draft: Self::Draft) -> Self;
}

/// Text rendering of a field value for search and filters.
pub trait FieldText {
    fn field_text(&self) -> Option<String>;
}

impl FieldText for String {
    fn field_text(&self) -> Option<String> {
        Some(self.clone())
    }
}

impl FieldText for RecordId {
    fn field_text(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl FieldText for Vec<String> {
    fn field_text(&self) -> Option<String> {
        Some(self.join(", "))
    }
}

impl<T: FieldText> FieldText for Option<T> {
    fn field_text(&self) -> Option<String> {
        self.as_ref().and_then(FieldText::field_text)
    }
}
