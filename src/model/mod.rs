pub mod activity;
pub mod company;
pub mod deal;
pub mod lead;
pub mod ticket;
pub mod user;

pub use activity::{Activity, ActivityBody, ActivityDraft, ActivityKind, ActivityPatch, ParentRef};
pub use company::{Company, CompanyDraft, CompanyPatch, CompanyStatus, CompanyType};
pub use deal::{Deal, DealDraft, DealPatch, DealPriority, DealStage};
pub use lead::{Lead, LeadDraft, LeadPatch, LeadStatus};
pub use ticket::{
    AssociationKind, Ticket, TicketAssociation, TicketDraft, TicketPatch, TicketPriority,
    TicketSource, TicketStatus,
};
pub use user::{RegisterForm, StoredUser, UserProfile};

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

/// Owners selectable in the entity forms.
pub const OWNER_ROSTER: &[&str] = &[
    "Jane Cooper",
    "Wade Warren",
    "Brooklyn Simmons",
    "Leslie Alexander",
    "Jenny Wilson",
    "Guy Hawkins",
    "Robert Fox",
    "Cameron Williamson",
];

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

pub(crate) fn looks_like_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value.trim())
}

/// Returned when a label does not name any variant of a fixed enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Declares a closed set of labelled values (statuses, stages, priorities).
///
/// The label is both the serialized form and the display text; parsing is
/// case-insensitive. Attributes pass through, so `#[derive(Default)]` on the
/// enum plus `#[default]` on a variant gives it a default.
macro_rules! crm_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($(#[$variant_meta:meta])* $variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::model::UnknownVariant;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                let wanted = s.trim();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|variant| variant.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| $crate::model::UnknownVariant {
                        kind: stringify!($name),
                        value: wanted.to_string(),
                    })
            }
        }

        impl $crate::record::FieldText for $name {
            fn field_text(&self) -> Option<String> {
                Some(self.as_str().to_string())
            }
        }
    };
}

pub(crate) use crm_enum;
