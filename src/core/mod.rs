pub mod error;
pub mod types;
pub mod validation;

pub use error::{CrmError, Result};
pub use types::{
    Clock, EntityKind, FixedClock, IdSequence, RecordId, SystemClock, format_created,
};
pub use validation::{Validate, ValidationErrors};
