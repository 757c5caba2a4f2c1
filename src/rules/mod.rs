pub mod stage_guard;

pub use stage_guard::{StageGuard, Transition};
