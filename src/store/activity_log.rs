use super::EntityStore;
use crate::core::Result;
use crate::model::{Activity, ActivityKind, ParentRef};

/// Activity queries scoped to one parent record.
impl EntityStore<Activity> {
    /// Activities of `parent`, newest first.
    pub fn for_parent(&self, parent: ParentRef) -> Result<Vec<Activity>> {
        self.filter_by(|activity| activity.parent == parent)
    }

    pub fn of_kind(&self, parent: ParentRef, kind: ActivityKind) -> Result<Vec<Activity>> {
        self.filter_by(|activity| activity.parent == parent && activity.kind() == kind)
    }

    pub fn count_for(&self, parent: ParentRef) -> Result<usize> {
        Ok(self.for_parent(parent)?.len())
    }
}
