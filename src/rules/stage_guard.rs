use crate::core::{CrmError, Result};
use crate::model::{Activity, Deal, DealPatch, DealStage, ParentRef};
use crate::store::{EntityStore, UpdateGuard};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Allowed,
    Rejected { reason: String },
}

impl Transition {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Transition::Allowed)
    }
}

/// Deal pipeline rule: Contract Sent, Closed Won and Closed Lost can only
/// be entered once the deal has at least one activity. Every other move,
/// including leaving a closed stage, is free.
pub struct StageGuard {
    activities: Arc<EntityStore<Activity>>,
}

impl StageGuard {
    pub fn new(activities: Arc<EntityStore<Activity>>) -> Self {
        Self { activities }
    }

    pub fn can_transition(deal: &Deal, target: DealStage, activity_count: usize) -> Transition {
        if deal.stage == target {
            return Transition::Allowed;
        }
        if target.requires_activity() && activity_count == 0 {
            return Transition::Rejected {
                reason: format!("Cannot move to {} without at least one activity.", target),
            };
        }
        Transition::Allowed
    }
}

impl UpdateGuard<Deal> for StageGuard {
    fn check(&self, current: &Deal, patch: &DealPatch) -> Result<()> {
        let Some(target) = patch.stage else {
            return Ok(());
        };
        let activity_count = self.activities.count_for(ParentRef::deal(current.id))?;
        debug!(deal_id = %current.id, from = %current.stage, to = %target, activity_count, "Checking stage transition");

        match Self::can_transition(current, target, activity_count) {
            Transition::Allowed => Ok(()),
            Transition::Rejected { reason } => Err(CrmError::StageTransitionRejected { reason }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordId;
    use crate::model::DealPriority;

    fn deal(stage: DealStage) -> Deal {
        Deal {
            id: RecordId(1),
            name: "Website Revamp - Atlas Corp".into(),
            stage,
            amount: "$12,500".into(),
            owner: "Jane Cooper".into(),
            close_date: "Apr 8, 2025".into(),
            priority: DealPriority::High,
            created: "Apr 8, 2025".into(),
        }
    }

    #[test]
    fn test_gated_stages_need_an_activity() {
        let open = deal(DealStage::QualifiedToBuy);
        for target in DealStage::ACTIVITY_GATED {
            assert_eq!(
                StageGuard::can_transition(&open, *target, 0),
                Transition::Rejected {
                    reason: format!("Cannot move to {} without at least one activity.", target)
                }
            );
            assert!(StageGuard::can_transition(&open, *target, 1).is_allowed());
        }
    }

    #[test]
    fn test_self_transition_and_backward_moves() {
        let closed = deal(DealStage::ClosedWon);
        assert!(StageGuard::can_transition(&closed, DealStage::ClosedWon, 0).is_allowed());
        assert!(StageGuard::can_transition(&closed, DealStage::QualifiedToBuy, 0).is_allowed());
    }
}
