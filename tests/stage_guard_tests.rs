use crmdesk::model::{ActivityBody, ActivityDraft, DealPatch, DealStage, ParentRef};
use crmdesk::store::{NotificationLevel, RecordingNotifier};
use crmdesk::session::MemoryStorage;
use crmdesk::{Crm, CrmConfig, CrmError, RecordId};
use std::sync::Arc;

fn workspace() -> (Crm, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::new());
    let crm = Crm::builder(CrmConfig::new().password_cost(4))
        .notifier(notifier.clone())
        .build()
        .unwrap();
    (crm, notifier)
}

fn call(deal: RecordId) -> ActivityDraft {
    ActivityDraft::new(
        ParentRef::deal(deal),
        ActivityBody::Call {
            outcome: "Connected".into(),
            date: "2025-04-08".into(),
            time: "10:00".into(),
            note: String::new(),
        },
    )
}

#[tokio::test]
async fn test_closed_won_rejected_without_activity() {
    let (crm, notifier) = workspace();

    let err = crm
        .move_deal(RecordId(2), DealStage::ClosedWon)
        .await
        .unwrap_err();

    assert_eq!(
        err,
        CrmError::StageTransitionRejected {
            reason: "Cannot move to Closed Won without at least one activity.".into()
        }
    );
    let deal = crm.deals.get(&RecordId(2)).unwrap().unwrap();
    assert_eq!(deal.stage, DealStage::QualifiedToBuy);

    let last = notifier.notifications().pop().unwrap();
    assert_eq!(last.level, NotificationLevel::Error);
    assert_eq!(last.message, "Cannot move to Closed Won without at least one activity.");
}

#[tokio::test]
async fn test_one_activity_unlocks_gated_stages() {
    let (crm, _) = workspace();
    crm.log_activity(call(RecordId(2))).await.unwrap();

    let deal = crm
        .move_deal(RecordId(2), DealStage::ContractSent)
        .await
        .unwrap();
    assert_eq!(deal.stage, DealStage::ContractSent);
}

#[tokio::test]
async fn test_activity_on_another_deal_does_not_count() {
    let (crm, _) = workspace();
    crm.log_activity(call(RecordId(5))).await.unwrap();

    assert!(
        crm.move_deal(RecordId(2), DealStage::ClosedLost)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn test_self_transition_and_ungated_moves_are_allowed() {
    let (crm, _) = workspace();

    // deal 4 is seeded as Closed Won with no activities
    let same = crm.move_deal(RecordId(4), DealStage::ClosedWon).await.unwrap();
    assert_eq!(same.stage, DealStage::ClosedWon);

    let back = crm
        .move_deal(RecordId(4), DealStage::PresentationScheduled)
        .await
        .unwrap();
    assert_eq!(back.stage, DealStage::PresentationScheduled);
}

#[tokio::test]
async fn test_patches_without_stage_skip_the_guard() {
    let (crm, _) = workspace();
    let deal = crm
        .deals
        .update(RecordId(8), DealPatch::default().amount("$12,000"))
        .await
        .unwrap();
    assert_eq!(deal.amount, "$12,000");
    assert_eq!(deal.stage, DealStage::ClosedLost);
}

#[tokio::test]
async fn test_activity_for_unknown_parent_is_rejected() {
    let (crm, _) = workspace();
    let err = crm.log_activity(call(RecordId(99))).await.unwrap_err();
    assert_eq!(err, CrmError::not_found("Deal", RecordId(99)));
    assert!(crm.activities.is_empty().unwrap());
}

#[tokio::test]
async fn test_logged_activity_and_stage_survive_a_restart() {
    let storage = Arc::new(MemoryStorage::new());
    let open = || {
        Crm::builder(CrmConfig::new().password_cost(4))
            .storage(storage.clone())
            .notifier(Arc::new(RecordingNotifier::new()))
            .build()
            .unwrap()
    };

    let logged = open().log_activity(call(RecordId(2))).await.unwrap();

    let crm = open();
    assert_eq!(crm.activities.for_parent(ParentRef::deal(RecordId(2))).unwrap(), vec![logged]);
    crm.move_deal(RecordId(2), DealStage::ClosedWon).await.unwrap();

    let crm = open();
    let deal = crm.deals.get(&RecordId(2)).unwrap().unwrap();
    assert_eq!(deal.stage, DealStage::ClosedWon);
}
