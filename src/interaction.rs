//! Guards for user-driven async work: one submission per form at a time,
//! and no late results delivered into a view that has gone away.

use crate::core::{CrmError, Result};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// Refuses a second submission while one is in flight.
#[derive(Debug, Clone, Default)]
pub struct SubmitGate {
    in_flight: Arc<AtomicBool>,
}

/// Held for the duration of one submission; dropping it reopens the gate.
#[derive(Debug)]
pub struct SubmitPermit {
    in_flight: Arc<AtomicBool>,
}

impl Drop for SubmitPermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

impl SubmitGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// `None` while another submission holds the gate.
    pub fn try_begin(&self) -> Option<SubmitPermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SubmitPermit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    /// Runs `work` unless a submission is already running.
    pub async fn submit<T, F>(&self, work: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let Some(_permit) = self.try_begin() else {
            debug!("Duplicate submission refused");
            return Err(CrmError::SubmissionInFlight);
        };
        work.await
    }
}

/// Liveness token owned by a view. Dropping it marks the view torn down.
#[derive(Debug)]
pub struct ViewScope {
    alive: Arc<AtomicBool>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        Self {
            alive: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A handle async work can carry to check whether its view still exists.
    pub fn handle(&self) -> ViewHandle {
        ViewHandle {
            alive: Arc::clone(&self.alive),
        }
    }
}

impl Drop for ViewScope {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone)]
pub struct ViewHandle {
    alive: Arc<AtomicBool>,
}

impl ViewHandle {
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Awaits `work` and hands back its output only if the view is still
    /// alive; otherwise the result is discarded.
    pub async fn run<T, F>(&self, work: F) -> Option<T>
    where
        F: Future<Output = T>,
    {
        let output = work.await;
        if self.is_alive() {
            Some(output)
        } else {
            debug!("Discarding result for a torn-down view");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_second_submission_is_refused_while_first_runs() {
        let gate = SubmitGate::new();
        let permit = gate.try_begin().unwrap();
        assert!(gate.is_submitting());

        let refused = gate.submit(async { Ok(1) }).await;
        assert_eq!(refused, Err(CrmError::SubmissionInFlight));

        drop(permit);
        assert!(!gate.is_submitting());
        assert_eq!(gate.submit(async { Ok(2) }).await, Ok(2));
        assert!(!gate.is_submitting());
    }

    #[tokio::test]
    async fn test_gate_reopens_after_failed_submission() {
        let gate = SubmitGate::new();
        let failed: Result<()> = gate
            .submit(async { Err(CrmError::Network("down".into())) })
            .await;
        assert!(failed.is_err());
        assert!(gate.try_begin().is_some());
    }

    #[tokio::test]
    async fn test_late_result_for_dropped_view_is_discarded() {
        let scope = ViewScope::new();
        let handle = scope.handle();
        assert_eq!(handle.run(async { 5 }).await, Some(5));

        drop(scope);
        assert!(!handle.is_alive());
        assert_eq!(handle.run(async { 5 }).await, None);
    }
}
