//! The analysis trigger.
//!
//! A trigger owns one outstanding request at a time. On success the
//! document is written to the result store first and only then published,
//! so any listener that reads the store sees the new value.

use crate::broadcast::Broadcaster;
use crate::models::{AnalysisResult, Zone};
use crate::store::{PutOutcome, ResultStore};
use crate::trigger::{AnalysisBackend, TriggerError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Callbacks for the code that owns a trigger. All default to no-ops.
pub trait TriggerHooks: Send + Sync {
    fn on_start(&self, _zone: Zone) {}
    fn on_complete(&self, _outcome: &RunOutcome) {}
    fn on_error(&self, _message: &str) {}
}

struct NoHooks;

impl TriggerHooks for NoHooks {}

/// What happened to a successful run's document.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Stored and broadcast.
    Published(AnalysisResult),
    /// A run issued later finished first; this document was discarded.
    Superseded(AnalysisResult),
}

impl RunOutcome {
    pub fn result(&self) -> &AnalysisResult {
        match self {
            RunOutcome::Published(result) | RunOutcome::Superseded(result) => result,
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, RunOutcome::Published(_))
    }
}

/// Clears the running flag when the run ends, including when the caller
/// drops the run future before it completes.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Starts analysis runs and distributes their results.
pub struct AnalysisTrigger {
    backend: Arc<dyn AnalysisBackend>,
    store: Arc<ResultStore>,
    broadcaster: Broadcaster,
    hooks: Arc<dyn TriggerHooks>,
    running: AtomicBool,
}

impl AnalysisTrigger {
    pub fn new(
        backend: Arc<dyn AnalysisBackend>,
        store: Arc<ResultStore>,
        broadcaster: Broadcaster,
    ) -> Self {
        Self {
            backend,
            store,
            broadcaster,
            hooks: Arc::new(NoHooks),
            running: AtomicBool::new(false),
        }
    }

    pub fn with_hooks(mut self, hooks: Arc<dyn TriggerHooks>) -> Self {
        self.hooks = hooks;
        self
    }

    /// Whether a run is in flight. The trigger is disabled while it is.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Run an analysis for `zone`.
    ///
    /// Fails with [`TriggerError::Busy`] if this trigger already has a run
    /// in flight. On any failure the result store is left untouched and
    /// nothing is broadcast. Dropping the returned future abandons the run
    /// with the same guarantee.
    pub async fn run(&self, zone: Zone) -> Result<RunOutcome, TriggerError> {
        let _in_flight = InFlight::acquire(&self.running).ok_or(TriggerError::Busy)?;

        info!("Starting analysis for zone {}", zone);
        self.hooks.on_start(zone);

        match self.execute(zone).await {
            Ok(outcome) => {
                self.hooks.on_complete(&outcome);
                Ok(outcome)
            }
            Err(e) => {
                warn!("Analysis for zone {} failed: {}", zone, e);
                self.hooks.on_error(&e.to_string());
                Err(e)
            }
        }
    }

    async fn execute(&self, zone: Zone) -> Result<RunOutcome, TriggerError> {
        let ticket = self.store.issue_ticket();
        let result = self.backend.run_analysis(zone).await?;

        let mut delivered = 0;
        let outcome = self.store.commit(ticket, &result, |stored| {
            delivered = self.broadcaster.publish(stored);
        })?;

        match outcome {
            PutOutcome::Stored => {
                info!(
                    "Analysis for zone {} complete; notified {} views",
                    zone, delivered
                );
                Ok(RunOutcome::Published(result))
            }
            PutOutcome::Stale => {
                info!(
                    "Analysis for zone {} finished after a newer run; result discarded",
                    zone
                );
                Ok(RunOutcome::Superseded(result))
            }
        }
    }
}
