//! The single persisted slot holding the latest analysis result.

use crate::models::AnalysisResult;
use crate::store::{Storage, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Key holding the serialized analysis document.
pub const RESULT_KEY: &str = "analysisResults";

/// Key holding bookkeeping about the last accepted write.
pub const META_KEY: &str = "analysisResults.meta";

/// Issuance order of a write. Later tickets supersede earlier ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Outcome of a ticketed write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// The document is now the stored value.
    Stored,
    /// A write issued later has already been accepted; nothing was written.
    Stale,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoreMeta {
    stored_at: DateTime<Utc>,
}

/// Holds the most recent analysis result.
///
/// Writes serialize the whole document and hand it to the backend in one
/// call. Reads fail soft: a missing, unreadable or foreign value under
/// [`RESULT_KEY`] reads as `None`.
pub struct ResultStore {
    storage: Arc<dyn Storage>,
    next_ticket: AtomicU64,
    /// Ticket of the last accepted write; held while writing.
    accepted: Mutex<u64>,
}

impl ResultStore {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            next_ticket: AtomicU64::new(1),
            accepted: Mutex::new(0),
        }
    }

    /// Reserve a position in write order before starting a request.
    pub fn issue_ticket(&self) -> Ticket {
        Ticket(self.next_ticket.fetch_add(1, Ordering::SeqCst))
    }

    /// Store `result` under a fresh ticket. Only a concurrent writer that
    /// took its ticket later and finished first can make this `Stale`.
    pub fn put(&self, result: &AnalysisResult) -> Result<PutOutcome, StoreError> {
        let ticket = self.issue_ticket();
        self.put_ticketed(ticket, result)
    }

    /// Store `result` unless a write with a later ticket was already accepted.
    pub fn put_ticketed(
        &self,
        ticket: Ticket,
        result: &AnalysisResult,
    ) -> Result<PutOutcome, StoreError> {
        self.commit(ticket, result, |_| {})
    }

    /// Like [`put_ticketed`](Self::put_ticketed), then runs `on_stored` if
    /// the write was accepted.
    ///
    /// Writes stay locked until `on_stored` returns, so notifications sent
    /// from it follow the order of the writes. `on_stored` may read the
    /// store but must not write to it.
    pub fn commit<F>(
        &self,
        ticket: Ticket,
        result: &AnalysisResult,
        on_stored: F,
    ) -> Result<PutOutcome, StoreError>
    where
        F: FnOnce(&AnalysisResult),
    {
        let mut accepted = self.accepted.lock().unwrap_or_else(PoisonError::into_inner);

        if ticket.0 < *accepted {
            warn!(
                "Discarding analysis result from ticket {} (ticket {} already stored)",
                ticket.0, *accepted
            );
            return Ok(PutOutcome::Stale);
        }

        let document = serde_json::to_string(result)?;
        let meta = serde_json::to_string(&StoreMeta {
            stored_at: Utc::now(),
        })?;

        self.storage
            .set_items(&[(RESULT_KEY, document.as_str()), (META_KEY, meta.as_str())])?;
        *accepted = ticket.0;

        info!(
            "Stored analysis result for zone {} ({} bytes)",
            result.zone().unwrap_or("<unknown>"),
            document.len()
        );
        on_stored(result);
        Ok(PutOutcome::Stored)
    }

    /// The last stored result, or `None` if there is nothing usable.
    pub fn get(&self) -> Option<AnalysisResult> {
        let raw = match self.storage.get_item(RESULT_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No stored analysis result");
                return None;
            }
            Err(e) => {
                warn!("Could not read stored analysis result: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(document @ Value::Object(_)) => Some(AnalysisResult::new(document)),
            Ok(other) => {
                debug!("Ignoring stored analysis result that is not an object: {}", other);
                None
            }
            Err(e) => {
                debug!("Ignoring unparseable stored analysis result: {}", e);
                None
            }
        }
    }

    /// When the stored result was last written, if known.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get_item(META_KEY).ok().flatten()?;
        serde_json::from_str::<StoreMeta>(&raw)
            .ok()
            .map(|meta| meta.stored_at)
    }
}
