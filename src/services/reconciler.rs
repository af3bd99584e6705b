//! Payment status reconciliation.
//!
//! Holds the client-side copy of the payment list and merges two kinds of
//! writes into it: optimistic status changes acknowledged by the server, and
//! authoritative snapshots fetched from it. Every in-flight status change is
//! registered in a pending set keyed by `booking_id:status`; background poll
//! snapshots are dropped while that set is non-empty so a poll that left
//! before the write cannot overwrite it.

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::models::{PaymentRecord, PaymentStatus, PaymentView};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationKey {
    pub booking_id: String,
    pub status: PaymentStatus,
}

impl OperationKey {
    pub fn new(booking_id: impl Into<String>, status: PaymentStatus) -> Self {
        Self {
            booking_id: booking_id.into(),
            status,
        }
    }
}

impl std::fmt::Display for OperationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.booking_id, self.status)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("status change {0} is already in flight")]
    DuplicateInFlight(OperationKey),

    #[error("booking {booking_id} is already {status}")]
    Unchanged {
        booking_id: String,
        status: PaymentStatus,
    },

    #[error("no payment record for booking {0}")]
    UnknownBooking(String),
}

/// Where a snapshot came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOrigin {
    /// Scheduled background poll.
    Poll,
    /// User-initiated refresh.
    Refresh,
    /// Re-fetch that closes out a status change, after success or failure.
    Settle(OperationKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Applied,
    Suppressed,
}

#[derive(Debug, Default)]
pub struct PaymentStatusReconciler {
    records: Vec<PaymentRecord>,
    pending: BTreeSet<OperationKey>,
    // acknowledged by the server, not yet confirmed by a re-fetch
    optimistic: HashMap<String, PaymentStatus>,
    loading: bool,
    last_error: Option<String>,
}

impl PaymentStatusReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn is_pending(&self, key: &OperationKey) -> bool {
        self.pending.contains(key)
    }

    pub fn view(&self) -> PaymentView {
        PaymentView {
            records: self.records.clone(),
            loading: self.loading,
            pending_operations: self.pending.len(),
            last_error: self.last_error.clone(),
        }
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    /// Registers a status change before any network call is made.
    pub fn begin(
        &mut self,
        booking_id: &str,
        status: PaymentStatus,
    ) -> Result<OperationKey, ReconcileError> {
        let key = OperationKey::new(booking_id, status);
        if self.pending.contains(&key) {
            return Err(ReconcileError::DuplicateInFlight(key));
        }

        let current = self
            .records
            .iter()
            .find(|r| r.booking_id == booking_id)
            .map(|r| r.status)
            .ok_or_else(|| ReconcileError::UnknownBooking(booking_id.to_string()))?;
        if !current.can_transition_to(status) {
            return Err(ReconcileError::Unchanged {
                booking_id: booking_id.to_string(),
                status,
            });
        }

        self.pending.insert(key.clone());
        Ok(key)
    }

    /// Writes the acknowledged status locally. The key stays pending until settled.
    pub fn apply_optimistic_update(&mut self, key: &OperationKey, now: DateTime<Utc>) -> PaymentView {
        if let Some(record) = self.records.iter_mut().find(|r| r.booking_id == key.booking_id) {
            record.status = key.status;
            record.last_seen_at = now;
        }
        self.optimistic.insert(key.booking_id.clone(), key.status);
        self.view()
    }

    pub fn reconcile(
        &mut self,
        snapshot: Vec<PaymentRecord>,
        origin: SnapshotOrigin,
        now: DateTime<Utc>,
    ) -> ReconcileOutcome {
        match origin {
            SnapshotOrigin::Poll if self.has_pending() => {
                tracing::debug!(
                    pending = self.pending.len(),
                    "poll snapshot dropped while status changes are in flight"
                );
                return ReconcileOutcome::Suppressed;
            }
            SnapshotOrigin::Settle(key) => self.release(&key),
            SnapshotOrigin::Poll | SnapshotOrigin::Refresh => {}
        }

        self.records = snapshot
            .into_iter()
            .map(|mut record| {
                if let Some(status) = self.optimistic.get(&record.booking_id) {
                    record.status = *status;
                }
                record.last_seen_at = now;
                record
            })
            .collect();
        self.last_error = None;
        ReconcileOutcome::Applied
    }

    /// Releases a key whose settling re-fetch failed; the view keeps what it has.
    pub fn abandon(&mut self, key: &OperationKey) {
        self.release(key);
    }

    // The override outlives a key only while another change for the same booking is in flight.
    fn release(&mut self, key: &OperationKey) {
        self.pending.remove(key);
        let still_writing = self
            .pending
            .iter()
            .any(|k| k.booking_id == key.booking_id);
        if !still_writing {
            self.optimistic.remove(&key.booking_id);
        }
    }
}
