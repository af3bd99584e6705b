//! Drives the payment reconciler against the remote API: status changes,
//! confirmatory re-fetches, rollbacks and the background poller.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, error, info, warn};

use crate::models::{PaymentStatus, PaymentView};
use crate::services::api::{ApiError, BookingApi};
use crate::services::reconciler::{
    OperationKey, PaymentStatusReconciler, ReconcileError, ReconcileOutcome, SnapshotOrigin,
};
use crate::services::session::SessionContext;

#[derive(Debug, thiserror::Error)]
pub enum StatusChangeError {
    #[error(transparent)]
    Conflict(#[from] ReconcileError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Not fetched: a status change was in flight.
    Skipped,
    Applied,
    /// Fetched, but a status change started while the request was out.
    Suppressed,
    Failed,
}

pub struct PaymentDesk {
    api: Arc<dyn BookingApi>,
    reconciler: Mutex<PaymentStatusReconciler>,
    confirm_delay: Duration,
    updates: broadcast::Sender<PaymentView>,
}

impl PaymentDesk {
    pub fn new(api: Arc<dyn BookingApi>, confirm_delay: Duration) -> Self {
        let (updates, _) = broadcast::channel(64);
        Self {
            api,
            reconciler: Mutex::new(PaymentStatusReconciler::new()),
            confirm_delay,
            updates,
        }
    }

    fn with_reconciler<R>(&self, f: impl FnOnce(&mut PaymentStatusReconciler) -> R) -> R {
        let mut guard = self
            .reconciler
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn publish(&self) {
        // no subscribers is fine
        let _ = self.updates.send(self.view());
    }

    pub fn view(&self) -> PaymentView {
        self.with_reconciler(|r| r.view())
    }

    pub fn subscribe(&self) -> BroadcastStream<PaymentView> {
        BroadcastStream::new(self.updates.subscribe())
    }

    /// User-initiated reload. Toggles the loading flag around the fetch.
    pub async fn refresh(&self, token: &str) -> Result<PaymentView, ApiError> {
        self.with_reconciler(|r| r.set_loading(true));
        self.publish();

        let result = self.api.list_payments(token).await;
        let view = self.with_reconciler(|r| {
            r.set_loading(false);
            match &result {
                Ok(snapshot) => {
                    r.reconcile(snapshot.clone(), SnapshotOrigin::Refresh, Utc::now());
                }
                Err(e) => r.set_error(Some(e.to_string())),
            }
            r.view()
        });
        self.publish();

        match result {
            Ok(_) => Ok(view),
            Err(e) => {
                warn!(error = %e, "payment refresh failed");
                Err(e)
            }
        }
    }

    /// Background poll. Silent: never touches the loading flag.
    pub async fn poll_once(&self, token: &str) -> PollOutcome {
        if self.with_reconciler(|r| r.has_pending()) {
            debug!("payment poll skipped, status change in flight");
            return PollOutcome::Skipped;
        }

        match self.api.list_payments(token).await {
            Ok(snapshot) => {
                // A poll sent before a status change began and answered after it settled
                // still applies; the next poll or confirmation corrects it.
                let outcome =
                    self.with_reconciler(|r| r.reconcile(snapshot, SnapshotOrigin::Poll, Utc::now()));
                match outcome {
                    ReconcileOutcome::Applied => {
                        self.publish();
                        PollOutcome::Applied
                    }
                    ReconcileOutcome::Suppressed => PollOutcome::Suppressed,
                }
            }
            Err(e) => {
                if e.is_transient() {
                    warn!(error = %e, "payment poll failed");
                } else {
                    error!(error = %e, "payment listing could not be read");
                }
                self.with_reconciler(|r| r.set_error(Some(e.to_string())));
                self.publish();
                PollOutcome::Failed
            }
        }
    }

    /// Sends a status change. A duplicate of an in-flight change is rejected
    /// without touching the network.
    pub async fn change_status(
        self: &Arc<Self>,
        token: &str,
        booking_id: &str,
        status: PaymentStatus,
    ) -> Result<PaymentView, StatusChangeError> {
        let key = self.with_reconciler(|r| r.begin(booking_id, status))?;
        self.publish();

        match self.api.update_payment_status(token, booking_id, status).await {
            Ok(()) => {
                let view = self.with_reconciler(|r| r.apply_optimistic_update(&key, Utc::now()));
                self.publish();
                info!(booking_id, status = %status, "payment status updated");
                self.schedule_confirmation(token.to_string(), key);
                Ok(view)
            }
            Err(e) => {
                warn!(booking_id, status = %status, error = %e, "payment status update failed, re-fetching");
                self.settle(token, key).await;
                self.with_reconciler(|r| r.set_error(Some(e.to_string())));
                self.publish();
                Err(e.into())
            }
        }
    }

    fn schedule_confirmation(self: &Arc<Self>, token: String, key: OperationKey) {
        let desk = Arc::clone(self);
        let delay = self.confirm_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            desk.settle(&token, key).await;
        });
    }

    async fn settle(&self, token: &str, key: OperationKey) {
        match self.api.list_payments(token).await {
            Ok(snapshot) => {
                debug!(operation = %key, "settling status change with server snapshot");
                self.with_reconciler(|r| {
                    r.reconcile(snapshot, SnapshotOrigin::Settle(key), Utc::now())
                });
            }
            Err(e) => {
                warn!(operation = %key, error = %e, "settling re-fetch failed, next poll will correct");
                self.with_reconciler(|r| r.abandon(&key));
            }
        }
        self.publish();
    }
}

/// Owns the background poll task. Dropping it stops polling.
pub struct PollerHandle {
    task: JoinHandle<()>,
}

impl PollerHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub fn spawn_poller(
    desk: Arc<PaymentDesk>,
    session: SessionContext,
    every: Duration,
) -> PollerHandle {
    let every = every.max(Duration::from_millis(1));
    let task = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!(every_ms = every.as_millis() as u64, "payment poller started");

        loop {
            ticker.tick().await;

            let token = match session.current(Utc::now()) {
                Ok(Some(session)) => session.token,
                Ok(None) => continue,
                Err(e) => {
                    warn!(error = %e, "could not read session for payment poll");
                    continue;
                }
            };

            desk.poll_once(&token).await;
        }
    });
    PollerHandle { task }
}
