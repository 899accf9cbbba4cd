// Fire-and-forget rank checks.
//
// Callers hand a request to a dedicated worker task and get an ack back
// immediately. The worker runs one batch at a time and logs how each ended.
// At most one request waits behind the running batch.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::checker::RankChecker;
use crate::error::RunError;

/// Answer to a trigger request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerAck {
    /// A run will start as soon as the worker is free.
    Accepted,
    /// A run is already waiting; this request folds into it.
    AlreadyQueued,
    /// The worker has shut down.
    Stopped,
}

#[derive(Clone)]
pub struct CheckTrigger {
    tx: mpsc::Sender<()>,
}

impl CheckTrigger {
    /// Start the worker. It exits once every `CheckTrigger` clone is dropped
    /// and the queue is drained.
    pub fn spawn(checker: Arc<RankChecker>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(1);
        let handle = tokio::spawn(run_worker(checker, rx));
        (Self { tx }, handle)
    }

    pub fn request(&self) -> TriggerAck {
        match self.tx.try_send(()) {
            Ok(()) => TriggerAck::Accepted,
            Err(TrySendError::Full(())) => TriggerAck::AlreadyQueued,
            Err(TrySendError::Closed(())) => TriggerAck::Stopped,
        }
    }
}

async fn run_worker(checker: Arc<RankChecker>, mut rx: mpsc::Receiver<()>) {
    info!("Rank check worker started");

    while rx.recv().await.is_some() {
        // Read the config fresh for every run.
        let tracking = match checker.store().tracking_config().await {
            Ok(tracking) => tracking,
            Err(e) => {
                error!(error = %e, "Rank check job failed: could not load tracking config");
                continue;
            }
        };

        match checker.run_batch(tracking.as_ref()).await {
            Ok(summary) => info!(%summary, "Rank check job completed in background"),
            Err(RunError::Config(e)) => warn!(error = %e, "Rank check job not started"),
            Err(e) => error!(error = %e, "Rank check job failed in background"),
        }
    }

    info!("Rank check worker stopped");
}
