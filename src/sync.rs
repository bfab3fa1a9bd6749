//! Live HP synchronization from remote character sheets.
//!
//! A background task polls a caller-supplied [`SheetFetcher`] for every
//! tracked participant and emits an [`HpUpdate`] whenever the remote
//! values change. The crate does no HTTP itself; the fetcher is the
//! seam where the application plugs in its transport.

use crate::import::CharacterSheet;
use crate::model::ParticipantId;
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Errors a sheet fetch can surface.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("sheet fetch failed: {0}")]
    Fetch(String),

    #[error("sheet {0} not found")]
    NotFound(String),
}

/// Source of character-sheet documents, supplied by the caller.
pub trait SheetFetcher: Send + Sync + 'static {
    /// Fetch the raw sheet document for an external sheet id.
    fn fetch(&self, sheet_id: &str) -> BoxFuture<'static, Result<serde_json::Value, SyncError>>;
}

/// A participant enrolled for polling, with its last known HP values.
#[derive(Debug, Clone)]
pub struct SyncTarget {
    pub participant_id: ParticipantId,
    pub sheet_id: String,
    pub current_hp: i32,
    pub max_hp: i32,
}

/// An HP change detected on a remote sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HpUpdate {
    pub participant_id: ParticipantId,
    pub current_hp: i32,
    pub max_hp: i32,
}

/// Handle to a running sync task.
pub struct LiveSync {
    shutdown: watch::Sender<bool>,
    handle: tokio::task::JoinHandle<()>,
}

impl LiveSync {
    /// Default polling cadence.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

    /// Start polling the given targets. Updates arrive on the returned
    /// channel; the task runs until [`stop`] or until the receiver and
    /// handle are dropped.
    ///
    /// Each participant has at most one fetch in flight at a time: a
    /// slow fetch simply causes that participant to skip ticks rather
    /// than pile up requests.
    ///
    /// [`stop`]: Self::stop
    pub fn start(
        fetcher: Arc<dyn SheetFetcher>,
        targets: Vec<SyncTarget>,
        interval: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<HpUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let known: Arc<Mutex<HashMap<ParticipantId, (i32, i32)>>> = Arc::new(Mutex::new(
                targets
                    .iter()
                    .map(|t| (t.participant_id, (t.current_hp, t.max_hp)))
                    .collect(),
            ));
            let in_flight: Arc<Mutex<HashSet<ParticipantId>>> =
                Arc::new(Mutex::new(HashSet::new()));

            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        for target in &targets {
                            let id = target.participant_id;
                            if !in_flight.lock().await.insert(id) {
                                // Previous fetch still running.
                                continue;
                            }

                            let fetcher = fetcher.clone();
                            let sheet_id = target.sheet_id.clone();
                            let known = known.clone();
                            let in_flight = in_flight.clone();
                            let tx = tx.clone();

                            tokio::spawn(async move {
                                match fetcher.fetch(&sheet_id).await {
                                    Ok(doc) => {
                                        let sheet = CharacterSheet::from_json(&doc);
                                        if let (Some(current), Some(max)) =
                                            (sheet.current_hp, sheet.max_hp)
                                        {
                                            let mut known = known.lock().await;
                                            if let Some(entry) = known.get_mut(&id) {
                                                let changed = current != entry.0
                                                    || (max != entry.1 && max > 0);
                                                if changed {
                                                    debug!(
                                                        sheet_id = %sheet_id,
                                                        current, max,
                                                        "remote HP changed"
                                                    );
                                                    *entry = (current, max);
                                                    let _ = tx.send(HpUpdate {
                                                        participant_id: id,
                                                        current_hp: current,
                                                        max_hp: max,
                                                    });
                                                }
                                            }
                                        }
                                    }
                                    Err(err) => {
                                        warn!(sheet_id = %sheet_id, error = %err, "sheet fetch failed, keeping last known values");
                                    }
                                }
                                in_flight.lock().await.remove(&id);
                            });
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
        });

        (Self { shutdown, handle }, rx)
    }

    /// Start with the default 5-second cadence.
    pub fn start_default(
        fetcher: Arc<dyn SheetFetcher>,
        targets: Vec<SyncTarget>,
    ) -> (Self, mpsc::UnboundedReceiver<HpUpdate>) {
        Self::start(fetcher, targets, Self::DEFAULT_INTERVAL)
    }

    /// Stop polling and wait for the task to wind down.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }
}
