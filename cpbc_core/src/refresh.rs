//! Shared state of a configured road and the task keeping it up to date.

use std::{future::Future, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::{debug, error, info, warn};
use tokio::{
    sync::{watch, Mutex, RwLock},
    task::JoinHandle,
    time::{interval, MissedTickBehavior},
};

use crate::{
    directory::{validate, Road, ValidationState},
    error::FetchError,
    event::CollectionEvent,
    refuse_client::RefuseClient,
};

pub static DEFAULT_PERIOD: Duration = Duration::from_secs(24 * 60 * 60);

/// What is known about the road after the latest refresh.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub events: Arc<Vec<CollectionEvent>>,
    pub refreshed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub validation: ValidationState,
}

/// Shared access to a road's events, handed to everything serving them.
///
/// Cloning is cheap; all clones see the same state.
#[derive(Debug, Clone)]
pub struct RefreshContext {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    client: RefuseClient,
    road_id: String,
    road_name: Option<String>,
    snapshot: RwLock<Snapshot>,
    refreshing: Mutex<()>,
}

impl RefreshContext {
    pub fn new(client: RefuseClient, road_id: String, road_name: Option<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                road_id,
                road_name,
                snapshot: RwLock::new(Snapshot::default()),
                refreshing: Mutex::new(()),
            }),
        }
    }

    pub fn road_id(&self) -> &str {
        &self.inner.road_id
    }

    pub fn road_name(&self) -> Option<&str> {
        self.inner.road_name.as_deref()
    }

    pub fn timezone(&self) -> Tz {
        self.inner.client.timezone()
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.inner.snapshot.read().await.clone()
    }

    pub async fn events(&self) -> Arc<Vec<CollectionEvent>> {
        self.inner.snapshot.read().await.events.clone()
    }

    /// Fetch the schedule again and replace the events.
    ///
    /// Returns the number of events. On failure the previous events stay.
    pub async fn refresh(&self) -> Result<usize, FetchError> {
        let _refreshing = self.inner.refreshing.lock().await;
        debug!("refreshing road {}", self.inner.road_id);
        let result = self.inner.client.get_events(&self.inner.road_id).await;
        self.apply(result).await
    }

    /// Store the outcome of a fetch.
    pub async fn apply(
        &self,
        result: Result<Vec<CollectionEvent>, FetchError>,
    ) -> Result<usize, FetchError> {
        let mut snapshot = self.inner.snapshot.write().await;
        match result {
            Ok(events) => {
                let count = events.len();
                info!("road {} has {count} collection events", self.inner.road_id);
                snapshot.events = Arc::new(events);
                snapshot.refreshed_at = Some(Utc::now());
                snapshot.last_error = None;
                Ok(count)
            }
            Err(err) => {
                error!("refreshing road {} failed: {err}", self.inner.road_id);
                snapshot.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Check the configured road against the council's directory.
    pub async fn validate(&self) -> Result<ValidationState, FetchError> {
        let roads = self.inner.client.get_roads().await?;
        Ok(self.apply_validation(&roads).await)
    }

    /// Store the outcome of checking the road against a directory listing.
    pub async fn apply_validation(&self, roads: &[Road]) -> ValidationState {
        let state = validate(roads, &self.inner.road_id, self.road_name());
        if let ValidationState::Fail(mismatch) = &state {
            warn!("road validation failed: {mismatch}");
        }
        self.inner.snapshot.write().await.validation = state.clone();
        state
    }

    /// Refresh the events and validate the road every `period`, starting now.
    pub fn spawn_schedule(&self, period: Duration) -> Schedule {
        let context = self.clone();
        spawn_periodic(period, move || {
            let context = context.clone();
            async move {
                // Failures are already logged and recorded in the snapshot.
                let _ = context.refresh().await;
                if let Err(err) = context.validate().await {
                    warn!("could not fetch road directory: {err}");
                }
            }
        })
    }
}

/// A running periodic task.
#[derive(Debug)]
pub struct Schedule {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Schedule {
    /// Stop the task, abandoning a run in progress.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.handle.await {
            error!("scheduled task ended abnormally: {err}");
        }
    }
}

/// Run `task` every `period`, the first time immediately.
///
/// Runs never overlap; a run taking longer than `period` delays the next.
pub fn spawn_periodic<F, Fut>(period: Duration, mut task: F) -> Schedule
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (shutdown, mut shutdown_receiver) = watch::channel(false);
    let handle = tokio::spawn(async move {
        let mut ticks = interval(period);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = shutdown_receiver.changed() => break,
                _ = async {
                    ticks.tick().await;
                    task().await;
                } => {}
            }
        }
        debug!("scheduled task stopped");
    });
    Schedule { shutdown, handle }
}
