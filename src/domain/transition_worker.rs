//! Background transition recording.
//!
//! Redirect handlers push [`TransitionEvent`]s onto a bounded channel and
//! return immediately; the worker spawned from [`run_transition_worker`]
//! drains the channel and persists each visit under its own time budget. A
//! lost analytics row never surfaces as a user-facing error.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{error, warn};

use crate::domain::entities::NewTransition;
use crate::domain::geo::GeoResolver;
use crate::domain::repositories::LinkStore;
use crate::domain::transition_event::TransitionEvent;
use crate::domain::user_agent;

/// Default per-event budget for recording, matching the redirect pipeline's
/// 2-second detachment window.
pub const DEFAULT_RECORD_TIMEOUT: Duration = Duration::from_secs(2);

/// Composes and persists transition rows from raw visit events.
///
/// User-agent parsing and geo resolution are best-effort: unparseable input
/// and failed lookups produce absent fields, never errors. Persistence
/// failures are logged and swallowed.
pub struct TransitionRecorder<S: ?Sized, G: ?Sized> {
    store: Arc<S>,
    geo: Arc<G>,
}

impl<S, G> TransitionRecorder<S, G>
where
    S: LinkStore + ?Sized,
    G: GeoResolver + ?Sized,
{
    /// Creates a new recorder.
    pub fn new(store: Arc<S>, geo: Arc<G>) -> Self {
        Self { store, geo }
    }

    /// Records one visit.
    ///
    /// Never fails: every degradation path ends in absent fields or a logged,
    /// swallowed store error.
    pub async fn record(&self, event: TransitionEvent) {
        let link_id = event.link_id;
        let client = user_agent::parse(event.user_agent.as_deref().unwrap_or(""));

        let location = match event.ip.as_deref() {
            Some(ip) => self.geo.resolve(ip).await,
            None => None,
        };
        let (country, city) = match location {
            Some(loc) => (loc.country, loc.city),
            None => (None, None),
        };

        let transition = NewTransition {
            link_id,
            country,
            city,
            referer: event.referer,
            user_agent: event.user_agent,
            browser: client.browser.map(str::to_string),
            os: client.os.map(str::to_string),
        };

        if let Err(e) = self.store.create_transition(transition).await {
            error!(link_id, error = %e, "failed to record transition");
            metrics::counter!("transitions_failed_total").increment(1);
        }
    }
}

/// Drains the transition channel until every sender is dropped.
///
/// Each event is processed under `budget` so a stalled geo lookup or store
/// cannot back the queue up indefinitely. The worker's lifetime is independent
/// of the requests that enqueue events; spawn it once at startup:
///
/// ```ignore
/// let (tx, rx) = mpsc::channel(config.transition_queue_capacity);
/// tokio::spawn(run_transition_worker(rx, recorder, DEFAULT_RECORD_TIMEOUT));
/// ```
pub async fn run_transition_worker<S, G>(
    mut rx: mpsc::Receiver<TransitionEvent>,
    recorder: TransitionRecorder<S, G>,
    budget: Duration,
) where
    S: LinkStore + ?Sized,
    G: GeoResolver + ?Sized,
{
    while let Some(event) = rx.recv().await {
        let link_id = event.link_id;
        if tokio::time::timeout(budget, recorder.record(event))
            .await
            .is_err()
        {
            warn!(link_id, "transition recording timed out");
            metrics::counter!("transitions_timed_out_total").increment(1);
        }
    }
}
