//! Self-rescheduling polling loop keeping [`GameState`](crate::state::GameState) in sync with
//! the server.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::Mutex, task::JoinHandle, time::sleep};
use tracing::{debug, error, info, warn};

use crate::{
    error::SyncError,
    remote::{RemoteError, RemoteGameService},
    state::{
        SessionId, SharedState, SyncFailure, SyncStatus,
        game::GameSnapshot,
        transitions::PhaseTransition,
    },
};

const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(250);
const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(300);

/// Timing knobs of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerSettings {
    /// Delay before retrying when the phase itself could not be fetched.
    pub retry_delay: Duration,
    /// Lower bound applied to server-reported intervals.
    pub min_interval: Duration,
    /// Upper bound applied to server-reported intervals.
    pub max_interval: Duration,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            retry_delay: DEFAULT_RETRY_DELAY,
            min_interval: DEFAULT_MIN_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
        }
    }
}

impl SchedulerSettings {
    /// Clamp a server-reported time-to-next-phase into the accepted range.
    pub fn refresh_delay(&self, reported: Duration) -> Duration {
        reported.clamp(self.min_interval, self.max_interval.max(self.min_interval))
    }
}

/// Timer armed for the next refresh of a given session.
struct PendingRefresh {
    session: SessionId,
    handle: JoinHandle<()>,
}

/// Owns the refresh loop: fetch the phase, re-arm, resolve the transition, commit.
///
/// Dropping the scheduler stops the loop in the background; call [`PhaseScheduler::stop`] to do
/// it deterministically.
pub struct PhaseScheduler {
    inner: Arc<SchedulerInner>,
}

struct SchedulerInner {
    remote: Arc<dyn RemoteGameService>,
    state: SharedState,
    settings: SchedulerSettings,
    timer: Mutex<Option<PendingRefresh>>,
    /// Monotonic cycle counter.
    cycles: AtomicU64,
    /// Cycle whose snapshot is currently shown; only its transition may still be committed.
    displayed_cycle: AtomicU64,
}

impl PhaseScheduler {
    pub fn new(
        remote: Arc<dyn RemoteGameService>,
        state: SharedState,
        settings: SchedulerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                remote,
                state,
                settings,
                timer: Mutex::new(None),
                cycles: AtomicU64::new(0),
                displayed_cycle: AtomicU64::new(0),
            }),
        }
    }

    /// State the scheduler writes into.
    pub fn state(&self) -> &SharedState {
        &self.inner.state
    }

    /// Open a session, run one full cycle and arm the loop.
    ///
    /// Returns once the first snapshot and the fetches it requires have settled. Transport
    /// failures do not fail the call: they are recorded in the view and the cycle is retried.
    /// An unknown phase halts the loop and is returned.
    pub async fn start(&self) -> Result<(), SyncError> {
        let session = self.inner.state.begin().await?;
        info!(%session, "starting game synchronization");
        self.inner.run_cycle(session).await
    }

    /// Cancel the pending refresh and reset the state to its empty defaults.
    ///
    /// Safe to call at any time, any number of times. A refresh already in flight completes its
    /// remote calls but its results are discarded.
    pub async fn stop(&self) {
        self.inner.stop().await;
    }
}

impl Drop for PhaseScheduler {
    fn drop(&mut self) {
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            let inner = Arc::clone(&self.inner);
            runtime.spawn(async move { inner.stop().await });
        }
    }
}

impl SchedulerInner {
    async fn stop(&self) {
        let mut timer = self.timer.lock().await;
        if let Some(pending) = timer.take() {
            pending.handle.abort();
            debug!(session = %pending.session, "pending refresh cancelled");
        }
        if let Some(session) = self.state.end().await {
            info!(%session, "game synchronization stopped");
        }
    }

    /// One fetch/arm/commit pass for `session`.
    async fn run_cycle(self: &Arc<Self>, session: SessionId) -> Result<(), SyncError> {
        let payload = match self.remote.fetch_phase().await {
            Ok(payload) => payload,
            Err(err) => {
                self.record_failure(session, &err).await?;
                self.arm(session, self.settings.retry_delay).await?;
                return Ok(());
            }
        };

        let snapshot = match GameSnapshot::try_from(payload) {
            Ok(snapshot) => snapshot,
            Err(unknown) => {
                error!(%session, phase = %unknown.phase, "unknown game phase; halting synchronization");
                let failure = SyncFailure::from(&unknown);
                self.state
                    .commit(session, |view| {
                        view.status = SyncStatus::Halted {
                            phase: unknown.phase.clone(),
                        };
                        view.refresh_armed = false;
                        view.last_failure = Some(failure);
                    })
                    .await?;
                return Err(unknown.into());
            }
        };

        // Arm before the side fetches so the cadence follows the server clock.
        let delay = self.settings.refresh_delay(snapshot.duration_to_next_phase);
        self.arm(session, delay).await?;

        let transition = PhaseTransition::for_snapshot(&snapshot);
        debug!(
            %session,
            phase = %snapshot.phase,
            phase_number = snapshot.phase_number,
            total_phase = snapshot.total_phase,
            ?transition,
            ?delay,
            "phase snapshot received"
        );
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        self.state
            .commit(session, |view| {
                self.displayed_cycle.store(cycle, Ordering::SeqCst);
                view.current_snapshot = Some(snapshot);
            })
            .await?;

        let resolved = transition.resolve(self.remote.as_ref()).await;
        if let Err(err) = &resolved {
            log_failure(session, err);
        }

        let mut applied = false;
        self.state
            .commit(session, |view| {
                if self.displayed_cycle.load(Ordering::SeqCst) != cycle {
                    return;
                }
                applied = true;
                match resolved {
                    Ok(effect) => {
                        effect.apply(view);
                        view.last_failure = None;
                    }
                    Err(err) => view.last_failure = Some(SyncFailure::from(&err)),
                }
            })
            .await?;
        if !applied {
            debug!(%session, cycle, ?transition, "newer snapshot committed meanwhile; transition dropped");
        }

        Ok(())
    }

    /// Arm the next refresh of `session` unless it was stopped meanwhile.
    async fn arm(self: &Arc<Self>, session: SessionId, delay: Duration) -> Result<(), SyncError> {
        let mut timer = self.timer.lock().await;
        self.state
            .commit(session, |view| view.refresh_armed = true)
            .await?;

        if let Some(previous) = timer.take() {
            previous.handle.abort();
        }
        let handle = self.spawn_refresh(session, delay);
        *timer = Some(PendingRefresh { session, handle });
        Ok(())
    }

    fn spawn_refresh(self: &Arc<Self>, session: SessionId, delay: Duration) -> JoinHandle<()> {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            sleep(delay).await;
            if !inner.claim_timer(session).await {
                return;
            }

            match inner.run_cycle(session).await {
                Ok(()) => {}
                Err(SyncError::SessionEnded) => {
                    debug!(%session, "session stopped during refresh; results discarded");
                }
                Err(err) => warn!(%session, error = %err, "refresh loop halted"),
            }
        })
    }

    /// Take ownership of the fired timer so a new one can be armed.
    async fn claim_timer(&self, session: SessionId) -> bool {
        let mut timer = self.timer.lock().await;
        let owned = timer
            .as_ref()
            .is_some_and(|pending| pending.session == session);
        if !owned {
            return false;
        }
        timer.take();

        self.state
            .commit(session, |view| view.refresh_armed = false)
            .await
            .is_ok()
    }

    /// Keep the last known state and record why the cycle could not complete.
    async fn record_failure(&self, session: SessionId, err: &RemoteError) -> Result<(), SyncError> {
        log_failure(session, err);
        let failure = SyncFailure::from(err);
        self.state
            .commit(session, |view| view.last_failure = Some(failure))
            .await?;
        Ok(())
    }
}

fn log_failure(session: SessionId, err: &RemoteError) {
    if err.is_malformed() {
        error!(%session, endpoint = err.endpoint(), error = %err, "malformed response from game service");
    } else {
        warn!(%session, endpoint = err.endpoint(), error = %err, "game service unreachable; keeping last known state");
    }
}
