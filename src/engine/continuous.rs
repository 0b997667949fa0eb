use super::{run_once, Engine};
use crate::discover::Discoverer;
use crate::result::DiscoveryResult;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// The schedule of one discoverer within a [`ContinuousEngine`]: how often it
/// runs, and the optional control channels that adjust it at runtime.
pub struct DiscovererSchedule {
    discoverer: Arc<dyn Discoverer>,
    interval: Duration,
    interval_updates: Option<mpsc::Receiver<Duration>>,
    triggers: Option<mpsc::Receiver<()>>,
}

impl DiscovererSchedule {
    pub fn new(discoverer: Arc<dyn Discoverer>, interval: Duration) -> Self {
        Self {
            discoverer,
            interval,
            interval_updates: None,
            triggers: None,
        }
    }

    /// Attach a channel of interval updates. Each message replaces the
    /// interval between passes without firing an extra pass.
    pub fn with_interval_updates(mut self, updates: mpsc::Receiver<Duration>) -> Self {
        self.interval_updates = Some(updates);
        self
    }

    /// Attach a channel of manual triggers. Each message launches one pass
    /// outside the regular cadence and defers the next scheduled pass by a
    /// full interval.
    pub fn with_triggers(mut self, triggers: mpsc::Receiver<()>) -> Self {
        self.triggers = Some(triggers);
        self
    }
}

/// An engine that runs every configured discoverer on its own timer,
/// indefinitely, until the shutdown token fires.
///
/// Overlapping passes of the same discoverer are allowed: if a discoverer is
/// slower than its interval, multiple passes may be in flight at once.
/// Skip-if-busy or backpressure semantics are deliberately left to each
/// discoverer's own internal concurrency control.
pub struct ContinuousEngine {
    schedules: Vec<DiscovererSchedule>,
}

impl ContinuousEngine {
    pub fn new() -> Self {
        Self {
            schedules: Vec::new(),
        }
    }

    /// Add a scheduled discoverer to the engine's continuous run.
    pub fn with_schedule(mut self, schedule: DiscovererSchedule) -> Self {
        self.schedules.push(schedule);
        self
    }

    /// Add a discoverer with just an interval, no control channels.
    pub fn with_discoverer(self, discoverer: Arc<dyn Discoverer>, interval: Duration) -> Self {
        self.with_schedule(DiscovererSchedule::new(discoverer, interval))
    }
}

impl Default for ContinuousEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for ContinuousEngine {
    /// Runs until the shutdown token fires. The results channel closes
    /// exactly once, after every in-flight pass of every discoverer has
    /// drained.
    async fn run(self, shutdown: CancellationToken, results: mpsc::Sender<DiscoveryResult>) {
        let mut loops = JoinSet::new();
        for schedule in self.schedules {
            loops.spawn(run_continuously(
                schedule,
                shutdown.child_token(),
                results.clone(),
            ));
        }

        drop(results);

        while let Some(joined) = loops.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "continuous discovery loop failed");
            }
        }
    }
}

/// The per-discoverer scheduling loop.
///
/// Launches an initial pass immediately, then arms a ticker at the configured
/// interval and reacts to interval updates, manual triggers, and ticks until
/// shutdown. Returns only after the passes it launched have drained, so
/// results already started are never discarded.
async fn run_continuously(
    schedule: DiscovererSchedule,
    shutdown: CancellationToken,
    results: mpsc::Sender<DiscoveryResult>,
) {
    let DiscovererSchedule {
        discoverer,
        interval,
        mut interval_updates,
        mut triggers,
    } = schedule;

    let mut passes = JoinSet::new();
    passes.spawn(run_once(
        Arc::clone(&discoverer),
        shutdown.child_token(),
        results.clone(),
    ));

    let mut ticker = new_ticker(interval);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            new_interval = next_message(&mut interval_updates) => {
                tracing::debug!(discoverer_id = discoverer.id(), ?new_interval, "interval updated");
                ticker = new_ticker(new_interval);
            }
            _ = next_message(&mut triggers) => {
                tracing::debug!(discoverer_id = discoverer.id(), "manual trigger received");
                ticker.reset();
                passes.spawn(run_once(
                    Arc::clone(&discoverer),
                    shutdown.child_token(),
                    results.clone(),
                ));
            }
            _ = ticker.tick() => {
                passes.spawn(run_once(
                    Arc::clone(&discoverer),
                    shutdown.child_token(),
                    results.clone(),
                ));
            }
        }

        // reap passes that have already finished
        while passes.try_join_next().is_some() {}
    }

    // let in-flight passes drain before closing our share of the channel
    while let Some(joined) = passes.join_next().await {
        if let Err(e) = joined {
            tracing::warn!(discoverer_id = discoverer.id(), error = %e, "discovery pass task failed");
        }
    }
}

/// Arm a ticker whose first tick is one full period away.
fn new_ticker(period: Duration) -> tokio::time::Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Receive from an optional control channel.
///
/// An absent or closed channel behaves as "never ready" rather than as an
/// error, so discoverers without runtime controls cost nothing in the select
/// loop.
async fn next_message<T>(slot: &mut Option<mpsc::Receiver<T>>) -> T {
    loop {
        match slot {
            Some(receiver) => match receiver.recv().await {
                Some(message) => return message,
                None => *slot = None,
            },
            None => return std::future::pending().await,
        }
    }
}
