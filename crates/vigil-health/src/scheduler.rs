//! Scheduler — drives probe → evaluate → track → notify on an interval.
//!
//! A single task runs cycles back to back: the next tick is only awaited
//! after the current cycle (including notification delivery) has finished,
//! so cycles never overlap. The retained failure set lives here and is only
//! replaced once a cycle has fully resolved.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use vigil_core::{ConfigProvider, CycleReport, FailureSet, MonitorConfig};
use vigil_notify::{Alert, Notifier};

use crate::evaluator::{evaluate, evaluate_probe_error};
use crate::probe::HealthProbe;
use crate::tracker::{CycleOutcome, NotifyAction, process_cycle};

pub struct Scheduler<C, P, N> {
    config: C,
    probe: P,
    notifier: N,
    /// Failure set of the last completed cycle.
    state: FailureSet,
}

impl<C, P, N> Scheduler<C, P, N>
where
    C: ConfigProvider,
    P: HealthProbe,
    N: Notifier,
{
    pub fn new(config: C, probe: P, notifier: N) -> Self {
        Self {
            config,
            probe,
            notifier,
            state: FailureSet::new(),
        }
    }

    /// Failure set retained from the last completed cycle.
    pub fn state(&self) -> &FailureSet {
        &self.state
    }

    /// Announce that monitoring has begun. Always sent.
    pub async fn notify_startup(&mut self) {
        let config = self.config.current().clone();
        let alert = Alert::startup(config.targets.len(), config.interval());
        match self.notifier.deliver(&config.webhook_url, &alert).await {
            Ok(()) => info!("sent startup notification"),
            Err(e) => error!(error = %e, "failed to send startup notification"),
        }
    }

    /// Run one full cycle and commit its failure set.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        // Snapshot the config so a reload cannot change it mid-cycle.
        let config = self.config.current().clone();
        info!(targets = config.targets.len(), "health check cycle started");

        let fragments = probe_all(&self.probe, &config).await;
        let outcome = process_cycle(fragments, self.state.clone());

        announce(&self.notifier, &config, &outcome.action).await;

        self.state = outcome.new_state.clone();
        info!(
            failing = self.state.len(),
            new = outcome.new_failures.len(),
            recovered = outcome.recovered.len(),
            "health check cycle finished"
        );
        outcome
    }

    /// Notify startup, then run cycles on the configured interval until
    /// `shutdown` fires. The first cycle runs immediately.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let mut period = self.config.current().interval();
        info!(interval = ?period, "starting health monitor");

        tokio::select! {
            _ = self.notify_startup() => {}
            _ = shutdown.changed() => {
                debug!("health monitor shutting down before first cycle");
                return;
            }
        }

        let mut ticker = new_ticker(Instant::now(), period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => break,
            }

            tokio::select! {
                _ = self.run_cycle() => {}
                _ = shutdown.changed() => break,
            }

            let next = self.config.current().interval();
            if next != period {
                info!(from = ?period, to = ?next, "interval changed");
                period = next;
                ticker = new_ticker(Instant::now() + period, period);
            }
        }

        debug!("health monitor shutting down");
    }
}

/// Probe every target in declaration order.
async fn probe_all<P: HealthProbe>(probe: &P, config: &MonitorConfig) -> Vec<CycleReport> {
    let mut fragments = Vec::with_capacity(config.targets.len());
    for target in &config.targets {
        let fragment = match probe.fetch(&target.url).await {
            Ok(document) => evaluate(target, &document),
            Err(e) => evaluate_probe_error(target, &e),
        };
        fragments.push(fragment);
    }
    fragments
}

/// Deliver the alert an action calls for. Delivery errors are only logged.
async fn announce<N: Notifier>(notifier: &N, config: &MonitorConfig, action: &NotifyAction) {
    let (alert, what) = match action {
        NotifyAction::AlertNewFailures { detail_lines } => {
            (Alert::failures(detail_lines.as_slice()), "failure alert")
        }
        NotifyAction::AlertRecovery => (Alert::recovery(), "recovery notification"),
        NotifyAction::NoOp => return,
    };

    match notifier.deliver(&config.webhook_url, &alert).await {
        Ok(()) => info!("sent {what}"),
        Err(e) => error!(error = %e, "failed to send {what}"),
    }
}

fn new_ticker(start: Instant, period: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval_at(start, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
