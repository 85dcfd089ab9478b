//! The outer polling loop.

use crate::engine::DealTracker;
use crate::orchestration::DealScanner;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::info;

/// Drives the scanner on a fixed interval until shut down.
///
/// Cycles never overlap: each runs to completion before the next tick is
/// awaited. The fixed delay is the only pacing mechanism.
pub struct PollLoop {
    scanner: DealScanner,
    interval: Duration,
}

impl PollLoop {
    pub fn new(scanner: DealScanner, interval: Duration) -> Self {
        Self { scanner, interval }
    }

    /// Run until the shutdown channel fires (or its sender is dropped).
    /// Returns the tracker so callers can inspect final state.
    pub async fn run(
        self,
        mut tracker: DealTracker,
        mut shutdown: watch::Receiver<bool>,
    ) -> DealTracker {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Polling every {:?}", self.interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.scanner.run_cycle(&mut tracker).await;
                }
                _ = shutdown.changed() => {
                    info!("Shutdown requested, stopping poll loop");
                    break;
                }
            }
        }
        tracker
    }
}
