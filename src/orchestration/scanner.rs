//! Per-cycle deal scanning and lifecycle transitions.

use crate::config::StartMarkerMode;
use crate::domain::deal::FIELD_STARTED;
use crate::domain::{DealFields, DealId, Price};
use crate::engine::{DealPhase, DealTracker};
use crate::gateway::CatalogGateway;
use crate::orchestration::PriceAdjuster;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Scans all deal records once per cycle and drives their transitions.
///
/// The tracker is passed in by the caller so tests can inspect it between
/// cycles; the scanner itself holds no mutable state.
#[derive(Clone)]
pub struct DealScanner {
    gateway: Arc<dyn CatalogGateway>,
    adjuster: PriceAdjuster,
    start_marker_mode: StartMarkerMode,
}

impl DealScanner {
    pub fn new(
        gateway: Arc<dyn CatalogGateway>,
        increment: Price,
        start_marker_mode: StartMarkerMode,
    ) -> Self {
        let adjuster = PriceAdjuster::new(gateway.clone(), increment);
        Self {
            gateway,
            adjuster,
            start_marker_mode,
        }
    }

    /// Run one full cycle at the current wall-clock time.
    pub async fn run_cycle(&self, tracker: &mut DealTracker) {
        self.run_cycle_at(tracker, Utc::now()).await
    }

    /// Run one full cycle with an explicit "now", for deterministic tests.
    ///
    /// A fetch failure aborts only this cycle; no transition is made without
    /// eligibility confirmed from inputs already in hand, so the next
    /// scheduled cycle retries with uncorrupted state.
    pub async fn run_cycle_at(&self, tracker: &mut DealTracker, now: DateTime<Utc>) {
        let deals = match self.gateway.fetch_deals().await {
            Ok(deals) => deals,
            Err(e) => {
                warn!("Deal fetch failed, skipping cycle: {}", e);
                return;
            }
        };

        for record in deals {
            let fields = match DealFields::parse(&record.fields) {
                Ok(fields) => fields,
                Err(e) => {
                    warn!("Skipping deal {} with bad field set: {}", record.id, e);
                    continue;
                }
            };
            self.process_deal(tracker, &record.id, &fields, now).await;
        }
    }

    async fn process_deal(
        &self,
        tracker: &mut DealTracker,
        deal: &DealId,
        fields: &DealFields,
        now: DateTime<Utc>,
    ) {
        match tracker.phase(deal) {
            None => {
                if !fields.eligible_at(now) {
                    return;
                }
                self.begin_tracking(tracker, deal, fields).await;
            }
            Some(DealPhase::PendingStart) => {
                // marker mutation failed on an earlier cycle; no price step
                // happens until the remote start is confirmed
                self.confirm_start(tracker, deal).await;
            }
            Some(DealPhase::Active) => {
                if self.adjuster.adjust_product_prices(&fields.product).await {
                    info!("Deal {} fully recovered, untracking", deal);
                    tracker.untrack(deal);
                }
            }
        }
    }

    async fn begin_tracking(&self, tracker: &mut DealTracker, deal: &DealId, fields: &DealFields) {
        match self.start_marker_mode {
            StartMarkerMode::Local => {
                info!("Deal {} eligible, starting recovery", deal);
                tracker.mark_active(deal.clone());
            }
            StartMarkerMode::Remote => {
                if fields.started {
                    // marker already flipped (e.g. before a restart): resume
                    // without re-issuing the start mutation
                    info!("Deal {} already started remotely, resuming", deal);
                    tracker.mark_active(deal.clone());
                } else {
                    tracker.track_pending(deal.clone());
                    self.confirm_start(tracker, deal).await;
                }
            }
        }
    }

    async fn confirm_start(&self, tracker: &mut DealTracker, deal: &DealId) {
        let fields = vec![(FIELD_STARTED.to_string(), "true".to_string())];
        match self.gateway.update_deal_metadata(deal, &fields).await {
            Ok(()) => {
                info!("Deal {} marked started, starting recovery", deal);
                tracker.mark_active(deal.clone());
            }
            Err(e) => {
                warn!("Could not mark deal {} started, will retry: {}", deal, e);
            }
        }
    }
}
