//! Per-product price adjustment pass.

use crate::domain::{Price, ProductId, Variant};
use crate::engine::next_price;
use crate::gateway::CatalogGateway;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Applies one price step to every variant of a product per cycle.
#[derive(Clone)]
pub struct PriceAdjuster {
    gateway: Arc<dyn CatalogGateway>,
    increment: Price,
}

impl PriceAdjuster {
    pub fn new(gateway: Arc<dyn CatalogGateway>, increment: Price) -> Self {
        Self { gateway, increment }
    }

    /// Run one adjustment pass over a product.
    ///
    /// Returns true iff every variant is at its compare-at price after this
    /// pass. Any gateway fault leaves the true state of record untouched on
    /// the remote side, so returning false and retrying next cycle is safe.
    pub async fn adjust_product_prices(&self, product_id: &ProductId) -> bool {
        let product = match self.gateway.fetch_product(product_id).await {
            Ok(p) => p,
            Err(e) => {
                warn!("Failed to fetch product {}: {}", product_id, e);
                return false;
            }
        };

        debug!(
            "Adjusting {} variant(s) of {:?} ({})",
            product.variants.len(),
            product.title,
            product.id
        );

        let mut all_complete = true;
        for variant in &product.variants {
            // one variant's failure must not block its siblings
            all_complete &= self.step_variant(variant).await;
        }
        all_complete
    }

    /// Step a single variant toward its target. Returns true iff the variant
    /// is at target after this step.
    async fn step_variant(&self, variant: &Variant) -> bool {
        let Some(compare_at) = variant.compare_at else {
            // nothing to recover toward
            return true;
        };

        let plan = next_price(variant.price, compare_at, self.increment);
        if !plan.needs_mutation {
            return plan.complete_after;
        }

        match self
            .gateway
            .update_variant_price(&variant.id, plan.next)
            .await
        {
            Ok(()) => {
                info!(
                    "Variant {} stepped {} -> {} (target {})",
                    variant.id, variant.price, plan.next, compare_at
                );
                plan.complete_after
            }
            Err(e) => {
                warn!("Price update failed for variant {}: {}", variant.id, e);
                false
            }
        }
    }
}
