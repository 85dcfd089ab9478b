//! Mock gateway for testing without network calls.
//!
//! Holds its own deal and product state: price and metadata mutations are
//! applied to that state, so multi-cycle tests observe real step sequences.

use super::{CatalogGateway, GatewayError};
use crate::domain::{DealId, Field, Price, Product, ProductId, RawDealRecord, VariantId};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct MockState {
    deals: Vec<RawDealRecord>,
    products: HashMap<ProductId, Product>,
    fail_fetch_deals: bool,
    fail_fetch_product: bool,
    fail_metadata: bool,
    failing_variants: HashSet<VariantId>,
    price_updates: Vec<(VariantId, Price)>,
    metadata_updates: Vec<(DealId, Vec<(String, String)>)>,
}

/// Mock gateway with scripted deals/products and failure injection.
#[derive(Debug, Default)]
pub struct MockGateway {
    state: Mutex<MockState>,
}

impl MockGateway {
    /// Create an empty mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a deal record.
    pub fn with_deal(self, deal: RawDealRecord) -> Self {
        self.lock().deals.push(deal);
        self
    }

    /// Add a product.
    pub fn with_product(self, product: Product) -> Self {
        self.lock().products.insert(product.id.clone(), product);
        self
    }

    /// Make `fetch_deals` fail with a transport error.
    pub fn set_fail_fetch_deals(&self, fail: bool) {
        self.lock().fail_fetch_deals = fail;
    }

    /// Make `fetch_product` fail with a transport error.
    pub fn set_fail_fetch_product(&self, fail: bool) {
        self.lock().fail_fetch_product = fail;
    }

    /// Make `update_deal_metadata` fail with user errors.
    pub fn set_fail_metadata(&self, fail: bool) {
        self.lock().fail_metadata = fail;
    }

    /// Make price mutations for one variant fail with user errors.
    pub fn fail_variant(&self, variant: VariantId) {
        self.lock().failing_variants.insert(variant);
    }

    /// Stop failing price mutations for one variant.
    pub fn heal_variant(&self, variant: &VariantId) {
        self.lock().failing_variants.remove(variant);
    }

    /// All price mutations issued so far, in order.
    pub fn price_updates(&self) -> Vec<(VariantId, Price)> {
        self.lock().price_updates.clone()
    }

    /// All metadata mutations issued so far, in order.
    pub fn metadata_updates(&self) -> Vec<(DealId, Vec<(String, String)>)> {
        self.lock().metadata_updates.clone()
    }

    /// Current state of a product, after any applied mutations.
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.lock().products.get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl CatalogGateway for MockGateway {
    async fn fetch_deals(&self) -> Result<Vec<RawDealRecord>, GatewayError> {
        let state = self.lock();
        if state.fail_fetch_deals {
            return Err(GatewayError::Transport("mock: fetch_deals down".to_string()));
        }
        Ok(state.deals.clone())
    }

    async fn fetch_product(&self, product: &ProductId) -> Result<Product, GatewayError> {
        let state = self.lock();
        if state.fail_fetch_product {
            return Err(GatewayError::Transport(
                "mock: fetch_product down".to_string(),
            ));
        }
        state
            .products
            .get(product)
            .cloned()
            .ok_or_else(|| GatewayError::Shape(format!("mock: no product {}", product)))
    }

    async fn update_variant_price(
        &self,
        variant: &VariantId,
        price: Price,
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if state.failing_variants.contains(variant) {
            return Err(GatewayError::Payload(format!(
                "mock: variant {} rejected price update",
                variant
            )));
        }

        let slot = state
            .products
            .values_mut()
            .flat_map(|p| p.variants.iter_mut())
            .find(|v| &v.id == variant)
            .ok_or_else(|| GatewayError::Shape(format!("mock: no variant {}", variant)))?;
        slot.price = price;

        state.price_updates.push((variant.clone(), price));
        Ok(())
    }

    async fn update_deal_metadata(
        &self,
        deal: &DealId,
        fields: &[(String, String)],
    ) -> Result<(), GatewayError> {
        let mut state = self.lock();
        if state.fail_metadata {
            return Err(GatewayError::Payload(
                "mock: metadata update rejected".to_string(),
            ));
        }

        let record = state
            .deals
            .iter_mut()
            .find(|d| &d.id == deal)
            .ok_or_else(|| GatewayError::Shape(format!("mock: no deal {}", deal)))?;

        for (key, value) in fields {
            match record.fields.iter_mut().find(|f| &f.key == key) {
                Some(field) => field.value = value.clone(),
                None => record.fields.push(Field {
                    key: key.clone(),
                    value: value.clone(),
                }),
            }
        }

        state.metadata_updates.push((deal.clone(), fields.to_vec()));
        Ok(())
    }
}
