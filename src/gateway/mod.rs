//! Catalog gateway abstraction: deal records, products, and the two
//! mutations the engine issues.

use crate::domain::{DealId, Price, Product, ProductId, RawDealRecord, VariantId};
use async_trait::async_trait;
use std::fmt;

pub mod mock;
pub mod shopify;

pub use mock::MockGateway;
pub use shopify::ShopifyGateway;

/// Remote catalog gateway.
///
/// Implementations own transport concerns (auth, retry/backoff); callers
/// treat every error variant as the same "did not progress" failure class.
#[async_trait]
pub trait CatalogGateway: Send + Sync + fmt::Debug {
    /// Fetch all deal records of the managed type, field sets untyped.
    async fn fetch_deals(&self) -> Result<Vec<RawDealRecord>, GatewayError>;

    /// Fetch a product with all of its variants.
    async fn fetch_product(&self, product: &ProductId) -> Result<Product, GatewayError>;

    /// Update one variant's live price. The price is wire-formatted to
    /// exactly two decimal places by the implementation.
    async fn update_variant_price(
        &self,
        variant: &VariantId,
        price: Price,
    ) -> Result<(), GatewayError>;

    /// Update deal metadata fields (used to persist the start marker).
    async fn update_deal_metadata(
        &self,
        deal: &DealId,
        fields: &[(String, String)],
    ) -> Result<(), GatewayError>;
}

/// A field-level user error returned by a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserError {
    pub field: Option<String>,
    pub message: String,
}

/// Error type for gateway operations.
#[derive(Debug, Clone)]
pub enum GatewayError {
    /// Network fault (connection refused, timeout, DNS failure).
    Transport(String),
    /// Non-success HTTP status from the remote.
    Http { status: u16, message: String },
    /// The remote responded but flagged a GraphQL-level error or
    /// field-level user errors.
    Payload(String),
    /// Response parsed but missing expected fields.
    Shape(String),
}

impl GatewayError {
    /// Build a Payload error from a mutation's userErrors list.
    pub fn from_user_errors(errors: &[UserError]) -> Self {
        let joined = errors
            .iter()
            .map(|e| match &e.field {
                Some(field) => format!("{}: {}", field, e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ");
        GatewayError::Payload(joined)
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Transport(msg) => write!(f, "Transport error: {}", msg),
            GatewayError::Http { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            GatewayError::Payload(msg) => write!(f, "Payload error: {}", msg),
            GatewayError::Shape(msg) => write!(f, "Response shape error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_error_display() {
        let err = GatewayError::Transport("connection refused".to_string());
        assert_eq!(err.to_string(), "Transport error: connection refused");

        let err = GatewayError::Http {
            status: 502,
            message: "Bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 502: Bad gateway");

        let err = GatewayError::Payload("Throttled".to_string());
        assert_eq!(err.to_string(), "Payload error: Throttled");

        let err = GatewayError::Shape("missing product node".to_string());
        assert_eq!(err.to_string(), "Response shape error: missing product node");
    }

    #[test]
    fn test_user_errors_fold_into_payload() {
        let errors = vec![
            UserError {
                field: Some("price".to_string()),
                message: "must be positive".to_string(),
            },
            UserError {
                field: None,
                message: "variant locked".to_string(),
            },
        ];
        let err = GatewayError::from_user_errors(&errors);
        assert_eq!(
            err.to_string(),
            "Payload error: price: must be positive; variant locked"
        );
    }
}
