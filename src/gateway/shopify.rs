//! Shopify Admin GraphQL client.
//!
//! Deals live as metaobjects of a fixed type; products and variants come from
//! the standard catalog surface. String-typed decimals are parsed into
//! `Price` at this boundary.

use super::{CatalogGateway, GatewayError, UserError};
use crate::domain::{DealId, Field, Price, Product, ProductId, RawDealRecord, Variant, VariantId};
use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const API_VERSION: &str = "2024-07";

/// Metaobject type under which deal records are stored.
const DEAL_TYPE: &str = "step_deal";

const QUERY_DEALS: &str = r#"
query StepDeals($type: String!) {
  metaobjects(type: $type, first: 100) {
    nodes {
      id
      fields { key value }
    }
  }
}
"#;

const QUERY_PRODUCT: &str = r#"
query ManagedProduct($id: ID!) {
  product(id: $id) {
    id
    title
    variants(first: 100) {
      nodes { id price compareAtPrice }
    }
  }
}
"#;

const MUTATION_VARIANT_PRICE: &str = r#"
mutation StepVariantPrice($id: ID!, $price: Money!) {
  productVariantUpdate(input: { id: $id, price: $price }) {
    productVariant { id price }
    userErrors { field message }
  }
}
"#;

const MUTATION_DEAL_METADATA: &str = r#"
mutation MarkDealStarted($id: ID!, $fields: [MetaobjectFieldInput!]!) {
  metaobjectUpdate(id: $id, metaobject: { fields: $fields }) {
    userErrors { field message code }
  }
}
"#;

/// Gateway over the Shopify Admin GraphQL API.
#[derive(Debug, Clone)]
pub struct ShopifyGateway {
    client: Client,
    endpoint: String,
    access_token: String,
}

impl ShopifyGateway {
    /// Create a gateway for the given shop domain and Admin API token.
    pub fn new(shop_domain: String, access_token: String) -> Self {
        Self {
            client: Client::new(),
            endpoint: format!(
                "https://{}/admin/api/{}/graphql.json",
                shop_domain, API_VERSION
            ),
            access_token,
        }
    }

    async fn post_graphql(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<serde_json::Value, GatewayError> {
        let body = serde_json::json!({ "query": query, "variables": variables });
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self
                .client
                .post(&self.endpoint)
                .header("X-Shopify-Access-Token", &self.access_token)
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    backoff::Error::transient(GatewayError::Transport(e.to_string()))
                })?;

            let status = response.status();
            if status == 429 || status.is_server_error() {
                return Err(backoff::Error::transient(GatewayError::Http {
                    status: status.as_u16(),
                    message: "Retryable status".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(GatewayError::Http {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            let payload = response
                .json::<serde_json::Value>()
                .await
                .map_err(|e| backoff::Error::permanent(GatewayError::Shape(e.to_string())))?;

            if let Some(errors) = payload.get("errors").and_then(|e| e.as_array()) {
                if !errors.is_empty() {
                    let joined = errors
                        .iter()
                        .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
                        .collect::<Vec<_>>()
                        .join("; ");
                    return Err(backoff::Error::permanent(GatewayError::Payload(joined)));
                }
            }

            payload
                .get("data")
                .cloned()
                .ok_or_else(|| {
                    backoff::Error::permanent(GatewayError::Shape(
                        "missing data object".to_string(),
                    ))
                })
        })
        .await
    }
}

#[async_trait]
impl CatalogGateway for ShopifyGateway {
    async fn fetch_deals(&self) -> Result<Vec<RawDealRecord>, GatewayError> {
        debug!("Fetching deal metaobjects of type {}", DEAL_TYPE);

        let data = self
            .post_graphql(QUERY_DEALS, serde_json::json!({ "type": DEAL_TYPE }))
            .await?;

        let nodes = data
            .pointer("/metaobjects/nodes")
            .and_then(|n| n.as_array())
            .ok_or_else(|| GatewayError::Shape("missing metaobjects.nodes".to_string()))?;

        Ok(parse_deal_nodes(nodes))
    }

    async fn fetch_product(&self, product: &ProductId) -> Result<Product, GatewayError> {
        debug!("Fetching product {}", product);

        let data = self
            .post_graphql(
                QUERY_PRODUCT,
                serde_json::json!({ "id": product.as_str() }),
            )
            .await?;

        let node = data
            .get("product")
            .filter(|p| !p.is_null())
            .ok_or_else(|| GatewayError::Shape(format!("product {} not found", product)))?;

        parse_product(node)
    }

    async fn update_variant_price(
        &self,
        variant: &VariantId,
        price: Price,
    ) -> Result<(), GatewayError> {
        debug!("Updating variant {} to {}", variant, price);

        let data = self
            .post_graphql(
                MUTATION_VARIANT_PRICE,
                serde_json::json!({ "id": variant.as_str(), "price": price.to_wire() }),
            )
            .await?;

        let user_errors = parse_user_errors(data.pointer("/productVariantUpdate/userErrors"));
        if !user_errors.is_empty() {
            return Err(GatewayError::from_user_errors(&user_errors));
        }
        Ok(())
    }

    async fn update_deal_metadata(
        &self,
        deal: &DealId,
        fields: &[(String, String)],
    ) -> Result<(), GatewayError> {
        debug!("Updating metadata on deal {}", deal);

        let field_inputs: Vec<serde_json::Value> = fields
            .iter()
            .map(|(key, value)| serde_json::json!({ "key": key, "value": value }))
            .collect();

        let data = self
            .post_graphql(
                MUTATION_DEAL_METADATA,
                serde_json::json!({ "id": deal.as_str(), "fields": field_inputs }),
            )
            .await?;

        let user_errors = parse_user_errors(data.pointer("/metaobjectUpdate/userErrors"));
        if !user_errors.is_empty() {
            return Err(GatewayError::from_user_errors(&user_errors));
        }
        Ok(())
    }
}

/// A malformed node drops only itself; the rest of the listing survives.
fn parse_deal_nodes(nodes: &[serde_json::Value]) -> Vec<RawDealRecord> {
    let mut records = Vec::with_capacity(nodes.len());
    for node in nodes {
        match parse_deal_node(node) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!("Failed to parse deal node: {}", e);
            }
        }
    }
    records
}

fn parse_deal_node(node: &serde_json::Value) -> Result<RawDealRecord, GatewayError> {
    let id = node
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::Shape("deal node missing id".to_string()))?;

    let fields = node
        .get("fields")
        .and_then(|f| f.as_array())
        .ok_or_else(|| GatewayError::Shape("deal node missing fields".to_string()))?
        .iter()
        .filter_map(|f| {
            let key = f.get("key").and_then(|k| k.as_str())?;
            // a null value means the field was never set; skip it
            let value = f.get("value").and_then(|v| v.as_str())?;
            Some(Field {
                key: key.to_string(),
                value: value.to_string(),
            })
        })
        .collect();

    Ok(RawDealRecord {
        id: DealId::new(id),
        fields,
    })
}

fn parse_product(node: &serde_json::Value) -> Result<Product, GatewayError> {
    let id = node
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::Shape("product missing id".to_string()))?;

    let title = node
        .get("title")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();

    let variant_nodes = node
        .pointer("/variants/nodes")
        .and_then(|n| n.as_array())
        .ok_or_else(|| GatewayError::Shape("product missing variants.nodes".to_string()))?;

    let mut variants = Vec::with_capacity(variant_nodes.len());
    for v in variant_nodes {
        variants.push(parse_variant(v)?);
    }

    Ok(Product {
        id: ProductId::new(id),
        title,
        variants,
    })
}

fn parse_variant(node: &serde_json::Value) -> Result<Variant, GatewayError> {
    let id = node
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::Shape("variant missing id".to_string()))?;

    let price_raw = node
        .get("price")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::Shape("variant missing price".to_string()))?;
    let price = Price::parse(price_raw)
        .map_err(|e| GatewayError::Shape(format!("invalid price {:?}: {}", price_raw, e)))?;

    let compare_at = match node.get("compareAtPrice").and_then(|v| v.as_str()) {
        Some(raw) => Some(Price::parse(raw).map_err(|e| {
            GatewayError::Shape(format!("invalid compareAtPrice {:?}: {}", raw, e))
        })?),
        None => None,
    };

    Ok(Variant {
        id: VariantId::new(id),
        price,
        compare_at,
    })
}

fn parse_user_errors(value: Option<&serde_json::Value>) -> Vec<UserError> {
    value
        .and_then(|v| v.as_array())
        .map(|errors| {
            errors
                .iter()
                .map(|e| UserError {
                    field: e
                        .pointer("/field/0")
                        .or_else(|| e.get("field"))
                        .and_then(|f| f.as_str())
                        .map(String::from),
                    message: e
                        .get("message")
                        .and_then(|m| m.as_str())
                        .unwrap_or("unknown user error")
                        .to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_deal_node_valid() {
        let node = serde_json::json!({
            "id": "gid://shop/Metaobject/7",
            "fields": [
                { "key": "step_pricing", "value": "true" },
                { "key": "starts_at", "value": "2026-03-01T09:00:00Z" },
                { "key": "product", "value": "gid://shop/Product/42" },
                { "key": "started", "value": null }
            ]
        });

        let record = parse_deal_node(&node).unwrap();
        assert_eq!(record.id, DealId::new("gid://shop/Metaobject/7"));
        // null-valued field is dropped, not carried as a string
        assert_eq!(record.fields.len(), 3);
        assert_eq!(record.fields[0].key, "step_pricing");
    }

    #[test]
    fn test_parse_deal_node_missing_id() {
        let node = serde_json::json!({ "fields": [] });
        assert!(matches!(
            parse_deal_node(&node),
            Err(GatewayError::Shape(_))
        ));
    }

    #[test]
    fn test_malformed_deal_node_dropped_siblings_kept() {
        let nodes = vec![
            serde_json::json!({ "fields": [] }),
            serde_json::json!({
                "id": "gid://shop/Metaobject/8",
                "fields": [
                    { "key": "step_pricing", "value": "true" }
                ]
            }),
        ];
        let records = parse_deal_nodes(&nodes);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, DealId::new("gid://shop/Metaobject/8"));
    }

    #[test]
    fn test_parse_product_with_variants() {
        let node = serde_json::json!({
            "id": "gid://shop/Product/42",
            "title": "Step Jacket",
            "variants": {
                "nodes": [
                    { "id": "gid://shop/ProductVariant/1", "price": "80.00", "compareAtPrice": "100.00" },
                    { "id": "gid://shop/ProductVariant/2", "price": "55.00", "compareAtPrice": null }
                ]
            }
        });

        let product = parse_product(&node).unwrap();
        assert_eq!(product.title, "Step Jacket");
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].price, Price::parse("80").unwrap());
        assert_eq!(
            product.variants[0].compare_at,
            Some(Price::parse("100").unwrap())
        );
        assert_eq!(product.variants[1].compare_at, None);
    }

    #[test]
    fn test_parse_variant_bad_price() {
        let node = serde_json::json!({
            "id": "gid://shop/ProductVariant/1",
            "price": "eighty",
            "compareAtPrice": "100.00"
        });
        assert!(matches!(parse_variant(&node), Err(GatewayError::Shape(_))));
    }

    #[test]
    fn test_parse_user_errors_shapes() {
        // Shopify returns field as a path array
        let value = serde_json::json!([
            { "field": ["price"], "message": "must be positive" },
            { "field": null, "message": "locked" }
        ]);
        let errors = parse_user_errors(Some(&value));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field.as_deref(), Some("price"));
        assert_eq!(errors[1].field, None);
        assert_eq!(errors[1].message, "locked");
    }
}
