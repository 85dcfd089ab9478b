//! Deal, product, and variant records, plus the typed field-set boundary.
//!
//! Deal records arrive as flat key/value string pairs. They are converted to
//! typed values here, immediately after fetch; the engine's invariants are
//! stated over the typed form, never over raw strings.

use super::{DealId, Price, ProductId, VariantId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Field key: pricing-mode flag, boolean-as-string.
pub const FIELD_STEP_PRICING: &str = "step_pricing";
/// Field key: deal start timestamp, RFC 3339.
pub const FIELD_STARTS_AT: &str = "starts_at";
/// Field key: reference to the managed product.
pub const FIELD_PRODUCT: &str = "product";
/// Field key: remote start marker, boolean-as-string, optional.
pub const FIELD_STARTED: &str = "started";

/// One key/value pair of a deal's field set, as fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub key: String,
    pub value: String,
}

/// A deal record as returned by the gateway, fields still untyped.
#[derive(Debug, Clone)]
pub struct RawDealRecord {
    pub id: DealId,
    pub fields: Vec<Field>,
}

/// Typed view of a deal's field set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DealFields {
    /// Pricing-mode flag: the deal participates in step-down recovery.
    pub step_pricing: bool,
    /// When recovery becomes eligible to begin.
    pub starts_at: DateTime<Utc>,
    /// The product whose variants are under management.
    pub product: ProductId,
    /// Remote start marker; false when the field is absent.
    pub started: bool,
}

#[derive(Debug, Clone, Error)]
pub enum FieldParseError {
    #[error("missing required field: {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl DealFields {
    /// Parse a raw field list into typed fields.
    ///
    /// Keys are unique in well-formed responses; if the remote ever returns
    /// duplicates, last write wins.
    pub fn parse(fields: &[Field]) -> Result<Self, FieldParseError> {
        let map: HashMap<&str, &str> = fields
            .iter()
            .map(|f| (f.key.as_str(), f.value.as_str()))
            .collect();

        let step_pricing = parse_bool(&map, FIELD_STEP_PRICING)?
            .ok_or(FieldParseError::Missing(FIELD_STEP_PRICING))?;

        let starts_at_raw = map
            .get(FIELD_STARTS_AT)
            .ok_or(FieldParseError::Missing(FIELD_STARTS_AT))?;
        let starts_at = DateTime::parse_from_rfc3339(starts_at_raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| FieldParseError::Invalid {
                key: FIELD_STARTS_AT,
                value: starts_at_raw.to_string(),
            })?;

        let product = map
            .get(FIELD_PRODUCT)
            .map(|v| ProductId::new(*v))
            .ok_or(FieldParseError::Missing(FIELD_PRODUCT))?;

        let started = parse_bool(&map, FIELD_STARTED)?.unwrap_or(false);

        Ok(DealFields {
            step_pricing,
            starts_at,
            product,
            started,
        })
    }

    /// True when the pricing mode is on and the start time has passed.
    pub fn eligible_at(&self, now: DateTime<Utc>) -> bool {
        self.step_pricing && now >= self.starts_at
    }
}

fn parse_bool(
    map: &HashMap<&str, &str>,
    key: &'static str,
) -> Result<Option<bool>, FieldParseError> {
    match map.get(key) {
        None => Ok(None),
        Some(&"true") => Ok(Some(true)),
        Some(&"false") => Ok(Some(false)),
        Some(other) => Err(FieldParseError::Invalid {
            key,
            value: other.to_string(),
        }),
    }
}

/// A product and its variants, as fetched for one adjustment pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub variants: Vec<Variant>,
}

/// A sellable variant under price management.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub id: VariantId,
    /// Current live price.
    pub price: Price,
    /// Recovery target. A variant without one has nothing to recover.
    pub compare_at: Option<Price>,
}
