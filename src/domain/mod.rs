//! Core domain types shared across the engine.

pub mod deal;
pub mod price;
pub mod primitives;

pub use deal::{DealFields, Field, FieldParseError, Product, RawDealRecord, Variant};
pub use price::Price;
pub use primitives::{DealId, ProductId, VariantId};
