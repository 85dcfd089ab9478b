pub mod config;
pub mod domain;
pub mod engine;
pub mod gateway;
pub mod orchestration;

pub use config::{Config, ConfigError, StartMarkerMode};
pub use domain::{
    DealFields, DealId, Field, Price, Product, ProductId, RawDealRecord, Variant, VariantId,
};
pub use engine::{DealPhase, DealTracker};
pub use gateway::{CatalogGateway, GatewayError, MockGateway, ShopifyGateway};
pub use orchestration::{DealScanner, PollLoop, PriceAdjuster};
