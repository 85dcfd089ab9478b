//! Deal lifecycle tracking and price stepping.

pub mod stepper;
pub mod tracker;

pub use stepper::{next_price, StepPlan};
pub use tracker::{DealPhase, DealTracker};
