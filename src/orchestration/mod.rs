//! Gateway-facing orchestration: the adjuster, the scanner, and the loop
//! that drives them.

pub mod adjuster;
pub mod poll;
pub mod scanner;

pub use adjuster::PriceAdjuster;
pub use poll::PollLoop;
pub use scanner::DealScanner;
