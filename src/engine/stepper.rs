//! Next-price computation for one variant.
//!
//! Pure decision logic; issuing the actual mutation is the adjuster's job.

use crate::domain::Price;

/// The planned step for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepPlan {
    /// Price the variant should hold after this cycle.
    pub next: Price,
    /// Whether a mutation must be issued to reach `next`.
    pub needs_mutation: bool,
    /// Whether the variant is at its target once `next` is in effect.
    pub complete_after: bool,
}

/// Compute the next price for a variant recovering toward `compare_at`.
///
/// The returned price is non-decreasing and never exceeds `compare_at`.
/// When the remaining distance is smaller than `increment` the price snaps
/// directly to the target, avoiding an infinite tail of sub-cent steps.
pub fn next_price(current: Price, compare_at: Price, increment: Price) -> StepPlan {
    if current >= compare_at {
        return StepPlan {
            next: current,
            needs_mutation: false,
            complete_after: true,
        };
    }

    let remaining = compare_at - current;
    let next = if remaining < increment {
        compare_at
    } else {
        // stepped price is capped at the target
        let stepped = current + increment;
        if stepped > compare_at {
            compare_at
        } else {
            stepped
        }
    };

    StepPlan {
        next,
        needs_mutation: true,
        complete_after: next == compare_at,
    }
}
