//! Cancellation fee policy
//!
//! The fee a passenger or driver pays for cancelling depends on how far
//! ahead of departure the cancellation happens:
//!
//! | Hours before departure | Fee |
//! |---|---|
//! | more than 24 | free |
//! | (12, 24] | 50% |
//! | (6, 12] | 75% |
//! | (0, 6] | 100% |
//! | 0 or past | cancellation refused |
//!
//! Boundaries are strict greater-than comparisons evaluated top-down: a
//! cancellation at exactly 24 hours lands in the 50% tier, at exactly 12
//! hours in the 75% tier, at exactly 6 hours in the 100% tier.
//!
//! The assessment is a pure function of its inputs; the reference time is a
//! parameter so callers and tests control the clock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{hours_until, Money, Rate};

/// Fee tier applied to a cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeTier {
    /// More than 24 hours before departure: no fee
    Free,
    /// Between 12 and 24 hours: half the booking amount
    Half,
    /// Between 6 and 12 hours: three quarters of the booking amount
    ThreeQuarters,
    /// Six hours or less: the full booking amount
    Full,
}

impl FeeTier {
    /// The fee as a percentage of the booking amount (0, 50, 75, or 100)
    pub fn percentage(&self) -> Decimal {
        match self {
            FeeTier::Free => dec!(0),
            FeeTier::Half => dec!(50),
            FeeTier::ThreeQuarters => dec!(75),
            FeeTier::Full => dec!(100),
        }
    }

    /// The fee as a rate applicable to a money amount
    pub fn rate(&self) -> Rate {
        Rate::from_percentage(self.percentage())
    }
}

/// Result of assessing a cancellation against the fee policy
///
/// When `can_cancel` is false the fee equals the full booking amount but is
/// informational only; the orchestration refuses the cancellation and
/// charges nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CancellationAssessment {
    /// Whether the booking may still be cancelled
    pub can_cancel: bool,
    /// The fee retained if the cancellation goes ahead
    pub fee: Money,
    /// The tier the cancellation falls into
    pub tier: FeeTier,
    /// Human-readable explanation, suitable for showing to the user
    pub reason: String,
    /// Signed fractional hours between `now` and departure
    pub hours_before_departure: f64,
}

/// Assesses a cancellation at reference time `now`
///
/// `departs_at` is the trip's departure instant and `total_price` the
/// booking amount the fee is proportional to. The caller is responsible for
/// passing a non-negative amount.
pub fn assess_cancellation(
    departs_at: DateTime<Utc>,
    total_price: Money,
    now: DateTime<Utc>,
) -> CancellationAssessment {
    let hours = hours_until(departs_at, now);

    if hours <= 0.0 {
        return CancellationAssessment {
            can_cancel: false,
            fee: total_price,
            tier: FeeTier::Full,
            reason: "Cannot cancel - trip has already started".to_string(),
            hours_before_departure: hours,
        };
    }

    // Order matters: each tier is exclusive of its upper bound.
    let (tier, reason) = if hours > 24.0 {
        (
            FeeTier::Free,
            "Free cancellation (more than 24 hours before departure)",
        )
    } else if hours > 12.0 {
        (
            FeeTier::Half,
            "50% cancellation fee (12-24 hours before departure)",
        )
    } else if hours > 6.0 {
        (
            FeeTier::ThreeQuarters,
            "75% cancellation fee (6-12 hours before departure)",
        )
    } else {
        (
            FeeTier::Full,
            "100% cancellation fee (less than 6 hours before departure)",
        )
    };

    CancellationAssessment {
        can_cancel: true,
        fee: tier.rate().apply(&total_price),
        tier,
        reason: reason.to_string(),
        hours_before_departure: hours,
    }
}
