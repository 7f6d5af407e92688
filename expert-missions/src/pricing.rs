//! Price, reputation and late-delivery reward model for expert missions.
//!
//! Every function here is pure. Expert missions pay moderately more than
//! baseline ones up front, grant less reputation per unit, and lose reward
//! harmonically with every day they are late.

use crate::constants::{
    PRICE_BASE_PER_UNIT, PRICE_DISTANCE_BONUS_RATE, PRICE_QUANTITY_BONUS_RATE, PRICE_SCALE,
    PRICE_SPEED_DIVISOR, PRICE_WEIGHT_DIVISOR, REPUTATION_SCALE,
};
use crate::numbers::round_f64_to_i32;

/// Multiplicative factors feeding [`total_price`], exposed for inspection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceFactors {
    pub base: f64,
    pub distance_bonus: f64,
    pub weight_bonus: f64,
    pub quantity_bonus: f64,
    pub speed_bonus: f64,
}

impl PriceFactors {
    #[must_use]
    pub fn compute(
        distance_units: f64,
        quantity: u32,
        unit_weight: f64,
        speed_factor: f64,
    ) -> Self {
        let qty = f64::from(quantity);
        Self {
            base: PRICE_BASE_PER_UNIT * distance_units,
            distance_bonus: 1.0 + distance_units * PRICE_DISTANCE_BONUS_RATE,
            weight_bonus: 1.0 + unit_weight * qty / PRICE_WEIGHT_DIVISOR,
            quantity_bonus: 1.0 + qty * PRICE_QUANTITY_BONUS_RATE,
            speed_bonus: speed_factor / PRICE_SPEED_DIVISOR,
        }
    }

    #[must_use]
    pub fn product(&self) -> f64 {
        self.base
            * self.distance_bonus
            * self.weight_bonus
            * self.quantity_bonus
            * self.speed_bonus
            * PRICE_SCALE
    }
}

/// Total up-front price of an expert mission.
#[must_use]
pub fn total_price(
    distance_units: f64,
    quantity: u32,
    unit_weight: f64,
    speed_factor: f64,
) -> i32 {
    let factors = PriceFactors::compute(distance_units, quantity, unit_weight, speed_factor);
    round_f64_to_i32(factors.product())
}

/// Reputation granted per delivered unit.
#[must_use]
pub fn delivery_reputation(total_price: i32, good_count: u32) -> i32 {
    if good_count == 0 {
        return 0;
    }
    round_f64_to_i32(f64::from(total_price) * REPUTATION_SCALE / f64::from(good_count))
}

/// Days past due; zero when delivered on or before the due day.
#[must_use]
pub const fn days_late(current_day: u32, due_day: u32) -> u32 {
    current_day.saturating_sub(due_day)
}

/// Unrounded per-unit reward after the harmonic late penalty.
#[must_use]
pub fn reward_per_unit(total_price: i32, good_count: u32, current_day: u32, due_day: u32) -> f64 {
    if good_count == 0 {
        return 0.0;
    }
    let per_unit = f64::from(total_price) / f64::from(good_count);
    per_unit / (1.0 + f64::from(days_late(current_day, due_day)))
}

/// Gold paid per delivered unit: full price on time, then 1/2, 1/3, ...
#[must_use]
pub fn delivery_reward(total_price: i32, good_count: u32, current_day: u32, due_day: u32) -> i32 {
    round_f64_to_i32(reward_per_unit(total_price, good_count, current_day, due_day))
}
