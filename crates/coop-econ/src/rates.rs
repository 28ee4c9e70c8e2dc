//! Egg-laying, shipping and stone allocation.

use coop_core::{BaseCoefficients, LoadoutEffect};
use serde::{Deserialize, Serialize};

/// Multiplier granted by one stone.
pub const STONE_BONUS: f64 = 1.05;

/// Stones assigned to lay rate (tachyon) and ship rate (quantum).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoneAllocation {
    pub tachyon: u32,
    pub quantum: u32,
}

/// Rates in eggs per hour.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RateResult {
    pub lay_rate: f64,
    pub ship_rate: f64,
    /// Always `min(lay_rate, ship_rate)`.
    pub delivery_rate: f64,
    pub stones: StoneAllocation,
}

impl RateResult {
    pub fn new(lay_rate: f64, ship_rate: f64, stones: StoneAllocation) -> Self {
        Self {
            lay_rate,
            ship_rate,
            delivery_rate: lay_rate.min(ship_rate),
            stones,
        }
    }

    /// Lay rate over ship rate; above 1 the player is ship-capped.
    pub fn lay_ship_ratio(&self) -> f64 {
        if self.ship_rate > 0.0 {
            self.lay_rate / self.ship_rate
        } else {
            0.0
        }
    }
}

/// Greedily hand out `slots` stones, one at a time, to the lower rate.
///
/// The comparison is redone after every stone, so a gap narrower than one
/// stone bonus can flip the next pick.
///
/// Example:
/// let r = allocate_stones(100.0, 90.0, 2);
/// assert_eq!(r.stones.quantum, 2);
pub fn allocate_stones(mut lay: f64, mut ship: f64, slots: u32) -> RateResult {
    let mut stones = StoneAllocation::default();
    for _ in 0..slots {
        if ship < lay {
            ship *= STONE_BONUS;
            stones.quantum += 1;
        } else {
            lay *= STONE_BONUS;
            stones.tachyon += 1;
        }
    }
    RateResult::new(lay, ship, stones)
}

/// Rates for one player at `population`.
///
/// `other_deflector_percent` is the coop deflector total minus the player's
/// own. Stones are only optimised once the habitat is full; a growing farm
/// uses the plain formula.
pub fn compute_rates(
    population: f64,
    base: &BaseCoefficients,
    effect: &LoadoutEffect,
    other_deflector_percent: f64,
    at_ceiling: bool,
) -> RateResult {
    let deflector = 1.0 + other_deflector_percent.max(0.0) / 100.0;
    let lay = population.max(0.0) * base.elr * effect.elr_mult * deflector;
    let ship = base.ship_capacity * effect.sr_mult;
    if at_ceiling {
        allocate_stones(lay, ship, effect.stone_slots)
    } else {
        RateResult::new(lay, ship, StoneAllocation::default())
    }
}
