//! Per-player mutable state, owned by one run.

use coop_core::{
    BaseCoefficients, Catalog, LoadoutEffect, PlayerConfig, RuleSet, Stage, ValidationError,
};
use coop_econ::{btv_per_sec, compute_rates, RateResult};
use serde::{Deserialize, Serialize};

/// Habitats per farm times internal hatchery calm multiplier.
const HATCHERY_FACTOR: f64 = 12.0;

/// Rates and population captured the moment a player's habitats fill,
/// before the hatchery artifacts are swapped out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwapSnapshot {
    pub at: f64,
    pub lay_rate: f64,
    pub ship_rate: f64,
    pub population: f64,
}

#[derive(Clone, Debug)]
pub struct PlayerState {
    pub population: f64,
    pub max_chickens: f64,
    /// Delivered eggs.
    pub delivered: f64,
    /// Boost-time-value accumulator.
    pub btv: f64,
    pub rates: RateResult,
    pub boost_multiplier: f64,
    pub boost_started_at: Option<f64>,
    pub habitat_full: bool,
    pub boosting: bool,
    pub siab_active: bool,
    pub deflector_percent: f64,
    pub siab_percent: f64,
    pub before_swap: Option<SwapSnapshot>,
    siab_swapped: bool,
    ihr: f64,
    base: BaseCoefficients,
    growth: LoadoutEffect,
    production: LoadoutEffect,
    swapped: LoadoutEffect,
}

impl PlayerState {
    /// Fresh state with zeroed accumulators.
    pub fn new(cfg: &PlayerConfig, catalog: &Catalog) -> Result<Self, ValidationError> {
        let resolve = |stage| -> Result<LoadoutEffect, ValidationError> {
            let effect = catalog.resolve(&cfg.loadout, stage, cfg.siab_swap_deflector)?;
            Ok(if cfg.colleggtibles {
                effect.with_colleggtibles()
            } else {
                effect
            })
        };
        let growth = resolve(Stage::Growth)?;
        let production = resolve(Stage::Production)?;
        let swapped = resolve(Stage::Swapped)?;
        Ok(Self {
            population: 0.0,
            max_chickens: cfg.base.hab_capacity * growth.chickens_mult,
            delivered: 0.0,
            btv: 0.0,
            rates: RateResult::default(),
            boost_multiplier: 1.0,
            boost_started_at: None,
            habitat_full: false,
            boosting: false,
            siab_active: false,
            deflector_percent: 0.0,
            siab_percent: 0.0,
            before_swap: None,
            siab_swapped: false,
            ihr: cfg.base.ihr * growth.ihr_mult,
            base: cfg.base,
            growth,
            production,
            swapped,
        })
    }

    /// Equipment effect currently worn.
    pub fn effect(&self) -> &LoadoutEffect {
        if !self.habitat_full {
            &self.growth
        } else if self.siab_swapped {
            &self.swapped
        } else {
            &self.production
        }
    }

    /// Population gained per second.
    pub fn growth_per_sec(&self) -> f64 {
        self.ihr * HATCHERY_FACTOR * self.boost_multiplier / 60.0
    }

    /// Grow for `dt` seconds. Returns true when the ceiling is reached.
    pub fn grow(&mut self, dt: f64) -> bool {
        if self.habitat_full {
            return false;
        }
        self.population = (self.population + self.growth_per_sec() * dt).min(self.max_chickens);
        self.population >= self.max_chickens
    }

    /// Habitats just filled: snapshot, then swap hatchery artifacts for the
    /// deflector and shield.
    pub fn reach_ceiling(&mut self, at: f64) {
        self.before_swap = Some(SwapSnapshot {
            at,
            lay_rate: self.rates.lay_rate,
            ship_rate: self.rates.ship_rate,
            population: self.population,
        });
        self.population = self.max_chickens;
        self.habitat_full = true;
        self.deflector_percent = self.production.deflector_percent;
        self.siab_percent = self.production.siab_percent;
        self.siab_active = self.siab_percent > 0.0;
    }

    /// Take the shield off for the player's swap deflector. Happens at most once.
    pub fn swap_siab(&mut self) {
        if !self.siab_active || self.siab_swapped {
            return;
        }
        self.siab_swapped = true;
        self.siab_active = false;
        self.deflector_percent = self.swapped.deflector_percent;
        self.siab_percent = 0.0;
    }

    pub fn start_boost(&mut self, multiplier: f64, at: f64) {
        if self.boosting {
            return;
        }
        self.boosting = true;
        self.boost_multiplier = multiplier;
        self.boost_started_at = Some(at);
    }

    /// Recompute rates against the coop deflector total.
    pub fn refresh_rates(&mut self, total_deflector: f64) {
        let other = total_deflector - self.deflector_percent;
        self.rates = compute_rates(
            self.population,
            &self.base,
            self.effect(),
            other,
            self.habitat_full,
        );
    }

    /// Deliver eggs and accrue boost-time-value over `dt` seconds.
    pub fn accrue(&mut self, dt: f64, rules: RuleSet) {
        self.delivered += self.rates.delivery_rate * dt / 3600.0;
        self.btv += btv_per_sec(self.deflector_percent, self.siab_percent, rules) * dt;
    }

    /// Boost-time-value per second right now.
    pub fn btv_per_sec(&self, rules: RuleSet) -> f64 {
        btv_per_sec(self.deflector_percent, self.siab_percent, rules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coop_core::EquipmentCategory;

    fn config() -> (PlayerConfig, Catalog) {
        let catalog = Catalog::standard();
        let mut cfg = PlayerConfig::default();
        cfg.loadout.deflector = catalog
            .find(EquipmentCategory::Deflector, "T4L Deflector")
            .unwrap();
        cfg.loadout.siab = catalog.find(EquipmentCategory::Siab, "T4L SIAB").unwrap();
        cfg.siab_swap_deflector = catalog
            .find(EquipmentCategory::Deflector, "T4C Deflector")
            .unwrap();
        (cfg, catalog)
    }

    #[test]
    fn starts_empty_and_unboosted() {
        let (cfg, catalog) = config();
        let p = PlayerState::new(&cfg, &catalog).unwrap();
        assert_eq!(p.population, 0.0);
        assert_eq!(p.boost_multiplier, 1.0);
        assert_eq!(p.deflector_percent, 0.0);
        assert_eq!(p.max_chickens, cfg.base.hab_capacity);
    }

    #[test]
    fn growth_is_capped_and_flags_ceiling() {
        let (cfg, catalog) = config();
        let mut p = PlayerState::new(&cfg, &catalog).unwrap();
        p.population = p.max_chickens - 1.0;
        assert!(p.grow(1.0));
        assert_eq!(p.population, p.max_chickens);
        p.reach_ceiling(10.0);
        assert!(p.habitat_full);
        assert!(p.siab_active);
        assert_eq!(p.deflector_percent, 20.0);
        assert_eq!(p.before_swap.unwrap().at, 10.0);
        assert!(!p.grow(1.0));
    }

    #[test]
    fn siab_swap_happens_once() {
        let (cfg, catalog) = config();
        let mut p = PlayerState::new(&cfg, &catalog).unwrap();
        p.population = p.max_chickens;
        p.reach_ceiling(0.0);
        p.swap_siab();
        assert!(!p.siab_active);
        assert_eq!(p.siab_percent, 0.0);
        assert_eq!(p.deflector_percent, 35.0);
        p.swap_siab();
        assert_eq!(p.deflector_percent, 35.0);
    }

    #[test]
    fn boosting_never_reverses() {
        let (cfg, catalog) = config();
        let mut p = PlayerState::new(&cfg, &catalog).unwrap();
        p.start_boost(4080.0, 100.0);
        p.start_boost(80.0, 200.0);
        assert_eq!(p.boost_multiplier, 4080.0);
        assert_eq!(p.boost_started_at, Some(100.0));
    }

    #[test]
    fn colleggtibles_raise_ceiling() {
        let (mut cfg, catalog) = config();
        cfg.colleggtibles = true;
        let p = PlayerState::new(&cfg, &catalog).unwrap();
        assert!((p.max_chickens - cfg.base.hab_capacity * 1.05).abs() < 1.0);
    }
}
