#![deny(warnings)]

//! Core domain models and invariants for the coop contract simulator.
//!
//! This crate defines the serializable inputs of a simulation run (players,
//! global parameters, the equipment catalog) with validation helpers that
//! reject bad input before any run state exists.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub mod catalog;

pub use catalog::{
    Catalog, EquipmentCategory, EquipmentEffect, LoadoutEffect, Stage, COLLEGGTIBLE_BONUS,
};

/// Hard cap on coop size.
pub const MAX_COOP_SIZE: usize = 40;

/// Seconds per day.
pub const SECS_PER_DAY: f64 = 86_400.0;

/// Catalog indices for the eight loadout slots. `0` is the empty slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loadout {
    pub gusset: usize,
    pub metronome: usize,
    pub compass: usize,
    pub slot_filler: usize,
    pub deflector: usize,
    pub siab: usize,
    pub chalice: usize,
    pub life_stones: usize,
}

impl Loadout {
    pub fn get(&self, category: EquipmentCategory) -> usize {
        match category {
            EquipmentCategory::Gusset => self.gusset,
            EquipmentCategory::Metronome => self.metronome,
            EquipmentCategory::Compass => self.compass,
            EquipmentCategory::SlotFiller => self.slot_filler,
            EquipmentCategory::Deflector => self.deflector,
            EquipmentCategory::Siab => self.siab,
            EquipmentCategory::Chalice => self.chalice,
            EquipmentCategory::LifeStones => self.life_stones,
        }
    }

    pub fn set(&mut self, category: EquipmentCategory, index: usize) {
        let slot = match category {
            EquipmentCategory::Gusset => &mut self.gusset,
            EquipmentCategory::Metronome => &mut self.metronome,
            EquipmentCategory::Compass => &mut self.compass,
            EquipmentCategory::SlotFiller => &mut self.slot_filler,
            EquipmentCategory::Deflector => &mut self.deflector,
            EquipmentCategory::Siab => &mut self.siab,
            EquipmentCategory::Chalice => &mut self.chalice,
            EquipmentCategory::LifeStones => &mut self.life_stones,
        };
        *slot = index;
    }
}

/// Research-level coefficients of a player's farm, before equipment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseCoefficients {
    /// Eggs per chicken per hour.
    pub elr: f64,
    /// Shipping capacity in eggs per hour.
    pub ship_capacity: f64,
    /// Internal hatchery rate, chickens per minute per habitat.
    pub ihr: f64,
    /// Habitat capacity in chickens.
    pub hab_capacity: f64,
}

impl Default for BaseCoefficients {
    fn default() -> Self {
        Self {
            elr: 300_000.0,
            ship_capacity: 5.0e15,
            ihr: 7_440.0,
            hab_capacity: 11_340_000_000.0,
        }
    }
}

/// One coop member. Immutable during a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub name: String,
    /// Tokens this player spends on their boost.
    pub tokens: u32,
    /// Player needs a mirror boost; costs and multiplies as one token fewer.
    pub mirror: bool,
    /// Token sink; credited with the full token-gifting teamwork term.
    pub sink: bool,
    /// Coop creator; their token timer runs from time zero.
    pub creator: bool,
    pub colleggtibles: bool,
    pub loadout: Loadout,
    /// Deflector index that replaces the shield at the buff swap (0 = none).
    pub siab_swap_deflector: usize,
    /// Tokens gifted to teammates over the contract.
    pub tokens_gifted: u32,
    pub base: BaseCoefficients,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            name: "player".to_string(),
            tokens: 6,
            mirror: false,
            sink: false,
            creator: false,
            colleggtibles: false,
            loadout: Loadout::default(),
            siab_swap_deflector: 0,
            tokens_gifted: 0,
            base: BaseCoefficients::default(),
        }
    }
}

/// Formula generation for boost-time-value and teamwork.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    #[default]
    Legacy,
    Alternate,
}

/// Global parameters of a run, already converted to seconds and eggs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    /// Contract length in seconds; also the ceiling on simulated time.
    pub duration_secs: f64,
    pub target_eggs: f64,
    /// Mean seconds between token gifts, per player.
    pub gift_interval_secs: f64,
    /// Seconds between contract timer tokens.
    pub timer_interval_secs: f64,
    /// Seconds before non-creators start receiving timer tokens.
    pub crt_time_secs: f64,
    /// Roster indices in boosting order. Empty means roster order.
    pub boost_order: Vec<usize>,
    pub rules: RuleSet,
    /// Doubles gift tokens.
    pub double_gifts: bool,
    /// Chicken runs per player per week, for teamwork.
    pub chicken_runs_per_week: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            duration_secs: 3.0 * SECS_PER_DAY,
            target_eggs: 1.0e16,
            gift_interval_secs: 1_800.0,
            timer_interval_secs: 3_600.0,
            crt_time_secs: 0.0,
            boost_order: Vec::new(),
            rules: RuleSet::Legacy,
            double_gifts: false,
            chicken_runs_per_week: 0.0,
        }
    }
}

impl SimParams {
    /// Boost order for a roster of `players`, defaulting to roster order.
    pub fn effective_boost_order(&self, players: usize) -> Vec<usize> {
        if self.boost_order.is_empty() {
            (0..players).collect()
        } else {
            self.boost_order.clone()
        }
    }

    pub fn duration_days(&self) -> f64 {
        self.duration_secs / SECS_PER_DAY
    }
}

/// Validation errors for run inputs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("roster is empty")]
    EmptyRoster,
    #[error("coop of {0} players exceeds the cap of {max}", max = MAX_COOP_SIZE)]
    CoopTooLarge(usize),
    #[error("unknown {category} selection {index}")]
    UnknownEquipment {
        category: EquipmentCategory,
        index: usize,
    },
    #[error("catalog has no {0} items")]
    MissingCategory(EquipmentCategory),
    #[error("catalog {category} item {index} has an invalid coefficient")]
    InvalidEffect {
        category: EquipmentCategory,
        index: usize,
    },
    #[error("boost order is not a permutation of the roster: {0}")]
    InvalidBoostOrder(String),
    #[error("{0} players are marked as creator")]
    MultipleCreators(usize),
    #[error("{0} must be finite and > 0")]
    NonPositive(&'static str),
    #[error("{0} must be finite and >= 0")]
    Negative(&'static str),
}

fn positive(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NonPositive(field))
    }
}

fn non_negative(value: f64, field: &'static str) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::Negative(field))
    }
}

/// Validate global parameters.
pub fn validate_params(p: &SimParams) -> Result<(), ValidationError> {
    positive(p.duration_secs, "duration_secs")?;
    positive(p.target_eggs, "target_eggs")?;
    positive(p.gift_interval_secs, "gift_interval_secs")?;
    positive(p.timer_interval_secs, "timer_interval_secs")?;
    non_negative(p.crt_time_secs, "crt_time_secs")?;
    non_negative(p.chicken_runs_per_week, "chicken_runs_per_week")?;
    Ok(())
}

/// Validate one player against the catalog.
pub fn validate_player(player: &PlayerConfig, catalog: &Catalog) -> Result<(), ValidationError> {
    for category in EquipmentCategory::ALL {
        catalog.get(category, player.loadout.get(category))?;
    }
    catalog.get(EquipmentCategory::Deflector, player.siab_swap_deflector)?;
    positive(player.base.elr, "base.elr")?;
    positive(player.base.ship_capacity, "base.ship_capacity")?;
    positive(player.base.ihr, "base.ihr")?;
    positive(player.base.hab_capacity, "base.hab_capacity")?;
    Ok(())
}

/// Validate a full run input, including cross-references like the boost order.
pub fn validate_roster(
    players: &[PlayerConfig],
    params: &SimParams,
    catalog: &Catalog,
) -> Result<(), ValidationError> {
    if players.is_empty() {
        return Err(ValidationError::EmptyRoster);
    }
    if players.len() > MAX_COOP_SIZE {
        return Err(ValidationError::CoopTooLarge(players.len()));
    }
    catalog.validate()?;
    validate_params(params)?;
    for p in players {
        validate_player(p, catalog)?;
    }
    let creators = players.iter().filter(|p| p.creator).count();
    if creators > 1 {
        return Err(ValidationError::MultipleCreators(creators));
    }

    let order = params.effective_boost_order(players.len());
    let mut seen = vec![false; players.len()];
    for &i in &order {
        match seen.get_mut(i) {
            Some(s) if !*s => *s = true,
            Some(_) => return Err(ValidationError::InvalidBoostOrder(format!("{i} repeated"))),
            None => return Err(ValidationError::InvalidBoostOrder(format!("{i} out of range"))),
        }
    }
    if order.len() != players.len() {
        return Err(ValidationError::InvalidBoostOrder(format!(
            "{} entries for {} players",
            order.len(),
            players.len()
        )));
    }
    debug!(players = players.len(), "roster validated");
    Ok(())
}
