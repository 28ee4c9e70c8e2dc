//! Stepped phase of a run.
//!
//! Every player advances in lockstep on a fixed one-second tick until the
//! target is met, the contract ends, or every habitat is full. From there the
//! run is finished in closed form by [`crate::resolve`].

use coop_core::{validate_roster, Catalog, PlayerConfig, SimParams};
use coop_econ::{boost_cost, boost_multiplier};
use tracing::debug;

use crate::report::{Outcome, Phase};
use crate::state::PlayerState;
use crate::tokens::TokenLedger;
use crate::{resolve, SimError};

/// Simulated seconds per tick.
pub const TICK_SECS: f64 = 1.0;

/// Absolute ceiling on ticks in one run, independent of the contract length.
pub const MAX_TICKS: u64 = 50_000_000;

/// Everything one run owns. Nothing is shared between runs.
pub struct SimulationContext<'a> {
    pub(crate) params: &'a SimParams,
    pub(crate) configs: &'a [PlayerConfig],
    pub(crate) players: Vec<PlayerState>,
    pub(crate) elapsed: f64,
    pub(crate) total_deflector: f64,
    pub(crate) phase: Phase,
    pub(crate) steady_state_at: Option<f64>,
    deflector_dirty: bool,
    ledger: TokenLedger,
    boost_order: Vec<usize>,
    boost_cursor: usize,
    ticks: u64,
    tick_limit: u64,
}

impl<'a> SimulationContext<'a> {
    /// Validate the inputs and build zeroed state for every player.
    pub fn new(
        configs: &'a [PlayerConfig],
        params: &'a SimParams,
        catalog: &Catalog,
    ) -> Result<Self, SimError> {
        validate_roster(configs, params, catalog)?;
        let players = configs
            .iter()
            .map(|c| PlayerState::new(c, catalog))
            .collect::<Result<Vec<_>, _>>()?;
        let tick_limit = ((params.duration_secs / TICK_SECS).ceil() as u64)
            .saturating_add(1)
            .min(MAX_TICKS);
        let mut ctx = Self {
            params,
            configs,
            players,
            elapsed: 0.0,
            total_deflector: 0.0,
            phase: Phase::PreBoost,
            steady_state_at: None,
            deflector_dirty: false,
            ledger: TokenLedger::new(params, configs.len()),
            boost_order: params.effective_boost_order(configs.len()),
            boost_cursor: 0,
            ticks: 0,
            tick_limit,
        };
        ctx.refresh_all();
        // Free boosts (zero token cost) start immediately.
        ctx.release_boosts();
        Ok(ctx)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn total_deflector(&self) -> f64 {
        self.total_deflector
    }

    pub fn tokens_spent(&self) -> u64 {
        self.ledger.spent()
    }

    /// Delivered eggs across the coop.
    pub fn delivered(&self) -> f64 {
        self.players.iter().map(|p| p.delivered).sum()
    }

    /// Coop delivery in eggs per hour.
    pub fn coop_rate(&self) -> f64 {
        self.players.iter().map(|p| p.rates.delivery_rate).sum()
    }

    pub fn all_full(&self) -> bool {
        self.players.iter().all(|p| p.habitat_full)
    }

    /// True once stepping can make no further useful progress.
    pub fn stepping_done(&self) -> bool {
        self.delivered() >= self.params.target_eggs
            || self.elapsed >= self.params.duration_secs
            || self.all_full()
            || self.ticks >= self.tick_limit
    }

    pub(crate) fn tick_limit_hit(&self) -> bool {
        self.ticks >= self.tick_limit
    }

    /// Recompute the deflector total and every player's rates.
    pub(crate) fn refresh_all(&mut self) {
        self.total_deflector = self.players.iter().map(|p| p.deflector_percent).sum();
        let total = self.total_deflector;
        for p in &mut self.players {
            p.refresh_rates(total);
        }
    }

    /// Accrue eggs and btv for every player over `dt` at current rates.
    pub(crate) fn advance(&mut self, dt: f64) {
        let rules = self.params.rules;
        for p in &mut self.players {
            p.accrue(dt, rules);
        }
        self.elapsed += dt;
    }

    /// One tick.
    pub fn step(&mut self) {
        let dt = TICK_SECS;
        let now = self.elapsed + dt;
        let total = self.total_deflector;

        for (i, p) in self.players.iter_mut().enumerate() {
            if p.habitat_full {
                continue;
            }
            if p.grow(dt) {
                p.reach_ceiling(now);
                self.deflector_dirty = true;
                debug!(player = i, at = now, deflector = p.deflector_percent, "habitat full");
            } else {
                p.refresh_rates(total);
            }
        }

        self.advance(dt);

        if self.deflector_dirty {
            self.refresh_all();
            self.deflector_dirty = false;
        }

        self.release_boosts();
        self.ticks += 1;

        if self.steady_state_at.is_none() && self.all_full() {
            self.steady_state_at = Some(self.elapsed);
            self.phase = Phase::SteadyState;
            debug!(at = self.elapsed, "all habitats full");
        }
    }

    /// Start boosts for the next players in order while the pool covers them.
    fn release_boosts(&mut self) {
        while let Some(&i) = self.boost_order.get(self.boost_cursor) {
            if self.players[i].habitat_full {
                self.boost_cursor += 1;
                continue;
            }
            let cfg = &self.configs[i];
            let cost = u64::from(boost_cost(cfg.tokens, cfg.mirror));
            if self.ledger.available(self.elapsed) < cost {
                break;
            }
            self.ledger.spend(cost);
            let multiplier = boost_multiplier(cfg.tokens, cfg.mirror);
            self.players[i].start_boost(multiplier, self.elapsed);
            self.boost_cursor += 1;
            if self.phase == Phase::PreBoost {
                self.phase = Phase::Boosting;
            }
            debug!(player = i, at = self.elapsed, cost, multiplier, "boost started");
        }
    }

    /// Step until done.
    pub fn run_stepped(&mut self) {
        while !self.stepping_done() {
            self.step();
        }
    }

    /// Step, then resolve to a terminal outcome.
    pub fn run(mut self) -> Outcome {
        self.run_stepped();
        resolve::finish(self)
    }
}
