#![deny(warnings)]

//! Production and scoring models for coop contracts.
//!
//! This crate provides pure functions for:
//! - Lay, ship and delivery rates with greedy stone allocation
//! - The token-to-growth-multiplier boost table
//! - Boost-time-value accrual, teamwork and contract score

pub mod boost;
pub mod rates;
pub mod score;

pub use boost::{boost_cost, boost_multiplier, BOOST_FLOOR};
pub use rates::{allocate_stones, compute_rates, RateResult, StoneAllocation, STONE_BONUS};
pub use score::{
    btv_per_sec, btv_rate, contract_score, teamwork_factor, TeamworkInputs, BTV_CAP,
    TOKEN_TERM_CAP,
};
