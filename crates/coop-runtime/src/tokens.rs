//! Coop token pool.
//!
//! Tokens come from gifts (every player, whole run) and the contract timer.
//! The creator's timer runs from zero; everyone else's starts after
//! `crt_time`. Boosting players draw from the pool in boost order.

use coop_core::SimParams;

#[derive(Clone, Debug)]
pub struct TokenLedger {
    players: u64,
    gift_interval: f64,
    timer_interval: f64,
    crt_time: f64,
    gift_multiplier: u64,
    spent: u64,
}

impl TokenLedger {
    pub fn new(params: &SimParams, players: usize) -> Self {
        Self {
            players: players as u64,
            gift_interval: params.gift_interval_secs,
            timer_interval: params.timer_interval_secs,
            crt_time: params.crt_time_secs,
            gift_multiplier: if params.double_gifts { 2 } else { 1 },
            spent: 0,
        }
    }

    /// Tokens earned by the whole coop by time `t`.
    pub fn accrued(&self, t: f64) -> u64 {
        let t = t.max(0.0);
        let gifts = (t * self.players as f64 / self.gift_interval).floor() as u64;
        let creator = (t / self.timer_interval).floor() as u64;
        let others = if t > self.crt_time {
            (((t - self.crt_time) / self.timer_interval).floor() as u64)
                .saturating_mul(self.players.saturating_sub(1))
        } else {
            0
        };
        gifts
            .saturating_mul(self.gift_multiplier)
            .saturating_add(creator)
            .saturating_add(others)
    }

    /// Unspent tokens at time `t`.
    pub fn available(&self, t: f64) -> u64 {
        self.accrued(t).saturating_sub(self.spent)
    }

    pub fn spend(&mut self, tokens: u64) {
        self.spent = self.spent.saturating_add(tokens);
    }

    pub fn spent(&self) -> u64 {
        self.spent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimParams {
        SimParams {
            gift_interval_secs: 1_800.0,
            timer_interval_secs: 3_600.0,
            crt_time_secs: 600.0,
            ..SimParams::default()
        }
    }

    #[test]
    fn gifts_scale_with_coop_size() {
        let ledger = TokenLedger::new(&params(), 4);
        // 4 players * 900s / 1800s = 2 gifts, timers not yet due
        assert_eq!(ledger.accrued(900.0), 2);
    }

    #[test]
    fn timer_prorated_after_creation_phase() {
        let ledger = TokenLedger::new(&params(), 3);
        // gifts: floor(3600*3/1800)=6, creator: 1, others: floor(3000/3600)=0
        assert_eq!(ledger.accrued(3_600.0), 7);
        // gifts: 8, creator: 1, others: floor(4200/3600) * 2 = 2
        assert_eq!(ledger.accrued(4_800.0), 11);
    }

    #[test]
    fn double_gifts() {
        let p = SimParams {
            double_gifts: true,
            ..params()
        };
        let ledger = TokenLedger::new(&p, 4);
        assert_eq!(ledger.accrued(900.0), 4);
    }

    #[test]
    fn tiny_intervals_saturate_instead_of_overflowing() {
        let p = SimParams {
            gift_interval_secs: 1e-30,
            timer_interval_secs: 1e-30,
            double_gifts: true,
            ..params()
        };
        let mut ledger = TokenLedger::new(&p, 40);
        assert_eq!(ledger.accrued(100.0), u64::MAX);
        ledger.spend(u64::MAX);
        ledger.spend(6);
        assert_eq!(ledger.spent(), u64::MAX);
        assert_eq!(ledger.available(100.0), 0);
    }

    #[test]
    fn spending_reduces_availability() {
        let mut ledger = TokenLedger::new(&params(), 4);
        ledger.spend(1);
        assert_eq!(ledger.available(900.0), 1);
        assert_eq!(ledger.available(0.0), 0);
        assert_eq!(ledger.spent(), 1);
    }
}
