//! Boost-time-value, teamwork and contract score.
//!
//! The contribution and speed curves are empirical fits of the game's scoring;
//! both regimes of the contribution curve meet at a ratio of 2.5.

use coop_core::RuleSet;
use serde::{Deserialize, Serialize};

/// Cap on the boost-time-value ratio used by teamwork.
pub const BTV_CAP: f64 = 2.0;

/// Maximum of the token-gifting teamwork term.
pub const TOKEN_TERM_CAP: f64 = 3.0;

const BTV_WEIGHT: f64 = 5.0;
const CHICKEN_RUN_TERM_CAP: f64 = 6.0;
const CHICKEN_RUN_MAX_PLAYERS: f64 = 20.0;
const TEAMWORK_DIVISOR: f64 = 19.0;

const CONTRIBUTION_BREAK: f64 = 2.5;
const CONTRIBUTION_CAP: f64 = 12.5;
const SECS_PER_BASE_UNIT: f64 = 259_200.0;
const TEAMWORK_WEIGHT: f64 = 0.19;
const COMPLETION_BONUS: f64 = 1.05;
const SCORE_SCALE: f64 = 187.5;

/// Boost-time-value rate in percent units: multiply by seconds / 100.
pub fn btv_rate(deflector_percent: f64, siab_percent: f64, rules: RuleSet) -> f64 {
    let deflector = deflector_percent.max(0.0);
    let siab = siab_percent.max(0.0);
    match rules {
        RuleSet::Legacy => 7.5 * deflector + 0.75 * siab,
        RuleSet::Alternate => 12.5 * deflector.min(12.0) + 0.75 * siab,
    }
}

/// Boost-time-value accrued per second.
pub fn btv_per_sec(deflector_percent: f64, siab_percent: f64, rules: RuleSet) -> f64 {
    btv_rate(deflector_percent, siab_percent, rules) / 100.0
}

/// Inputs to [`teamwork_factor`] for one player.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamworkInputs {
    /// Accrued boost-time-value over completion time.
    pub btv_ratio: f64,
    pub players: usize,
    pub duration_days: f64,
    pub runs_per_week: f64,
    pub tokens_gifted: f64,
    pub rules: RuleSet,
}

/// Teamwork in [0, 1].
///
/// `(5 B + CR + T) / 19` where `B` is the btv ratio capped at 2, `CR` the
/// chicken-run term (up to 6) and `T` the token term (up to 3). The alternate
/// rule set awards `CR` and `T` in full.
pub fn teamwork_factor(inp: &TeamworkInputs) -> f64 {
    let b = if inp.btv_ratio.is_finite() {
        inp.btv_ratio.clamp(0.0, BTV_CAP)
    } else {
        0.0
    };
    let (cr, t) = match inp.rules {
        RuleSet::Alternate => (CHICKEN_RUN_TERM_CAP, TOKEN_TERM_CAP),
        RuleSet::Legacy => {
            let cap = ((inp.players as f64 - 1.0).min(CHICKEN_RUN_MAX_PLAYERS)).max(1.0);
            let runs = inp.runs_per_week.max(0.0) * inp.duration_days.max(0.0) / 7.0;
            let cr = CHICKEN_RUN_TERM_CAP * (runs / cap).min(1.0);
            (cr, inp.tokens_gifted.clamp(0.0, TOKEN_TERM_CAP))
        }
    };
    let tw = (BTV_WEIGHT * b + cr + t) / TEAMWORK_DIVISOR;
    if tw.is_finite() {
        tw.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn contribution_factor(ratio: f64) -> f64 {
    if ratio <= CONTRIBUTION_BREAK {
        1.0 + 3.0 * ratio.powf(0.15)
    } else {
        0.02221 * ratio.min(CONTRIBUTION_CAP) + 4.386486
    }
}

/// Contract score for one player, lengths and times in seconds.
///
/// Example:
/// let cs = contract_score(1.0, 259_200.0, 129_600.0, 0.5);
/// assert!(cs > 0);
pub fn contract_score(
    contribution_ratio: f64,
    contract_length: f64,
    completion_time: f64,
    teamwork: f64,
) -> u64 {
    let length = if contract_length > 0.0 && contract_length.is_finite() {
        contract_length
    } else {
        1.0
    };
    let ratio = if contribution_ratio.is_finite() {
        contribution_ratio.max(0.0)
    } else {
        0.0
    };
    let base = 1.0 + length / SECS_PER_BASE_UNIT;
    let remaining = if completion_time.is_finite() {
        (1.0 - completion_time / length).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let speed = 1.0 + 4.0 * remaining.powi(3);
    let tw = 1.0 + TEAMWORK_WEIGHT * teamwork.clamp(0.0, 1.0);
    let score = (base * contribution_factor(ratio) * speed * tw * COMPLETION_BONUS * SCORE_SCALE)
        .ceil();
    if score.is_finite() && score > 0.0 {
        score as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn inputs(btv_ratio: f64) -> TeamworkInputs {
        TeamworkInputs {
            btv_ratio,
            players: 10,
            duration_days: 3.0,
            runs_per_week: 0.0,
            tokens_gifted: 0.0,
            rules: RuleSet::Legacy,
        }
    }

    #[test]
    fn btv_ratio_is_capped_before_weighting() {
        let tw = teamwork_factor(&inputs(5.0));
        assert!((tw - 10.0 / 19.0).abs() < 1e-12);
    }

    #[test]
    fn full_teamwork_is_one() {
        let tw = teamwork_factor(&TeamworkInputs {
            runs_per_week: 100.0,
            tokens_gifted: 10.0,
            ..inputs(2.0)
        });
        assert!((tw - 1.0).abs() < 1e-12);
    }

    #[test]
    fn alternate_rules_award_fixed_terms() {
        let tw = teamwork_factor(&TeamworkInputs {
            rules: RuleSet::Alternate,
            ..inputs(0.0)
        });
        assert!((tw - 9.0 / 19.0).abs() < 1e-12);
    }

    #[test]
    fn chicken_runs_scale_with_coop_size() {
        // 10 players: cap 9 runs. 7 runs/week over 3 days = 3 runs -> 6 * 3/9 = 2.
        let tw = teamwork_factor(&TeamworkInputs {
            runs_per_week: 7.0,
            ..inputs(0.0)
        });
        assert!((tw - 2.0 / 19.0).abs() < 1e-12);
    }

    #[test]
    fn single_player_run_cap_does_not_divide_by_zero() {
        let tw = teamwork_factor(&TeamworkInputs {
            players: 1,
            runs_per_week: 7.0,
            ..inputs(0.0)
        });
        assert!(tw.is_finite());
    }

    #[test]
    fn btv_formulas() {
        assert_eq!(btv_rate(20.0, 100.0, RuleSet::Legacy), 225.0);
        assert_eq!(btv_rate(20.0, 0.0, RuleSet::Alternate), 150.0);
        assert_eq!(btv_per_sec(20.0, 0.0, RuleSet::Legacy), 1.5);
    }

    #[test]
    fn contribution_regimes_meet_at_break() {
        let below = contribution_factor(CONTRIBUTION_BREAK);
        let above = contribution_factor(CONTRIBUTION_BREAK + 1e-9);
        assert!((below - above).abs() < 1e-3);
    }

    #[test]
    fn known_score() {
        // 2 * 4 * 1.5 * 1.095 * 1.05 * 187.5 = 2586.9375
        let cs = contract_score(1.0, 259_200.0, 129_600.0, 0.5);
        assert_eq!(cs, 2587);
    }

    #[test]
    fn late_completion_gets_no_speed_bonus() {
        let on_time = contract_score(1.0, 259_200.0, 259_200.0, 0.0);
        let late = contract_score(1.0, 259_200.0, 400_000.0, 0.0);
        assert_eq!(on_time, late);
    }

    #[test]
    fn degenerate_inputs_do_not_panic() {
        assert!(contract_score(f64::NAN, 0.0, f64::INFINITY, 0.0) > 0);
    }

    proptest! {
        #[test]
        fn score_is_deterministic(r in 0.0f64..20.0, tc in 0.0f64..300_000.0, tw in 0.0f64..1.0) {
            let a = contract_score(r, 259_200.0, tc, tw);
            let b = contract_score(r, 259_200.0, tc, tw);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn faster_is_never_worse(
            r in 0.1f64..10.0,
            t1 in 0.0f64..259_200.0,
            dt in 0.0f64..100_000.0
        ) {
            let fast = contract_score(r, 259_200.0, t1, 0.5);
            let slow = contract_score(r, 259_200.0, t1 + dt, 0.5);
            prop_assert!(fast >= slow);
        }

        #[test]
        fn teamwork_in_unit_interval(
            b in -5.0f64..50.0,
            n in 1usize..40,
            runs in 0.0f64..50.0,
            tok in 0.0f64..20.0
        ) {
            let tw = teamwork_factor(&TeamworkInputs {
                btv_ratio: b,
                players: n,
                duration_days: 3.0,
                runs_per_week: runs,
                tokens_gifted: tok,
                rules: RuleSet::Legacy,
            });
            prop_assert!((0.0..=1.0).contains(&tw));
        }
    }
}
