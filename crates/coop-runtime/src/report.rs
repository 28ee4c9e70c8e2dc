//! Result records handed back to callers.

use coop_econ::StoneAllocation;
use serde::{Deserialize, Serialize};

use crate::state::SwapSnapshot;

/// Engine state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Habitats filling, nobody boosting yet.
    PreBoost,
    /// At least one player boosting.
    Boosting,
    /// Every habitat full; delivery runs at a fixed coop rate.
    SteadyState,
    Completed,
    Failed,
}

/// Final numbers for one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    pub name: String,
    /// Eggs per hour.
    pub lay_rate: f64,
    /// Eggs per hour.
    pub ship_rate: f64,
    pub stones: StoneAllocation,
    pub population: f64,
    pub contribution_ratio: f64,
    /// Seconds from start until the player boosted.
    pub time_to_boost: Option<f64>,
    pub btv_ratio: f64,
    pub teamwork: f64,
    pub score: u64,
    pub before_swap: Option<SwapSnapshot>,
}

/// Coop-level aggregates of a completed run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoopReport {
    /// Coop delivery in eggs per hour at completion.
    pub aggregate_rate: f64,
    /// Seconds from start.
    pub completion_time: f64,
    pub max_score: u64,
    pub mean_score: f64,
    pub total_deflector_percent: f64,
    /// Deflector percent the tightest player could lose and stay ship-capped.
    pub safe_deflector_drop_percent: f64,
    /// When every habitat was full, if that happened before completion.
    pub steady_state_at: Option<f64>,
    /// Solved shield swap instant, if anyone wore a shield.
    pub siab_swap_at: Option<f64>,
    pub players: Vec<PlayerResult>,
}

impl CoopReport {
    pub fn min_score(&self) -> u64 {
        self.players.iter().map(|p| p.score).min().unwrap_or(0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// Simulated time hit the contract length during stepping.
    DurationExceeded,
    /// Steady-state projection lands after the contract ends.
    ProjectedPastDuration,
    /// Stepping stopped on the iteration cap.
    TickLimit,
}

/// Terminal failure. Carries enough to explain the miss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FailureReport {
    pub reason: FailureReason,
    pub elapsed: f64,
    pub delivered: f64,
    pub target: f64,
    pub projected_completion: Option<f64>,
    pub summary: String,
}

/// Exactly one per run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Completed(CoopReport),
    Failed(FailureReport),
}

impl Outcome {
    pub fn phase(&self) -> Phase {
        match self {
            Outcome::Completed(_) => Phase::Completed,
            Outcome::Failed(_) => Phase::Failed,
        }
    }

    pub fn report(&self) -> Option<&CoopReport> {
        match self {
            Outcome::Completed(r) => Some(r),
            Outcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// `1h 02m 03s` style duration.
pub fn format_duration(secs: f64) -> String {
    if !secs.is_finite() || secs < 0.0 {
        return "-".to_string();
    }
    let total = secs.round() as u64;
    let (d, h, m, s) = (
        total / 86_400,
        total % 86_400 / 3_600,
        total % 3_600 / 60,
        total % 60,
    );
    if d > 0 {
        format!("{d}d {h:02}h {m:02}m")
    } else if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else {
        format!("{m}m {s:02}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_format() {
        assert_eq!(format_duration(59.0), "0m 59s");
        assert_eq!(format_duration(3_723.0), "1h 02m 03s");
        assert_eq!(format_duration(90_061.0), "1d 01h 01m");
        assert_eq!(format_duration(f64::NAN), "-");
    }

    #[test]
    fn failed_outcome_serializes_with_status_tag() {
        let out = Outcome::Failed(FailureReport {
            reason: FailureReason::DurationExceeded,
            elapsed: 10.0,
            delivered: 1.0,
            target: 2.0,
            projected_completion: None,
            summary: "x".into(),
        });
        let s = serde_json::to_string(&out).unwrap();
        assert!(s.contains("\"status\":\"failed\""));
        let back: Outcome = serde_json::from_str(&s).unwrap();
        assert_eq!(back, out);
    }
}
