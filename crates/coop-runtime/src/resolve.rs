//! Closed-form end of a run.
//!
//! Once every habitat is full the coop rate only changes when shields come
//! off, so instead of stepping further the shield swap instant and the
//! completion time are solved for directly.

use coop_econ::{contract_score, teamwork_factor, TeamworkInputs, BTV_CAP, TOKEN_TERM_CAP};
use tracing::{debug, info};

use crate::engine::SimulationContext;
use crate::report::{
    format_duration, CoopReport, FailureReason, FailureReport, Outcome, Phase, PlayerResult,
};
use crate::state::PlayerState;

/// Denominators smaller than this are treated as degenerate.
const SOLVE_EPSILON: f64 = 1e-12;

/// Eggs per second, with a zero or broken rate replaced by 1.
fn per_sec(rate_per_hour: f64) -> f64 {
    let r = rate_per_hour / 3600.0;
    if r.is_finite() && r > 0.0 {
        r
    } else {
        1.0
    }
}

/// `numer / denom` clamped to `[0, naive]`.
///
/// A degenerate denominator means the shield's value does not change with the
/// swap time: keep it to the end when the numerator says it still helps,
/// otherwise drop it at once.
pub fn solve_clamped(numer: f64, denom: f64, naive: f64) -> f64 {
    let naive = if naive.is_finite() { naive.max(0.0) } else { 0.0 };
    if !denom.is_finite() || denom.abs() < SOLVE_EPSILON {
        return if numer > 0.0 { naive } else { 0.0 };
    }
    let t = numer / denom;
    if t.is_finite() {
        t.clamp(0.0, naive)
    } else {
        0.0
    }
}

/// Seconds from now until the coop should take its shields off.
///
/// For each shield wearer, with `a`/`b` its btv rate with and without the
/// shield, `r_on`/`r_off` the coop rate before and after the swap and `e` the
/// remaining eggs, the shield is worth keeping until the final btv ratio would
/// land exactly on the cap:
///
/// `btv0 + a*T1 + b*(e - r_on*T1)/r_off = cap * (t0 + T1 + (e - r_on*T1)/r_off)`
///
/// The coop swaps at the latest of those instants.
pub(crate) fn solve_siab_swap(ctx: &SimulationContext<'_>) -> f64 {
    let rules = ctx.params.rules;
    let remaining = (ctx.params.target_eggs - ctx.delivered()).max(0.0);
    let r_on = per_sec(ctx.coop_rate());
    let naive = remaining / r_on;

    let mut after: Vec<PlayerState> = ctx.players.clone();
    for p in &mut after {
        p.swap_siab();
    }
    let total_after: f64 = after.iter().map(|p| p.deflector_percent).sum();
    for p in &mut after {
        p.refresh_rates(total_after);
    }
    let r_off = per_sec(after.iter().map(|p| p.rates.delivery_rate).sum());

    let t0 = ctx.elapsed;
    let mut swap_in = 0.0f64;
    for (i, (p, q)) in ctx.players.iter().zip(&after).enumerate() {
        if !p.siab_active {
            continue;
        }
        let a = p.btv_per_sec(rules);
        let b = q.btv_per_sec(rules);
        let numer = BTV_CAP * t0 - p.btv - (b - BTV_CAP) * remaining / r_off;
        let denom = a - BTV_CAP - (b - BTV_CAP) * r_on / r_off;
        let t1 = solve_clamped(numer, denom, naive);
        debug!(player = i, a, b, numer, denom, t1, "shield swap solve");
        swap_in = swap_in.max(t1);
    }
    swap_in
}

/// Finish a run whose stepping phase has ended.
pub(crate) fn finish(mut ctx: SimulationContext<'_>) -> Outcome {
    let target = ctx.params.target_eggs;
    let duration = ctx.params.duration_secs;

    if ctx.delivered() >= target {
        let completion = ctx.elapsed;
        return complete(ctx, completion, None);
    }
    if ctx.elapsed >= duration {
        return fail(&mut ctx, FailureReason::DurationExceeded, None);
    }
    if !ctx.all_full() {
        debug_assert!(ctx.tick_limit_hit());
        return fail(&mut ctx, FailureReason::TickLimit, None);
    }

    let mut siab_swap_at = None;
    if ctx.players.iter().any(|p| p.siab_active) {
        let t1 = solve_siab_swap(&ctx);
        ctx.advance(t1);
        for p in &mut ctx.players {
            p.swap_siab();
        }
        ctx.refresh_all();
        siab_swap_at = Some(ctx.elapsed);
        debug!(at = ctx.elapsed, "shields swapped");
    }

    let remaining = (target - ctx.delivered()).max(0.0);
    let completion = ctx.elapsed + remaining / per_sec(ctx.coop_rate());
    if !completion.is_finite() || completion > duration {
        let projected = completion.is_finite().then_some(completion);
        return fail(&mut ctx, FailureReason::ProjectedPastDuration, projected);
    }
    let rest = completion - ctx.elapsed;
    ctx.advance(rest);
    complete(ctx, completion, siab_swap_at)
}

fn fail(
    ctx: &mut SimulationContext<'_>,
    reason: FailureReason,
    projected_completion: Option<f64>,
) -> Outcome {
    ctx.phase = Phase::Failed;
    let delivered = ctx.delivered();
    let target = ctx.params.target_eggs;
    let summary = match projected_completion {
        Some(t) => format!(
            "contract not completed: projected {} exceeds {}",
            format_duration(t),
            format_duration(ctx.params.duration_secs)
        ),
        None => format!(
            "contract not completed: {:.3e} of {:.3e} eggs after {}",
            delivered,
            target,
            format_duration(ctx.elapsed)
        ),
    };
    info!(?reason, elapsed = ctx.elapsed, delivered, target, "run failed");
    Outcome::Failed(FailureReport {
        reason,
        elapsed: ctx.elapsed,
        delivered,
        target,
        projected_completion,
        summary,
    })
}

fn complete(
    mut ctx: SimulationContext<'_>,
    completion: f64,
    siab_swap_at: Option<f64>,
) -> Outcome {
    ctx.phase = Phase::Completed;
    let params = ctx.params;
    let n = ctx.players.len();
    let share = params.target_eggs / n.max(1) as f64;

    let players: Vec<PlayerResult> = ctx
        .configs
        .iter()
        .zip(&ctx.players)
        .map(|(cfg, p)| {
            let contribution_ratio = if share > 0.0 { p.delivered / share } else { 0.0 };
            let btv_ratio = if completion > 0.0 { p.btv / completion } else { 0.0 };
            let tokens_gifted = if cfg.sink {
                TOKEN_TERM_CAP
            } else {
                f64::from(cfg.tokens_gifted)
            };
            let teamwork = teamwork_factor(&TeamworkInputs {
                btv_ratio,
                players: n,
                duration_days: params.duration_days(),
                runs_per_week: params.chicken_runs_per_week,
                tokens_gifted,
                rules: params.rules,
            });
            PlayerResult {
                name: cfg.name.clone(),
                lay_rate: p.rates.lay_rate,
                ship_rate: p.rates.ship_rate,
                stones: p.rates.stones,
                population: p.population,
                contribution_ratio,
                time_to_boost: p.boost_started_at,
                btv_ratio,
                teamwork,
                score: contract_score(
                    contribution_ratio,
                    params.duration_secs,
                    completion,
                    teamwork,
                ),
                before_swap: p.before_swap,
            }
        })
        .collect();

    let max_score = players.iter().map(|p| p.score).max().unwrap_or(0);
    let mean_score = if players.is_empty() {
        0.0
    } else {
        players.iter().map(|p| p.score as f64).sum::<f64>() / players.len() as f64
    };
    let report = CoopReport {
        aggregate_rate: ctx.coop_rate(),
        completion_time: completion,
        max_score,
        mean_score,
        total_deflector_percent: ctx.total_deflector,
        safe_deflector_drop_percent: safe_deflector_drop(&ctx.players, ctx.total_deflector),
        steady_state_at: ctx.steady_state_at,
        siab_swap_at,
        players,
    };
    info!(
        completion = %format_duration(completion),
        max_score,
        mean_score,
        "run completed"
    );
    Outcome::Completed(report)
}

/// Deflector percent that could be removed from the coop while the tightest
/// player (lowest lay/ship ratio) stays ship-capped.
pub fn safe_deflector_drop(players: &[PlayerState], total_deflector: f64) -> f64 {
    let tightest = players.iter().min_by(|a, b| {
        a.rates
            .lay_ship_ratio()
            .total_cmp(&b.rates.lay_ship_ratio())
    });
    let Some(p) = tightest else {
        return 0.0;
    };
    if p.rates.lay_ship_ratio() < 1.0 {
        return 0.0;
    }
    let other = total_deflector - p.deflector_percent;
    let undeflected = p.rates.lay_rate / (1.0 + other / 100.0);
    if !(undeflected.is_finite() && undeflected > 0.0) {
        return 0.0;
    }
    let needed = (p.rates.ship_rate / undeflected - 1.0) * 100.0;
    (other - needed).max(0.0)
}
