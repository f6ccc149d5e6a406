// Power score: weighted blend of the method scores, squashed to (-100, 100).

use ranker_core::config::PowerWeights;
use tracing::warn;

use crate::metrics::streak_discount;

const POWER_SCALE: f64 = 100.0;
const BLEND_SQUASH: f64 = 0.5;

/// Method scores for the window's teams, all aligned with `team_ids()`.
#[derive(Debug, Clone, Default)]
pub struct MethodScores {
    pub dom: Vec<f64>,
    pub lsq: Vec<f64>,
    pub col: Vec<f64>,
    pub awp: Vec<f64>,
    pub sos: Vec<f64>,
    pub luck: Vec<f64>,
    pub cons: Vec<f64>,
    pub streak: Vec<i32>,
}

/// `100 * tanh(sum / 0.5)` of the weighted method scores, per team.
pub fn power_scores(scores: &MethodScores, weights: &PowerWeights) -> Vec<f64> {
    let total = weights.sum();
    if !(0.9..=1.1).contains(&total) {
        warn!("power weights sum to {total:.3}, expected roughly 1.0");
    }

    (0..scores.dom.len())
        .map(|i| {
            let blended = weights.dom * scores.dom[i]
                + weights.lsq * scores.lsq[i]
                + weights.col * scores.col[i]
                + weights.awp * scores.awp[i]
                + weights.sos * scores.sos[i]
                + weights.luck * scores.luck[i]
                + weights.cons * scores.cons[i]
                + weights.streak * streak_discount(scores.streak[i]);
            POWER_SCALE * (blended / BLEND_SQUASH).tanh()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(value: f64, streak: i32) -> MethodScores {
        MethodScores {
            dom: vec![value],
            lsq: vec![value],
            col: vec![value],
            awp: vec![value],
            sos: vec![value],
            luck: vec![value],
            cons: vec![value],
            streak: vec![streak],
        }
    }

    #[test]
    fn all_ones_with_default_weights() {
        let power = power_scores(&single(1.0, 0), &PowerWeights::default());
        // Weights sum to 1.0 -> 100 * tanh(2).
        assert!((power[0] - 100.0 * 2.0_f64.tanh()).abs() < 1e-9);
    }

    #[test]
    fn streak_moves_power_both_ways() {
        let w = PowerWeights::default();
        let base = power_scores(&single(0.5, 0), &w)[0];
        let hot = power_scores(&single(0.5, 3), &w)[0];
        let cold = power_scores(&single(0.5, -3), &w)[0];
        assert!(hot > base);
        assert!(cold < base);
    }

    #[test]
    fn power_is_bounded() {
        let mut w = PowerWeights::default();
        w.dom = 50.0;
        let power = power_scores(&single(10.0, 0), &w);
        assert!(power[0] <= 100.0);
    }
}
