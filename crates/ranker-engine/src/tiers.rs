// Tier assignment from local minima of a kernel density over power scores.

use ranker_core::config::TierConfig;
use serde::Serialize;
use statrs::distribution::{Continuous, Normal};
use tracing::debug;

pub const MAX_TIER: u32 = 5;
const GRID_PADDING: f64 = 10.0;
const GRID_POINTS_PER_TEAM: usize = 10;

/// Density estimate evaluated on an evenly spaced grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityCurve {
    pub grid: Vec<f64>,
    pub density: Vec<f64>,
    /// Grid positions of the local minima, descending.
    pub minima: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TierAssignment {
    /// Tier per team, same order as the input scores. 1 is best.
    pub tiers: Vec<u32>,
    /// `None` when there were too few distinct scores to estimate a density.
    pub curve: Option<DensityCurve>,
}

/// Sample standard deviation (n - 1 denominator).
fn sample_std(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
}

fn linspace(start: f64, end: f64, points: usize) -> Vec<f64> {
    match points {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (end - start) / (points - 1) as f64;
            (0..points).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Indices `i` where `values[i]` is strictly below every neighbour within
/// `order` positions. Out-of-range neighbours clip to the nearest edge, so the
/// first and last points are never minima.
pub fn relative_minima(values: &[f64], order: usize) -> Vec<usize> {
    let n = values.len();
    (0..n)
        .filter(|&i| {
            (1..=order).all(|k| {
                let right = (i + k).min(n - 1);
                let left = i.saturating_sub(k);
                values[i] < values[right] && values[i] < values[left]
            })
        })
        .collect()
}

/// Gaussian KDE of `scores` with kernel width `bandwidth * sample std`.
pub fn density_curve(scores: &[f64], config: &TierConfig) -> Option<DensityCurve> {
    if scores.len() < 2 {
        return None;
    }
    let std = sample_std(scores);
    let kernel = Normal::new(0.0, config.bandwidth * std).ok()?;

    let lo = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let grid = linspace(lo - GRID_PADDING, hi + GRID_PADDING, GRID_POINTS_PER_TEAM * scores.len());

    let n = scores.len() as f64;
    let density: Vec<f64> = grid
        .iter()
        .map(|&x| scores.iter().map(|&s| kernel.pdf(x - s)).sum::<f64>() / n)
        .collect();

    let mut minima: Vec<f64> = relative_minima(&density, config.order)
        .into_iter()
        .map(|i| grid[i])
        .collect();
    minima.sort_by(|a, b| b.total_cmp(a));

    Some(DensityCurve {
        grid,
        density,
        minima,
    })
}

/// Assign tiers: one plus the number of density minima above the team's
/// power, capped at [`MAX_TIER`].
pub fn classify(scores: &[f64], config: &TierConfig) -> TierAssignment {
    let Some(curve) = density_curve(scores, config) else {
        return TierAssignment {
            tiers: vec![1; scores.len()],
            curve: None,
        };
    };

    let tiers = scores
        .iter()
        .map(|&p| {
            let above = curve.minima.iter().filter(|&&m| m > p).count() as u32;
            (1 + above).min(MAX_TIER)
        })
        .collect();

    debug!("tier density has {} minima", curve.minima.len());
    TierAssignment {
        tiers,
        curve: Some(curve),
    }
}
