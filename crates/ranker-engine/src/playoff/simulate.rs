// Monte Carlo trials of the rest of the regular season.

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use ranker_core::season::Division;
use statrs::distribution::{ContinuousCDF, Normal};

use super::standings::{select_field, Standing};

/// Weekly score distribution for one team. A team with no spread (or no
/// games) always scores its mean.
#[derive(Debug, Clone)]
pub struct ScoreModel {
    mean: f64,
    std_dev: f64,
    dist: Option<Normal>,
}

impl ScoreModel {
    /// Maximum-likelihood normal fit: sample mean and population std.
    pub fn fit(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::fixed(0.0);
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let std_dev = (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
        match Normal::new(mean, std_dev) {
            Ok(dist) => Self {
                mean,
                std_dev,
                dist: Some(dist),
            },
            Err(_) => Self::fixed(mean),
        }
    }

    pub fn fixed(mean: f64) -> Self {
        Self {
            mean,
            std_dev: 0.0,
            dist: None,
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    pub fn is_fixed(&self) -> bool {
        self.dist.is_none()
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.dist {
            Some(dist) => dist.sample(rng),
            None => self.mean,
        }
    }
}

/// Probability that `team` outscores `opponent`:
/// `1 - Phi(0; mu_t - mu_o, sqrt(sd_t^2 + sd_o^2))`.
pub fn win_probability(team: &ScoreModel, opponent: &ScoreModel) -> f64 {
    let diff = team.mean() - opponent.mean();
    let spread = (team.std_dev().powi(2) + opponent.std_dev().powi(2)).sqrt();
    match Normal::new(diff, spread) {
        Ok(dist) => 1.0 - dist.cdf(0.0),
        Err(_) if diff > 0.0 => 1.0,
        Err(_) if diff < 0.0 => 0.0,
        Err(_) => 0.5,
    }
}

/// Everything a trial needs, shared read-only across threads.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub standings: Vec<Standing>,
    /// Unplayed games as (home, away) positions into `standings`.
    pub remaining: Vec<(usize, usize)>,
    pub models: Vec<ScoreModel>,
    pub divisions: Vec<Division>,
    pub spots: usize,
}

/// Per-team counts of trials ending in each kind of playoff berth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counts {
    pub trials: u64,
    pub division: Vec<u64>,
    pub wildcard: Vec<u64>,
}

impl Counts {
    pub fn new(teams: usize) -> Self {
        Self {
            trials: 0,
            division: vec![0; teams],
            wildcard: vec![0; teams],
        }
    }

    pub fn merge(mut self, other: Counts) -> Counts {
        self.trials += other.trials;
        for (a, b) in self.division.iter_mut().zip(&other.division) {
            *a += b;
        }
        for (a, b) in self.wildcard.iter_mut().zip(&other.wildcard) {
            *a += b;
        }
        self
    }
}

impl Scenario {
    fn run_trial<R: Rng>(&self, rng: &mut R, counts: &mut Counts) {
        let mut table = self.standings.clone();
        for &(h, a) in &self.remaining {
            let home = self.models[h].sample(rng);
            let away = self.models[a].sample(rng);
            table[h].points_for += home;
            table[a].points_for += away;
            // Exact ties go to the home team.
            if home >= away {
                table[h].wins += 1;
            } else {
                table[a].wins += 1;
            }
        }

        let field = select_field(&table, &self.divisions, self.spots);
        for i in field.division_winners {
            counts.division[i] += 1;
        }
        for i in field.wildcards {
            counts.wildcard[i] += 1;
        }
        counts.trials += 1;
    }

    /// Run `trials` trials on one RNG stream.
    pub fn run_chunk(&self, seed: u64, trials: usize) -> Counts {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = Counts::new(self.standings.len());
        for _ in 0..trials {
            self.run_trial(&mut rng, &mut counts);
        }
        counts
    }

    /// Run `trials` trials split into chunks of `chunk_size`, in parallel.
    /// Chunk `k` of the whole run (starting at `first_chunk`) draws from
    /// `base_seed + k`, so results do not depend on thread scheduling.
    pub fn run_batch(&self, base_seed: u64, first_chunk: u64, trials: usize, chunk_size: usize) -> Counts {
        let chunk_size = chunk_size.max(1);
        let chunks = trials.div_ceil(chunk_size);
        (0..chunks)
            .into_par_iter()
            .map(|c| {
                let size = chunk_size.min(trials - c * chunk_size);
                self.run_chunk(base_seed.wrapping_add(first_chunk + c as u64), size)
            })
            .reduce(|| Counts::new(self.standings.len()), Counts::merge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> Scenario {
        let standings = (0..4)
            .map(|i| Standing {
                team_id: i + 1,
                division_id: 0,
                wins: 0,
                points_for: 0.0,
            })
            .collect();
        Scenario {
            standings,
            remaining: vec![(0, 1), (2, 3), (0, 2), (1, 3)],
            models: vec![
                ScoreModel::fit(&[120.0, 110.0, 130.0]),
                ScoreModel::fit(&[100.0, 90.0, 110.0]),
                ScoreModel::fit(&[105.0, 95.0, 100.0]),
                ScoreModel::fit(&[80.0, 85.0, 90.0]),
            ],
            divisions: vec![],
            spots: 2,
        }
    }

    #[test]
    fn fit_uses_population_std() {
        let model = ScoreModel::fit(&[90.0, 110.0]);
        assert_eq!(model.mean(), 100.0);
        assert_eq!(model.std_dev(), 10.0);
        let flat = ScoreModel::fit(&[95.0, 95.0]);
        assert!(flat.is_fixed());
        assert_eq!(flat.mean(), 95.0);
    }

    #[test]
    fn win_probability_is_symmetric() {
        let a = ScoreModel::fit(&[120.0, 100.0]);
        let b = ScoreModel::fit(&[105.0, 95.0]);
        let p = win_probability(&a, &b);
        assert!(p > 0.5);
        assert!((p + win_probability(&b, &a) - 1.0).abs() < 1e-12);
        assert_eq!(win_probability(&ScoreModel::fixed(90.0), &ScoreModel::fixed(80.0)), 1.0);
        assert_eq!(win_probability(&ScoreModel::fixed(80.0), &ScoreModel::fixed(80.0)), 0.5);
    }

    #[test]
    fn batches_are_reproducible_and_fill_every_spot() {
        let s = scenario();
        let a = s.run_batch(7, 0, 2_500, 1_000);
        let b = s.run_batch(7, 0, 2_500, 1_000);
        assert_eq!(a, b);
        assert_eq!(a.trials, 2_500);
        let berths: u64 = a.wildcard.iter().sum();
        assert_eq!(berths, 2 * 2_500);
    }

    #[test]
    fn chunking_matches_sequential_chunks() {
        let s = scenario();
        let parallel = s.run_batch(11, 0, 300, 100);
        let sequential = (0..3)
            .map(|c| s.run_chunk(11 + c, 100))
            .fold(Counts::new(4), Counts::merge);
        assert_eq!(parallel, sequential);
    }
}
