//! Seeded synthetic signals that approximate a [`PatternStats`] target.
//!
//! Used to seed the knowledge base without recorded signals. The output is a
//! statistical approximation: the base noise follows the target mean and
//! variance midpoints, peaks and a zero-crossing sinusoid are layered on top.

use crate::stats::PatternStats;
use crate::{Error, Result};
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

pub const DEFAULT_SAMPLE_COUNT: usize = 200;
pub const DEFAULT_SEED: u64 = 42;

/// Samples overwritten with `±peak` when a peak target is present
pub const PEAK_COUNT: usize = 5;

const ZCR_FREQUENCY_SCALE: f64 = 10.0;
const ZCR_TIME_SPAN: f64 = 20.0;
const ZCR_AMPLITUDE: f64 = 0.1;

/// Generate `sample_count` samples for `target`.
///
/// Identical `(target, sample_count, seed)` always yields the identical
/// sequence.
pub fn generate(target: &PatternStats, sample_count: usize, seed: u64) -> Result<Vec<f32>> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mean = target.mean.map_or(0.0, |r| r.midpoint());
    let std = target.variance.map_or(1.0, |r| r.midpoint().max(0.0).sqrt());
    let normal = Normal::new(mean, std)
        .map_err(|e| Error::InvalidPatternStats(format!("mean {} std {}: {}", mean, std, e)))?;

    let mut data: Vec<f64> = (0..sample_count).map(|_| normal.sample(&mut rng)).collect();

    if let Some(peak) = target.peak {
        let magnitude = peak.midpoint();
        let amount = PEAK_COUNT.min(sample_count);
        for i in index::sample(&mut rng, sample_count, amount).into_iter() {
            data[i] = if rng.random_bool(0.5) { magnitude } else { -magnitude };
        }
    }

    if let Some(rate) = target.zero_crossing_rate {
        let frequency = rate.midpoint() * ZCR_FREQUENCY_SCALE;
        let step = if sample_count > 1 {
            ZCR_TIME_SPAN / (sample_count - 1) as f64
        } else {
            0.0
        };
        for (i, x) in data.iter_mut().enumerate() {
            let t = i as f64 * step;
            *x += ZCR_AMPLITUDE * (2.0 * std::f64::consts::PI * frequency * t).sin();
        }
    }

    Ok(data.into_iter().map(|x| x as f32).collect())
}
