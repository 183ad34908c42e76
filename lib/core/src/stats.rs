//! Statistic targets carried by knowledge entries, and the statistics
//! measured from a raw signal.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Closed range `[low, high]`, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct StatRange {
    low: f64,
    high: f64,
}

impl StatRange {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        if !low.is_finite() || !high.is_finite() {
            return Err(Error::InvalidPatternStats(format!(
                "range bounds must be finite, got [{}, {}]",
                low, high
            )));
        }
        if low > high {
            return Err(Error::InvalidPatternStats(format!(
                "range low {} exceeds high {}",
                low, high
            )));
        }
        Ok(Self { low, high })
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.low && value <= self.high
    }
}

impl TryFrom<[f64; 2]> for StatRange {
    type Error = Error;

    fn try_from(bounds: [f64; 2]) -> Result<Self> {
        StatRange::new(bounds[0], bounds[1])
    }
}

impl From<StatRange> for [f64; 2] {
    fn from(range: StatRange) -> Self {
        [range.low, range.high]
    }
}

/// Target statistic ranges a synthetic pattern was generated against.
///
/// Kept for provenance; matching never reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternStats {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<StatRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<StatRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub peak: Option<StatRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlier_count: Option<StatRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero_crossing_rate: Option<StatRange>,
}

impl PatternStats {
    /// Parse the loosely-typed stats object stored alongside a record.
    /// `null` means no targets.
    pub fn from_value(value: &serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value.clone()).map_err(|e| Error::InvalidPatternStats(e.to_string()))
    }

    pub fn is_empty(&self) -> bool {
        self.mean.is_none()
            && self.variance.is_none()
            && self.peak.is_none()
            && self.outlier_count.is_none()
            && self.zero_crossing_rate.is_none()
    }
}

/// Summary statistics of a raw sample sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalStats {
    pub mean: f64,
    /// Population variance
    pub variance: f64,
    /// Largest absolute sample
    pub peak: f64,
    pub min: f64,
    pub max: f64,
    /// Samples further than three standard deviations from the mean
    pub outlier_count: usize,
    /// Sign changes between consecutive samples per sample
    pub zero_crossing_rate: f64,
}

impl SignalStats {
    pub fn compute(samples: &[f32]) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptySignal);
        }
        let n = samples.len() as f64;
        let mean = samples.iter().map(|&x| x as f64).sum::<f64>() / n;
        let variance = samples
            .iter()
            .map(|&x| {
                let d = x as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let std = variance.sqrt();

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut peak = 0.0f64;
        for &x in samples {
            let x = x as f64;
            min = min.min(x);
            max = max.max(x);
            peak = peak.max(x.abs());
        }

        let outlier_count = samples
            .iter()
            .filter(|&&x| (x as f64 - mean).abs() > 3.0 * std)
            .count();

        // sign(0) is 0, so touching zero counts as a change just like crossing it
        let crossings = samples
            .windows(2)
            .filter(|w| sign(w[0]) != sign(w[1]))
            .count();

        Ok(Self {
            mean,
            variance,
            peak,
            min,
            max,
            outlier_count,
            zero_crossing_rate: crossings as f64 / n,
        })
    }
}

#[inline]
fn sign(x: f32) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}
