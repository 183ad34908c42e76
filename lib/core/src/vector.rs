use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tolerance for the unit-norm invariant on indexed and query vectors.
pub const UNIT_NORM_TOLERANCE: f32 = 1e-5;

/// A dense embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Vector {
    data: Vec<f32>,
}

impl Vector {
    #[inline]
    #[must_use]
    pub fn new(data: Vec<f32>) -> Self {
        Self { data }
    }

    #[inline]
    #[must_use]
    pub fn from_slice(data: &[f32]) -> Self {
        Self {
            data: data.to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn dim(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    #[must_use]
    pub fn into_inner(self) -> Vec<f32> {
        self.data
    }

    #[inline]
    pub fn norm(&self) -> f32 {
        crate::simd::norm_simd(&self.data)
    }

    /// Index of the first NaN or infinite component, if any
    pub fn first_non_finite(&self) -> Option<usize> {
        self.data.iter().position(|x| !x.is_finite())
    }

    /// Inner product; equals cosine similarity when both sides are unit length
    #[inline]
    pub fn dot(&self, other: &Vector) -> f32 {
        crate::simd::dot_product_simd(&self.data, &other.data)
    }

    #[inline]
    pub fn is_unit(&self) -> bool {
        (self.norm() - 1.0).abs() <= UNIT_NORM_TOLERANCE
    }

    /// Scale to unit L2 norm in place.
    ///
    /// Only an all-zero vector is a `ZeroNormVector`; `context` names the
    /// vector in the error. The norm is taken over components scaled by the
    /// largest magnitude and summed in f64, so very large or very small
    /// finite values still normalize.
    pub fn normalize(&mut self, context: &str) -> Result<()> {
        if let Some(pos) = self.first_non_finite() {
            return Err(Error::MalformedEmbedding {
                id: context.to_string(),
                reason: format!("component {} is not finite", pos),
            });
        }
        let max_abs = self.data.iter().fold(0.0f64, |m, &x| m.max((x as f64).abs()));
        if max_abs == 0.0 {
            return Err(Error::ZeroNormVector {
                context: context.to_string(),
            });
        }
        let scaled_norm = self
            .data
            .iter()
            .map(|&x| {
                let s = x as f64 / max_abs;
                s * s
            })
            .sum::<f64>()
            .sqrt();
        let divisor = max_abs * scaled_norm;
        for x in &mut self.data {
            *x = (*x as f64 / divisor) as f32;
        }
        Ok(())
    }

    /// Normalized copy
    pub fn normalized(&self, context: &str) -> Result<Self> {
        let mut v = self.clone();
        v.normalize(context)?;
        Ok(v)
    }
}

impl From<Vec<f32>> for Vector {
    fn from(data: Vec<f32>) -> Self {
        Self::new(data)
    }
}
