//! Bounds for feature domains
//!
//! This module provides bounds types describing the box a synthetic data
//! provider samples from, and the enlarged box used for extrapolation tests.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// Bounds for a single feature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl Bounds {
    /// Create new bounds
    ///
    /// # Panics
    /// Panics if min > max
    pub fn new(min: f64, max: f64) -> Self {
        assert!(
            min <= max,
            "Invalid bounds: min ({}) must be <= max ({})",
            min,
            max
        );
        Self { min, max }
    }

    /// Create new bounds, returning an error instead of panicking
    pub fn try_new(min: f64, max: f64) -> Result<Self, DataError> {
        if min.is_finite() && max.is_finite() && min <= max {
            Ok(Self { min, max })
        } else {
            Err(DataError::InvalidConfiguration(format!(
                "invalid bounds [{}, {}]",
                min, max
            )))
        }
    }

    /// Create symmetric bounds centered at 0
    pub fn symmetric(half_width: f64) -> Self {
        Self::new(-half_width, half_width)
    }

    /// Create unit bounds [0, 1]
    pub fn unit() -> Self {
        Self::new(0.0, 1.0)
    }

    /// Get the range (max - min)
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Get the center point
    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Check if a value is within bounds
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Widen the bounds by `fraction` of the range on each side
    pub fn expand(&self, fraction: f64) -> Self {
        let pad = self.range() * fraction.max(0.0);
        Self {
            min: self.min - pad,
            max: self.max + pad,
        }
    }

    /// Draw a uniform sample
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.range() <= 0.0 {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }
}

impl From<(f64, f64)> for Bounds {
    fn from((min, max): (f64, f64)) -> Self {
        Self::new(min, max)
    }
}

/// Multi-dimensional bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiBounds {
    /// Bounds for each feature
    pub bounds: Vec<Bounds>,
}

impl MultiBounds {
    /// Create new multi-dimensional bounds
    pub fn new(bounds: Vec<Bounds>) -> Self {
        Self { bounds }
    }

    /// Create bounds from parallel min/max vectors
    pub fn from_min_max(min_vals: &[f64], max_vals: &[f64]) -> Result<Self, DataError> {
        if min_vals.len() != max_vals.len() {
            return Err(DataError::DimensionMismatch {
                expected: min_vals.len(),
                actual: max_vals.len(),
            });
        }
        min_vals
            .iter()
            .zip(max_vals)
            .map(|(&lo, &hi)| Bounds::try_new(lo, hi))
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }

    /// Create uniform bounds for all dimensions
    pub fn uniform(bound: Bounds, dimension: usize) -> Self {
        Self {
            bounds: vec![bound; dimension],
        }
    }

    /// Create symmetric bounds for all dimensions
    pub fn symmetric(half_width: f64, dimension: usize) -> Self {
        Self::uniform(Bounds::symmetric(half_width), dimension)
    }

    /// Get number of dimensions
    pub fn dimension(&self) -> usize {
        self.bounds.len()
    }

    /// Get bounds for a specific dimension
    pub fn get(&self, index: usize) -> Option<&Bounds> {
        self.bounds.get(index)
    }

    /// Check if all values are within bounds
    pub fn contains_vec(&self, values: &[f64]) -> bool {
        values.len() == self.bounds.len()
            && values
                .iter()
                .zip(&self.bounds)
                .all(|(&v, b)| b.contains(v))
    }

    /// Widen every dimension by `fraction` of its range on each side
    pub fn expand(&self, fraction: f64) -> Self {
        self.bounds.iter().map(|b| b.expand(fraction)).collect()
    }

    /// Draw a uniform point inside the box
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.bounds.iter().map(|b| b.sample(rng)).collect()
    }

    /// Draw a uniform point inside `self.expand(fraction)` but outside `self`
    ///
    /// One coordinate is pushed into an outer margin; the rest are uniform in
    /// the enlarged box, so the point always lies outside the original box.
    pub fn sample_outside<R: Rng + ?Sized>(&self, fraction: f64, rng: &mut R) -> Vec<f64> {
        let outer = self.expand(fraction);
        let mut point = outer.sample(rng);
        let axes: Vec<usize> = (0..self.bounds.len())
            .filter(|&i| self.bounds[i].range() > 0.0)
            .collect();
        if axes.is_empty() || fraction <= 0.0 {
            return point;
        }
        let axis = axes[rng.gen_range(0..axes.len())];
        if let (Some(inner), Some(wide)) = (self.bounds.get(axis), outer.bounds.get(axis)) {
            let pad = inner.min - wide.min;
            let offset = rng.gen_range(0.0..pad);
            point[axis] = if rng.gen::<bool>() {
                inner.max + pad - offset
            } else {
                wide.min + offset
            };
        }
        point
    }
}

impl FromIterator<Bounds> for MultiBounds {
    fn from_iter<I: IntoIterator<Item = Bounds>>(iter: I) -> Self {
        Self {
            bounds: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<(f64, f64)> for MultiBounds {
    fn from_iter<I: IntoIterator<Item = (f64, f64)>>(iter: I) -> Self {
        Self {
            bounds: iter.into_iter().map(Bounds::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    #[should_panic(expected = "Invalid bounds")]
    fn test_bounds_invalid() {
        Bounds::new(5.0, -5.0);
    }

    #[test]
    fn test_bounds_try_new_rejects_inverted_and_nan() {
        assert!(Bounds::try_new(1.0, 0.0).is_err());
        assert!(Bounds::try_new(f64::NAN, 0.0).is_err());
        assert!(Bounds::try_new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_bounds_expand() {
        let b = Bounds::new(0.0, 10.0).expand(0.25);
        assert_eq!(b.min, -2.5);
        assert_eq!(b.max, 12.5);
        assert_eq!(Bounds::unit().center(), 0.5);
    }

    #[test]
    fn test_degenerate_bounds_sample() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Bounds::new(3.0, 3.0).sample(&mut rng), 3.0);
    }

    #[test]
    fn test_multi_bounds_from_min_max() {
        let mb = MultiBounds::from_min_max(&[0.0, -1.0], &[1.0, 1.0]).unwrap();
        assert_eq!(mb.dimension(), 2);
        assert_eq!(mb.get(1), Some(&Bounds::new(-1.0, 1.0)));

        let err = MultiBounds::from_min_max(&[0.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, DataError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_multi_bounds_contains_vec() {
        let mb = MultiBounds::symmetric(5.0, 3);
        assert!(mb.contains_vec(&[0.0, 0.0, 0.0]));
        assert!(mb.contains_vec(&[-5.0, 5.0, 0.0]));
        assert!(!mb.contains_vec(&[-6.0, 0.0, 0.0]));
        assert!(!mb.contains_vec(&[0.0, 0.0]));
    }

    #[test]
    fn test_sample_inside_and_outside() {
        let mut rng = StdRng::seed_from_u64(42);
        let mb: MultiBounds = vec![(0.0, 1.0), (-2.0, 2.0)].into_iter().collect();
        let outer = mb.expand(0.5);
        for _ in 0..200 {
            let inside = mb.sample(&mut rng);
            assert!(mb.contains_vec(&inside));

            let outside = mb.sample_outside(0.5, &mut rng);
            assert!(!mb.contains_vec(&outside), "{:?} should be outside", outside);
            assert!(outer.contains_vec(&outside));
        }
    }
}
