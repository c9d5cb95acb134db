//! Benchmark target functions
//!
//! Standard test functions used as ground truth by [`TestFunction`].
//!
//! [`TestFunction`]: crate::data::test_function::TestFunction

use std::f64::consts::PI;

use crate::data::bounds::MultiBounds;

/// A synthetic target that labels points on demand
pub trait SyntheticFunction: Send + Sync {
    /// Name of the function
    fn name(&self) -> &'static str;

    /// Number of input features
    fn dimension(&self) -> usize;

    /// Conventional domain for the function
    fn bounds(&self) -> MultiBounds;

    /// Evaluate the function at a point
    fn evaluate(&self, x: &[f64]) -> f64;
}

/// Sphere function: f(x) = Σxᵢ²
///
/// Smooth and convex; a surrogate should recover it exactly.
#[derive(Clone, Debug)]
pub struct Sphere {
    dimension: usize,
}

impl Sphere {
    /// Create a new Sphere function
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl SyntheticFunction for Sphere {
    fn name(&self) -> &'static str {
        "Sphere"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn bounds(&self) -> MultiBounds {
        MultiBounds::symmetric(5.12, self.dimension)
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        x.iter().map(|xi| xi * xi).sum()
    }
}

/// Rastrigin function: f(x) = 10n + Σ(xᵢ² - 10cos(2πxᵢ))
#[derive(Clone, Debug)]
pub struct Rastrigin {
    dimension: usize,
}

impl Rastrigin {
    /// Create a new Rastrigin function
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl SyntheticFunction for Rastrigin {
    fn name(&self) -> &'static str {
        "Rastrigin"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn bounds(&self) -> MultiBounds {
        MultiBounds::symmetric(5.12, self.dimension)
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let a = 10.0;
        let n = x.len() as f64;
        a * n
            + x.iter()
                .map(|xi| xi * xi - a * (2.0 * PI * xi).cos())
                .sum::<f64>()
    }
}

/// Rosenbrock function: f(x) = Σ[100(xᵢ₊₁-xᵢ²)² + (1-xᵢ)²]
#[derive(Clone, Debug)]
pub struct Rosenbrock {
    dimension: usize,
}

impl Rosenbrock {
    /// Create a new Rosenbrock function
    ///
    /// # Panics
    /// Panics if `dimension < 2`
    pub fn new(dimension: usize) -> Self {
        assert!(dimension >= 2, "Rosenbrock requires at least 2 dimensions");
        Self { dimension }
    }
}

impl SyntheticFunction for Rosenbrock {
    fn name(&self) -> &'static str {
        "Rosenbrock"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn bounds(&self) -> MultiBounds {
        MultiBounds::uniform((-2.0, 2.0).into(), self.dimension)
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        x.windows(2)
            .map(|w| 100.0 * (w[1] - w[0] * w[0]).powi(2) + (1.0 - w[0]).powi(2))
            .sum()
    }
}

/// Ackley function
#[derive(Clone, Debug)]
pub struct Ackley {
    dimension: usize,
    a: f64,
    b: f64,
    c: f64,
}

impl Ackley {
    /// Create a new Ackley function with default parameters
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            a: 20.0,
            b: 0.2,
            c: 2.0 * PI,
        }
    }
}

impl SyntheticFunction for Ackley {
    fn name(&self) -> &'static str {
        "Ackley"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn bounds(&self) -> MultiBounds {
        MultiBounds::symmetric(32.768, self.dimension)
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        let n = x.len() as f64;
        let sum_sq = x.iter().map(|xi| xi * xi).sum::<f64>();
        let sum_cos = x.iter().map(|xi| (self.c * xi).cos()).sum::<f64>();

        -self.a * (-self.b * (sum_sq / n).sqrt()).exp() - (sum_cos / n).exp()
            + self.a
            + std::f64::consts::E
    }
}

/// Wraps a closure as a [`SyntheticFunction`]
pub struct FnTarget<F> {
    name: &'static str,
    bounds: MultiBounds,
    function: F,
}

impl<F> FnTarget<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    /// Create a target from a closure over the given domain
    pub fn new(name: &'static str, bounds: MultiBounds, function: F) -> Self {
        Self {
            name,
            bounds,
            function,
        }
    }
}

impl<F> SyntheticFunction for FnTarget<F>
where
    F: Fn(&[f64]) -> f64 + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn dimension(&self) -> usize {
        self.bounds.dimension()
    }

    fn bounds(&self) -> MultiBounds {
        self.bounds.clone()
    }

    fn evaluate(&self, x: &[f64]) -> f64 {
        (self.function)(x)
    }
}
