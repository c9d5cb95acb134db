//! Ridge-regression ensemble surrogate
//!
//! A lightweight formula-producing surrogate: one closed-form polynomial
//! ridge regression per regularization strength on a geometric grid. Strong
//! regularization yields short, biased formulas; weak regularization yields
//! longer, tighter ones, so the members disagree most where data is sparse.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use super::artifact::ArtifactPath;
use super::traits::{Ensemble, EnsembleMember, SurrogateModel, UnitHints};
use crate::error::SurrogateError;

/// Coefficients below this magnitude are treated as inactive terms
const ACTIVE_TERM_EPS: f64 = 1e-10;

/// Configuration for [`RidgeEnsemble`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeEnsembleConfig {
    /// Smallest regularization strength
    pub alpha_min: f64,
    /// Largest regularization strength
    pub alpha_max: f64,
    /// Number of ensemble members
    pub num_models: usize,
    /// Highest power of each feature in the basis
    pub degree: usize,
}

impl Default for RidgeEnsembleConfig {
    fn default() -> Self {
        Self {
            alpha_min: 1e-4,
            alpha_max: 1e3,
            num_models: 20,
            degree: 2,
        }
    }
}

impl RidgeEnsembleConfig {
    /// Regularization strengths, geometrically spaced
    pub fn alphas(&self) -> Vec<f64> {
        match self.num_models {
            0 => vec![],
            1 => vec![self.alpha_min],
            n => {
                let (lo, hi) = (self.alpha_min.ln(), self.alpha_max.ln());
                (0..n)
                    .map(|i| (lo + (hi - lo) * i as f64 / (n - 1) as f64).exp())
                    .collect()
            }
        }
    }
}

/// Ensemble of polynomial ridge regressions
#[derive(Clone, Debug)]
pub struct RidgeEnsemble {
    config: RidgeEnsembleConfig,
    artifact: ArtifactPath,
    units: Option<UnitHints>,
    dimension: Option<usize>,
    coefficients: Vec<Vec<f64>>,
    ensemble: Ensemble,
}

impl RidgeEnsemble {
    /// Create an unfitted ensemble
    pub fn new(config: RidgeEnsembleConfig) -> Self {
        Self {
            config,
            artifact: ArtifactPath::default(),
            units: None,
            dimension: None,
            coefficients: Vec::new(),
            ensemble: Ensemble::default(),
        }
    }

    /// Set the artifact path
    pub fn with_artifact(mut self, artifact: impl Into<ArtifactPath>) -> Self {
        self.artifact = artifact.into();
        self
    }

    /// Unit hints seen in the last fit
    pub fn unit_hints(&self) -> Option<&UnitHints> {
        self.units.as_ref()
    }

    /// Configuration
    pub fn config(&self) -> &RidgeEnsembleConfig {
        &self.config
    }

    fn basis(&self, x: &[f64]) -> Vec<f64> {
        let mut row = Vec::with_capacity(1 + x.len() * self.config.degree);
        row.push(1.0);
        for &xi in x {
            for p in 1..=self.config.degree {
                row.push(xi.powi(p as i32));
            }
        }
        row
    }

    fn term_name(&self, term: usize) -> String {
        let degree = self.config.degree.max(1);
        let feature = (term - 1) / degree;
        let power = (term - 1) % degree + 1;
        if power == 1 {
            format!("x{}", feature)
        } else {
            format!("x{}^{}", feature, power)
        }
    }

    fn render(&self, coefficients: &[f64]) -> String {
        let mut formula = format!("{:.6}", coefficients.first().copied().unwrap_or(0.0));
        for (term, &c) in coefficients.iter().enumerate().skip(1) {
            if c.abs() < ACTIVE_TERM_EPS {
                continue;
            }
            let sign = if c < 0.0 { '-' } else { '+' };
            formula.push_str(&format!(" {} {:.6}*{}", sign, c.abs(), self.term_name(term)));
        }
        formula
    }
}

impl Default for RidgeEnsemble {
    fn default() -> Self {
        Self::new(RidgeEnsembleConfig::default())
    }
}

fn check_rows(features: &[Vec<f64>], dimension: usize) -> Result<(), SurrogateError> {
    match features.iter().find(|row| row.len() != dimension) {
        Some(row) => Err(SurrogateError::DimensionMismatch {
            expected: dimension,
            actual: row.len(),
        }),
        None => Ok(()),
    }
}

impl SurrogateModel for RidgeEnsemble {
    fn fit(
        &mut self,
        features: &[Vec<f64>],
        output: &[f64],
        units: Option<&UnitHints>,
    ) -> Result<(), SurrogateError> {
        let dimension = features
            .first()
            .map(Vec::len)
            .ok_or_else(|| SurrogateError::FitFailed("no training rows".to_string()))?;
        check_rows(features, dimension)?;
        if output.len() != features.len() {
            return Err(SurrogateError::FitFailed(format!(
                "{} outputs for {} rows",
                output.len(),
                features.len()
            )));
        }
        if self.config.num_models == 0 {
            return Err(SurrogateError::FitFailed(
                "ensemble needs at least one member".to_string(),
            ));
        }
        self.dimension = Some(dimension);

        let rows: Vec<Vec<f64>> = features.iter().map(|x| self.basis(x)).collect();
        let n = rows.len();
        let terms = rows.first().map_or(1, Vec::len);
        let design = DMatrix::from_fn(n, terms, |i, j| rows[i][j]);
        let y = DVector::from_column_slice(output);
        let gram = design.transpose() * &design;
        let moment = design.transpose() * &y;

        let mean_y = output.iter().sum::<f64>() / n as f64;
        let var_y = output.iter().map(|v| (v - mean_y).powi(2)).sum::<f64>() / n as f64;

        let mut coefficients = Vec::with_capacity(self.config.num_models);
        let mut members = Vec::with_capacity(self.config.num_models);
        for alpha in self.config.alphas() {
            let mut system = gram.clone();
            for j in 1..terms {
                system[(j, j)] += alpha;
            }
            let solution = match system.clone().cholesky() {
                Some(chol) => chol.solve(&moment),
                None => system.lu().solve(&moment).ok_or_else(|| {
                    SurrogateError::FitFailed(format!("singular system at alpha = {:e}", alpha))
                })?,
            };

            let residual = &design * &solution - &y;
            let loss = residual.norm_squared() / n as f64;
            let score = if var_y > 0.0 {
                (1.0 - loss / var_y).max(0.0)
            } else if loss <= ACTIVE_TERM_EPS {
                1.0
            } else {
                0.0
            };
            let coef: Vec<f64> = solution.iter().copied().collect();
            members.push(EnsembleMember {
                formula: self.render(&coef),
                complexity: coef.iter().filter(|c| c.abs() >= ACTIVE_TERM_EPS).count(),
                loss,
                score,
            });
            coefficients.push(coef);
        }

        // Highest score wins; ties go to the simpler formula
        let mut best = 0;
        for (i, m) in members.iter().enumerate().skip(1) {
            let current = &members[best];
            let better = m.score > current.score + 1e-12
                || ((m.score - current.score).abs() <= 1e-12 && m.complexity < current.complexity);
            if better {
                best = i;
            }
        }

        self.ensemble = Ensemble::new(members, best)?;
        self.coefficients = coefficients;
        self.units = units.cloned();
        Ok(())
    }

    fn predict(
        &self,
        features: &[Vec<f64>],
        member: Option<usize>,
    ) -> Result<Vec<f64>, SurrogateError> {
        let dimension = self.dimension.ok_or(SurrogateError::NotFitted)?;
        check_rows(features, dimension)?;
        let index = member.unwrap_or_else(|| self.ensemble.best_index());
        let coef = self
            .coefficients
            .get(index)
            .ok_or(SurrogateError::MemberOutOfRange {
                index,
                len: self.coefficients.len(),
            })?;
        Ok(features
            .iter()
            .map(|x| self.basis(x).iter().zip(coef).map(|(b, c)| b * c).sum())
            .collect())
    }

    fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    fn artifact(&self) -> &ArtifactPath {
        &self.artifact
    }

    fn artifact_mut(&mut self) -> &mut ArtifactPath {
        &mut self.artifact
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quadratic_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (-10..=10).map(|i| vec![i as f64 / 5.0]).collect();
        let y = x.iter().map(|r| 1.0 + 2.0 * r[0] - 0.5 * r[0] * r[0]).collect();
        (x, y)
    }

    #[test]
    fn test_alphas_geometric() {
        let config = RidgeEnsembleConfig {
            alpha_min: 1e-2,
            alpha_max: 1e2,
            num_models: 5,
            degree: 1,
        };
        let alphas = config.alphas();
        assert_eq!(alphas.len(), 5);
        assert_relative_eq!(alphas[0], 1e-2, epsilon = 1e-12);
        assert_relative_eq!(alphas[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(alphas[4], 1e2, epsilon = 1e-9);
    }

    #[test]
    fn test_predict_before_fit() {
        let model = RidgeEnsemble::default();
        assert_eq!(
            model.predict(&[vec![0.0]], None).unwrap_err(),
            SurrogateError::NotFitted
        );
    }

    #[test]
    fn test_fit_recovers_quadratic() {
        let (x, y) = quadratic_data();
        let mut model = RidgeEnsemble::default();
        model.fit(&x, &y, None).unwrap();

        assert_eq!(model.ensemble().len(), 20);
        let best = model.ensemble().best().unwrap();
        assert!(best.score > 0.999, "score = {}", best.score);

        let pred = model.predict(&[vec![1.0]], None).unwrap();
        assert_relative_eq!(pred[0], 2.5, epsilon = 1e-2);
    }

    #[test]
    fn test_members_disagree() {
        let (x, y) = quadratic_data();
        let mut model = RidgeEnsemble::default();
        model.fit(&x, &y, None).unwrap();

        let weak = model.predict(&[vec![3.0]], Some(0)).unwrap()[0];
        let strong = model.predict(&[vec![3.0]], Some(19)).unwrap()[0];
        assert!((weak - strong).abs() > 1e-3);
        assert!(model.ensemble().get(0).unwrap().loss < model.ensemble().get(19).unwrap().loss);
    }

    #[test]
    fn test_member_out_of_range_and_dimension_mismatch() {
        let (x, y) = quadratic_data();
        let mut model = RidgeEnsemble::default();
        model.fit(&x, &y, None).unwrap();
        assert!(matches!(
            model.predict(&[vec![0.0]], Some(99)),
            Err(SurrogateError::MemberOutOfRange { index: 99, .. })
        ));
        assert!(matches!(
            model.predict(&[vec![0.0, 1.0]], None),
            Err(SurrogateError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_formula_mentions_active_terms_and_units_are_kept() {
        let (x, y) = quadratic_data();
        let hints = UnitHints {
            features: vec!["m".to_string()],
            output: "J".to_string(),
        };
        let mut model = RidgeEnsemble::default();
        model.fit(&x, &y, Some(&hints)).unwrap();
        let formula = &model.ensemble().best().unwrap().formula;
        assert!(formula.contains("x0^2"), "{}", formula);
        assert_eq!(model.unit_hints(), Some(&hints));
    }
}
