//! Active-learning iteration loop
//!
//! Each step refits the surrogate on the labeled set, optionally rolls back to
//! the previous model, records quality metrics, scores the remaining
//! candidates, selects a batch and labels it through the data provider.

use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use super::config::ActiveLearningConfig;
use super::guard;
use super::result::{ActiveLearningResult, RESULT_VERSION};
use crate::acquisition::engine::AcquisitionEngine;
use crate::data::dataset::{CandidateSet, LabeledSet, RowId};
use crate::data::provider::{DataProvider, EvaluationSplits};
use crate::diagnostics::penalties::PenaltyAudit;
use crate::diagnostics::scoring::r2_score;
use crate::diagnostics::{HeldOutScores, IterationMetrics, MetricsTable, TimingStats};
use crate::error::{ActiveLearningError, AlResult, SurrogateError};
use crate::selection::traits::{BatchSelector, ScoredCandidates};
use crate::surrogate::traits::SurrogateModel;

/// Result of a single step
#[derive(Debug)]
pub enum StepResult {
    /// An iteration finished and its batch was labeled
    Iteration {
        /// Index of the iteration that finished
        iteration: usize,
        /// Rows labeled on this iteration
        selected: Vec<RowId>,
        /// The regression guard kept the previous model
        rolled_back: bool,
    },
    /// All iterations have run
    Complete(Box<ActiveLearningResult>),
}

/// Active-learning loop
///
/// Owns the labeled and candidate sets, the surrogate and the previous-model
/// slot used by the regression guard.
///
/// # Example
///
/// ```rust,ignore
/// let mut al = ActiveLearning::builder()
///     .provider(problem)
///     .surrogate(RidgeEnsemble::default())
///     .selector(DiversitySelector::new())
///     .config(ActiveLearningConfig::default().with_iterations(3))
///     .build()?;
///
/// loop {
///     match al.step(&mut rng)? {
///         StepResult::Iteration { iteration, .. } => println!("iteration {}", iteration),
///         StepResult::Complete(result) => break,
///     }
/// }
/// ```
pub struct ActiveLearning<P, S, B> {
    config: ActiveLearningConfig,
    provider: P,
    surrogate: S,
    selector: B,
    engine: AcquisitionEngine,
    labeled: LabeledSet,
    candidates: CandidateSet,
    previous: Option<S>,
    iteration: usize,
    metrics: MetricsTable,
    selections: Vec<Vec<RowId>>,
    penalties: PenaltyAudit,
}

impl ActiveLearning<(), (), ()> {
    /// Create a builder
    pub fn builder() -> ActiveLearningBuilder<(), (), ()> {
        ActiveLearningBuilder::new()
    }
}

impl<P, S, B> ActiveLearning<P, S, B>
where
    P: DataProvider,
    S: SurrogateModel + Clone,
    B: BatchSelector,
{
    fn new(
        config: ActiveLearningConfig,
        provider: P,
        surrogate: S,
        selector: B,
        engine: AcquisitionEngine,
    ) -> Self {
        let labeled = provider.labeled_set().clone();
        let candidates = provider.candidate_set().clone();
        Self {
            config,
            provider,
            surrogate,
            selector,
            engine,
            labeled,
            candidates,
            previous: None,
            iteration: 0,
            metrics: MetricsTable::new(),
            selections: Vec::new(),
            penalties: PenaltyAudit::new(),
        }
    }

    /// Run configuration
    pub fn config(&self) -> &ActiveLearningConfig {
        &self.config
    }

    /// Number of completed iterations
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Check whether every configured iteration has run
    pub fn is_complete(&self) -> bool {
        self.iteration >= self.config.iterations
    }

    /// Current labeled set
    pub fn labeled(&self) -> &LabeledSet {
        &self.labeled
    }

    /// Remaining candidates
    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    /// Surrogate used on the most recent iteration
    pub fn surrogate(&self) -> &S {
        &self.surrogate
    }

    /// Metrics recorded so far
    pub fn metrics(&self) -> &MetricsTable {
        &self.metrics
    }

    /// Selected rows per iteration so far
    pub fn selections(&self) -> &[Vec<RowId>] {
        &self.selections
    }

    /// Penalty audit so far
    pub fn penalties(&self) -> &PenaltyAudit {
        &self.penalties
    }

    /// Data provider
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Snapshot of the run's current state
    pub fn result(&self) -> ActiveLearningResult {
        ActiveLearningResult {
            version: RESULT_VERSION,
            metrics: self.metrics.clone(),
            selections: self.selections.clone(),
            penalties: self.penalties.clone(),
            labeled: self.labeled.clone(),
            candidates: self.candidates.clone(),
        }
    }

    /// Run one iteration, or report completion
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> AlResult<StepResult> {
        if self.is_complete() {
            return Ok(StepResult::Complete(Box::new(self.result())));
        }

        let i = self.iteration;
        let batch_size = self.config.batch_size;
        if batch_size > self.candidates.len() {
            return Err(ActiveLearningError::InsufficientCandidates {
                requested: batch_size,
                available: self.candidates.len(),
            });
        }
        let started = Instant::now();

        // Fit
        let hints = self.config.unit_hints();
        self.surrogate
            .fit(self.labeled.features(), self.labeled.outputs(), hints.as_ref())?;
        self.surrogate.artifact_mut().advance(i);
        let fit_time = started.elapsed();

        // Regression guard
        let mut rolled_back = false;
        let mut guard_maes = None;
        if self.config.regression_guard {
            if let Some(previous) = &self.previous {
                let outcome = guard::compare(previous, &self.surrogate, &self.labeled)?;
                guard_maes = Some((outcome.previous_mae, outcome.current_mae));
                if outcome.rolled_back {
                    warn!(
                        iteration = i,
                        previous_mae = outcome.previous_mae,
                        current_mae = outcome.current_mae,
                        "new surrogate is worse, keeping previous model"
                    );
                    let mut restored = previous.clone();
                    restored.artifact_mut().advance(i);
                    self.surrogate = restored;
                    rolled_back = true;
                }
            }
        }

        // Quality
        let held_out = self.held_out_scores()?;
        let existing_score = self.score_on(&self.labeled)?;
        let ensemble = self.surrogate.ensemble();
        let best = ensemble.best().ok_or_else(|| {
            SurrogateError::FitFailed("surrogate produced an empty ensemble".to_string())
        })?;
        let (loss_other, score_other) = ensemble
            .secondary()
            .map(|m| (m.loss, m.score))
            .unwrap_or((f64::NAN, f64::NAN));
        let formula = best.formula.clone();
        let (loss, score) = (best.loss, best.score);

        // Acquisition
        let acquisition_start = Instant::now();
        let objective = self.engine.objective(
            self.candidates.features(),
            &self.labeled,
            &self.surrogate,
            &self.config.acquisition,
            &self.config.batch_config,
            &mut *rng,
        )?;
        let acquisition_time = acquisition_start.elapsed();

        // Selection
        let selection_start = Instant::now();
        let scored = ScoredCandidates::new(
            self.candidates.ids().to_vec(),
            objective,
            self.candidates.features().to_vec(),
        )?;
        let outcome = self
            .selector
            .select(&scored, batch_size, &self.config.selection, &mut *rng)?;
        outcome.validate(&scored, batch_size)?;
        let selection_time = selection_start.elapsed();
        debug!(iteration = i, selected = ?outcome.selected, "batch selected");
        self.penalties.extend_prefixed(i + 1, outcome.penalties);

        // Augment
        for (id, features) in self.candidates.take(&outcome.selected)? {
            let output = self.provider.label(id, &features)?;
            self.labeled.push(id, features, output)?;
        }
        self.previous = Some(self.surrogate.clone());

        let timing = TimingStats::new()
            .with_fit(fit_time)
            .with_acquisition(acquisition_time)
            .with_selection(selection_time)
            .with_total(started.elapsed());

        info!(
            iteration = i,
            formula = %formula,
            loss,
            held_out = %held_out,
            labeled = self.labeled.len(),
            remaining = self.candidates.len(),
            rolled_back,
            "iteration complete"
        );

        self.metrics.record(IterationMetrics {
            iteration: i,
            formula,
            held_out,
            existing_score,
            loss,
            score,
            loss_other,
            score_other,
            rolled_back,
            previous_mae: guard_maes.map(|(p, _)| p),
            current_mae: guard_maes.map(|(_, c)| c),
            timing,
        });
        self.selections.push(outcome.selected.clone());
        self.iteration += 1;

        Ok(StepResult::Iteration {
            iteration: i,
            selected: outcome.selected,
            rolled_back,
        })
    }

    /// Run every remaining iteration
    pub fn run<R: Rng>(&mut self, rng: &mut R) -> AlResult<ActiveLearningResult> {
        loop {
            if let StepResult::Complete(result) = self.step(rng)? {
                return Ok(*result);
            }
        }
    }

    fn score_on(&self, set: &LabeledSet) -> Result<f64, SurrogateError> {
        if set.is_empty() {
            return Ok(f64::NAN);
        }
        let predicted = self.surrogate.predict(set.features(), None)?;
        Ok(r2_score(set.outputs(), &predicted))
    }

    fn held_out_scores(&self) -> Result<HeldOutScores, SurrogateError> {
        Ok(match self.provider.evaluation_splits() {
            EvaluationSplits::Split {
                extrapolation,
                interpolation,
            } => HeldOutScores::Split {
                extrapolation: self.score_on(extrapolation)?,
                interpolation: self.score_on(interpolation)?,
            },
            EvaluationSplits::Holdout(holdout) => HeldOutScores::Holdout(self.score_on(holdout)?),
        })
    }
}

/// Builder for [`ActiveLearning`]
pub struct ActiveLearningBuilder<P, S, B> {
    config: ActiveLearningConfig,
    provider: Option<P>,
    surrogate: Option<S>,
    selector: Option<B>,
    engine: Option<AcquisitionEngine>,
}

impl<P, S, B> ActiveLearningBuilder<P, S, B> {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ActiveLearningConfig::default(),
            provider: None,
            surrogate: None,
            selector: None,
            engine: None,
        }
    }

    /// Set the whole configuration
    pub fn config(mut self, config: ActiveLearningConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the number of iterations
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.config.iterations = iterations;
        self
    }

    /// Set the batch size
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.config.batch_size = batch_size;
        self
    }

    /// Replace the acquisition engine
    pub fn engine(mut self, engine: AcquisitionEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Set the data provider
    pub fn provider<NewP>(self, provider: NewP) -> ActiveLearningBuilder<NewP, S, B> {
        ActiveLearningBuilder {
            config: self.config,
            provider: Some(provider),
            surrogate: self.surrogate,
            selector: self.selector,
            engine: self.engine,
        }
    }

    /// Set the surrogate model
    pub fn surrogate<NewS>(self, surrogate: NewS) -> ActiveLearningBuilder<P, NewS, B> {
        ActiveLearningBuilder {
            config: self.config,
            provider: self.provider,
            surrogate: Some(surrogate),
            selector: self.selector,
            engine: self.engine,
        }
    }

    /// Set the batch selector
    pub fn selector<NewB>(self, selector: NewB) -> ActiveLearningBuilder<P, S, NewB> {
        ActiveLearningBuilder {
            config: self.config,
            provider: self.provider,
            surrogate: self.surrogate,
            selector: Some(selector),
            engine: self.engine,
        }
    }
}

impl Default for ActiveLearningBuilder<(), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, S, B> ActiveLearningBuilder<P, S, B>
where
    P: DataProvider,
    S: SurrogateModel + Clone,
    B: BatchSelector,
{
    /// Build the loop
    pub fn build(self) -> AlResult<ActiveLearning<P, S, B>> {
        let provider = self
            .provider
            .ok_or_else(|| ActiveLearningError::Configuration("Data provider required".into()))?;
        let surrogate = self
            .surrogate
            .ok_or_else(|| ActiveLearningError::Configuration("Surrogate model required".into()))?;
        let selector = self
            .selector
            .ok_or_else(|| ActiveLearningError::Configuration("Batch selector required".into()))?;
        self.config.validate()?;

        Ok(ActiveLearning::new(
            self.config,
            provider,
            surrogate,
            selector,
            self.engine.unwrap_or_default(),
        ))
    }
}
