//! Model selection and training
//!
//! Grid-searches every requested pipeline with stratified CV, scores the
//! refitted winners on a stratified hold-out, and persists the best one as
//! the workflow's pipeline artifact.

use super::cross_validation::{stratified_holdout, CrossValidator, CvScores, CvStrategy};
use super::grid::{ParamGrid, TrialParams};
use crate::config::Config;
use crate::data::DataLoader;
use crate::error::{LifeboatError, Result};
use crate::features;
use crate::pipeline::{
    build_pipelines, default_registry, save_pipeline, ArtifactMetadata, FittedPipeline,
    ModelPipeline, ProcessingPipeline,
};
use crate::preprocessing::ColumnTransformer;
use crate::training::metrics::ClassificationMetrics;
use ndarray::Array1;
use polars::prelude::*;
use tracing::{info, warn};

/// Outcome for one candidate model
#[derive(Debug, Clone)]
pub struct ModelResult {
    pub name: String,
    pub cv: CvScores,
    pub best_params: TrialParams,
    pub holdout_accuracy: f64,
}

/// Outcome of a training run
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub results: Vec<ModelResult>,
    pub best_model: String,
    pub best_accuracy: f64,
    /// False when an accuracy threshold was supplied and the winner missed it
    pub persisted: bool,
    pub artifact_path: String,
}

/// Reject a threshold outside `[0, 1]` before any work happens
pub fn validate_threshold(threshold: Option<f64>) -> Result<()> {
    if let Some(value) = threshold {
        if !(0.0..=1.0).contains(&value) {
            return Err(LifeboatError::InvalidParameter {
                name: "acc-threshold".to_string(),
                value: value.to_string(),
                reason: "must be a number between 0 and 1".to_string(),
            });
        }
    }
    Ok(())
}

/// Training driver
pub struct Trainer {
    config: Config,
}

impl Trainer {
    /// Create a trainer over the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Train the named models and persist the winner.
    ///
    /// An empty `model_names` trains every model enabled in the
    /// configuration. A threshold outside `[0, 1]` aborts before any data
    /// is read.
    pub fn train(&self, model_names: &[String], threshold: Option<f64>) -> Result<TrainReport> {
        validate_threshold(threshold)?;

        let entries = self.select_entries(model_names)?;

        let raw = DataLoader::new().load_csv(&self.config.data.train_path)?;
        let engineered = features::engineer_features(&raw)?;
        let (x_df, y) = features::split_features(&engineered, &self.config.features.target)?;
        info!(
            rows = x_df.height(),
            columns = x_df.width(),
            "training data loaded"
        );

        let (train_idx, holdout_idx) = stratified_holdout(
            &y,
            self.config.training.validation_split,
            self.config.training.seed,
        )?;
        let train_df = take_rows(&x_df, &train_idx)?;
        let y_train = take_values(&y, &train_idx);
        let holdout_df = take_rows(&x_df, &holdout_idx)?;
        let y_holdout = take_values(&y, &holdout_idx);

        let processing = ProcessingPipeline::new(ColumnTransformer::new(
            self.config.features.groups.clone(),
        ))
        .with_selection(self.config.features.select_k_best);

        let pipelines = build_pipelines(&processing, &entries);

        let mut results: Vec<ModelResult> = Vec::with_capacity(pipelines.len());
        let mut fitted: Vec<(String, ModelPipeline)> = Vec::with_capacity(pipelines.len());

        for (name, (pipeline, grid)) in pipelines {
            let (best_params, cv) =
                self.grid_search(&pipeline, &grid, &train_df, &y_train)?;

            let mut winner = pipeline;
            winner.apply_params(&best_params)?;
            winner.fit(&train_df, &y_train)?;
            let holdout_accuracy = winner.score(&holdout_df, &y_holdout)?;

            info!(
                model = %name,
                cv_accuracy = cv.mean,
                holdout_accuracy,
                "model evaluated"
            );

            results.push(ModelResult {
                name: name.clone(),
                cv,
                best_params,
                holdout_accuracy,
            });
            fitted.push((name, winner));
        }

        let best = results
            .iter()
            .max_by(|a, b| {
                a.holdout_accuracy
                    .partial_cmp(&b.holdout_accuracy)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .ok_or_else(|| LifeboatError::TrainingError("no models trained".to_string()))?
            .clone();

        let persisted = match threshold {
            Some(t) if best.holdout_accuracy < t => {
                warn!(
                    model = %best.name,
                    accuracy = best.holdout_accuracy,
                    threshold = t,
                    "winner below the accuracy threshold, not persisting"
                );
                false
            }
            _ => true,
        };

        if persisted {
            let (_, winner) = fitted
                .into_iter()
                .find(|(name, _)| *name == best.name)
                .expect("winner is one of the fitted pipelines");
            self.persist(winner, &best, &y_holdout, &holdout_df)?;
        }

        Ok(TrainReport {
            best_model: best.name.clone(),
            best_accuracy: best.holdout_accuracy,
            persisted,
            artifact_path: self.config.data.artifact_path.clone(),
            results,
        })
    }

    fn select_entries(
        &self,
        model_names: &[String],
    ) -> Result<Vec<crate::pipeline::RegistryEntry>> {
        let registry = default_registry();
        let requested: Vec<String> = if model_names.is_empty() {
            self.config.training.models.clone()
        } else {
            model_names.to_vec()
        };

        requested
            .iter()
            .map(|name| {
                registry
                    .iter()
                    .find(|entry| entry.name == *name)
                    .cloned()
                    .ok_or_else(|| LifeboatError::InvalidParameter {
                        name: "model".to_string(),
                        value: name.clone(),
                        reason: format!(
                            "unknown model, expected one of: {}",
                            registry
                                .iter()
                                .map(|e| e.name.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    })
            })
            .collect()
    }

    fn grid_search(
        &self,
        pipeline: &ModelPipeline,
        grid: &ParamGrid,
        df: &DataFrame,
        y: &Array1<f64>,
    ) -> Result<(TrialParams, CvScores)> {
        let cv = CrossValidator::new(CvStrategy::StratifiedKFold {
            n_splits: self.config.training.cv_folds,
            shuffle: true,
        })
        .with_random_state(self.config.training.seed);
        let splits = cv.split(df.height(), Some(y))?;

        let mut best: Option<(TrialParams, CvScores)> = None;

        for params in grid.candidates() {
            let mut scores = Vec::with_capacity(splits.len());
            for split in &splits {
                let mut candidate = pipeline.clone();
                candidate.apply_params(&params)?;

                let fold_train = take_rows(df, &split.train_indices)?;
                let fold_y = take_values(y, &split.train_indices);
                candidate.fit(&fold_train, &fold_y)?;

                let fold_test = take_rows(df, &split.test_indices)?;
                let fold_y_test = take_values(y, &split.test_indices);
                scores.push(candidate.score(&fold_test, &fold_y_test)?);
            }

            let summary = CvScores::from_scores(scores);
            let improves = best
                .as_ref()
                .map_or(true, |(_, current)| summary.mean > current.mean);
            if improves {
                best = Some((params, summary));
            }
        }

        best.ok_or_else(|| LifeboatError::TrainingError("empty parameter grid".to_string()))
    }

    fn persist(
        &self,
        winner: ModelPipeline,
        best: &ModelResult,
        y_holdout: &Array1<f64>,
        holdout_df: &DataFrame,
    ) -> Result<()> {
        let predictions = winner.predict(holdout_df)?;
        let metrics = ClassificationMetrics::compute(y_holdout, &predictions)?;

        let metadata = ArtifactMetadata {
            model_name: best.name.clone(),
            trained_at: chrono::Utc::now().to_rfc3339(),
            feature_columns: winner.output_columns(),
            accuracy: metrics.accuracy,
        };
        let fitted = FittedPipeline {
            pipeline: winner,
            target: self.config.features.target.clone(),
            metrics,
        };

        save_pipeline(&fitted, metadata, &self.config.data.artifact_path)?;
        info!(
            model = %best.name,
            path = %self.config.data.artifact_path,
            "pipeline artifact written"
        );
        Ok(())
    }
}

/// Select rows of a frame by position
pub(crate) fn take_rows(df: &DataFrame, indices: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "idx".into(),
        indices.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

/// Select entries of a target vector by position
pub(crate) fn take_values(y: &Array1<f64>, indices: &[usize]) -> Array1<f64> {
    Array1::from_vec(indices.iter().map(|&i| y[i]).collect())
}
