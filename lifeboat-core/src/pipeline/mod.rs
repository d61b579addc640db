//! End-to-end pipelines and the model registry
//!
//! A `ModelPipeline` chains the shared processing stage (column transformer
//! plus optional k-best selection) with one candidate classifier. The
//! factory stamps out one pipeline per registry entry, cloning the
//! processing stage so no two pipelines share mutable state.

mod artifact;

pub use artifact::{load_pipeline, save_pipeline, ArtifactMetadata};

use crate::error::{LifeboatError, Result};
use crate::features;
use crate::models::{Classifier, DecisionTree, LogisticRegression, RandomForest};
use crate::preprocessing::{ColumnTransformer, SelectKBest};
use crate::training::grid::ParamGrid;
use crate::training::grid::TrialParams;
use crate::training::metrics::ClassificationMetrics;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Shared processing stage: column transformer plus optional selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingPipeline {
    transformer: ColumnTransformer,
    selector: Option<SelectKBest>,
}

impl ProcessingPipeline {
    /// Create a processing stage without feature selection
    pub fn new(transformer: ColumnTransformer) -> Self {
        Self {
            transformer,
            selector: None,
        }
    }

    /// Keep only the k best transformed columns
    pub fn with_selection(mut self, k: Option<usize>) -> Self {
        self.selector = k.map(|k| SelectKBest::new(Some(k)));
        self
    }

    /// Fit the transformer, then the selector on the transformed matrix
    pub fn fit(&mut self, df: &DataFrame, y: &Array1<f64>) -> Result<()> {
        self.transformer.fit(df)?;
        if let Some(selector) = &mut self.selector {
            let transformed = self.transformer.transform(df)?;
            let x = to_feature_matrix(&transformed)?;
            selector.fit(&x, y)?;
        }
        Ok(())
    }

    /// Transform a frame into the model's feature matrix
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let transformed = self.transformer.transform(df)?;
        let x = to_feature_matrix(&transformed)?;
        match &self.selector {
            Some(selector) => selector.transform(&x),
            None => Ok(x),
        }
    }

    /// Names of the transformer's output columns (before selection)
    pub fn output_columns(&self) -> Vec<String> {
        self.transformer.output_columns()
    }
}

/// One named end-to-end pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPipeline {
    pub name: String,
    processing: ProcessingPipeline,
    classifier: Classifier,
}

impl ModelPipeline {
    /// Chain a processing stage with a classifier
    pub fn new(name: impl Into<String>, processing: ProcessingPipeline, classifier: Classifier) -> Self {
        Self {
            name: name.into(),
            processing,
            classifier,
        }
    }

    /// Apply one hyperparameter assignment to the classifier
    pub fn apply_params(&mut self, params: &TrialParams) -> Result<()> {
        self.classifier.apply_params(params)
    }

    /// Fit processing and classifier on engineered features
    pub fn fit(&mut self, df: &DataFrame, y: &Array1<f64>) -> Result<()> {
        self.processing.fit(df, y)?;
        let x = self.processing.transform(df)?;
        self.classifier.fit(&x, y)
    }

    /// Predicted labels for engineered features
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let x = self.processing.transform(df)?;
        self.classifier.predict(&x)
    }

    /// Hold-out accuracy on engineered features
    pub fn score(&self, df: &DataFrame, y: &Array1<f64>) -> Result<f64> {
        let predictions = self.predict(df)?;
        Ok(crate::training::metrics::accuracy(y, &predictions))
    }

    /// The classifier kind backing this pipeline
    pub fn classifier_kind(&self) -> &'static str {
        self.classifier.kind()
    }

    /// Names of the processing stage's output columns
    pub fn output_columns(&self) -> Vec<String> {
        self.processing.output_columns()
    }
}

/// A registry entry: name, untrained classifier, search grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub classifier: Classifier,
    pub grid: ParamGrid,
}

/// The workflow's built-in candidates with their search grids
pub fn default_registry() -> Vec<RegistryEntry> {
    vec![
        RegistryEntry {
            name: "logistic_regression".to_string(),
            classifier: Classifier::Logistic(LogisticRegression::new()),
            grid: ParamGrid::new()
                .floats("alpha", &[0.001, 0.01, 0.1])
                .floats("learning_rate", &[0.1, 0.5]),
        },
        RegistryEntry {
            name: "decision_tree".to_string(),
            classifier: Classifier::DecisionTree(DecisionTree::new()),
            grid: ParamGrid::new()
                .ints("max_depth", &[3, 5, 8])
                .ints("min_samples_leaf", &[1, 5]),
        },
        RegistryEntry {
            name: "random_forest".to_string(),
            classifier: Classifier::RandomForest(RandomForest::new(100)),
            grid: ParamGrid::new()
                .ints("n_estimators", &[50, 100])
                .ints("max_depth", &[5, 8]),
        },
    ]
}

/// Build one pipeline per registry entry around a shared processing stage.
///
/// The processing stage is cloned for every entry; fitted state never leaks
/// between models.
pub fn build_pipelines(
    processing: &ProcessingPipeline,
    registry: &[RegistryEntry],
) -> BTreeMap<String, (ModelPipeline, ParamGrid)> {
    registry
        .iter()
        .map(|entry| {
            let pipeline = ModelPipeline::new(
                entry.name.clone(),
                processing.clone(),
                entry.classifier.clone(),
            );
            (entry.name.clone(), (pipeline, entry.grid.clone()))
        })
        .collect()
}

/// The persisted unit: a fitted pipeline plus the feature-engineering step
/// in front of it, scored at training time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedPipeline {
    pub pipeline: ModelPipeline,
    pub target: String,
    pub metrics: ClassificationMetrics,
}

impl FittedPipeline {
    /// Predict from raw rows (identifier columns still present)
    pub fn predict_raw(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let engineered = features::engineer_features(df)?;
        self.pipeline.predict(&engineered)
    }

    /// Evaluate against raw labeled rows
    pub fn evaluate_raw(&self, df: &DataFrame) -> Result<ClassificationMetrics> {
        let engineered = features::engineer_features(df)?;
        let (x, y) = features::split_features(&engineered, &self.target)?;
        let predictions = self.pipeline.predict(&x)?;
        ClassificationMetrics::compute(&y, &predictions)
    }
}

/// Flatten a fully numeric frame into a row-major feature matrix
pub fn to_feature_matrix(df: &DataFrame) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = df.width();
    let mut data = Vec::with_capacity(n_rows * n_cols);

    for column in df.get_columns() {
        let values = column
            .as_materialized_series()
            .cast(&DataType::Float64)
            .map_err(|e| LifeboatError::DataError(e.to_string()))?;
        let ca = values
            .f64()
            .map_err(|e| LifeboatError::DataError(e.to_string()))?;
        data.extend(ca.into_iter().map(|v| v.unwrap_or(0.0)));
    }

    let x = Array2::from_shape_vec((n_cols, n_rows), data)
        .map_err(|e| LifeboatError::ShapeError {
            expected: format!("({n_cols}, {n_rows})"),
            actual: e.to_string(),
        })?
        .t()
        .to_owned();

    Ok(x)
}
