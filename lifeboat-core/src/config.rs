//! Workflow configuration
//!
//! Everything the CLI commands need to run lives in `lifeboat.toml`: data
//! and artifact paths, the three feature groups (supplied here, never
//! inferred from the data), the enabled models and the split/CV settings.

use crate::error::{LifeboatError, Result};
use crate::preprocessing::FeatureGroups;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration loaded from `lifeboat.toml`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub features: FeatureConfig,
    pub training: TrainingConfig,
    pub database: DatabaseConfig,
}

/// Paths to the flat-file datasets and the serialized pipeline artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Labeled training data (CSV)
    pub train_path: String,
    /// Labeled held-out data used by the validation command (CSV)
    pub test_path: String,
    /// Where the winning fitted pipeline is persisted
    pub artifact_path: String,
    /// Where the validation report is written
    pub report_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            train_path: "data/train.csv".to_string(),
            test_path: "data/test.csv".to_string(),
            artifact_path: "artifacts/model.bin".to_string(),
            report_path: "validation_report.md".to_string(),
        }
    }
}

/// Target column and the three disjoint feature groups
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub target: String,
    pub groups: FeatureGroups,
    /// Keep the k best transformed columns; `None` keeps all of them
    pub select_k_best: Option<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            target: "Survived".to_string(),
            groups: FeatureGroups {
                numeric: vec![
                    "Age".to_string(),
                    "Fare".to_string(),
                    "FamilySize".to_string(),
                ],
                ordinal: vec![
                    "Pclass".to_string(),
                    "SibSp".to_string(),
                    "Parch".to_string(),
                    "IsAlone".to_string(),
                ],
                categorical: vec!["Sex".to_string(), "Embarked".to_string()],
            },
            select_k_best: None,
        }
    }
}

/// Model selection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Models trained when the CLI does not name any explicitly
    pub models: Vec<String>,
    /// Fraction of the training data held out for final scoring
    pub validation_split: f64,
    /// Number of stratified CV folds used by the grid search
    pub cv_folds: usize,
    /// Seed for splits and bootstraps
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            models: vec![
                "logistic_regression".to_string(),
                "decision_tree".to_string(),
                "random_forest".to_string(),
            ],
            validation_split: 0.2,
            cv_folds: 5,
            seed: 42,
        }
    }
}

/// Database connection settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Connection URL; the `DATABASE_URL` environment variable wins over this
    pub url: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig::default(),
            features: FeatureConfig::default(),
            training: TrainingConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the given path, falling back to defaults when it is absent
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the database URL: environment first, then the config file
    pub fn database_url(&self) -> Result<String> {
        dotenvy::dotenv().ok();
        if let Ok(url) = std::env::var("DATABASE_URL") {
            return Ok(url);
        }
        self.database.url.clone().ok_or_else(|| {
            LifeboatError::ConfigError(
                "no database URL: set DATABASE_URL or [database] url".to_string(),
            )
        })
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.training.validation_split) {
            return Err(LifeboatError::InvalidParameter {
                name: "validation_split".to_string(),
                value: self.training.validation_split.to_string(),
                reason: "must be in [0, 1)".to_string(),
            });
        }
        if self.training.cv_folds < 2 {
            return Err(LifeboatError::InvalidParameter {
                name: "cv_folds".to_string(),
                value: self.training.cv_folds.to_string(),
                reason: "must be at least 2".to_string(),
            });
        }
        Ok(())
    }
}
