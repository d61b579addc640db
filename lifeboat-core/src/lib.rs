//! Lifeboat Core - Titanic survival training and validation workflow
//!
//! This crate provides the workflow behind the `lifeboat` CLI: feature
//! engineering, column-wise preprocessing, candidate classifiers, grid
//! search with cross validation, pipeline artifacts and the PostgreSQL
//! data loader.

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod training;

pub use error::{LifeboatError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::data::{DataLoader, PostgresManager};
    pub use crate::error::{LifeboatError, Result};
    pub use crate::features::{engineer_features, split_features};
    pub use crate::pipeline::{
        build_pipelines, default_registry, load_pipeline, save_pipeline, FittedPipeline,
        ModelPipeline, ProcessingPipeline,
    };
    pub use crate::preprocessing::{ColumnTransformer, FeatureGroups};
    pub use crate::training::{validate_threshold, Trainer, Validator};
}
