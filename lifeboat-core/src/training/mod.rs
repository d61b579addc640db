//! Model selection, evaluation and validation

pub mod cross_validation;
pub mod grid;
pub mod metrics;
mod trainer;
mod validation;

pub use cross_validation::{stratified_holdout, CrossValidator, CvScores, CvStrategy};
pub use grid::{ParamGrid, ParamValue, TrialParams};
pub use metrics::{accuracy, ClassificationMetrics, ConfusionMatrix};
pub use trainer::{validate_threshold, ModelResult, TrainReport, Trainer};
pub use validation::{render_report, Validator};
