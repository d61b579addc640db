//! Validation of the persisted pipeline
//!
//! Loads the artifact, scores it on the labeled test set and writes a
//! Markdown report with the confusion matrix and a per-class
//! classification report.

use super::metrics::{precision_recall_f1, ClassificationMetrics};
use crate::config::Config;
use crate::data::DataLoader;
use crate::error::Result;
use crate::pipeline::load_pipeline;
use tracing::info;

/// Validation driver
pub struct Validator {
    config: Config,
}

impl Validator {
    /// Create a validator over the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Score the persisted pipeline on the test set, write the report and
    /// return the accuracy.
    pub fn validate(&self) -> Result<f64> {
        let (fitted, metadata) = load_pipeline(&self.config.data.artifact_path)?;
        let df = DataLoader::new().load_csv(&self.config.data.test_path)?;

        let metrics = fitted.evaluate_raw(&df)?;
        info!(
            model = %metadata.model_name,
            accuracy = metrics.accuracy,
            samples = metrics.n_samples,
            "validation scored"
        );

        let report = render_report(
            &metadata.model_name,
            &metrics,
            &chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        );
        std::fs::write(&self.config.data.report_path, report)?;
        info!(path = %self.config.data.report_path, "validation report written");

        Ok(metrics.accuracy)
    }
}

/// Render the validation report as Markdown
pub fn render_report(model_name: &str, metrics: &ClassificationMetrics, generated_at: &str) -> String {
    let confusion = &metrics.confusion;
    let (precision_dead, recall_dead, f1_dead) = precision_recall_f1(&confusion.inverted());

    format!(
        "# Validation Report\n\
         \n\
         Model: `{model_name}`\n\
         Generated: {generated_at}\n\
         \n\
         ## Confusion Matrix\n\
         \n\
         |                | Predicted Dead | Predicted Survive |\n\
         |----------------|---------------:|------------------:|\n\
         | Actual Dead    | {tn:>14} | {fp:>17} |\n\
         | Actual Survive | {fn_:>14} | {tp:>17} |\n\
         \n\
         ## Classification Report\n\
         \n\
         | class        | precision | recall | f1-score | support |\n\
         |--------------|----------:|-------:|---------:|--------:|\n\
         | Dead (0)     | {pd:>9.2} | {rd:>6.2} | {fd:>8.2} | {sd:>7} |\n\
         | Survived (1) | {ps:>9.2} | {rs:>6.2} | {fs:>8.2} | {ss:>7} |\n\
         \n\
         Accuracy: {accuracy:.4} on {n} samples\n",
        tn = confusion.true_negatives,
        fp = confusion.false_positives,
        fn_ = confusion.false_negatives,
        tp = confusion.true_positives,
        pd = precision_dead,
        rd = recall_dead,
        fd = f1_dead,
        sd = confusion.negatives(),
        ps = metrics.precision,
        rs = metrics.recall,
        fs = metrics.f1,
        ss = confusion.positives(),
        accuracy = metrics.accuracy,
        n = metrics.n_samples,
    )
}
