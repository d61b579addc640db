//! Pipeline artifact persistence
//!
//! The winning fitted pipeline is written as a small envelope: magic bytes,
//! format version, metadata, the bincode-serialized pipeline and an FNV-1a
//! checksum over it. Loading verifies magic and checksum before touching
//! the payload.

use super::FittedPipeline;
use crate::error::{LifeboatError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

const MAGIC: [u8; 4] = *b"LFBT";
const FORMAT_VERSION: u32 = 1;

/// Metadata stored next to the serialized pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    pub model_name: String,
    /// RFC 3339 timestamp of the training run
    pub trained_at: String,
    pub feature_columns: Vec<String>,
    pub accuracy: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    magic: [u8; 4],
    format_version: u32,
    metadata: ArtifactMetadata,
    payload: Vec<u8>,
    checksum: u64,
}

fn fnv1a(data: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 14695981039346656037;
    const FNV_PRIME: u64 = 1099511628211;

    let mut hash = FNV_OFFSET;
    for byte in data {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Persist a fitted pipeline to the given path
pub fn save_pipeline(
    fitted: &FittedPipeline,
    metadata: ArtifactMetadata,
    path: impl AsRef<Path>,
) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let payload = bincode::serialize(fitted)
        .map_err(|e| LifeboatError::SerializationError(e.to_string()))?;
    let envelope = Envelope {
        magic: MAGIC,
        format_version: FORMAT_VERSION,
        metadata,
        checksum: fnv1a(&payload),
        payload,
    };

    let file = File::create(path.as_ref())?;
    bincode::serialize_into(BufWriter::new(file), &envelope)
        .map_err(|e| LifeboatError::SerializationError(e.to_string()))?;
    Ok(())
}

/// Load a fitted pipeline, verifying magic and checksum
pub fn load_pipeline(path: impl AsRef<Path>) -> Result<(FittedPipeline, ArtifactMetadata)> {
    let file = File::open(path.as_ref()).map_err(|e| {
        LifeboatError::DataError(format!(
            "cannot open artifact {}: {e}",
            path.as_ref().display()
        ))
    })?;

    let envelope: Envelope = bincode::deserialize_from(BufReader::new(file))
        .map_err(|e| LifeboatError::SerializationError(e.to_string()))?;

    if envelope.magic != MAGIC {
        return Err(LifeboatError::SerializationError(
            "not a lifeboat pipeline artifact".to_string(),
        ));
    }
    if envelope.format_version != FORMAT_VERSION {
        return Err(LifeboatError::SerializationError(format!(
            "unsupported artifact version {}",
            envelope.format_version
        )));
    }
    if fnv1a(&envelope.payload) != envelope.checksum {
        return Err(LifeboatError::SerializationError(
            "artifact checksum mismatch, file may be corrupted".to_string(),
        ));
    }

    let fitted: FittedPipeline = bincode::deserialize(&envelope.payload)
        .map_err(|e| LifeboatError::SerializationError(e.to_string()))?;
    Ok((fitted, envelope.metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Classifier, DecisionTree};
    use crate::pipeline::{ModelPipeline, ProcessingPipeline};
    use crate::preprocessing::{ColumnTransformer, FeatureGroups};
    use crate::training::metrics::ClassificationMetrics;
    use ndarray::array;
    use polars::prelude::*;

    fn fitted_pipeline() -> FittedPipeline {
        let df = df!(
            "Age" => &[22.0, 38.0, 26.0, 35.0],
            "Sex" => &["male", "female", "female", "male"],
        )
        .unwrap();
        let y = array![0.0, 1.0, 1.0, 0.0];

        let processing = ProcessingPipeline::new(ColumnTransformer::new(FeatureGroups {
            numeric: vec!["Age".to_string()],
            ordinal: vec![],
            categorical: vec!["Sex".to_string()],
        }));
        let mut pipeline = ModelPipeline::new(
            "decision_tree",
            processing,
            Classifier::DecisionTree(DecisionTree::new()),
        );
        pipeline.fit(&df, &y).unwrap();

        let predictions = pipeline.predict(&df).unwrap();
        FittedPipeline {
            pipeline,
            target: "Survived".to_string(),
            metrics: ClassificationMetrics::compute(&y, &predictions).unwrap(),
        }
    }

    fn metadata() -> ArtifactMetadata {
        ArtifactMetadata {
            model_name: "decision_tree".to_string(),
            trained_at: "2026-01-01T00:00:00Z".to_string(),
            feature_columns: vec!["Age".to_string(), "Sex0".to_string(), "Sex1".to_string()],
            accuracy: 1.0,
        }
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        let fitted = fitted_pipeline();
        save_pipeline(&fitted, metadata(), &path).unwrap();

        let (loaded, meta) = load_pipeline(&path).unwrap();
        assert_eq!(meta.model_name, "decision_tree");
        assert_eq!(loaded.pipeline.name, "decision_tree");

        // The loaded pipeline still predicts
        let df = df!(
            "Age" => &[22.0, 38.0],
            "Sex" => &["male", "female"],
        )
        .unwrap();
        let predictions = loaded.pipeline.predict(&df).unwrap();
        assert_eq!(predictions.len(), 2);
    }

    #[test]
    fn test_corrupted_artifact_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        save_pipeline(&fitted_pipeline(), metadata(), &path).unwrap();

        // Flip a byte near the end of the payload
        let mut bytes = std::fs::read(&path).unwrap();
        let idx = bytes.len() / 2;
        bytes[idx] ^= 0xFF;
        std::fs::write(&path, bytes).unwrap();

        assert!(load_pipeline(&path).is_err());
    }

    #[test]
    fn test_missing_artifact_reports_path() {
        let err = load_pipeline("no/such/artifact.bin").unwrap_err();
        assert!(err.to_string().contains("artifact"));
    }

    #[test]
    fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("model.bin");

        save_pipeline(&fitted_pipeline(), metadata(), &path).unwrap();
        assert!(path.exists());
    }
}
