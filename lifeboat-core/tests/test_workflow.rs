//! Integration test: full workflow (load → engineer → preprocess → train →
//! persist → validate)

use lifeboat_core::config::Config;
use lifeboat_core::features;
use lifeboat_core::models::Classifier;
use lifeboat_core::pipeline::{
    build_pipelines, default_registry, load_pipeline, ModelPipeline, ProcessingPipeline,
};
use lifeboat_core::preprocessing::{ColumnTransformer, FeatureGroups};
use lifeboat_core::training::{Trainer, Validator};
use polars::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};

const HEADER: &str = "PassengerId,Name,Ticket,Cabin,Survived,Pclass,Sex,Age,SibSp,Parch,Fare,Embarked";

/// A small separable passenger list: first-class women survive, third-class
/// men do not. A couple of fields are left empty to exercise imputation.
fn write_passengers(path: &Path, n_per_class: usize) {
    let mut file = std::fs::File::create(path).unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for i in 0..n_per_class {
        let age = if i % 7 == 0 {
            String::new()
        } else {
            (18 + i % 40).to_string()
        };
        writeln!(
            file,
            "{i},Passenger {i},T{i},C{i},1,1,female,{age},0,{},{},C",
            i % 3,
            60.0 + i as f64
        )
        .unwrap();
    }
    for i in 0..n_per_class {
        let id = n_per_class + i;
        writeln!(
            file,
            "{id},Passenger {id},T{id},,0,3,male,{},1,0,{},S",
            35 + i % 30,
            6.0 + i as f64
        )
        .unwrap();
    }
}

fn workflow_config(dir: &Path) -> (Config, PathBuf) {
    let train_path = dir.join("train.csv");
    let test_path = dir.join("test.csv");
    write_passengers(&train_path, 15);
    write_passengers(&test_path, 5);

    let mut config = Config::default();
    config.data.train_path = train_path.to_string_lossy().to_string();
    config.data.test_path = test_path.to_string_lossy().to_string();
    config.data.artifact_path = dir.join("model.bin").to_string_lossy().to_string();
    config.data.report_path = dir.join("validation_report.md").to_string_lossy().to_string();
    config.training.cv_folds = 3;
    config.training.models = vec!["decision_tree".to_string()];

    let artifact = PathBuf::from(&config.data.artifact_path);
    (config, artifact)
}

#[test]
fn test_train_then_validate_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (config, artifact_path) = workflow_config(dir.path());
    let report_path = PathBuf::from(&config.data.report_path);

    // Train: the winner gets persisted
    let trainer = Trainer::new(config.clone());
    let report = trainer.train(&[], None).unwrap();
    assert_eq!(report.best_model, "decision_tree");
    assert!(report.persisted);
    assert!(artifact_path.exists());

    // The separable data should be learned nearly perfectly
    assert!(
        report.best_accuracy >= 0.8,
        "hold-out accuracy too low: {}",
        report.best_accuracy
    );

    // Validate: loads the artifact, scores the test set, writes the report
    let validator = Validator::new(config);
    let score = validator.validate().unwrap();
    assert!((0.0..=1.0).contains(&score));
    assert!(score >= 0.8, "validation accuracy too low: {score}");

    let report_text = std::fs::read_to_string(report_path).unwrap();
    assert!(report_text.contains("# Validation Report"));
    assert!(report_text.contains("## Confusion Matrix"));
}

#[test]
fn test_persisted_pipeline_predicts_raw_rows() {
    let dir = tempfile::tempdir().unwrap();
    let (config, artifact_path) = workflow_config(dir.path());

    Trainer::new(config.clone())
        .train(&["decision_tree".to_string()], None)
        .unwrap();

    let (fitted, metadata) = load_pipeline(&artifact_path).unwrap();
    assert_eq!(metadata.model_name, "decision_tree");
    assert!(metadata.accuracy > 0.0);
    assert!(!metadata.feature_columns.is_empty());

    // Raw rows still carry the identifier columns; the fitted pipeline
    // engineers them away itself.
    let raw = lifeboat_core::data::DataLoader::new()
        .load_csv(&config.data.test_path)
        .unwrap();
    let predictions = fitted.predict_raw(&raw).unwrap();
    assert_eq!(predictions.len(), raw.height());
    assert!(predictions.iter().all(|&p| p == 0.0 || p == 1.0));
}

#[test]
fn test_factory_pipelines_over_engineered_features() {
    let dir = tempfile::tempdir().unwrap();
    let train_path = dir.path().join("train.csv");
    write_passengers(&train_path, 10);

    let raw = lifeboat_core::data::DataLoader::new()
        .load_csv(&train_path)
        .unwrap();
    let engineered = features::engineer_features(&raw).unwrap();
    let (x_df, y) = features::split_features(&engineered, "Survived").unwrap();

    let processing = ProcessingPipeline::new(ColumnTransformer::new(FeatureGroups {
        numeric: vec!["Age".to_string(), "Fare".to_string(), "FamilySize".to_string()],
        ordinal: vec!["Pclass".to_string(), "IsAlone".to_string()],
        categorical: vec!["Sex".to_string(), "Embarked".to_string()],
    }));

    let registry = default_registry();
    let pipelines = build_pipelines(&processing, &registry);
    assert_eq!(pipelines.len(), registry.len());

    for (name, (pipeline, _grid)) in pipelines {
        let mut pipeline: ModelPipeline = pipeline;
        pipeline.fit(&x_df, &y).unwrap();
        let score = pipeline.score(&x_df, &y).unwrap();
        assert!(
            score >= 0.8,
            "{name} scored {score} on its own training data"
        );
        assert!(matches!(
            pipeline.classifier_kind(),
            "logistic_regression" | "decision_tree" | "random_forest"
        ));
    }
}

#[test]
fn test_one_hot_columns_follow_naming_contract() {
    let df = df!(
        "Sex" => &["male", "female", "female", "male"],
        "Embarked" => &["S", "C", "Q", "S"],
    )
    .unwrap();

    let mut transformer = ColumnTransformer::new(FeatureGroups {
        numeric: vec![],
        ordinal: vec![],
        categorical: vec!["Sex".to_string(), "Embarked".to_string()],
    });
    let result = transformer.fit_transform(&df).unwrap();

    let names: Vec<String> = result
        .get_column_names()
        .into_iter()
        .map(|n| n.to_string())
        .collect();
    // 2 + 3 observed categories, named <column><category-index>
    assert_eq!(names, vec!["Sex0", "Sex1", "Embarked0", "Embarked1", "Embarked2"]);
    assert_eq!(result.height(), 4);
}

#[test]
fn test_workflow_fails_fast_on_missing_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    // No Cabin column at all
    writeln!(file, "PassengerId,Name,Ticket,Survived,Pclass,Sex,Age,SibSp,Parch,Fare").unwrap();
    writeln!(file, "1,A,T1,0,3,male,22,1,0,7.25").unwrap();

    let raw = lifeboat_core::data::DataLoader::new().load_csv(&path).unwrap();
    let err = features::engineer_features(&raw).unwrap_err();
    assert!(err.to_string().contains("Cabin"));
}

#[test]
fn test_classifier_enum_round_trips_through_registry() {
    let registry = default_registry();
    for entry in &registry {
        match (&entry.classifier, entry.name.as_str()) {
            (Classifier::Logistic(_), "logistic_regression") => {}
            (Classifier::DecisionTree(_), "decision_tree") => {}
            (Classifier::RandomForest(_), "random_forest") => {}
            (classifier, name) => panic!("{name} paired with {}", classifier.kind()),
        }
        assert!(!entry.grid.is_empty());
    }
}
