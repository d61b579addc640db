//! Lifeboat CLI
//!
//! Command-line interface for training, validating and inspecting the
//! Titanic survival pipeline.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use std::time::Instant;

use lifeboat_core::config::Config;
use lifeboat_core::data::PostgresManager;
use lifeboat_core::training::{validate_threshold, Trainer, Validator};

#[derive(Parser)]
#[command(name = "lifeboat")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Titanic survival training and validation workflow", long_about = None)]
struct Cli {
    /// Path to the workflow configuration file
    #[arg(long, global = true, default_value = "lifeboat.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train one or more models and persist the winner
    Train {
        /// Model to train (repeatable)
        #[arg(short = 'm', long = "model", required = true)]
        model: Vec<String>,

        /// Accuracy threshold for the model to be registered (between 0 and 1)
        #[arg(short = 't', long = "acc-threshold")]
        acc_threshold: Option<f64>,
    },

    /// Validate the persisted model and optionally retrain on a miss
    Validation {
        /// Accuracy threshold for retraining the model (between 0 and 1)
        #[arg(short = 't', long = "acc-threshold")]
        acc_threshold: Option<f64>,
    },

    /// Run the test suite
    Test {
        /// Run the tests with coverage
        #[arg(short, long)]
        coverage: bool,
    },

    /// Run a SQL file against the PostgreSQL database
    RunSql {
        /// The path of the SQL file
        #[arg(long = "sql-file")]
        sql_file: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lifeboat=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Train {
            model,
            acc_threshold,
        } => cmd_train(config, &model, acc_threshold),
        Commands::Validation { acc_threshold } => cmd_validation(config, acc_threshold),
        Commands::Test { coverage } => cmd_test(coverage),
        Commands::RunSql { sql_file } => cmd_run_sql(config, &sql_file),
    }
}

fn cmd_train(config: Config, models: &[String], threshold: Option<f64>) -> anyhow::Result<()> {
    println!("{}", "Lifeboat - Training".blue().bold());
    println!();

    if validate_threshold(threshold).is_err() {
        println!("Invalid input. Please enter a float number between 0 and 1.");
        anyhow::bail!("invalid accuracy threshold");
    }

    let start = Instant::now();
    let trainer = Trainer::new(config);
    let report = trainer.train(models, threshold)?;

    println!("{:<22} {:>12} {:>12}", "Model", "CV Accuracy", "Hold-out");
    println!("{}", "─".repeat(48));
    for result in &report.results {
        println!(
            "{:<22} {:>12.4} {:>12.4}",
            result.name, result.cv.mean, result.holdout_accuracy
        );
    }
    println!("{}", "─".repeat(48));
    println!();
    println!(
        "Best model: {} (accuracy {:.4}, {:.2?})",
        report.best_model.green().bold(),
        report.best_accuracy,
        start.elapsed()
    );

    if report.persisted {
        println!("Artifact written to {}", report.artifact_path.cyan());
    } else {
        println!(
            "{}",
            "Accuracy below the threshold; the model was not registered.".yellow()
        );
    }

    Ok(())
}

fn cmd_validation(config: Config, threshold: Option<f64>) -> anyhow::Result<()> {
    println!("{}", "Lifeboat - Validation".blue().bold());
    println!();

    if validate_threshold(threshold).is_err() {
        println!("Invalid input. Please enter a float number between 0 and 1.");
        anyhow::bail!("invalid accuracy threshold");
    }

    let validator = Validator::new(config);
    let score = validator.validate()?;
    println!("Validation accuracy: {score:.4}");

    if let Some(threshold) = threshold {
        if score < threshold {
            println!("The model is not good enough. Training a new model.");
            run_make("train")?;
        }
    }

    Ok(())
}

fn cmd_test(coverage: bool) -> anyhow::Result<()> {
    if coverage {
        run_make("test-coverage")
    } else {
        run_make("test")
    }
}

fn cmd_run_sql(config: Config, sql_file: &PathBuf) -> anyhow::Result<()> {
    if !sql_file.exists() {
        println!("Error: File '{}' does not exist.", sql_file.display());
        anyhow::bail!("SQL file not found");
    }

    let query = std::fs::read_to_string(sql_file)?;

    let mut db = PostgresManager::new(config.database_url()?)?;
    let result = db
        .connect()
        .and_then(|_| db.fetch_to_dataframe(&query));
    // The connection is closed whether the query succeeded or not
    db.close();

    match result {
        Ok(data) => {
            println!(
                "Successfully executed SQL from '{}'.",
                sql_file.display()
            );
            println!("{data}");
        }
        Err(e) => println!("Error executing SQL: {e}"),
    }

    Ok(())
}

/// Run a Makefile target, mirroring the workflow's make-driven tasks
fn run_make(target: &str) -> anyhow::Result<()> {
    let status = std::process::Command::new("make").arg(target).status()?;
    if !status.success() {
        anyhow::bail!("make {target} failed with {status}");
    }
    Ok(())
}
