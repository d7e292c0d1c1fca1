//! Model training and ONNX import.
//!
//! Tabular families (linear, forest) are trained in-process from collected
//! candle CSVs. Recurrent models are trained externally and imported here
//! as ONNX graphs so the manifest and schema checks still apply.

use anyhow::{Context, Result};
use clap::Parser;
use cryptocast::application::model::artifact::{ModelArtifact, ModelKind, ModelSpec};
use cryptocast::application::training::{Dataset, TrainingOptions, train};
use cryptocast::config::Config;
use cryptocast::domain::forecast::FeatureSchema;
use cryptocast::infrastructure::artifact_store::FileArtifactStore;
use cryptocast::infrastructure::candle_csv::load_candles;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Symbol the model is trained for; sets the artifact prefix
    #[arg(long, default_value = "BTCUSDT")]
    symbol: String,

    /// Candle history CSV (defaults to {DATA_DIR}/{symbol}.csv)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Model family: linear, forest or lstm
    #[arg(long, default_value = "forest")]
    kind: String,

    /// Feature schema: full or compact
    #[arg(long, default_value = "compact")]
    schema: String,

    /// Train on raw features, skipping the scaling boundary
    #[arg(long)]
    raw: bool,

    /// Disable train/test split (train on 100% of data). Use after validation.
    #[arg(long)]
    no_split: bool,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum depth of trees
    #[arg(long, default_value_t = 10)]
    max_depth: u16,

    /// Minimum samples required to split an internal node
    #[arg(long, default_value_t = 5)]
    min_split: usize,

    /// Pre-trained ONNX graph to import (required for --kind lstm)
    #[arg(long)]
    onnx: Option<PathBuf>,

    /// Window rows the ONNX graph consumes per prediction
    #[arg(long, default_value_t = 10)]
    seq_len: usize,

    /// Artifacts output directory (defaults to ARTIFACTS_DIR env)
    #[arg(long)]
    artifacts: Option<PathBuf>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    let kind = ModelKind::from_str(&args.kind)?;
    let schema = FeatureSchema::from_str(&args.schema)?;
    let prefix = Config::symbol_prefix(&args.symbol);
    let store =
        FileArtifactStore::new(args.artifacts.clone().unwrap_or_else(|| config.artifacts_dir.clone()));

    if kind == ModelKind::Recurrent {
        return import_onnx(&args, &store, &prefix, schema);
    }

    let input = args.input.unwrap_or_else(|| {
        config.data_dir.join(format!("{}.csv", args.symbol.to_lowercase()))
    });
    if !input.exists() {
        anyhow::bail!(
            "Training data not found at {:?}. Run the collect binary first.",
            input
        );
    }

    println!("Loading candle history from {:?}", input);
    let candles = load_candles(&input)?;
    let dataset = Dataset::from_candles(&candles, &schema)?;

    let opts = TrainingOptions {
        kind,
        scaled: !args.raw,
        split: if args.no_split { None } else { Some(0.8) },
        n_trees: args.n_trees,
        max_depth: args.max_depth,
        min_split: args.min_split,
    };

    println!(
        "Training {} for {} on {} samples ({})",
        kind,
        args.symbol,
        dataset.len(),
        schema.describe()
    );

    let (artifacts, report) = train(&dataset, &schema, &opts)?;

    if let (Some(rmse), Some(mae), Some(r2)) = (report.rmse, report.mae, report.r2) {
        println!(
            "Holdout (n={}): RMSE={:.4}, MAE={:.4}, R2={:.4}",
            report.test_samples, rmse, mae, r2
        );
    } else {
        println!("Trained on 100% of data, no holdout evaluation.");
    }

    let model_path = store.save_model(&prefix, kind, &artifacts.model)?;
    if let Some(scaler) = &artifacts.scaler {
        store.save_scaler(&prefix, scaler)?;
    }

    println!("Done. Model saved to {:?}.", model_path);
    Ok(())
}

/// Wraps an externally trained ONNX graph in a manifest so inference gets
/// the same schema and scaling checks as native models.
fn import_onnx(
    args: &Args,
    store: &FileArtifactStore,
    prefix: &str,
    schema: FeatureSchema,
) -> Result<()> {
    let source = args
        .onnx
        .as_ref()
        .context("--kind lstm requires --onnx pointing at a trained graph")?;
    if !source.exists() {
        anyhow::bail!("ONNX graph not found at {:?}", source);
    }

    if !args.raw {
        // The scaling boundary must already exist and agree on the layout.
        let scaler = store.load_scaler(prefix)?;
        schema.validate_against(&scaler.schema)?;
    }

    let weights_name = format!("{}_lstm.onnx", prefix);
    let dest = store.dir().join(&weights_name);
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create artifact directory {:?}", parent))?;
    }
    std::fs::copy(source, &dest)
        .with_context(|| format!("Failed to copy ONNX graph to {:?}", dest))?;

    let artifact = ModelArtifact {
        schema,
        scaled: !args.raw,
        spec: ModelSpec::Recurrent {
            weights: PathBuf::from(weights_name),
            sequence_length: args.seq_len,
        },
    };

    let manifest_path = store.save_model(prefix, ModelKind::Recurrent, &artifact)?;
    println!("Imported ONNX model. Manifest saved to {:?}.", manifest_path);
    Ok(())
}
