//! Batch command - process every file matching a glob pattern.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use invox_core::{EmbeddedTextEngine, InvoicePipeline};

use super::process::{load_config, open_store, process_file};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input files (e.g. "invoices/*.pdf")
    #[arg(required = true)]
    pattern: String,

    /// Owner of the processed invoices
    #[arg(short, long, default_value = "default")]
    user: String,

    /// Stop at the first failed file instead of continuing
    #[arg(long)]
    fail_fast: bool,
}

pub async fn run(
    args: BatchArgs,
    config_path: Option<&str>,
    data_dir: Option<&str>,
) -> anyhow::Result<()> {
    let paths: Vec<PathBuf> = glob::glob(&args.pattern)?
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .filter(|p| p.is_file())
        .collect();

    if paths.is_empty() {
        anyhow::bail!("No files matched pattern: {}", args.pattern);
    }

    let config = load_config(config_path)?;
    let store = open_store(data_dir)?;
    let pipeline = InvoicePipeline::new(
        config.clone(),
        Arc::new(EmbeddedTextEngine::new(&config.ocr)),
        store,
    );

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut processed = 0usize;
    let mut failed = 0usize;
    for path in &paths {
        pb.set_message(path.display().to_string());
        match process_file(&pipeline, path, &args.user).await {
            Ok(_) => processed += 1,
            Err(err) => {
                failed += 1;
                warn!(file = %path.display(), error = %err, "file failed");
                if args.fail_fast {
                    pb.abandon();
                    return Err(err);
                }
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    // Batch ingests are the natural point to refresh the anomaly model.
    if processed > 0 {
        pipeline.retrain_fraud_model(&args.user).await?;
    }

    println!(
        "{} Processed {} file(s), {} failed",
        style("✓").green(),
        processed,
        failed
    );
    Ok(())
}
