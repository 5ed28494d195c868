//! Ask command - answer a question over the stored invoices.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Args;
use console::style;

use invox_core::llm::OpenRouterClient;
use invox_core::QueryResolver;

use super::process::{load_config, open_store};

/// Arguments for the ask command.
#[derive(Args)]
pub struct AskArgs {
    /// The question, in plain language
    #[arg(required = true)]
    question: String,

    /// Owner whose invoices are queried
    #[arg(short, long, default_value = "default")]
    user: String,

    /// Write a CSV attachment here when the answer includes one
    #[arg(long)]
    export_to: Option<PathBuf>,
}

pub async fn run(
    args: AskArgs,
    config_path: Option<&str>,
    data_dir: Option<&str>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let store = open_store(data_dir)?;
    let llm = OpenRouterClient::from_env(config.llm).map(|c| Arc::new(c) as _);
    let resolver = QueryResolver::new(store, llm);

    let answer = resolver.answer(&args.user, &args.question).await?;
    println!("{}", answer.answer);

    for invoice in &answer.invoices {
        println!(
            "  {} {} ({}, score {:.2})",
            style("•").yellow(),
            invoice.filename,
            invoice.fields.vendor.as_deref().unwrap_or("unknown vendor"),
            invoice.fraud_score
        );
    }

    if let Some(encoded) = &answer.csv_base64 {
        let path = args
            .export_to
            .unwrap_or_else(|| PathBuf::from("invoices.csv"));
        fs::write(&path, BASE64.decode(encoded)?)?;
        println!("{} CSV written to {}", style("✓").green(), path.display());
    }

    Ok(())
}
