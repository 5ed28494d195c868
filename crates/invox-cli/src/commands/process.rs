//! Process command - run one invoice file through the pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use tracing::debug;

use invox_core::{
    EmbeddedTextEngine, InvoicePipeline, InvoiceRecord, InvoxConfig, RawDocument,
};

use crate::store::JsonFileStore;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or plain text)
    #[arg(required = true)]
    pub input: PathBuf,

    /// Owner of the processed invoice
    #[arg(short, long, default_value = "default")]
    pub user: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Plain text summary
    Text,
}

pub async fn run(
    args: ProcessArgs,
    config_path: Option<&str>,
    data_dir: Option<&str>,
) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = load_config(config_path)?;
    let store = open_store(data_dir)?;
    let pipeline = InvoicePipeline::new(
        config.clone(),
        Arc::new(EmbeddedTextEngine::new(&config.ocr)),
        store,
    );

    let record = process_file(&pipeline, &args.input, &args.user).await?;

    let output = format_record(&record, args.format)?;
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());
    Ok(())
}

pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvoxConfig> {
    match config_path {
        Some(path) => Ok(InvoxConfig::from_file(Path::new(path))?),
        None => Ok(InvoxConfig::default()),
    }
}

pub fn open_store(data_dir: Option<&str>) -> anyhow::Result<Arc<JsonFileStore>> {
    let dir = data_dir
        .map(PathBuf::from)
        .unwrap_or_else(JsonFileStore::default_data_dir);
    Ok(Arc::new(JsonFileStore::open(&dir)?))
}

pub async fn process_file(
    pipeline: &InvoicePipeline<JsonFileStore>,
    input: &Path,
    user: &str,
) -> anyhow::Result<InvoiceRecord> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let media_type = media_type_for(input)?;
    let filename = input
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload");
    let bytes = fs::read(input)?;

    let record = pipeline
        .process(RawDocument::new(bytes, media_type, user, filename))
        .await?;
    Ok(record)
}

fn media_type_for(input: &Path) -> anyhow::Result<&'static str> {
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match extension.as_str() {
        "pdf" => Ok("application/pdf"),
        "txt" | "text" => Ok("text/plain"),
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    }
}

pub fn format_record(record: &InvoiceRecord, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(record)?),
        OutputFormat::Text => Ok(text_summary(record)),
    }
}

fn text_summary(record: &InvoiceRecord) -> String {
    let vendor = record.fields.vendor.as_deref().unwrap_or("unknown");
    let amount = match (&record.fields.amount, &record.fields.currency) {
        (Some(amount), Some(currency)) => format!("{amount} {currency}"),
        _ => "not detected".to_string(),
    };
    let date = record
        .fields
        .date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "not detected".to_string());

    format!(
        "Invoice {}\n  Vendor:      {}\n  Amount:      {}\n  Date:        {}\n  Type:        {}\n  Language:    {}\n  VAT:         {}\n  Tax valid:   {}\n  Fraud score: {:.2}",
        record.id,
        vendor,
        amount,
        date,
        record.doc_type.as_str(),
        record.language,
        record.vat,
        record.tax_valid,
        record.fraud_score
    )
}
