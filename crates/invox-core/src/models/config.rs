//! Configuration structures for the invoice pipeline.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration for the invox pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoxConfig {
    /// Text extraction configuration.
    pub ocr: OcrConfig,

    /// Document classification configuration.
    pub classifier: ClassifierConfig,

    /// VAT resolution configuration.
    pub vat: VatConfig,

    /// Fraud scoring configuration.
    pub fraud: FraudConfig,

    /// LLM collaborator configuration.
    pub llm: LlmConfig,
}

/// Text extractor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Timeout for one OCR collaborator call, in milliseconds.
    pub timeout_ms: u64,

    /// Minimum embedded-text length before a PDF counts as text-based.
    pub min_text_length: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            min_text_length: 20,
        }
    }
}

/// Keyword tables driving document classification.
///
/// Declarative so that new cues can be added via config without touching
/// classifier logic.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Cues for recurring billing documents.
    pub recurring_keywords: Vec<String>,

    /// Cues for goods/product invoices.
    pub product_keywords: Vec<String>,

    /// Cues for service invoices.
    pub service_keywords: Vec<String>,

    /// Minimum text length before language detection is attempted.
    pub min_language_text_len: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            recurring_keywords: strings(&["subscription", "monthly", "recurring", "renewal"]),
            product_keywords: strings(&[
                "sku",
                "qty",
                "quantity",
                "unit price",
                "pcs",
                "item",
                "goods",
                "product",
            ]),
            service_keywords: strings(&[
                "consulting",
                "service",
                "maintenance",
                "support",
                "hours worked",
            ]),
            min_language_text_len: 40,
        }
    }
}

/// Jurisdiction rate table for VAT resolution.
///
/// Country code -> VAT rate as a fraction (`0.19` = 19%). Extensible via
/// config without code change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VatConfig {
    /// Known jurisdiction rates keyed by ISO 3166-1 alpha-2 code.
    pub jurisdictions: HashMap<String, Decimal>,

    /// Fallback rate applied when the country cannot be resolved.
    pub default_rate: Decimal,
}

impl Default for VatConfig {
    fn default() -> Self {
        let mut jurisdictions = HashMap::new();
        for (country, rate) in [
            ("AT", "0.20"),
            ("BE", "0.21"),
            ("DE", "0.19"),
            ("DK", "0.25"),
            ("ES", "0.21"),
            ("FR", "0.20"),
            ("GB", "0.20"),
            ("IE", "0.23"),
            ("IT", "0.22"),
            ("NL", "0.21"),
            ("PL", "0.23"),
            ("PT", "0.23"),
            ("SE", "0.25"),
            ("TR", "0.20"),
            ("AE", "0.05"),
            ("SA", "0.15"),
        ] {
            jurisdictions.insert(country.to_string(), rate.parse().unwrap());
        }

        Self {
            jurisdictions,
            default_rate: "0.20".parse().unwrap(),
        }
    }
}

/// Fraud scorer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FraudConfig {
    /// Minimum historical invoices before the anomaly model is applied.
    /// Below this, only hard rules score (cold start).
    pub min_history: usize,

    /// Trailing window, in days, for the spending-average rule.
    pub trailing_days: i64,

    /// Amount-spike multiplier: an amount above `multiplier x` the trailing
    /// average fires a hard override.
    pub spike_multiplier: u32,

    /// Scam phrases that force a high score when present in the text.
    pub red_flag_phrases: Vec<String>,
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            min_history: 5,
            trailing_days: 90,
            spike_multiplier: 5,
            red_flag_phrases: strings(&[
                "pay by gift card",
                "wire immediately",
                "urgent payment required",
                "overdue fee 50%",
            ]),
        }
    }
}

/// LLM collaborator configuration (OpenRouter-compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Chat completions endpoint.
    pub base_url: String,

    /// Model identifier.
    pub model: String,

    /// Timeout for one completion call, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1/chat/completions".to_string(),
            model: "openai/gpt-4o-mini".to_string(),
            timeout_ms: 30_000,
        }
    }
}

impl InvoxConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
