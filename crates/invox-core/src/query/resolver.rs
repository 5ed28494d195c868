//! Query resolution over a user's stored invoices.
//!
//! Deterministic intents are answered entirely from stored data; only
//! freeform questions reach the language model, and then with all
//! numeric aggregates precomputed.

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{NaiveDate, Utc};
use csv::WriterBuilder;
use rust_decimal::Decimal;
use serde_json::json;
use tracing::{debug, warn};

use crate::error::{InvoxError, Result};
use crate::fraud::RISKY_THRESHOLD;
use crate::llm::LlmClient;
use crate::models::record::{InvoiceRecord, QueryAnswer};
use crate::query::intent::{self, QueryIntent, TimeWindow};
use crate::store::InvoiceStore;

const CSV_HEADER: [&str; 7] = [
    "filename",
    "vendor",
    "date",
    "currency",
    "amount",
    "vat",
    "fraud_score",
];

const FREEFORM_FALLBACK: &str = "I could not answer that. Try asking about totals \
     (\"total spent in August\"), risky invoices, a vendor by name, or a CSV export.";

pub struct QueryResolver<S> {
    store: Arc<S>,
    llm: Option<Arc<dyn LlmClient>>,
}

impl<S: InvoiceStore> QueryResolver<S> {
    pub fn new(store: Arc<S>, llm: Option<Arc<dyn LlmClient>>) -> Self {
        Self { store, llm }
    }

    /// Answer a question against one user's invoices.
    pub async fn answer(&self, user_id: &str, question: &str) -> Result<QueryAnswer> {
        self.answer_at(user_id, question, Utc::now().date_naive())
            .await
    }

    /// Same as `answer` with an explicit anchor date for relative
    /// phrases.
    pub async fn answer_at(
        &self,
        user_id: &str,
        question: &str,
        today: NaiveDate,
    ) -> Result<QueryAnswer> {
        let records = self.store.list_by_user(user_id).await?;
        let vendors = known_vendors(&records);
        let intent = intent::classify(question, &vendors, today);
        debug!(user_id, ?intent, "query classified");

        match intent {
            QueryIntent::AggregateTotal { window } => {
                Ok(aggregate_total(&records, window.as_ref()))
            }
            QueryIntent::ListRisky { window } => Ok(list_risky(&records, window.as_ref())),
            QueryIntent::ExportCsv { window } => export_csv(&records, window.as_ref()),
            QueryIntent::VendorBreakdown { vendor, window } => {
                Ok(vendor_breakdown(&records, &vendor, window.as_ref()))
            }
            QueryIntent::Freeform => Ok(self.freeform(question, &records).await),
        }
    }

    async fn freeform(&self, question: &str, records: &[InvoiceRecord]) -> QueryAnswer {
        let Some(llm) = &self.llm else {
            return QueryAnswer::text(FREEFORM_FALLBACK);
        };

        let context = freeform_context(records);
        match llm.complete(question, &context).await {
            Ok(answer) => QueryAnswer::text(answer),
            Err(err) => {
                warn!(error = %err, "freeform query fell back to canned answer");
                QueryAnswer::text(FREEFORM_FALLBACK)
            }
        }
    }
}

/// Unique vendor names across the user's records, longest first so the
/// most specific mention wins.
fn known_vendors(records: &[InvoiceRecord]) -> Vec<String> {
    let mut vendors: Vec<String> = records
        .iter()
        .filter_map(|r| r.fields.vendor.clone())
        .collect();
    vendors.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    vendors.dedup();
    vendors
}

fn in_window<'a>(
    records: &'a [InvoiceRecord],
    window: Option<&TimeWindow>,
) -> Vec<&'a InvoiceRecord> {
    records
        .iter()
        .filter(|r| window.map_or(true, |w| w.contains(r.effective_date())))
        .collect()
}

/// Sum of amounts per currency. Records without an amount are excluded,
/// never counted as zero.
fn totals_by_currency(records: &[&InvoiceRecord]) -> BTreeMap<String, Decimal> {
    let mut totals = BTreeMap::new();
    for record in records {
        if let (Some(amount), Some(currency)) = (record.fields.amount, &record.fields.currency) {
            *totals.entry(currency.clone()).or_insert(Decimal::ZERO) += amount;
        }
    }
    totals
}

fn format_totals(totals: &BTreeMap<String, Decimal>) -> String {
    totals
        .iter()
        .map(|(currency, total)| format!("{} {}", total.round_dp(2), currency))
        .collect::<Vec<_>>()
        .join(", ")
}

fn window_phrase(window: Option<&TimeWindow>) -> String {
    match window {
        None => String::new(),
        Some(w) => {
            let name = month_name(w.month);
            match w.year {
                Some(year) => format!(" in {name} {year}"),
                None => format!(" in {name}"),
            }
        }
    }
}

fn month_name(month: u32) -> &'static str {
    const NAMES: [&str; 12] = [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ];
    NAMES[(month as usize - 1).min(11)]
}

fn aggregate_total(records: &[InvoiceRecord], window: Option<&TimeWindow>) -> QueryAnswer {
    let matching = in_window(records, window);
    let totals = totals_by_currency(&matching);
    let phrase = window_phrase(window);

    if totals.is_empty() {
        return QueryAnswer::text(format!("No invoices with amounts found{phrase}."));
    }
    QueryAnswer::text(format!("Total spent{phrase}: {}", format_totals(&totals)))
}

fn list_risky(records: &[InvoiceRecord], window: Option<&TimeWindow>) -> QueryAnswer {
    let risky: Vec<InvoiceRecord> = in_window(records, window)
        .into_iter()
        .filter(|r| r.fraud_score >= RISKY_THRESHOLD)
        .cloned()
        .collect();
    let phrase = window_phrase(window);

    if risky.is_empty() {
        return QueryAnswer::text(format!("No risky invoices found{phrase}."));
    }

    let listing = risky
        .iter()
        .map(|r| {
            format!(
                "{} ({}, score {:.2})",
                r.filename,
                r.fields.vendor.as_deref().unwrap_or("unknown vendor"),
                r.fraud_score
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    QueryAnswer {
        answer: format!("{} risky invoice(s){phrase}: {listing}", risky.len()),
        invoices: risky,
        csv_base64: None,
    }
}

fn vendor_breakdown(
    records: &[InvoiceRecord],
    vendor: &str,
    window: Option<&TimeWindow>,
) -> QueryAnswer {
    let matching: Vec<&InvoiceRecord> = in_window(records, window)
        .into_iter()
        .filter(|r| r.fields.vendor.as_deref() == Some(vendor))
        .collect();
    let totals = totals_by_currency(&matching);
    let phrase = window_phrase(window);

    if matching.is_empty() {
        return QueryAnswer::text(format!("No invoices from {vendor} found{phrase}."));
    }
    let amounts = if totals.is_empty() {
        "no parsed amounts".to_string()
    } else {
        format_totals(&totals)
    };
    QueryAnswer::text(format!(
        "{} invoice(s) from {vendor}{phrase}, totalling {amounts}.",
        matching.len()
    ))
}

fn export_csv(records: &[InvoiceRecord], window: Option<&TimeWindow>) -> Result<QueryAnswer> {
    let matching = in_window(records, window);
    let phrase = window_phrase(window);

    let mut writer = WriterBuilder::new().from_writer(Vec::new());
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| InvoxError::Export(format!("csv serialization failed: {e}")))?;
    for record in &matching {
        let date = record
            .fields
            .date
            .map(|d| d.to_string())
            .unwrap_or_default();
        let amount = record
            .fields
            .amount
            .map(|a| a.to_string())
            .unwrap_or_default();
        let vat = record.vat.to_string();
        let score = format!("{:.2}", record.fraud_score);
        writer
            .write_record([
                record.filename.as_str(),
                record.fields.vendor.as_deref().unwrap_or(""),
                date.as_str(),
                record.fields.currency.as_deref().unwrap_or(""),
                amount.as_str(),
                vat.as_str(),
                score.as_str(),
            ])
            .map_err(|e| InvoxError::Export(format!("csv serialization failed: {e}")))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| InvoxError::Export(format!("csv serialization failed: {e}")))?;

    Ok(QueryAnswer {
        answer: format!("Exported {} invoice(s){phrase} as CSV.", matching.len()),
        invoices: Vec::new(),
        csv_base64: Some(BASE64.encode(bytes)),
    })
}

/// Precomputed aggregates handed to the model so it never does
/// arithmetic itself.
fn freeform_context(records: &[InvoiceRecord]) -> serde_json::Value {
    let all: Vec<&InvoiceRecord> = records.iter().collect();
    let totals = totals_by_currency(&all);
    let risky_count = records
        .iter()
        .filter(|r| r.fraud_score >= RISKY_THRESHOLD)
        .count();

    let mut per_vendor: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        if let Some(vendor) = &record.fields.vendor {
            *per_vendor.entry(vendor.clone()).or_insert(0) += 1;
        }
    }

    let summaries: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            json!({
                "vendor": r.fields.vendor,
                "date": r.effective_date().to_string(),
                "amount": r.fields.amount,
                "currency": r.fields.currency,
                "vat": r.vat,
                "docType": r.doc_type,
                "fraudScore": r.fraud_score,
            })
        })
        .collect();

    json!({
        "invoiceCount": records.len(),
        "totalsByCurrency": totals,
        "riskyCount": risky_count,
        "invoicesPerVendor": per_vendor,
        "invoices": summaries,
    })
}
