//! The invoice processing pipeline: raw upload to persisted record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::classify::{Classification, DocClassifier};
use crate::error::Result;
use crate::fields::{FieldParser, ParseOutcome};
use crate::fraud::{FraudScore, FraudScorer, ScoreInput};
use crate::models::config::InvoxConfig;
use crate::models::record::{ExtractedText, InvoiceRecord, RawDocument};
use crate::ocr::{OcrEngine, TextExtractor};
use crate::store::InvoiceStore;
use crate::vat::{VatResolution, VatResolver};

/// Synchronous per-document pipeline, invoked once per upload.
///
/// Every upstream partial failure degrades the record's data quality
/// rather than aborting the run; only a storage failure is fatal, in which
/// case nothing is persisted (all-or-nothing assembly). Runs are
/// independent and safe to execute concurrently: all state is scoped to
/// the call except the fraud model snapshot, which is read-shared.
pub struct InvoicePipeline<S> {
    extractor: TextExtractor,
    parser: FieldParser,
    classifier: DocClassifier,
    vat: VatResolver,
    fraud: FraudScorer,
    store: Arc<S>,
}

impl<S: InvoiceStore> InvoicePipeline<S> {
    /// Build a pipeline around an OCR engine and a store.
    pub fn new(config: InvoxConfig, engine: Arc<dyn OcrEngine>, store: Arc<S>) -> Self {
        Self {
            extractor: TextExtractor::new(engine, config.ocr),
            parser: FieldParser::new(),
            classifier: DocClassifier::new(config.classifier),
            vat: VatResolver::new(config.vat),
            fraud: FraudScorer::new(config.fraud),
            store,
        }
    }

    /// Process one uploaded document into a persisted invoice record.
    #[instrument(skip(self, doc), fields(user_id = %doc.user_id, filename = %doc.filename))]
    pub async fn process(&self, doc: RawDocument) -> Result<InvoiceRecord> {
        let text = self.extractor.extract(&doc).await;
        let parse = self.parser.parse(&text);
        let classification = self.classifier.classify(&text);
        let vat = self.vat.resolve(&parse.fields);

        // History is read before scoring; no lock is held across the call.
        let history = self.store.list_by_user(&doc.user_id).await?;

        let created_at = Utc::now();
        let joined = text.joined();
        let input = ScoreInput {
            fields: &parse.fields,
            vat: vat.vat,
            text: &joined,
            date: parse.fields.date.unwrap_or_else(|| created_at.date_naive()),
        };
        let fraud = self.fraud.score(&input, &history);

        let record = assemble(&doc, text, parse, classification, vat, &fraud, created_at);

        info!(
            record_id = %record.id,
            doc_type = record.doc_type.as_str(),
            fraud_score = record.fraud_score,
            risky = fraud.is_risky(),
            "invoice processed"
        );

        self.store.put(record.clone()).await?;
        Ok(record)
    }

    /// Retrain the fraud model over one user's stored records and publish
    /// the new snapshot. Intended to be called periodically, off the
    /// upload path.
    pub async fn retrain_fraud_model(&self, user_id: &str) -> Result<()> {
        let records = self.store.list_by_user(user_id).await?;
        self.fraud.retrain(&records);
        Ok(())
    }

    /// Canonical fraud scorer, for callers that need the risky threshold
    /// semantics.
    pub fn fraud_scorer(&self) -> &FraudScorer {
        &self.fraud
    }
}

/// Pure merge of all stage outputs into one immutable record.
///
/// No business logic lives here: missing upstream data has already been
/// degraded to defaults by the stages themselves.
fn assemble(
    doc: &RawDocument,
    text: ExtractedText,
    parse: ParseOutcome,
    classification: Classification,
    vat: VatResolution,
    fraud: &FraudScore,
    created_at: DateTime<Utc>,
) -> InvoiceRecord {
    InvoiceRecord {
        id: Uuid::new_v4().simple().to_string(),
        user_id: doc.user_id.clone(),
        filename: doc.filename.clone(),
        ocr_text: text.lines,
        fields: parse.fields,
        doc_type: classification.doc_type,
        language: classification.language,
        vat: vat.vat,
        tax_valid: vat.tax_valid,
        fraud_score: fraud.score,
        created_at,
    }
}
