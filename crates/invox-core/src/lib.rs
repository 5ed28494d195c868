//! Core library for invoice document processing.
//!
//! This crate provides:
//! - Text extraction from uploads (plain text and embedded-text PDFs)
//! - Rule-based field parsing (vendor, date, currency, amount, tax id)
//! - Document classification and language detection
//! - VAT resolution against per-jurisdiction rates
//! - Fraud scoring (override rules plus a learned statistical model)
//! - A natural-language query resolver over stored records

pub mod classify;
pub mod error;
pub mod fields;
pub mod fraud;
pub mod llm;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod query;
pub mod store;
pub mod vat;

pub use error::{InvoxError, LlmError, OcrError, Result, StorageError};
pub use models::config::InvoxConfig;
pub use models::record::{
    DocType, ExtractedText, InvoiceRecord, ParsedFields, QueryAnswer, RawDocument,
};
pub use ocr::{EmbeddedTextEngine, OcrEngine, PlainTextEngine, TextExtractor};
pub use pipeline::InvoicePipeline;
pub use query::{QueryIntent, QueryResolver, TimeWindow};
pub use store::{InvoiceStore, MemoryStore};
