//! Data models for the invoice pipeline.

pub mod config;
pub mod record;

pub use config::InvoxConfig;
pub use record::{
    DocType, ExtractedText, InvoiceRecord, ParsedFields, QueryAnswer, RawDocument,
};
