//! Error types for the invox-core library.

use thiserror::Error;

/// Main error type for the invox library.
///
/// Most upstream failures in the pipeline degrade the record's data quality
/// instead of surfacing here (missing fields, unknown class, defaulted VAT,
/// rule-only fraud scoring). Only collaborator failures become errors, and
/// of those only storage aborts a pipeline run.
#[derive(Error, Debug)]
pub enum InvoxError {
    /// Storage collaborator error. Fatal to a pipeline run.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// OCR collaborator error. The text extractor converts this into a
    /// degraded `ExtractedText` before it can reach a caller.
    #[error("OCR error: {0}")]
    Ocr(#[from] OcrError),

    /// LLM collaborator error. The query resolver converts this into a
    /// canned deterministic answer before it can reach a caller.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV export could not be serialized.
    #[error("export error: {0}")]
    Export(String),
}

/// Errors from the OCR collaborator boundary.
#[derive(Error, Debug)]
pub enum OcrError {
    /// The engine does not handle this media type.
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The input bytes could not be decoded.
    #[error("unreadable input: {0}")]
    Unreadable(String),

    /// The engine produced no text at all.
    #[error("no text extracted")]
    Empty,

    /// The engine did not respond within the configured timeout.
    #[error("OCR timed out after {0} ms")]
    Timeout(u64),

    /// Engine-internal failure.
    #[error("engine failure: {0}")]
    Engine(String),
}

/// Errors from the storage collaborator boundary.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The record could not be written.
    #[error("failed to persist record: {0}")]
    Put(String),

    /// A user's records could not be listed.
    #[error("failed to list records for user {user_id}: {reason}")]
    List { user_id: String, reason: String },

    /// Underlying I/O failure of a file-backed store.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Corrupt persisted data.
    #[error("corrupt store data: {0}")]
    Corrupt(String),
}

/// Errors from the LLM collaborator boundary.
#[derive(Error, Debug)]
pub enum LlmError {
    /// No client configured (missing API key).
    #[error("LLM client not configured")]
    NotConfigured,

    /// Request failed or returned a non-success status.
    #[error("LLM request failed: {0}")]
    Request(String),

    /// Response body could not be interpreted.
    #[error("malformed LLM response: {0}")]
    Response(String),

    /// The provider did not answer within the configured timeout.
    #[error("LLM timed out after {0} ms")]
    Timeout(u64),
}

/// Result type for the invox library.
pub type Result<T> = std::result::Result<T, InvoxError>;
