//! Error types for the docsift pipeline.
//!
//! Typed errors for the extraction/retrieval core; modules that mostly talk
//! to external services (Qdrant, the embedding model) use anyhow with context
//! and convert at the boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the docsift pipeline
#[derive(Error, Debug)]
pub enum SiftError {
    /// PDF could not be opened or its text layer read
    #[error("Failed to parse PDF {path}: {reason}")]
    PdfParse { path: PathBuf, reason: String },

    /// OCR fallback failed for a scanned page
    #[error("OCR failed on page {page}: {reason}")]
    Ocr { page: u32, reason: String },

    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector store errors
    #[error("Vector store error: {0}")]
    VectorStore(String),

    /// No PDF documents found under the input directory
    #[error("No PDF files found in {0}")]
    EmptyCorpus(PathBuf),

    /// Persona/task query produced no usable text
    #[error("Query is empty after shaping persona and task")]
    EmptyQuery,

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, SiftError>;

/// Convert anyhow errors at module boundaries
impl From<anyhow::Error> for SiftError {
    fn from(err: anyhow::Error) -> Self {
        SiftError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SiftError::PdfParse {
            path: PathBuf::from("reports/q1.pdf"),
            reason: "encrypted".to_string(),
        };
        assert!(err.to_string().contains("q1.pdf"));
        assert!(err.to_string().contains("encrypted"));
    }

    #[test]
    fn test_empty_corpus_error() {
        let err = SiftError::EmptyCorpus(PathBuf::from("input"));
        assert!(err.to_string().contains("input"));
    }
}
