//! docsift - Persona-driven section retrieval over PDF collections
//!
//! Two cooperating retrieval stages over a directory of PDFs:
//!
//! 1. **Coarse**: extract each document's heading outline from font and
//!    layout signals, embed the headings and the persona+task query, and
//!    select the best-matching candidate sections.
//! 2. **Fine**: chunk page text, index it in a vector store, search scoped
//!    to the candidate sections' page spans, and rank the merged hits into
//!    a final `output.json`.

pub mod config;
pub mod errors;
pub mod models;

// Re-export commonly used types
pub use errors::{Result, SiftError};

// Extraction: PDF -> text blocks -> outline
pub mod extractor;

// Retrieval: embeddings, vector store, chunking, two-stage search
pub mod embedding;
pub mod ingest;
pub mod retrieval;
pub mod store;

// Orchestration and reporting
pub mod eval;
pub mod output;
pub mod pipeline;

// Interface layer
pub mod cli;
pub mod doctor;
pub mod telemetry;
