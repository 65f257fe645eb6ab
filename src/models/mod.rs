//! Data models for parsed documents and their outlines
//!
//! This module provides the shared types flowing through the pipeline:
//! - Text blocks with font and layout metadata
//! - Parsed documents with corpus-level statistics
//! - Headings and hierarchical outlines

pub mod document;
pub mod outline;

// Re-export key types for convenience
pub use document::{DocumentLanguage, FontInfo, ParsedDocument, TextBlock};
pub use outline::{Heading, Outline};
