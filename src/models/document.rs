//! Parsed document representation: text blocks with font and layout metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Sentinel font family assigned to OCR-recovered blocks, which carry no
/// real font information.
pub const OCR_FONT_FAMILY: &str = "OCR";

/// Font information attached to a text block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontInfo {
    pub family: String,
    pub size: f32,
    pub flags: u32,
    pub color: String,
}

impl FontInfo {
    /// Font info for OCR-recovered text, where the source font is unknown
    pub fn ocr() -> Self {
        Self {
            family: OCR_FONT_FAMILY.to_string(),
            size: 12.0,
            flags: 0,
            color: "#000000".to_string(),
        }
    }

    /// Whether this block came from the OCR fallback rather than the text layer
    pub fn is_ocr(&self) -> bool {
        self.family == OCR_FONT_FAMILY
    }
}

/// A span of text extracted from a PDF page, with position and font metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextBlock {
    pub text: String,
    /// 1-based page number
    pub page: u32,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub font_info: FontInfo,
}

/// Language routing for heading detection heuristics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentLanguage {
    #[default]
    English,
    Japanese,
}

/// A fully parsed PDF document with corpus statistics used downstream by
/// heading detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub filename: String,
    pub filepath: String,
    pub page_count: u32,
    pub processed_at: DateTime<Utc>,
    pub text_blocks: Vec<TextBlock>,
    pub language: DocumentLanguage,

    // Statistics for heading analysis
    pub avg_font_size: f32,
    pub primary_font: String,
    /// (width, height) per page, in points
    pub page_dimensions: Vec<(f32, f32)>,
}

impl ParsedDocument {
    /// Create an empty document shell for the given file
    pub fn new(filename: impl Into<String>, filepath: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            filepath: filepath.into(),
            page_count: 0,
            processed_at: Utc::now(),
            text_blocks: Vec::new(),
            language: DocumentLanguage::default(),
            avg_font_size: 0.0,
            primary_font: "Unknown".to_string(),
            page_dimensions: Vec::new(),
        }
    }

    /// Recompute average font size and primary font from the text blocks.
    ///
    /// OCR blocks are excluded: their font metadata is synthetic and would
    /// drag the average toward the 12pt sentinel.
    pub fn calculate_stats(&mut self) {
        let sizes: Vec<f32> = self
            .text_blocks
            .iter()
            .filter(|b| b.font_info.size > 0.0 && !b.font_info.is_ocr())
            .map(|b| b.font_info.size)
            .collect();

        self.avg_font_size = if sizes.is_empty() {
            12.0
        } else {
            sizes.iter().sum::<f32>() / sizes.len() as f32
        };

        let mut family_counts: HashMap<&str, usize> = HashMap::new();
        for block in &self.text_blocks {
            if !block.font_info.is_ocr() {
                *family_counts.entry(block.font_info.family.as_str()).or_insert(0) += 1;
            }
        }

        if let Some((family, _)) = family_counts.into_iter().max_by_key(|(_, n)| *n) {
            self.primary_font = family.to_string();
        }
    }

    /// Concatenated text of all blocks on a page, in extraction order
    pub fn page_text(&self, page: u32) -> String {
        let mut parts = Vec::new();
        for block in &self.text_blocks {
            if block.page == page {
                parts.push(block.text.as_str());
            }
        }
        parts.join(" ")
    }

    /// Page width for a 1-based page number, if known
    pub fn page_width(&self, page: u32) -> Option<f32> {
        self.page_dimensions
            .get(page.saturating_sub(1) as usize)
            .map(|(w, _)| *w)
    }
}
