//! Output formatting: per-document outline JSON and the final ranked
//! `output.json` for an analysis run.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::Result;
use crate::models::Outline;
use crate::retrieval::{CandidateSection, RankedChunk};

/// One entry of the outline JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: String,
    pub text: String,
    pub page: u32,
}

/// Per-document outline report (`{stem}_outline.json`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineReport {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

impl OutlineReport {
    pub fn from_outline(title: impl Into<String>, outline: &Outline) -> Self {
        Self {
            title: title.into(),
            outline: outline
                .headings
                .iter()
                .map(|h| OutlineEntry {
                    level: h.level_label(),
                    text: h.text.clone(),
                    page: h.page,
                })
                .collect(),
        }
    }

    /// Write the report next to other outlines as `{stem}_outline.json`
    pub fn write(&self, output_dir: &Path, stem: &str) -> Result<PathBuf> {
        fs::create_dir_all(output_dir)?;
        let path = output_dir.join(format!("{}_outline.json", stem));
        let json = serde_json::to_string_pretty(self)?;
        fs::write(&path, json)?;
        Ok(path)
    }
}

/// Metadata block of the analysis report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    pub processing_timestamp: String,
}

/// A ranked section entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: usize,
    pub page_number: u32,
}

/// A ranked text passage entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsectionEntry {
    pub document: String,
    pub refined_text: String,
    pub page_number: u32,
}

/// The final `output.json` of an analysis run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub extracted_sections: Vec<ExtractedSection>,
    pub subsection_analysis: Vec<SubsectionEntry>,
}

impl AnalysisReport {
    /// Assemble the report from ranked sections and chunks. Section ranks are
    /// contiguous from 1 in ranking order.
    pub fn build(
        input_documents: Vec<String>,
        persona: &str,
        job_to_be_done: &str,
        sections: &[CandidateSection],
        chunks: &[RankedChunk],
    ) -> Self {
        let extracted_sections = sections
            .iter()
            .enumerate()
            .map(|(i, section)| ExtractedSection {
                document: section.document.clone(),
                section_title: section.title.clone(),
                importance_rank: i + 1,
                page_number: section.page_start,
            })
            .collect();

        let subsection_analysis = chunks
            .iter()
            .map(|ranked| SubsectionEntry {
                document: ranked.hit.chunk.document.clone(),
                refined_text: ranked.hit.chunk.text.clone(),
                page_number: ranked.hit.chunk.page,
            })
            .collect();

        Self {
            metadata: ReportMetadata {
                input_documents,
                persona: persona.to_string(),
                job_to_be_done: job_to_be_done.to_string(),
                processing_timestamp: Utc::now().to_rfc3339(),
            },
            extracted_sections,
            subsection_analysis,
        }
    }

    /// Write the report as pretty-printed JSON
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}
