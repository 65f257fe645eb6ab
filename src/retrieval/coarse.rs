//! Coarse retrieval stage: heading-level semantic pre-filtering.
//!
//! Embeds every outline heading and the shaped persona+task query, ranks
//! headings by cosine similarity, and turns the best ones into candidate
//! sections with page spans for the fine stage.

use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;
use crate::embedding::Embedder;
use crate::errors::{Result, SiftError};
use crate::models::Outline;
use crate::store::ChunkScope;

/// A document outline paired with its provenance, input to the coarse stage
#[derive(Debug, Clone)]
pub struct DocumentOutline {
    pub document: String,
    pub page_count: u32,
    pub outline: Outline,
}

/// A heading selected by the coarse filter, with the page span it governs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSection {
    pub document: String,
    pub title: String,
    pub level: u8,
    /// 1-based inclusive page span
    pub page_start: u32,
    pub page_end: u32,
    /// Cosine similarity between heading text and the query
    pub score: f32,
}

impl CandidateSection {
    pub fn scope(&self) -> ChunkScope {
        ChunkScope {
            document: self.document.clone(),
            page_start: self.page_start,
            page_end: self.page_end,
        }
    }
}

/// Combine persona and task into the retrieval query
pub fn shape_query(persona: &str, task: &str) -> Result<String> {
    let persona = persona.trim();
    let task = task.trim();

    if persona.is_empty() && task.is_empty() {
        return Err(SiftError::EmptyQuery);
    }
    if persona.is_empty() {
        return Ok(task.to_string());
    }
    if task.is_empty() {
        return Ok(persona.to_string());
    }

    Ok(format!("As {}, I need to {}.", persona, task))
}

/// Cosine similarity between two vectors, 0.0 on mismatch or zero norms
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Heading-level pre-filter over document outlines
pub struct SectionFilter<'a> {
    embedder: &'a dyn Embedder,
    top_sections: usize,
    min_score: f32,
}

impl<'a> SectionFilter<'a> {
    pub fn new(embedder: &'a dyn Embedder, config: &RetrievalConfig) -> Self {
        Self {
            embedder,
            top_sections: config.top_sections,
            min_score: config.min_section_score,
        }
    }

    /// Rank every heading across the corpus against the query and keep the
    /// top sections above the similarity floor.
    pub fn select(
        &self,
        outlines: &[DocumentOutline],
        query: &str,
    ) -> Result<Vec<CandidateSection>> {
        let mut sections: Vec<CandidateSection> = Vec::new();
        let mut heading_texts: Vec<&str> = Vec::new();

        for doc in outlines {
            for (i, heading) in doc.outline.headings.iter().enumerate() {
                let span = section_span(doc, i);
                sections.push(CandidateSection {
                    document: doc.document.clone(),
                    title: heading.text.clone(),
                    level: heading.level,
                    page_start: span.0,
                    page_end: span.1,
                    score: 0.0,
                });
                heading_texts.push(heading.text.as_str());
            }
        }

        if sections.is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self
            .embedder
            .embed(query)
            .map_err(|e| SiftError::Embedding(e.to_string()))?;
        let heading_vecs = self
            .embedder
            .embed_batch(&heading_texts)
            .map_err(|e| SiftError::Embedding(e.to_string()))?;

        for (section, vec) in sections.iter_mut().zip(heading_vecs.iter()) {
            section.score = cosine_similarity(&query_vec, vec);
        }

        Ok(select_top(sections, self.top_sections, self.min_score))
    }
}

/// Pick the page span a heading governs: from its own page through the page
/// before the next heading of the same or higher level, else the document end.
fn section_span(doc: &DocumentOutline, heading_index: usize) -> (u32, u32) {
    let headings = &doc.outline.headings;
    let heading = &headings[heading_index];

    let next_boundary = headings[heading_index + 1..]
        .iter()
        .find(|h| h.level <= heading.level)
        .map(|h| h.page);

    let last_page = doc.page_count.max(heading.page);

    let page_end = match next_boundary {
        // A sibling on the same page caps the span at that page
        Some(next_page) if next_page > heading.page => (next_page - 1).min(last_page),
        Some(_) => heading.page,
        None => last_page,
    };

    (heading.page, page_end.max(heading.page))
}

/// Keep the best-scoring sections above the floor, ordered by score
fn select_top(
    mut sections: Vec<CandidateSection>,
    top_sections: usize,
    min_score: f32,
) -> Vec<CandidateSection> {
    sections.retain(|s| s.score >= min_score);
    sections.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.document.cmp(&b.document))
            .then_with(|| a.page_start.cmp(&b.page_start))
    });
    sections.truncate(top_sections);
    sections
}
