//! Fine retrieval stage: chunk-level semantic search scoped to candidate
//! sections.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::RetrievalConfig;
use crate::retrieval::coarse::CandidateSection;
use crate::store::{ChunkHit, ChunkSearcher};

/// Parameters for the chunk-level search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineSearchParams {
    /// Chunk hits retrieved per candidate section
    pub top_k: usize,
    /// Minimum similarity for a chunk hit
    pub threshold: f32,
}

impl Default for FineSearchParams {
    fn default() -> Self {
        Self {
            top_k: 5,
            threshold: 0.3,
        }
    }
}

impl From<&RetrievalConfig> for FineSearchParams {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            top_k: config.top_k,
            threshold: config.chunk_threshold,
        }
    }
}

/// A chunk hit annotated with the candidate section it was found under
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionChunk {
    pub chunk: ChunkHit,
    pub section_title: String,
    pub section_score: f32,
}

/// Chunk-level search engine restricted to candidate section page spans
pub struct FineSearchEngine<'a> {
    store: &'a dyn ChunkSearcher,
    params: FineSearchParams,
}

impl<'a> FineSearchEngine<'a> {
    pub fn new(store: &'a dyn ChunkSearcher, params: FineSearchParams) -> Self {
        Self { store, params }
    }

    /// Search every candidate section's page span and annotate the hits
    pub async fn retrieve(
        &self,
        query_embedding: &[f32],
        sections: &[CandidateSection],
    ) -> Result<Vec<SectionChunk>> {
        let mut results = Vec::new();

        for section in sections {
            let hits = self
                .store
                .search_scoped(
                    query_embedding,
                    self.params.top_k,
                    self.params.threshold,
                    &section.scope(),
                )
                .await
                .context(format!(
                    "Failed to search section '{}' in {}",
                    section.title, section.document
                ))?;

            for chunk in hits {
                results.push(SectionChunk {
                    chunk,
                    section_title: section.title.clone(),
                    section_score: section.score,
                });
            }
        }

        Ok(results)
    }

    pub fn params(&self) -> &FineSearchParams {
        &self.params
    }
}
