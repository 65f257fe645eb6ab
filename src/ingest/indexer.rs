//! Embeds chunk batches and writes them to the vector store.

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::ingest::chunker::PageChunk;
use crate::store::{ChunkRecord, VectorStore};

const EMBED_BATCH_SIZE: usize = 32;

/// Indexes document chunks into the vector store
pub struct ChunkIndexer<'a> {
    engine: &'a dyn Embedder,
    store: &'a VectorStore,
}

impl<'a> ChunkIndexer<'a> {
    pub fn new(engine: &'a dyn Embedder, store: &'a VectorStore) -> Self {
        Self { engine, store }
    }

    /// Replace a document's chunks in the store. Prior points for the same
    /// document are deleted first so re-ingestion never accumulates stale
    /// entries. `section_for_page` resolves the candidate section title a
    /// page belongs to, if any.
    pub async fn index_document(
        &self,
        document_name: &str,
        chunks: &[PageChunk],
        section_for_page: impl Fn(u32) -> Option<String>,
    ) -> Result<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        self.store
            .delete_document(document_name)
            .await
            .context("Failed to clear prior chunks")?;

        let mut indexed = 0usize;

        for batch in chunks.chunks(EMBED_BATCH_SIZE) {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let embeddings = self
                .engine
                .embed_batch(&texts)
                .context("Failed to embed chunk batch")?;

            let records: Vec<ChunkRecord> = batch
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| ChunkRecord {
                    id: Uuid::new_v4().to_string(),
                    text: chunk.text.clone(),
                    embedding,
                    document: document_name.to_string(),
                    page: chunk.page,
                    chunk_index: chunk.index,
                    section: section_for_page(chunk.page),
                })
                .collect();

            indexed += records.len();
            self.store
                .add_batch(records)
                .await
                .context("Failed to upsert chunk batch")?;
        }

        Ok(indexed)
    }
}
