// Vector store for chunk embeddings
pub mod vector_db;

pub use vector_db::{ChunkHit, ChunkRecord, ChunkScope, VectorStore};

use async_trait::async_trait;

/// Seam for scoped chunk search, so the fine retrieval stage can run against
/// the Qdrant-backed store or an in-memory test double.
#[async_trait]
pub trait ChunkSearcher: Send + Sync {
    async fn search_scoped(
        &self,
        query_embedding: &[f32],
        n_results: usize,
        threshold: f32,
        scope: &ChunkScope,
    ) -> anyhow::Result<Vec<ChunkHit>>;
}

#[async_trait]
impl ChunkSearcher for VectorStore {
    async fn search_scoped(
        &self,
        query_embedding: &[f32],
        n_results: usize,
        threshold: f32,
        scope: &ChunkScope,
    ) -> anyhow::Result<Vec<ChunkHit>> {
        self.query_scoped(query_embedding, n_results, threshold, scope)
            .await
    }
}
