// Sentence embedding engine
pub mod engine;

pub use engine::EmbeddingEngine;

/// Seam for anything that can turn text into vectors. The production
/// implementation is [`EmbeddingEngine`]; tests substitute deterministic
/// stubs.
pub trait Embedder: Send + Sync {
    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;

    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text])?;
        vectors
            .pop()
            .ok_or_else(|| anyhow::anyhow!("embedder returned no vector"))
    }

    fn dimension(&self) -> usize;
}

impl Embedder for EmbeddingEngine {
    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        EmbeddingEngine::embed_batch(self, texts)
    }

    fn dimension(&self) -> usize {
        EmbeddingEngine::dimension(self)
    }
}
