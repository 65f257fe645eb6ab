// Document ingestion: page-aware chunking and vector indexing
pub mod chunker;
pub mod indexer;

pub use chunker::{Chunker, PageChunk};
pub use indexer::ChunkIndexer;
