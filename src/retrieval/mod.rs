// Two-stage persona-driven retrieval.
//
// Components:
// - Coarse filter: rank outline headings against the shaped query, select
//   candidate sections with page spans
// - Fine engine: chunk-level vector search scoped to those spans
// - Ranker: merge, dedupe, and re-score chunk hits

pub mod coarse;
pub mod engine;
pub mod ranker;

// Re-export key types
pub use coarse::{shape_query, CandidateSection, DocumentOutline, SectionFilter};
pub use engine::{FineSearchEngine, FineSearchParams, SectionChunk};
pub use ranker::{RankConfig, RankedChunk, Ranker, RankingStrategy};
