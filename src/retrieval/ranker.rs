// Merging and re-ranking of chunk hits from the fine stage
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::RetrievalConfig;
use crate::retrieval::engine::SectionChunk;

/// Ranking strategy for merged chunk hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RankingStrategy {
    /// Use raw similarity scores only
    Similarity,
    /// Blend chunk similarity with the section's coarse score
    SectionWeighted,
    /// Blend plus an exact-keyword boost
    Hybrid,
}

/// Ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    pub strategy: RankingStrategy,
    /// Weight of the section score (0.0 to 1.0) when blending
    pub section_weight: f32,
    /// Cap on the boost for exact keyword matches
    pub keyword_boost: f32,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            strategy: RankingStrategy::Hybrid,
            section_weight: 0.3,
            keyword_boost: 0.1,
        }
    }
}

impl From<&RetrievalConfig> for RankConfig {
    fn from(config: &RetrievalConfig) -> Self {
        Self {
            strategy: RankingStrategy::Hybrid,
            section_weight: config.section_weight,
            keyword_boost: config.keyword_boost,
        }
    }
}

/// A chunk hit with its final ranking score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedChunk {
    pub hit: SectionChunk,
    pub original_score: f32,
    pub ranked_score: f32,
    pub boost_applied: f32,
}

/// Re-ranker merging hits across candidate sections
pub struct Ranker {
    config: RankConfig,
}

impl Ranker {
    pub fn new() -> Self {
        Self {
            config: RankConfig::default(),
        }
    }

    pub fn with_config(config: RankConfig) -> Self {
        Self { config }
    }

    /// Dedupe hits by chunk id (best section score wins), score each by the
    /// configured strategy, and sort descending with a stable tie-break on
    /// (document, page).
    pub fn rank(&self, hits: Vec<SectionChunk>, query: &str) -> Vec<RankedChunk> {
        let mut by_id: HashMap<String, SectionChunk> = HashMap::new();
        for hit in hits {
            match by_id.get(&hit.chunk.id) {
                Some(existing) if existing.section_score >= hit.section_score => {}
                _ => {
                    by_id.insert(hit.chunk.id.clone(), hit);
                }
            }
        }

        let mut ranked: Vec<RankedChunk> = by_id
            .into_values()
            .map(|hit| {
                let original_score = hit.chunk.score;
                let ranked_score = self.compute_score(&hit, query);
                RankedChunk {
                    boost_applied: ranked_score - original_score,
                    original_score,
                    ranked_score,
                    hit,
                }
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.ranked_score
                .partial_cmp(&a.ranked_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.hit.chunk.document.cmp(&b.hit.chunk.document))
                .then_with(|| a.hit.chunk.page.cmp(&b.hit.chunk.page))
        });

        ranked
    }

    fn compute_score(&self, hit: &SectionChunk, query: &str) -> f32 {
        let base = hit.chunk.score;

        match self.config.strategy {
            RankingStrategy::Similarity => base,
            RankingStrategy::SectionWeighted => self.blend(base, hit.section_score),
            RankingStrategy::Hybrid => {
                let blended = self.blend(base, hit.section_score);
                (blended + self.keyword_boost(hit, query)).min(1.0)
            }
        }
    }

    fn blend(&self, chunk_score: f32, section_score: f32) -> f32 {
        let similarity_weight = 1.0 - self.config.section_weight;
        chunk_score * similarity_weight + section_score * self.config.section_weight
    }

    /// Boost for query terms (longer than 3 chars) appearing verbatim
    fn keyword_boost(&self, hit: &SectionChunk, query: &str) -> f32 {
        let query_lower = query.to_lowercase();
        let content_lower = hit.chunk.text.to_lowercase();

        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        if query_words.is_empty() {
            return 0.0;
        }

        let matches = query_words
            .iter()
            .filter(|word| word.len() > 3 && content_lower.contains(*word))
            .count();

        if matches == 0 {
            return 0.0;
        }

        let boost_per_match = self.config.keyword_boost / query_words.len() as f32;
        (matches as f32 * boost_per_match).min(self.config.keyword_boost)
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ChunkHit;

    fn section_chunk(id: &str, text: &str, score: f32, section_score: f32) -> SectionChunk {
        SectionChunk {
            chunk: ChunkHit {
                id: id.to_string(),
                score,
                text: text.to_string(),
                document: "doc.pdf".to_string(),
                page: 1,
                chunk_index: 0,
                section: None,
            },
            section_title: "Section".to_string(),
            section_score,
        }
    }

    #[test]
    fn test_similarity_strategy_keeps_raw_scores() {
        let ranker = Ranker::with_config(RankConfig {
            strategy: RankingStrategy::Similarity,
            section_weight: 0.0,
            keyword_boost: 0.0,
        });

        let ranked = ranker.rank(
            vec![
                section_chunk("1", "content", 0.6, 0.9),
                section_chunk("2", "content", 0.9, 0.1),
            ],
            "query",
        );

        assert_eq!(ranked[0].hit.chunk.id, "2");
        assert_eq!(ranked[0].ranked_score, 0.9);
        assert_eq!(ranked[1].ranked_score, 0.6);
    }

    #[test]
    fn test_section_weighted_blend() {
        let ranker = Ranker::with_config(RankConfig {
            strategy: RankingStrategy::SectionWeighted,
            section_weight: 0.5,
            keyword_boost: 0.0,
        });

        let ranked = ranker.rank(vec![section_chunk("1", "content", 0.4, 0.8)], "query");
        assert!((ranked[0].ranked_score - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_hybrid_keyword_boost() {
        let ranker = Ranker::new();
        let with_match = section_chunk("1", "quarterly revenue results", 0.5, 0.5);
        let without_match = section_chunk("2", "unrelated content entirely", 0.5, 0.5);

        let ranked = ranker.rank(vec![without_match, with_match], "revenue growth");
        assert_eq!(ranked[0].hit.chunk.id, "1");
        assert!(ranked[0].boost_applied > ranked[1].boost_applied);
    }

    #[test]
    fn test_dedupe_keeps_best_section() {
        let ranker = Ranker::with_config(RankConfig {
            strategy: RankingStrategy::SectionWeighted,
            section_weight: 1.0,
            keyword_boost: 0.0,
        });

        let low = section_chunk("same", "content", 0.5, 0.2);
        let mut high = section_chunk("same", "content", 0.5, 0.9);
        high.section_title = "Better Section".to_string();

        let ranked = ranker.rank(vec![low, high], "query");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].hit.section_title, "Better Section");
        assert!((ranked[0].ranked_score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_scores_capped_at_one() {
        let ranker = Ranker::with_config(RankConfig {
            strategy: RankingStrategy::Hybrid,
            section_weight: 0.3,
            keyword_boost: 0.5,
        });

        let ranked = ranker.rank(
            vec![section_chunk("1", "revenue growth revenue growth", 0.99, 0.99)],
            "revenue growth",
        );
        assert!(ranked[0].ranked_score <= 1.0);
    }
}
