//! Retrieval quality evaluation: Mean Reciprocal Rank over a golden dataset.
//!
//! Each golden item pairs a user goal with the exact answer passage expected
//! to surface. A query scores 1/rank for the first retrieved chunk containing
//! the golden answer verbatim, 0 when it is absent from the top k.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::embedding::Embedder;
use crate::errors::{Result, SiftError};
use crate::extractor::text::text_similarity;
use crate::store::{ChunkHit, VectorStore};

/// One entry of the golden dataset JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenItem {
    pub user_goal: String,
    pub golden_answer: String,
}

/// Load a golden dataset from a JSON array file
pub fn load_golden(path: &Path) -> Result<Vec<GoldenItem>> {
    let contents = fs::read_to_string(path)?;
    let items: Vec<GoldenItem> = serde_json::from_str(&contents)?;
    Ok(items)
}

/// Per-query evaluation outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryOutcome {
    pub goal: String,
    /// 1-based rank of the first hit containing the golden answer
    pub rank: Option<usize>,
    pub reciprocal_rank: f64,
    /// Best word-overlap similarity between any hit and the golden answer,
    /// useful for diagnosing near misses
    pub best_similarity: f32,
}

/// Aggregate evaluation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub mrr: f64,
    pub outcomes: Vec<QueryOutcome>,
}

/// 1-based rank of the first hit whose text contains the answer verbatim
pub fn rank_of_answer(hits: &[ChunkHit], answer: &str) -> Option<usize> {
    hits.iter()
        .position(|hit| hit.text.contains(answer))
        .map(|i| i + 1)
}

/// Mean of reciprocal ranks; 0.0 for an empty set
pub fn mean_reciprocal_rank(reciprocal_ranks: &[f64]) -> f64 {
    if reciprocal_ranks.is_empty() {
        0.0
    } else {
        reciprocal_ranks.iter().sum::<f64>() / reciprocal_ranks.len() as f64
    }
}

/// Runs golden queries against an ingested corpus
pub struct Evaluator<'a> {
    store: &'a VectorStore,
    embedder: &'a dyn Embedder,
    top_k: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(store: &'a VectorStore, embedder: &'a dyn Embedder, top_k: usize) -> Self {
        Self {
            store,
            embedder,
            top_k,
        }
    }

    /// Evaluate every golden item with an unscoped top-k search
    pub async fn run(&self, dataset: &[GoldenItem]) -> Result<EvalReport> {
        let mut outcomes = Vec::with_capacity(dataset.len());
        let mut reciprocal_ranks = Vec::with_capacity(dataset.len());

        for item in dataset {
            let embedding = self
                .embedder
                .embed(&item.user_goal)
                .map_err(|e| SiftError::Embedding(e.to_string()))?;

            let hits = self
                .store
                .query(&embedding, self.top_k, 0.0)
                .await
                .map_err(|e| SiftError::VectorStore(e.to_string()))?;

            let rank = rank_of_answer(&hits, &item.golden_answer);
            let reciprocal = rank.map(|r| 1.0 / r as f64).unwrap_or(0.0);

            let best_similarity = hits
                .iter()
                .map(|hit| text_similarity(&hit.text, &item.golden_answer))
                .fold(0.0f32, f32::max);

            reciprocal_ranks.push(reciprocal);
            outcomes.push(QueryOutcome {
                goal: item.user_goal.clone(),
                rank,
                reciprocal_rank: reciprocal,
                best_similarity,
            });
        }

        Ok(EvalReport {
            mrr: mean_reciprocal_rank(&reciprocal_ranks),
            outcomes,
        })
    }
}
