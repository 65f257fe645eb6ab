//! Integration tests for the two-stage retrieval flow without external
//! services: stub embedder for the coarse stage, in-memory chunk searcher
//! for the fine stage, then ranking and report assembly.

use async_trait::async_trait;

use docsift::config::RetrievalConfig;
use docsift::embedding::Embedder;
use docsift::models::{FontInfo, Heading, Outline};
use docsift::output::AnalysisReport;
use docsift::retrieval::{
    shape_query, DocumentOutline, FineSearchEngine, FineSearchParams, RankConfig, Ranker,
    RankingStrategy, SectionFilter,
};
use docsift::store::{ChunkHit, ChunkScope, ChunkSearcher};

/// Deterministic embedder: finance-flavored text maps to one axis,
/// everything else to another.
struct StubEmbedder;

impl Embedder for StubEmbedder {
    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let t = t.to_lowercase();
                if t.contains("revenue") || t.contains("profit") || t.contains("financial") {
                    vec![1.0, 0.0]
                } else {
                    vec![0.0, 1.0]
                }
            })
            .collect())
    }

    fn dimension(&self) -> usize {
        2
    }
}

/// In-memory chunk corpus honoring the page scope
struct MemorySearcher {
    chunks: Vec<ChunkHit>,
}

#[async_trait]
impl ChunkSearcher for MemorySearcher {
    async fn search_scoped(
        &self,
        _query_embedding: &[f32],
        n_results: usize,
        threshold: f32,
        scope: &ChunkScope,
    ) -> anyhow::Result<Vec<ChunkHit>> {
        let mut hits: Vec<ChunkHit> = self
            .chunks
            .iter()
            .filter(|c| scope.contains(&c.document, c.page) && c.score >= threshold)
            .cloned()
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        hits.truncate(n_results);
        Ok(hits)
    }
}

fn font() -> FontInfo {
    FontInfo {
        family: "Arial".to_string(),
        size: 18.0,
        flags: 0,
        color: "#000000".to_string(),
    }
}

fn heading(text: &str, level: u8, page: u32) -> Heading {
    Heading::new(text, level, page, 0.8, font(), (0.0, 0.0))
}

fn chunk(id: &str, document: &str, page: u32, text: &str, score: f32) -> ChunkHit {
    ChunkHit {
        id: id.to_string(),
        score,
        text: text.to_string(),
        document: document.to_string(),
        page,
        chunk_index: 0,
        section: None,
    }
}

fn corpus_outlines() -> Vec<DocumentOutline> {
    vec![
        DocumentOutline {
            document: "earnings.pdf".to_string(),
            page_count: 8,
            outline: Outline::new(vec![
                heading("Financial Highlights", 1, 1),
                heading("Revenue by Segment", 1, 3),
                heading("Legal Notices", 1, 7),
            ]),
        },
        DocumentOutline {
            document: "handbook.pdf".to_string(),
            page_count: 4,
            outline: Outline::new(vec![heading("Office Etiquette", 1, 1)]),
        },
    ]
}

#[tokio::test]
async fn test_two_stage_flow_end_to_end() {
    let embedder = StubEmbedder;
    let query = shape_query("a business analyst", "find the latest research on company profits")
        .unwrap();

    // Coarse: finance headings beat the handbook
    let filter = SectionFilter::new(
        &embedder,
        &RetrievalConfig {
            top_sections: 2,
            min_section_score: 0.5,
            ..Default::default()
        },
    );
    let sections = filter.select(&corpus_outlines(), &query).unwrap();

    assert_eq!(sections.len(), 2);
    assert!(sections.iter().all(|s| s.document == "earnings.pdf"));

    // Fine: chunks outside the selected page spans never surface
    let searcher = MemorySearcher {
        chunks: vec![
            chunk(
                "c-revenue",
                "earnings.pdf",
                3,
                "Revenue grew 18% on data center demand.",
                0.9,
            ),
            chunk(
                "c-legal",
                "earnings.pdf",
                8,
                "Forward looking statements disclaimer.",
                0.95,
            ),
            chunk(
                "c-handbook",
                "handbook.pdf",
                2,
                "Please label your lunch in the fridge.",
                0.9,
            ),
        ],
    };

    let engine = FineSearchEngine::new(&searcher, FineSearchParams::default());
    let query_embedding = embedder.embed(&query).unwrap();
    let hits = engine.retrieve(&query_embedding, &sections).await.unwrap();

    let ids: Vec<&str> = hits.iter().map(|h| h.chunk.id.as_str()).collect();
    assert!(ids.contains(&"c-revenue"));
    assert!(!ids.contains(&"c-handbook"));

    // Rank and assemble the final report
    let ranker = Ranker::with_config(RankConfig {
        strategy: RankingStrategy::Hybrid,
        section_weight: 0.3,
        keyword_boost: 0.1,
    });
    let ranked = ranker.rank(hits, &query);

    let input_documents = vec!["earnings.pdf".to_string(), "handbook.pdf".to_string()];
    let report = AnalysisReport::build(
        input_documents,
        "a business analyst",
        "find the latest research on company profits",
        &sections,
        &ranked,
    );

    assert_eq!(report.metadata.input_documents.len(), 2);
    assert_eq!(report.extracted_sections[0].importance_rank, 1);
    assert!(report
        .subsection_analysis
        .iter()
        .any(|s| s.refined_text.contains("Revenue grew 18%")));

    let json = serde_json::to_string_pretty(&report).unwrap();
    assert!(json.contains("extracted_sections"));
    assert!(json.contains("subsection_analysis"));
    assert!(json.contains("processing_timestamp"));
}

#[tokio::test]
async fn test_duplicate_hits_across_overlapping_sections_dedupe() {
    let embedder = StubEmbedder;

    // Two candidate sections whose page spans overlap on page 3
    let outlines = vec![DocumentOutline {
        document: "earnings.pdf".to_string(),
        page_count: 5,
        outline: Outline::new(vec![
            heading("Financial Highlights", 1, 1),
            heading("Revenue Detail", 2, 2),
        ]),
    }];

    let filter = SectionFilter::new(
        &embedder,
        &RetrievalConfig {
            top_sections: 5,
            min_section_score: 0.5,
            ..Default::default()
        },
    );
    let query = shape_query("an analyst", "review revenue performance").unwrap();
    let sections = filter.select(&outlines, &query).unwrap();
    assert_eq!(sections.len(), 2);

    let searcher = MemorySearcher {
        chunks: vec![chunk(
            "shared",
            "earnings.pdf",
            3,
            "Quarterly revenue details.",
            0.8,
        )],
    };

    let engine = FineSearchEngine::new(&searcher, FineSearchParams::default());
    let query_embedding = embedder.embed(&query).unwrap();
    let hits = engine.retrieve(&query_embedding, &sections).await.unwrap();

    // The same chunk surfaced under both sections
    assert_eq!(hits.len(), 2);

    let ranked = Ranker::new().rank(hits, &query);
    assert_eq!(ranked.len(), 1, "duplicate chunk ids must collapse");
}

#[tokio::test]
async fn test_no_matching_sections_gives_empty_but_valid_report() {
    let embedder = StubEmbedder;

    let filter = SectionFilter::new(
        &embedder,
        &RetrievalConfig {
            min_section_score: 0.9,
            ..Default::default()
        },
    );
    let query = shape_query("a chef", "find dessert recipes").unwrap();

    let outlines = vec![DocumentOutline {
        document: "earnings.pdf".to_string(),
        page_count: 3,
        outline: Outline::new(vec![heading("Financial Highlights", 1, 1)]),
    }];

    let sections = filter.select(&outlines, &query).unwrap();
    assert!(sections.is_empty());

    let report = AnalysisReport::build(
        vec!["earnings.pdf".to_string()],
        "a chef",
        "find dessert recipes",
        &sections,
        &[],
    );

    assert!(report.extracted_sections.is_empty());
    assert!(report.subsection_analysis.is_empty());
    assert!(serde_json::to_string(&report).is_ok());
}
