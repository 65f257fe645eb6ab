//! End-to-end analysis pipeline: parse -> outline -> coarse filter ->
//! chunk/index -> fine retrieval -> rank -> report.
//!
//! One failing document never aborts a run: it is recorded in telemetry and
//! skipped, matching the per-document error handling of the extraction loop.

use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

use crate::config::Config;
use crate::embedding::Embedder;
use crate::errors::{Result, SiftError};
use crate::extractor::{HeadingDetector, OutlineBuilder, PdfParser};
use crate::ingest::{ChunkIndexer, Chunker};
use crate::models::{Outline, ParsedDocument};
use crate::output::AnalysisReport;
use crate::retrieval::{
    shape_query, CandidateSection, DocumentOutline, FineSearchEngine, FineSearchParams,
    RankConfig, RankedChunk, Ranker, SectionFilter,
};
use crate::store::VectorStore;
use crate::telemetry::{TelemetryCollector, TelemetryEvent};

/// A parsed document together with its built outline
pub struct DocumentRecord {
    pub parsed: ParsedDocument,
    pub outline: Outline,
}

/// Everything an analysis run produces
pub struct AnalysisOutcome {
    pub report: AnalysisReport,
    pub sections: Vec<CandidateSection>,
    pub chunks: Vec<RankedChunk>,
}

/// Two-stage retrieval pipeline over a PDF corpus
pub struct AnalysisPipeline<'a> {
    parser: PdfParser,
    detector: HeadingDetector,
    builder: OutlineBuilder,
    chunker: Chunker,
    embedder: &'a dyn Embedder,
    store: &'a VectorStore,
    config: Config,
    telemetry: TelemetryCollector,
    verbose: bool,
}

impl<'a> AnalysisPipeline<'a> {
    pub fn new(
        config: Config,
        embedder: &'a dyn Embedder,
        store: &'a VectorStore,
        telemetry: TelemetryCollector,
        verbose: bool,
    ) -> Result<Self> {
        Ok(Self {
            parser: PdfParser::new(&config.extraction)?,
            detector: HeadingDetector::new(&config.extraction),
            builder: OutlineBuilder::new(),
            chunker: Chunker::new(&config.chunking),
            embedder,
            store,
            config,
            telemetry,
            verbose,
        })
    }

    /// Non-recursive listing of PDF files under the input directory
    pub fn collect_pdfs(input_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut pdfs: Vec<PathBuf> = WalkDir::new(input_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| {
                p.extension()
                    .and_then(|ext| ext.to_str())
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false)
            })
            .collect();

        pdfs.sort();

        if pdfs.is_empty() {
            return Err(SiftError::EmptyCorpus(input_dir.to_path_buf()));
        }

        Ok(pdfs)
    }

    /// Parse a single document and build its outline
    pub fn extract_outline(&self, path: &Path) -> Result<DocumentRecord> {
        let parsed = self.parser.parse(path)?;
        let headings = self.detector.detect_headings(&parsed);
        let outline = self.builder.build_outline(headings);
        Ok(DocumentRecord { parsed, outline })
    }

    /// Parse the whole corpus, skipping documents that fail
    pub fn extract_corpus(&self, paths: &[PathBuf]) -> Vec<DocumentRecord> {
        let mut records = Vec::new();

        for path in paths {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            if self.verbose {
                println!("Processing file: {}", name);
            }

            match self.extract_outline(path) {
                Ok(record) => {
                    self.telemetry.record(TelemetryEvent::DocumentParsed {
                        document: name.clone(),
                        pages: record.parsed.page_count,
                        blocks: record.parsed.text_blocks.len(),
                        timestamp: Instant::now(),
                    });

                    for page in ocr_pages(&record.parsed) {
                        self.telemetry.record(TelemetryEvent::OcrFallback {
                            document: name.clone(),
                            page,
                            timestamp: Instant::now(),
                        });
                    }

                    self.telemetry.record(TelemetryEvent::HeadingsDetected {
                        document: name,
                        count: record.outline.headings.len(),
                        timestamp: Instant::now(),
                    });

                    records.push(record);
                }
                Err(e) => {
                    eprintln!("Failed to process {}: {}", name, e);
                    self.telemetry.record(TelemetryEvent::DocumentFailed {
                        document: name,
                        reason: e.to_string(),
                        timestamp: Instant::now(),
                    });
                }
            }
        }

        records
    }

    /// Run the full two-stage analysis over a directory of PDFs
    pub async fn analyze(
        &self,
        input_dir: &Path,
        persona: &str,
        task: &str,
    ) -> Result<AnalysisOutcome> {
        let query = shape_query(persona, task)?;
        if self.verbose {
            println!("Search query: '{}'", query);
        }

        let paths = Self::collect_pdfs(input_dir)?;
        let records = self.extract_corpus(&paths);

        let input_documents: Vec<String> =
            records.iter().map(|r| r.parsed.filename.clone()).collect();

        // Coarse stage: rank headings against the query
        let outlines: Vec<DocumentOutline> = records
            .iter()
            .filter(|r| !r.outline.is_empty())
            .map(|r| DocumentOutline {
                document: r.parsed.filename.clone(),
                page_count: r.parsed.page_count,
                outline: r.outline.clone(),
            })
            .collect();

        let filter = SectionFilter::new(self.embedder, &self.config.retrieval);
        let sections = filter.select(&outlines, &query)?;

        self.telemetry.record(TelemetryEvent::SectionsSelected {
            count: sections.len(),
            timestamp: Instant::now(),
        });

        if sections.is_empty() {
            let report =
                AnalysisReport::build(input_documents, persona, task, &[], &[]);
            return Ok(AnalysisOutcome {
                report,
                sections,
                chunks: Vec::new(),
            });
        }

        // Index chunks for the documents the coarse stage selected
        let indexer = ChunkIndexer::new(self.embedder, self.store);
        for record in &records {
            let name = record.parsed.filename.as_str();
            if !sections.iter().any(|s| s.document == name) {
                continue;
            }

            let chunks = self.chunker.chunk_document(&record.parsed);
            let doc_sections: Vec<&CandidateSection> =
                sections.iter().filter(|s| s.document == name).collect();

            let indexed = indexer
                .index_document(name, &chunks, |page| {
                    doc_sections
                        .iter()
                        .filter(|s| (s.page_start..=s.page_end).contains(&page))
                        .max_by(|a, b| {
                            a.score
                                .partial_cmp(&b.score)
                                .unwrap_or(std::cmp::Ordering::Equal)
                        })
                        .map(|s| s.title.clone())
                })
                .await?;

            self.telemetry.record(TelemetryEvent::ChunksIndexed {
                document: name.to_string(),
                count: indexed,
                timestamp: Instant::now(),
            });
        }

        // Fine stage: scoped chunk search and ranking
        let query_embedding = self
            .embedder
            .embed(&query)
            .map_err(|e| SiftError::Embedding(e.to_string()))?;

        let engine =
            FineSearchEngine::new(self.store, FineSearchParams::from(&self.config.retrieval));
        let hits = engine.retrieve(&query_embedding, &sections).await?;

        self.telemetry.record(TelemetryEvent::SearchCompleted {
            sections: sections.len(),
            hits: hits.len(),
            timestamp: Instant::now(),
        });

        let ranker = Ranker::with_config(RankConfig::from(&self.config.retrieval));
        let chunks = ranker.rank(hits, &query);

        let report =
            AnalysisReport::build(input_documents, persona, task, &sections, &chunks);

        Ok(AnalysisOutcome {
            report,
            sections,
            chunks,
        })
    }

    /// Chunk and index every document in the corpus, without section
    /// scoping. Used by the evaluation harness, which searches unscoped.
    pub async fn ingest_corpus(&self, input_dir: &Path) -> Result<usize> {
        let paths = Self::collect_pdfs(input_dir)?;
        let records = self.extract_corpus(&paths);

        let indexer = ChunkIndexer::new(self.embedder, self.store);
        let mut total = 0usize;

        for record in &records {
            let name = record.parsed.filename.as_str();
            let chunks = self.chunker.chunk_document(&record.parsed);
            let indexed = indexer.index_document(name, &chunks, |_| None).await?;

            self.telemetry.record(TelemetryEvent::ChunksIndexed {
                document: name.to_string(),
                count: indexed,
                timestamp: Instant::now(),
            });

            total += indexed;
        }

        Ok(total)
    }

    pub fn telemetry(&self) -> &TelemetryCollector {
        &self.telemetry
    }
}

/// Pages whose text came from the OCR fallback
fn ocr_pages(document: &ParsedDocument) -> Vec<u32> {
    let mut pages: Vec<u32> = document
        .text_blocks
        .iter()
        .filter(|b| b.font_info.is_ocr())
        .map(|b| b.page)
        .collect();
    pages.sort_unstable();
    pages.dedup();
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FontInfo, TextBlock};

    #[test]
    fn test_collect_pdfs_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("a.PDF"), b"x").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.pdf"), b"x").unwrap();

        let pdfs = AnalysisPipeline::collect_pdfs(dir.path()).unwrap();
        let names: Vec<String> = pdfs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        // Nested files are not picked up; extension match is case-insensitive
        assert_eq!(names, vec!["a.PDF".to_string(), "b.pdf".to_string()]);
    }

    #[test]
    fn test_collect_pdfs_empty_dir_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = AnalysisPipeline::collect_pdfs(dir.path()).unwrap_err();
        assert!(matches!(err, SiftError::EmptyCorpus(_)));
    }

    #[test]
    fn test_ocr_pages_dedup() {
        let mut doc = ParsedDocument::new("scan.pdf", "/tmp/scan.pdf");
        for page in [2u32, 2, 5] {
            doc.text_blocks.push(TextBlock {
                text: "line".to_string(),
                page,
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 12.0,
                font_info: FontInfo::ocr(),
            });
        }
        doc.text_blocks.push(TextBlock {
            text: "normal".to_string(),
            page: 1,
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 12.0,
            font_info: FontInfo {
                family: "Arial".to_string(),
                size: 12.0,
                flags: 0,
                color: "#000000".to_string(),
            },
        });

        assert_eq!(ocr_pages(&doc), vec![2, 5]);
    }
}
