//! Telemetry for pipeline runs
//!
//! Collects per-stage events and running statistics, displayed as a summary
//! at the end of a run.

use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum TelemetryEvent {
    DocumentParsed {
        document: String,
        pages: u32,
        blocks: usize,
        timestamp: Instant,
    },
    OcrFallback {
        document: String,
        page: u32,
        timestamp: Instant,
    },
    DocumentFailed {
        document: String,
        reason: String,
        timestamp: Instant,
    },
    HeadingsDetected {
        document: String,
        count: usize,
        timestamp: Instant,
    },
    ChunksIndexed {
        document: String,
        count: usize,
        timestamp: Instant,
    },
    SectionsSelected {
        count: usize,
        timestamp: Instant,
    },
    SearchCompleted {
        sections: usize,
        hits: usize,
        timestamp: Instant,
    },
}

/// Running statistics over a pipeline run
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    pub documents_processed: usize,
    pub documents_failed: usize,
    pub ocr_pages: usize,
    pub headings_detected: usize,
    pub chunks_indexed: usize,
    pub sections_selected: usize,
    pub chunk_hits: usize,
}

/// Telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<Vec<TelemetryEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

impl TelemetryCollector {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: TelemetryEvent) {
        {
            let mut stats = self.stats.lock().unwrap();
            match &event {
                TelemetryEvent::DocumentParsed { .. } => {
                    stats.documents_processed += 1;
                }
                TelemetryEvent::OcrFallback { .. } => {
                    stats.ocr_pages += 1;
                }
                TelemetryEvent::DocumentFailed { .. } => {
                    stats.documents_failed += 1;
                }
                TelemetryEvent::HeadingsDetected { count, .. } => {
                    stats.headings_detected += count;
                }
                TelemetryEvent::ChunksIndexed { count, .. } => {
                    stats.chunks_indexed += count;
                }
                TelemetryEvent::SectionsSelected { count, .. } => {
                    stats.sections_selected += count;
                }
                TelemetryEvent::SearchCompleted { hits, .. } => {
                    stats.chunk_hits += hits;
                }
            }
        }

        let mut events = self.events.lock().unwrap();
        events.push(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        self.stats.lock().unwrap().clone()
    }

    /// Elapsed time since the collector was created
    pub fn elapsed(&self) -> std::time::Duration {
        self.start_time.elapsed()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<TelemetryEvent> {
        let events = self.events.lock().unwrap();
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }

    /// Fraction of documents that parsed successfully
    pub fn parse_success_rate(&self) -> f64 {
        let stats = self.stats.lock().unwrap();
        let total = stats.documents_processed + stats.documents_failed;
        if total == 0 {
            1.0
        } else {
            stats.documents_processed as f64 / total as f64
        }
    }

    /// Display a summary of the run
    pub fn display_summary(&self) {
        let stats = self.get_stats();
        let elapsed = self.elapsed();

        println!("\nRun Summary");
        println!("─────────────────────────────────────");
        println!("Duration:            {:?}", elapsed);
        println!("Documents processed: {}", stats.documents_processed);
        println!("Documents failed:    {}", stats.documents_failed);
        println!("Pages via OCR:       {}", stats.ocr_pages);
        println!("Headings detected:   {}", stats.headings_detected);
        println!("Chunks indexed:      {}", stats.chunks_indexed);
        println!("Sections selected:   {}", stats.sections_selected);
        println!("Chunk hits:          {}", stats.chunk_hits);
        println!();
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}
