//! Integration tests for the structural extraction path: text blocks ->
//! heading detection -> outline building -> outline JSON.
//!
//! Runs on synthetic documents so no PDF library is required.

use docsift::config::ExtractionConfig;
use docsift::extractor::{HeadingDetector, OutlineBuilder};
use docsift::models::{FontInfo, ParsedDocument, TextBlock};
use docsift::output::OutlineReport;

fn block(text: &str, page: u32, y: f32, size: f32, family: &str) -> TextBlock {
    TextBlock {
        text: text.to_string(),
        page,
        x: 72.0,
        y,
        width: 300.0,
        height: size,
        font_info: FontInfo {
            family: family.to_string(),
            size,
            flags: 0,
            color: "#000000".to_string(),
        },
    }
}

fn synthetic_report() -> ParsedDocument {
    let mut doc = ParsedDocument::new("annual_report.pdf", "/data/annual_report.pdf");
    doc.page_count = 6;
    doc.page_dimensions = vec![(612.0, 792.0); 6];

    doc.text_blocks = vec![
        block("1. Financial Overview", 1, 60.0, 22.0, "Helvetica-Bold"),
        block("2. Data Center Revenue", 2, 60.0, 22.0, "Helvetica-Bold"),
        block("2.1 Training Demand", 2, 200.0, 16.0, "Helvetica-Bold"),
        block("3. Outlook", 5, 60.0, 22.0, "Helvetica-Bold"),
    ];

    // Body text pushes the average font size down to a realistic level
    for page in 1..=6u32 {
        for line in 0..8u32 {
            doc.text_blocks.push(block(
                &format!("Body paragraph line {} on page {}.", line, page),
                page,
                300.0 + line as f32 * 14.0,
                10.0,
                "Helvetica",
            ));
        }
    }

    doc.calculate_stats();
    doc
}

#[test]
fn test_extraction_path_produces_ordered_outline() {
    let doc = synthetic_report();
    let detector = HeadingDetector::new(&ExtractionConfig::default());
    let builder = OutlineBuilder::new();

    let headings = detector.detect_headings(&doc);
    assert!(!headings.is_empty(), "expected headings from synthetic report");

    let outline = builder.build_outline(headings);

    // Reading order is preserved
    let pages: Vec<u32> = outline.headings.iter().map(|h| h.page).collect();
    let mut sorted = pages.clone();
    sorted.sort_unstable();
    assert_eq!(pages, sorted);

    // Large headings land on the top level, the smaller one nests below
    assert!(outline.headings.iter().any(|h| h.text == "1. Financial Overview" && h.level == 1));
    assert!(outline
        .headings
        .iter()
        .any(|h| h.text == "2.1 Training Demand" && h.level > 1));

    // A repaired outline starts at H1 and never jumps levels
    assert_eq!(outline.headings[0].level, 1);
    let issues = outline.validate_structure();
    assert!(
        !issues.iter().any(|i| i.contains("level jump")),
        "unexpected issues: {:?}",
        issues
    );
}

#[test]
fn test_outline_report_matches_expected_json_shape() {
    let doc = synthetic_report();
    let detector = HeadingDetector::new(&ExtractionConfig::default());
    let builder = OutlineBuilder::new();

    let outline = builder.build_outline(detector.detect_headings(&doc));
    let report = OutlineReport::from_outline(&doc.filename, &outline);

    assert_eq!(report.title, "annual_report.pdf");

    let json = serde_json::to_value(&report).unwrap();
    let entries = json["outline"].as_array().unwrap();
    assert_eq!(entries.len(), outline.headings.len());

    for entry in entries {
        let level = entry["level"].as_str().unwrap();
        assert!(matches!(level, "H1" | "H2" | "H3"));
        assert!(entry["page"].as_u64().unwrap() >= 1);
        assert!(!entry["text"].as_str().unwrap().is_empty());
    }
}

#[test]
fn test_outline_written_to_disk_round_trips() {
    let doc = synthetic_report();
    let detector = HeadingDetector::new(&ExtractionConfig::default());
    let builder = OutlineBuilder::new();
    let outline = builder.build_outline(detector.detect_headings(&doc));

    let dir = tempfile::tempdir().unwrap();
    let report = OutlineReport::from_outline(&doc.filename, &outline);
    let path = report.write(dir.path(), "annual_report").unwrap();

    let parsed: OutlineReport =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(parsed.outline.len(), outline.headings.len());
}

#[test]
fn test_empty_document_yields_empty_outline() {
    let mut doc = ParsedDocument::new("blank.pdf", "/data/blank.pdf");
    doc.page_count = 1;
    doc.page_dimensions = vec![(612.0, 792.0)];
    doc.calculate_stats();

    let detector = HeadingDetector::new(&ExtractionConfig::default());
    let outline = OutlineBuilder::new().build_outline(detector.detect_headings(&doc));

    assert!(outline.is_empty());
    assert_eq!(outline.quality_score, 0.0);
}
