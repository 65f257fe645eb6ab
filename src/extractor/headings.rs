//! Heading detection from font and layout signals.
//!
//! Candidates are scored with weighted heuristics (font size ratio, bold
//! style, page position, numbering patterns, section keywords) and grouped
//! into H1..H3 by font size. English and Japanese documents use different
//! weights and pattern tables.

use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::config::ExtractionConfig;
use crate::models::{DocumentLanguage, Heading, ParsedDocument, TextBlock};

const ENGLISH_KEYWORDS: &[&str] = &[
    "introduction",
    "conclusion",
    "abstract",
    "summary",
    "background",
    "methodology",
    "results",
    "discussion",
    "references",
    "appendix",
    "chapter",
    "section",
];

const JAPANESE_KEYWORDS: &[&str] = &[
    "概要",
    "はじめに",
    "要旨",
    "背景",
    "目的",
    "方法",
    "結果",
    "考察",
    "結論",
    "参考文献",
    "付録",
];

/// Detects headings in a parsed document
pub struct HeadingDetector {
    max_heading_length: usize,
    min_confidence: f32,
    english_numbering: Vec<(Regex, f32)>,
    japanese_numbering: Vec<(Regex, f32)>,
}

impl HeadingDetector {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            max_heading_length: config.max_heading_length,
            min_confidence: config.min_heading_confidence,
            english_numbering: vec![
                (Regex::new(r"^\d+\.\d*").unwrap(), 0.8),
                (Regex::new(r"^[A-Z]\.").unwrap(), 0.7),
                (Regex::new(r"(?i)^[IVXLC]+\.\s+").unwrap(), 0.7),
                (Regex::new(r"(?i)^(Chapter|Section)\s+\d+").unwrap(), 0.9),
            ],
            japanese_numbering: vec![
                (Regex::new(r"^第[一二三四五六七八九十百]+(章|節)").unwrap(), 1.0),
                (Regex::new(r"^\d+．").unwrap(), 0.8),
                (Regex::new(r"^\d+\.\d*").unwrap(), 0.7),
            ],
        }
    }

    /// Detect headings, routing to the heuristics for the document's language
    pub fn detect_headings(&self, document: &ParsedDocument) -> Vec<Heading> {
        match document.language {
            DocumentLanguage::Japanese => self.detect_japanese(document),
            DocumentLanguage::English => self.detect_english(document),
        }
    }

    fn detect_english(&self, document: &ParsedDocument) -> Vec<Heading> {
        let candidates = self.identify_candidates_english(document);
        let scored = self.score_candidates_english(&candidates, document);
        let headings = classify_heading_levels(&scored);
        post_process_headings(headings)
    }

    fn detect_japanese(&self, document: &ParsedDocument) -> Vec<Heading> {
        // Japanese headings rely less on layout: every block is a candidate
        // and numbering/keyword signals carry more weight.
        let candidates: Vec<&TextBlock> = document.text_blocks.iter().collect();
        let scored = self.score_candidates_japanese(&candidates, document);
        let headings = classify_heading_levels(&scored);
        post_process_headings(headings)
    }

    fn identify_candidates_english<'a>(&self, document: &'a ParsedDocument) -> Vec<&'a TextBlock> {
        let avg_size = nonzero_avg(document.avg_font_size);

        document
            .text_blocks
            .iter()
            .filter(|block| {
                let text = block.text.trim();
                if text.is_empty() || text.chars().count() > self.max_heading_length {
                    return false;
                }
                if block.font_info.size < avg_size {
                    return false;
                }
                // Sentence-like text: trailing punctuation on anything long
                let sentence_end =
                    text.ends_with(|c: char| matches!(c, '.' | '!' | '?' | ';' | ':'));
                !(sentence_end && text.chars().count() > 20)
            })
            .collect()
    }

    fn score_candidates_english<'a>(
        &self,
        candidates: &[&'a TextBlock],
        document: &ParsedDocument,
    ) -> Vec<(&'a TextBlock, f32)> {
        let mut scored = Vec::new();
        for block in candidates {
            let mut score = font_size_score(block, document) * 0.5
                + font_style_score(block) * 0.3
                + position_score(block, document) * 0.1
                + numbering_score(block, &self.english_numbering) * 0.1;

            if keyword_score(block, ENGLISH_KEYWORDS) > 0.0 {
                score = (score + 0.1).min(1.0);
            }

            if score >= self.min_confidence {
                scored.push((*block, score));
            }
        }
        scored
    }

    fn score_candidates_japanese<'a>(
        &self,
        candidates: &[&'a TextBlock],
        document: &ParsedDocument,
    ) -> Vec<(&'a TextBlock, f32)> {
        let mut scored = Vec::new();
        for block in candidates {
            let score = font_size_score(block, document) * 0.4
                + font_style_score(block) * 0.2
                + numbering_score(block, &self.japanese_numbering) * 0.3
                + keyword_score(block, JAPANESE_KEYWORDS) * 0.1;

            if score >= self.min_confidence {
                scored.push((*block, score));
            }
        }
        scored
    }
}

fn nonzero_avg(avg: f32) -> f32 {
    if avg > 0.0 {
        avg
    } else {
        12.0
    }
}

fn font_size_score(block: &TextBlock, document: &ParsedDocument) -> f32 {
    let ratio = block.font_info.size / nonzero_avg(document.avg_font_size);
    if ratio > 1.5 {
        1.0
    } else if ratio > 1.3 {
        0.8
    } else if ratio > 1.1 {
        0.6
    } else {
        0.2
    }
}

fn font_style_score(block: &TextBlock) -> f32 {
    let family = block.font_info.family.to_lowercase();
    let bold = ["bold", "black", "heavy", "gothicb"]
        .iter()
        .any(|w| family.contains(w));
    if bold {
        0.8
    } else {
        0.0
    }
}

// Only used for English: centered or left-margin text on the page.
fn position_score(block: &TextBlock, document: &ParsedDocument) -> f32 {
    let Some(page_width) = document.page_width(block.page) else {
        return 0.0;
    };
    if page_width <= 0.0 {
        return 0.0;
    }

    let center_diff = ((block.x + block.width / 2.0) - page_width / 2.0).abs();
    if center_diff < page_width * 0.15 {
        0.8
    } else if block.x < page_width * 0.1 {
        0.5
    } else {
        0.0
    }
}

fn numbering_score(block: &TextBlock, rules: &[(Regex, f32)]) -> f32 {
    let text = block.text.trim();
    rules
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, score)| *score)
        .unwrap_or(0.0)
}

fn keyword_score(block: &TextBlock, keywords: &[&str]) -> f32 {
    let text = block.text.to_lowercase();
    if keywords.iter().any(|k| text.contains(k)) {
        1.0
    } else {
        0.0
    }
}

/// Group scored candidates by font size (rounded to one decimal); the three
/// largest size groups become H1, H2, H3.
fn classify_heading_levels(scored: &[(&TextBlock, f32)]) -> Vec<Heading> {
    if scored.is_empty() {
        return Vec::new();
    }

    let mut size_groups: HashMap<i32, Vec<(&TextBlock, f32)>> = HashMap::new();
    for (block, score) in scored {
        let key = (block.font_info.size * 10.0).round() as i32;
        size_groups.entry(key).or_default().push((*block, *score));
    }

    let mut sizes: Vec<i32> = size_groups.keys().copied().collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));

    let mut headings = Vec::new();
    for (i, size_key) in sizes.iter().take(3).enumerate() {
        let level = (i + 1) as u8;
        for (block, confidence) in &size_groups[size_key] {
            headings.push(Heading::new(
                block.text.clone(),
                level,
                block.page,
                *confidence,
                block.font_info.clone(),
                (block.x, block.y),
            ));
        }
    }
    headings
}

/// Order by (page, y) and drop duplicate heading text (case-folded)
fn post_process_headings(mut headings: Vec<Heading>) -> Vec<Heading> {
    headings.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(a.position.1.total_cmp(&b.position.1))
    });

    let mut seen = HashSet::new();
    headings.retain(|h| seen.insert(h.text.to_lowercase()));
    headings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExtractionConfig;
    use crate::models::{FontInfo, ParsedDocument};

    fn block_at(text: &str, page: u32, y: f32, size: f32, family: &str) -> TextBlock {
        TextBlock {
            text: text.to_string(),
            page,
            x: 100.0,
            y,
            width: 200.0,
            height: size,
            font_info: FontInfo {
                family: family.to_string(),
                size,
                flags: 0,
                color: "#000000".to_string(),
            },
        }
    }

    fn doc_with(blocks: Vec<TextBlock>) -> ParsedDocument {
        let mut doc = ParsedDocument::new("test.pdf", "/tmp/test.pdf");
        doc.page_count = blocks.iter().map(|b| b.page).max().unwrap_or(1);
        doc.page_dimensions = vec![(612.0, 792.0); doc.page_count as usize];
        doc.text_blocks = blocks;
        doc.calculate_stats();
        doc
    }

    fn detector() -> HeadingDetector {
        HeadingDetector::new(&ExtractionConfig::default())
    }

    #[test]
    fn test_detects_large_bold_heading() {
        let doc = doc_with(vec![
            block_at("1. Introduction", 1, 50.0, 20.0, "Arial-Bold"),
            block_at("Body text sits at the regular size.", 1, 80.0, 10.0, "Arial"),
            block_at("More body text at the regular size.", 1, 100.0, 10.0, "Arial"),
        ]);

        let headings = detector().detect_headings(&doc);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "1. Introduction");
        assert_eq!(headings[0].level, 1);
        assert_eq!(headings[0].page, 1);
    }

    #[test]
    fn test_rejects_long_sentence_candidates() {
        let doc = doc_with(vec![
            block_at(
                "This is a long sentence that ends with a period and should not be a heading.",
                1,
                50.0,
                20.0,
                "Arial-Bold",
            ),
            block_at("body", 1, 80.0, 10.0, "Arial"),
        ]);

        let headings = detector().detect_headings(&doc);
        assert!(headings.is_empty());
    }

    #[test]
    fn test_levels_follow_font_size_groups() {
        let mut blocks = vec![
            block_at("Main Title Chapter", 1, 10.0, 24.0, "Arial-Bold"),
            block_at("Subsection Heading", 1, 40.0, 18.0, "Arial-Bold"),
            block_at("Minor Heading Here", 2, 10.0, 14.0, "Arial-Bold"),
        ];
        for i in 0..5 {
            blocks.push(block_at(
                &format!("regular body content {}", i),
                1 + (i % 2),
                100.0 + i as f32 * 12.0,
                8.0,
                "Arial",
            ));
        }
        let doc = doc_with(blocks);

        let headings = detector().detect_headings(&doc);
        let levels: Vec<(String, u8)> = headings
            .iter()
            .map(|h| (h.text.clone(), h.level))
            .collect();

        assert!(levels.contains(&("Main Title Chapter".to_string(), 1)));
        assert!(levels.contains(&("Subsection Heading".to_string(), 2)));
        assert!(levels.contains(&("Minor Heading Here".to_string(), 3)));
    }

    #[test]
    fn test_dedupes_repeated_headings() {
        // Running headers repeat on every page
        let doc = doc_with(vec![
            block_at("Annual Report", 1, 10.0, 20.0, "Arial-Bold"),
            block_at("Annual Report", 2, 10.0, 20.0, "Arial-Bold"),
            block_at("body text line", 1, 100.0, 10.0, "Arial"),
            block_at("body text line two", 2, 100.0, 10.0, "Arial"),
        ]);

        let headings = detector().detect_headings(&doc);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].page, 1);
    }

    #[test]
    fn test_japanese_numbering_pattern() {
        let mut doc = doc_with(vec![
            block_at("第一章 概要", 1, 10.0, 16.0, "GothicB"),
            block_at("本文のテキストです。", 1, 50.0, 10.0, "Mincho"),
        ]);
        doc.language = DocumentLanguage::Japanese;

        let headings = detector().detect_headings(&doc);
        assert_eq!(headings.len(), 1);
        assert_eq!(headings[0].text, "第一章 概要");
    }

    #[test]
    fn test_headings_sorted_by_page_then_y() {
        let doc = doc_with(vec![
            block_at("Later Heading Block", 2, 20.0, 20.0, "Arial-Bold"),
            block_at("First Heading Block", 1, 30.0, 20.0, "Arial-Bold"),
            block_at("body filler content", 1, 100.0, 10.0, "Arial"),
            block_at("body filler content two", 2, 100.0, 10.0, "Arial"),
        ]);

        let headings = detector().detect_headings(&doc);
        assert_eq!(headings[0].text, "First Heading Block");
        assert_eq!(headings[1].text, "Later Heading Block");
    }
}
