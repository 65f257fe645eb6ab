//! Heading and outline models for hierarchical document structure.

use serde::{Deserialize, Serialize};

use crate::models::document::FontInfo;

/// A detected heading with level, provenance, and detection confidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Heading {
    pub text: String,
    /// 1 = H1, 2 = H2, 3 = H3
    pub level: u8,
    /// 1-based page number
    pub page: u32,
    pub confidence: f32,
    pub font_info: FontInfo,
    /// (x, y) of the heading's first span
    pub position: (f32, f32),
}

impl Heading {
    /// Build a heading, trimming text and clamping level/confidence into range
    pub fn new(
        text: impl Into<String>,
        level: u8,
        page: u32,
        confidence: f32,
        font_info: FontInfo,
        position: (f32, f32),
    ) -> Self {
        Self {
            text: text.into().trim().to_string(),
            level: level.clamp(1, 3),
            page,
            confidence: confidence.clamp(0.0, 1.0),
            font_info,
            position,
        }
    }

    pub fn is_h1(&self) -> bool {
        self.level == 1
    }

    pub fn is_h2(&self) -> bool {
        self.level == 2
    }

    pub fn is_h3(&self) -> bool {
        self.level == 3
    }

    /// Heading label as emitted in outline JSON ("H1".."H3")
    pub fn level_label(&self) -> String {
        format!("H{}", self.level)
    }
}

/// A node in the built outline tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineNode {
    pub heading: Heading,
    pub children: Vec<OutlineNode>,
}

/// The complete outline of a document, with quality metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Outline {
    pub headings: Vec<Heading>,
    pub average_confidence: f32,
    pub quality_score: f32,
}

impl Outline {
    /// Create an outline over a flat heading list, computing the average
    /// confidence. Quality score is filled in by the outline builder.
    pub fn new(headings: Vec<Heading>) -> Self {
        let average_confidence = if headings.is_empty() {
            0.0
        } else {
            headings.iter().map(|h| h.confidence).sum::<f32>() / headings.len() as f32
        };

        Self {
            headings,
            average_confidence,
            quality_score: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.headings.is_empty()
    }

    pub fn h1_count(&self) -> usize {
        self.headings.iter().filter(|h| h.is_h1()).count()
    }

    pub fn h2_count(&self) -> usize {
        self.headings.iter().filter(|h| h.is_h2()).count()
    }

    pub fn h3_count(&self) -> usize {
        self.headings.iter().filter(|h| h.is_h3()).count()
    }

    pub fn max_depth(&self) -> u8 {
        self.headings.iter().map(|h| h.level).max().unwrap_or(0)
    }

    pub fn headings_by_level(&self, level: u8) -> Vec<&Heading> {
        self.headings.iter().filter(|h| h.level == level).collect()
    }

    pub fn headings_on_page(&self, page: u32) -> Vec<&Heading> {
        self.headings.iter().filter(|h| h.page == page).collect()
    }

    /// (min_page, max_page) covered by headings, or (0, 0) when empty
    pub fn page_range(&self) -> (u32, u32) {
        let pages: Vec<u32> = self.headings.iter().map(|h| h.page).collect();
        match (pages.iter().min(), pages.iter().max()) {
            (Some(min), Some(max)) => (*min, *max),
            _ => (0, 0),
        }
    }

    pub fn high_confidence_headings(&self, threshold: f32) -> Vec<&Heading> {
        self.headings
            .iter()
            .filter(|h| h.confidence >= threshold)
            .collect()
    }

    pub fn low_confidence_headings(&self, threshold: f32) -> Vec<&Heading> {
        self.headings
            .iter()
            .filter(|h| h.confidence < threshold)
            .collect()
    }

    /// Build an ownership tree from the flat list using a parent stack.
    /// A heading becomes a child of the nearest preceding heading with a
    /// shallower level; everything else is a root.
    pub fn build_tree(&self) -> Vec<OutlineNode> {
        let mut roots: Vec<OutlineNode> = Vec::new();
        // Index paths into `roots` identifying the open ancestor chain
        let mut stack: Vec<(usize, u8)> = Vec::new();

        for heading in &self.headings {
            while let Some(&(_, level)) = stack.last() {
                if level >= heading.level {
                    stack.pop();
                } else {
                    break;
                }
            }

            let node = OutlineNode {
                heading: heading.clone(),
                children: Vec::new(),
            };

            if stack.is_empty() {
                roots.push(node);
                stack.push((roots.len() - 1, heading.level));
            } else {
                // Walk the index path down to the open parent
                let mut current = &mut roots[stack[0].0];
                for &(idx, _) in &stack[1..] {
                    current = &mut current.children[idx];
                }
                current.children.push(node);
                let child_idx = current.children.len() - 1;
                stack.push((child_idx, heading.level));
            }
        }

        roots
    }

    /// Render an indented table of contents, up to max_level
    pub fn table_of_contents(&self, max_level: u8, include_pages: bool) -> Vec<String> {
        self.headings
            .iter()
            .filter(|h| h.level <= max_level)
            .map(|h| {
                let indent = "  ".repeat((h.level - 1) as usize);
                if include_pages {
                    format!("{}{} ... {}", indent, h.text, h.page)
                } else {
                    format!("{}{}", indent, h.text)
                }
            })
            .collect()
    }

    /// Validate the outline structure; returns human-readable issues
    pub fn validate_structure(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if self.is_empty() {
            issues.push("Outline is empty".to_string());
            return issues;
        }

        if self.h1_count() == 0 {
            issues.push("No H1 headings found".to_string());
        }

        let mut prev_level = 0u8;
        for (i, heading) in self.headings.iter().enumerate() {
            if heading.level > prev_level + 1 {
                let snippet: String = heading.text.chars().take(50).collect();
                issues.push(format!("Heading level jump at position {}: {}", i, snippet));
            }
            prev_level = heading.level;
        }

        let low = self.low_confidence_headings(0.3).len();
        if low * 2 > self.headings.len() {
            issues.push("More than 50% of headings have low confidence".to_string());
        }

        let (min_page, max_page) = self.page_range();
        let span = max_page.saturating_sub(min_page) + 1;
        if span > 0 {
            let per_page = self.headings.len() as f32 / span as f32;
            if per_page > 10.0 {
                issues.push("Too many headings per page (possible over-detection)".to_string());
            } else if per_page < 0.1 {
                issues.push("Too few headings per page (possible under-detection)".to_string());
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::FontInfo;

    fn font() -> FontInfo {
        FontInfo {
            family: "Arial".to_string(),
            size: 16.0,
            flags: 0,
            color: "#000000".to_string(),
        }
    }

    fn heading(text: &str, level: u8, page: u32, confidence: f32) -> Heading {
        Heading::new(text, level, page, confidence, font(), (0.0, 0.0))
    }

    #[test]
    fn test_heading_clamps_level_and_confidence() {
        let h = Heading::new("  Overview  ", 7, 1, 1.4, font(), (0.0, 0.0));
        assert_eq!(h.level, 3);
        assert!((h.confidence - 1.0).abs() < f32::EPSILON);
        assert_eq!(h.text, "Overview");

        let h = Heading::new("Intro", 0, 1, -0.2, font(), (0.0, 0.0));
        assert_eq!(h.level, 1);
        assert_eq!(h.confidence, 0.0);
    }

    #[test]
    fn test_outline_counts_and_range() {
        let outline = Outline::new(vec![
            heading("Introduction", 1, 1, 0.9),
            heading("Background", 2, 2, 0.8),
            heading("Details", 3, 4, 0.7),
        ]);

        assert_eq!(outline.h1_count(), 1);
        assert_eq!(outline.h2_count(), 1);
        assert_eq!(outline.h3_count(), 1);
        assert_eq!(outline.max_depth(), 3);
        assert_eq!(outline.page_range(), (1, 4));
        assert!((outline.average_confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_level_and_page_queries() {
        let outline = Outline::new(vec![
            heading("Intro", 1, 1, 0.9),
            heading("Scope", 2, 1, 0.5),
            heading("Methods", 1, 3, 0.3),
        ]);

        assert_eq!(outline.headings_by_level(1).len(), 2);
        assert_eq!(outline.headings_by_level(3).len(), 0);
        assert_eq!(outline.headings_on_page(1).len(), 2);
        assert_eq!(outline.headings_on_page(2).len(), 0);
        assert_eq!(outline.high_confidence_headings(0.8).len(), 1);
        assert_eq!(outline.low_confidence_headings(0.4).len(), 1);
    }

    #[test]
    fn test_build_tree_nests_by_level() {
        let outline = Outline::new(vec![
            heading("Chapter 1", 1, 1, 0.9),
            heading("Section 1.1", 2, 1, 0.8),
            heading("Detail 1.1.1", 3, 2, 0.7),
            heading("Chapter 2", 1, 3, 0.9),
        ]);

        let tree = outline.build_tree();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children.len(), 1);
        assert_eq!(tree[1].heading.text, "Chapter 2");
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn test_table_of_contents_indentation() {
        let outline = Outline::new(vec![
            heading("Top", 1, 1, 0.9),
            heading("Nested", 2, 2, 0.8),
        ]);

        let toc = outline.table_of_contents(3, true);
        assert_eq!(toc[0], "Top ... 1");
        assert_eq!(toc[1], "  Nested ... 2");

        let toc = outline.table_of_contents(1, false);
        assert_eq!(toc, vec!["Top".to_string()]);
    }

    #[test]
    fn test_validate_flags_missing_h1_and_jumps() {
        let outline = Outline::new(vec![heading("Orphan detail", 3, 1, 0.9)]);
        let issues = outline.validate_structure();
        assert!(issues.iter().any(|i| i.contains("No H1")));
        assert!(issues.iter().any(|i| i.contains("level jump")));
    }

    #[test]
    fn test_validate_empty_outline() {
        let outline = Outline::new(vec![]);
        assert_eq!(outline.validate_structure(), vec!["Outline is empty".to_string()]);
    }
}
