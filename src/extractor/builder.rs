//! Outline construction from detected headings.
//!
//! Sorts headings into reading order, repairs the level hierarchy so the
//! result is a well-formed H1/H2/H3 tree, and scores outline quality.

use std::collections::HashMap;

use crate::models::{Heading, Outline};

/// Builds validated outlines from detected headings
pub struct OutlineBuilder;

impl OutlineBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build an outline: sort, repair hierarchy, compute quality metrics
    pub fn build_outline(&self, headings: Vec<Heading>) -> Outline {
        if headings.is_empty() {
            return Outline::default();
        }

        let sorted = sort_headings(headings);
        let validated = validate_hierarchy(sorted);

        let mut outline = Outline::new(validated);
        outline.quality_score = quality_score(&outline);
        outline
    }
}

impl Default for OutlineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_headings(mut headings: Vec<Heading>) -> Vec<Heading> {
    headings.sort_by(|a, b| {
        a.page
            .cmp(&b.page)
            .then(a.position.1.total_cmp(&b.position.1))
    });
    headings
}

/// Repair the heading hierarchy:
/// - the first heading is always H1
/// - an H2 with no preceding H1 is promoted
/// - an H3 with no open H2 is demoted (to H2, or H1 if nothing precedes)
///
/// Adjusted headings take a small confidence penalty.
fn validate_hierarchy(headings: Vec<Heading>) -> Vec<Heading> {
    let mut validated: Vec<Heading> = Vec::with_capacity(headings.len());
    let mut level_stack: Vec<u8> = Vec::new();

    for mut heading in headings {
        let adjusted = appropriate_level(&heading, &level_stack, &validated);

        if adjusted != heading.level {
            heading.level = adjusted;
            heading.confidence = (heading.confidence * 0.9).clamp(0.0, 1.0);
        }

        level_stack.retain(|&l| l < adjusted);
        if !level_stack.contains(&adjusted) {
            level_stack.push(adjusted);
        }

        validated.push(heading);
    }

    validated
}

fn appropriate_level(heading: &Heading, level_stack: &[u8], previous: &[Heading]) -> u8 {
    if previous.is_empty() {
        return 1;
    }

    match heading.level {
        1 => 1,
        2 => {
            if previous.iter().any(|h| h.level == 1) {
                2
            } else {
                1
            }
        }
        _ => {
            if level_stack.contains(&2) {
                3
            } else if previous.iter().any(|h| h.level <= 2) {
                2
            } else {
                1
            }
        }
    }
}

/// Weighted outline quality: confidence 0.4, hierarchy balance 0.3,
/// page coverage 0.2, formatting consistency 0.1.
fn quality_score(outline: &Outline) -> f32 {
    if outline.is_empty() {
        return 0.0;
    }

    outline.average_confidence * 0.4
        + hierarchy_balance(&outline.headings) * 0.3
        + page_coverage(&outline.headings) * 0.2
        + consistency(&outline.headings) * 0.1
}

fn hierarchy_balance(headings: &[Heading]) -> f32 {
    let h1 = headings.iter().filter(|h| h.level == 1).count();
    let h2 = headings.iter().filter(|h| h.level == 2).count();
    let h3 = headings.iter().filter(|h| h.level == 3).count();

    if h1 == 0 {
        return 0.3;
    }

    let mut score: f32 = 0.5 + 0.3;

    if h2 > 0 {
        let ratio = h2 as f32 / h1 as f32;
        if (1.0..=5.0).contains(&ratio) {
            score += 0.1;
        }
    }

    if h3 > 0 && h2 > 0 {
        let ratio = h3 as f32 / h2 as f32;
        if (1.0..=3.0).contains(&ratio) {
            score += 0.1;
        }
    }

    score.min(1.0)
}

fn page_coverage(headings: &[Heading]) -> f32 {
    let pages: Vec<u32> = headings.iter().map(|h| h.page).collect();
    let (min, max) = match (pages.iter().min(), pages.iter().max()) {
        (Some(min), Some(max)) => (*min, *max),
        _ => return 0.0,
    };

    let total_pages = max - min + 1;
    if total_pages <= 1 {
        return 0.5;
    }

    let unique: std::collections::HashSet<u32> = pages.into_iter().collect();
    let ratio = unique.len() as f32 / total_pages as f32;

    if ratio >= 0.3 {
        1.0
    } else if ratio >= 0.2 {
        0.7
    } else if ratio >= 0.1 {
        0.4
    } else {
        0.2
    }
}

fn consistency(headings: &[Heading]) -> f32 {
    if headings.len() < 2 {
        return 1.0;
    }

    let mut score = 0.0;

    // Font consistency within levels
    let mut level_fonts: HashMap<u8, Vec<&str>> = HashMap::new();
    for h in headings {
        level_fonts
            .entry(h.level)
            .or_default()
            .push(h.font_info.family.as_str());
    }

    let total_levels = level_fonts.len();
    let consistent_levels = level_fonts
        .values()
        .filter(|fonts| {
            let unique: std::collections::HashSet<&&str> = fonts.iter().collect();
            unique.len() == 1
        })
        .count();

    if total_levels > 0 {
        score += (consistent_levels as f32 / total_levels as f32) * 0.5;
    }

    // Numbering pattern consistency
    let numbered = headings.iter().filter(|h| has_numbering(&h.text)).count();
    if numbered > 0 {
        score += (numbered as f32 / headings.len() as f32) * 0.3;
    }

    (score + 0.2).min(1.0)
}

fn has_numbering(text: &str) -> bool {
    use regex::Regex;
    use std::sync::OnceLock;

    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    let patterns = PATTERNS.get_or_init(|| {
        [
            r"^\d+\.",
            r"^\d+\.\d+",
            r"^[A-Z]\.",
            r"^[IVX]+\.",
            r"^\(\d+\)",
            r"^Chapter\s+\d+",
            r"^Section\s+\d+",
        ]
        .iter()
        .map(|p| Regex::new(p).unwrap())
        .collect()
    });

    let trimmed = text.trim();
    patterns.iter().any(|p| p.is_match(trimmed))
}
