//! Text cleanup helpers shared by extraction and chunking.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn subset_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{6}\+").unwrap())
}

fn font_variant_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[,\-].*$").unwrap())
}

/// Clean and normalize text extracted from PDFs: collapse whitespace, strip
/// control characters, and repair common mojibake sequences.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let collapsed = whitespace_re().replace_all(text, " ");

    let stripped: String = collapsed
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .collect();

    // Common UTF-8-decoded-as-Latin-1 artifacts
    let repaired = stripped
        .replace('\u{2019}', "'")
        .replace("â€™", "'")
        .replace("â€œ", "\"")
        .replace("â€\u{9d}", "\"")
        .replace("â€“", "-")
        .replace("â€”", "-");

    repaired.trim().to_string()
}

/// Normalize a raw PDF font name for comparison: strip subset prefixes
/// (e.g. "ABCDEF+"), cut style variants after a comma or hyphen, and map
/// common aliases.
pub fn normalize_font_name(font_name: &str) -> String {
    if font_name.is_empty() {
        return "Unknown".to_string();
    }

    let without_prefix = subset_prefix_re().replace(font_name, "");
    let base = font_variant_re().replace(&without_prefix, "");

    let titled = title_case(&base);

    match titled.as_str() {
        "Timesnewroman" | "Timesnewromanps" => "Times New Roman".to_string(),
        "Arialmt" | "Helvetica" => "Arial".to_string(),
        other => other.to_string(),
    }
}

fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;
    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Word-overlap (Jaccard) similarity between two strings, in 0.0..=1.0
pub fn text_similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a.trim() == b.trim() {
        return 1.0;
    }

    let words_a: HashSet<&str> = a.split_whitespace().collect();
    let words_b: HashSet<&str> = b.split_whitespace().collect();
    if words_a.is_empty() || words_b.is_empty() {
        return 0.0;
    }

    let intersection = words_a.intersection(&words_b).count();
    let union = words_a.union(&words_b).count();

    intersection as f32 / union as f32
}
