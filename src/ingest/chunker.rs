//! Page-aware text chunking for the fine retrieval stage.
//!
//! Each page is cleaned and split independently so every chunk keeps its
//! source page. Splitting prefers sentence boundaries and falls back to word
//! windows, targeting `chunk_size` characters with `chunk_overlap` carried
//! between consecutive chunks.

use crate::config::ChunkingConfig;
use crate::extractor::text::clean_text;
use crate::models::ParsedDocument;

/// A chunk of page text ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct PageChunk {
    pub text: String,
    /// 1-based page the chunk came from
    pub page: u32,
    /// Position of the chunk within its document
    pub index: usize,
}

/// Splits document pages into overlapping chunks
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
    min_fragment_len: usize,
}

impl Chunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        // Overlap must leave room for new content in every chunk
        let chunk_size = config.chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: config.chunk_overlap.min(chunk_size / 2),
            min_fragment_len: config.min_fragment_len,
        }
    }

    /// Chunk every page of a document, preserving page provenance
    pub fn chunk_document(&self, document: &ParsedDocument) -> Vec<PageChunk> {
        let mut chunks = Vec::new();

        for page in 1..=document.page_count {
            let cleaned = clean_text(&document.page_text(page));
            if cleaned.is_empty() {
                continue;
            }

            for text in self.split_text(&cleaned) {
                if text.trim().chars().count() < self.min_fragment_len {
                    continue;
                }
                let index = chunks.len();
                chunks.push(PageChunk { text, page, index });
            }
        }

        chunks
    }

    /// Split cleaned text into chunks of at most `chunk_size` characters
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.chars().count() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let units = split_units(text, self.chunk_size);

        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for unit in units {
            let unit_len = unit.chars().count();

            if current_len + unit_len > self.chunk_size && !current.is_empty() {
                let finished = current.trim().to_string();
                let carry = overlap_tail(&finished, self.chunk_overlap);
                chunks.push(finished);

                current = carry;
                current_len = current.chars().count();
            }

            if !current.is_empty() {
                current.push(' ');
                current_len += 1;
            }
            current.push_str(&unit);
            current_len += unit_len;
        }

        if !current.trim().is_empty() {
            chunks.push(current.trim().to_string());
        }

        chunks
    }
}

/// Split text into sentence units; sentences longer than max_len fall back
/// to word windows so no unit ever exceeds the chunk size.
fn split_units(text: &str, max_len: usize) -> Vec<String> {
    let mut units = Vec::new();

    for sentence in split_sentences(text) {
        if sentence.chars().count() <= max_len {
            units.push(sentence);
            continue;
        }

        let mut window = String::new();
        let mut window_len = 0usize;
        for word in sentence.split_whitespace() {
            let word_len = word.chars().count();
            if window_len + word_len + 1 > max_len && !window.is_empty() {
                units.push(std::mem::take(&mut window));
                window_len = 0;
            }
            if !window.is_empty() {
                window.push(' ');
                window_len += 1;
            }
            window.push_str(word);
            window_len += word_len;
        }
        if !window.is_empty() {
            units.push(window);
        }
    }

    units
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut start = 0usize;

    let bytes = text.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'.' && i + 1 < bytes.len() && bytes[i + 1] == b' ' {
            let sentence = text[start..=i].trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            start = i + 2;
            i += 2;
        } else {
            i += 1;
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail.to_string());
    }

    sentences
}

/// Last `overlap` characters of a chunk, aligned to a word boundary
fn overlap_tail(text: &str, overlap: usize) -> String {
    if overlap == 0 {
        return String::new();
    }

    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= overlap {
        return text.to_string();
    }

    let tail: String = chars[chars.len() - overlap..].iter().collect();
    match tail.find(' ') {
        Some(space) => tail[space + 1..].to_string(),
        None => tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FontInfo, TextBlock};
    use quickcheck_macros::quickcheck;

    fn chunker(size: usize, overlap: usize) -> Chunker {
        Chunker::new(&ChunkingConfig {
            chunk_size: size,
            chunk_overlap: overlap,
            min_fragment_len: 10,
        })
    }

    fn doc_with_pages(pages: &[&str]) -> ParsedDocument {
        let mut doc = ParsedDocument::new("test.pdf", "/tmp/test.pdf");
        doc.page_count = pages.len() as u32;
        for (i, text) in pages.iter().enumerate() {
            doc.text_blocks.push(TextBlock {
                text: text.to_string(),
                page: i as u32 + 1,
                x: 0.0,
                y: 0.0,
                width: 100.0,
                height: 12.0,
                font_info: FontInfo {
                    family: "Arial".to_string(),
                    size: 10.0,
                    flags: 0,
                    color: "#000000".to_string(),
                },
            });
        }
        doc
    }

    #[test]
    fn test_short_text_single_chunk() {
        let chunks = chunker(100, 20).split_text("A short paragraph.");
        assert_eq!(chunks, vec!["A short paragraph.".to_string()]);
    }

    #[test]
    fn test_long_text_respects_chunk_size() {
        let sentence = "The quick brown fox jumps over the lazy dog. ";
        let text = sentence.repeat(20);
        let chunks = chunker(100, 20).split_text(text.trim());

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(
                chunk.chars().count() <= 120,
                "chunk exceeds size with overlap slack: {}",
                chunk.len()
            );
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let sentence = "Revenue grew strongly across all data center segments this quarter. ";
        let text = sentence.repeat(10);
        let chunks = chunker(150, 40).split_text(text.trim());

        assert!(chunks.len() > 1);
        // The start of each later chunk repeats words from the previous one
        for pair in chunks.windows(2) {
            let first_words: Vec<&str> = pair[0].split_whitespace().collect();
            let tail = first_words[first_words.len().saturating_sub(2)..].join(" ");
            assert!(
                pair[1].contains(tail.split_whitespace().next().unwrap()),
                "no overlap between consecutive chunks"
            );
        }
    }

    #[test]
    fn test_chunk_document_keeps_page_provenance() {
        let doc = doc_with_pages(&[
            "First page content with enough text to keep.",
            "Second page content, also long enough to keep.",
        ]);

        let chunks = chunker(1000, 200).chunk_document(&doc);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].page, 1);
        assert_eq!(chunks[1].page, 2);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[1].index, 1);
    }

    #[test]
    fn test_chunk_document_drops_tiny_fragments() {
        let doc = doc_with_pages(&["ok", "This page has a real amount of text on it."]);
        let chunks = chunker(1000, 200).chunk_document(&doc);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].page, 2);
    }

    #[test]
    fn test_oversized_word_runs_are_windowed() {
        // One giant "sentence" with no periods
        let text = "word ".repeat(500);
        let chunks = chunker(100, 0).split_text(text.trim());
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 100));
    }

    #[quickcheck]
    fn prop_chunks_never_empty(words: Vec<String>) -> bool {
        let text: String = words
            .iter()
            .map(|w| w.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
            .filter(|w| !w.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let chunks = chunker(50, 10).split_text(&text);
        chunks.iter().all(|c| !c.trim().is_empty()) || text.trim().is_empty()
    }
}
