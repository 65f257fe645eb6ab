use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Application configuration, loaded from `~/.docsift/config.toml`.
/// A default file is written on first load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
}

/// PDF extraction and heading detection tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Candidates longer than this are never headings
    pub max_heading_length: usize,
    /// Scored candidates below this confidence are dropped
    pub min_heading_confidence: f32,
    /// Pages whose text layer totals fewer characters go through OCR
    pub ocr_trigger_chars: usize,
    /// Tesseract language code for the OCR fallback
    pub ocr_language: String,
    /// Render width in pixels when rasterizing a page for OCR
    pub ocr_render_width: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_heading_length: 150,
            min_heading_confidence: 0.4,
            ocr_trigger_chars: 50,
            ocr_language: "eng".to_string(),
            ocr_render_width: 2000,
        }
    }
}

/// Text chunking parameters for the fine retrieval stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Fragments shorter than this after trimming are discarded
    pub min_fragment_len: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            min_fragment_len: 10,
        }
    }
}

/// Two-stage retrieval parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Candidate sections kept by the coarse heading filter
    pub top_sections: usize,
    /// Minimum cosine similarity for a heading to become a candidate
    pub min_section_score: f32,
    /// Chunk hits retrieved per candidate section
    pub top_k: usize,
    /// Minimum similarity for a chunk hit
    pub chunk_threshold: f32,
    /// Weight of the section's coarse score when blending chunk scores
    pub section_weight: f32,
    /// Cap on the exact-keyword boost
    pub keyword_boost: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_sections: 5,
            min_section_score: 0.25,
            top_k: 5,
            chunk_threshold: 0.3,
            section_weight: 0.3,
            keyword_boost: 0.1,
        }
    }
}

/// Vector store connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".to_string(),
            collection: "chunks".to_string(),
        }
    }
}

/// Embedding model selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub model_id: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            let config = Config::default();
            config.save()?;
            return Ok(config);
        }

        let contents = fs::read_to_string(&config_path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(&config_path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".docsift").join("config.toml"))
    }
}
