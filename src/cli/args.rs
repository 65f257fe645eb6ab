//! Command-line argument parsing for docsift
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docsift - Persona-driven section retrieval over PDF collections
#[derive(Parser, Debug)]
#[command(name = "docsift")]
#[command(version)]
#[command(about = "Rank PDF sections and passages against a persona and task", long_about = None)]
pub struct Args {
    /// Qdrant server URL (overrides the config file)
    #[arg(long)]
    pub qdrant_url: Option<String>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress all output except final result)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the two-stage persona analysis and write a ranked output.json
    Analyze {
        /// Directory of input PDF files
        #[arg(short, long, default_value = "input")]
        input_dir: PathBuf,

        /// Path of the ranked result JSON
        #[arg(short, long, default_value = "output.json")]
        output: PathBuf,

        /// User role driving the search (e.g. "a business analyst")
        #[arg(short, long)]
        persona: String,

        /// Job to be done (e.g. "find the latest research on company profits")
        #[arg(short, long)]
        job: String,

        /// Override the number of candidate sections
        #[arg(long)]
        top_sections: Option<usize>,

        /// Override the number of chunk hits per section
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Extract a heading outline JSON for every input PDF
    Outline {
        /// Directory of input PDF files
        #[arg(short, long, default_value = "input")]
        input_dir: PathBuf,

        /// Directory for the generated `{stem}_outline.json` files
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,
    },

    /// Score retrieval quality against a golden dataset (Mean Reciprocal Rank)
    Evaluate {
        /// Directory of input PDF files
        #[arg(short, long, default_value = "documents")]
        input_dir: PathBuf,

        /// Golden dataset JSON ([{"user_goal", "golden_answer"}, ...])
        #[arg(short, long)]
        golden: PathBuf,

        /// Hits retrieved per query
        #[arg(long, default_value_t = 5)]
        top_k: usize,
    },

    /// Run environment health checks
    Doctor,

    /// Drop the chunk collection so the next run starts from scratch
    Clean,

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Check if should show progress output
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show detailed per-document events
    pub fn show_events(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
