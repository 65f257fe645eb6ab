//! docsift - Main CLI Entry Point

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;

use docsift::{
    cli::{Args, Commands, Verbosity},
    config::Config,
    doctor::Doctor,
    embedding::EmbeddingEngine,
    eval::{load_golden, Evaluator},
    extractor::{HeadingDetector, OutlineBuilder, PdfParser},
    output::OutlineReport,
    pipeline::AnalysisPipeline,
    store::VectorStore,
    telemetry::TelemetryCollector,
    SiftError,
};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = Config::load()?;
    if let Some(url) = &args.qdrant_url {
        config.store.url = url.clone();
    }

    match &args.command {
        Commands::Analyze {
            input_dir,
            output,
            persona,
            job,
            top_sections,
            top_k,
        } => {
            if let Some(n) = top_sections {
                config.retrieval.top_sections = *n;
            }
            if let Some(k) = top_k {
                config.retrieval.top_k = *k;
            }
            run_analyze(&args, config, input_dir, output, persona, job).await?;
        }
        Commands::Outline {
            input_dir,
            output_dir,
        } => {
            run_outline(&args, &config, input_dir, output_dir)?;
        }
        Commands::Evaluate {
            input_dir,
            golden,
            top_k,
        } => {
            run_evaluate(&args, config, input_dir, golden, *top_k).await?;
        }
        Commands::Doctor => {
            run_doctor(&config).await;
        }
        Commands::Clean => {
            VectorStore::drop_collection(&config.store.url, &config.store.collection).await?;
            println!(
                "Dropped collection '{}' at {}",
                config.store.collection, config.store.url
            );
        }
        Commands::Config => {
            show_config(&config)?;
        }
    }

    Ok(())
}

fn spinner(verbosity: Verbosity, msg: &str) -> ProgressBar {
    if !verbosity.show_progress() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn run_analyze(
    args: &Args,
    config: Config,
    input_dir: &Path,
    output: &Path,
    persona: &str,
    job: &str,
) -> Result<()> {
    let verbosity = args.verbosity();

    let pb = spinner(verbosity, "Loading embedding model...");
    let engine = EmbeddingEngine::new(&config.embedding.model_id)?;
    pb.finish_and_clear();

    let store = VectorStore::connect(
        &config.store.url,
        &config.store.collection,
        engine.dimension(),
    )
    .await?;

    let telemetry = TelemetryCollector::new();
    let pipeline = AnalysisPipeline::new(
        config,
        &engine,
        &store,
        telemetry.clone(),
        verbosity.show_events(),
    )?;

    let pb = spinner(verbosity, "Analyzing documents...");
    let outcome = match pipeline.analyze(input_dir, persona, job).await {
        Ok(outcome) => outcome,
        Err(SiftError::EmptyCorpus(dir)) => {
            pb.finish_and_clear();
            eprintln!("{}: no PDF files found in {:?}", "Warning".yellow(), dir);
            return Ok(());
        }
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    pb.finish_and_clear();

    outcome.report.write(output)?;

    if verbosity.show_progress() {
        println!(
            "{} {} ranked sections, {} passages -> {:?}",
            "Done:".green(),
            outcome.sections.len(),
            outcome.chunks.len(),
            output
        );
        for (i, section) in outcome.sections.iter().enumerate() {
            println!(
                "  {}. {} ({} p.{}, score {:.2})",
                i + 1,
                section.title.bold(),
                section.document,
                section.page_start,
                section.score
            );
        }

        telemetry.display_summary();
    }

    Ok(())
}

fn run_outline(
    args: &Args,
    config: &Config,
    input_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    let verbosity = args.verbosity();

    let pdf_files = match AnalysisPipeline::collect_pdfs(input_dir) {
        Ok(files) => files,
        Err(SiftError::EmptyCorpus(dir)) => {
            eprintln!("{}: no PDF files found in {:?}", "Warning".yellow(), dir);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if verbosity.show_progress() {
        println!("Found {} PDF files to process.", pdf_files.len());
    }

    let parser = PdfParser::new(&config.extraction)?;
    let detector = HeadingDetector::new(&config.extraction);
    let builder = OutlineBuilder::new();

    for pdf_path in &pdf_files {
        let name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| pdf_path.display().to_string());

        let result = parser.parse(pdf_path).map(|document| {
            let headings = detector.detect_headings(&document);
            (document, builder.build_outline(headings))
        });

        match result {
            Ok((document, outline)) => {
                let stem = pdf_path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_else(|| name.clone());

                let report = OutlineReport::from_outline(&document.filename, &outline);
                let path = report.write(output_dir, &stem)?;

                if verbosity.show_progress() {
                    println!(
                        "{} {} ({} headings) -> {:?}",
                        "ok".green(),
                        name,
                        outline.headings.len(),
                        path
                    );
                }
                if verbosity.show_events() {
                    for issue in outline.validate_structure() {
                        println!("   note: {}", issue);
                    }
                }
            }
            Err(e) => {
                eprintln!("{} {}: {}", "failed".red(), name, e);
            }
        }
    }

    Ok(())
}

async fn run_evaluate(
    args: &Args,
    config: Config,
    input_dir: &Path,
    golden: &PathBuf,
    top_k: usize,
) -> Result<()> {
    let verbosity = args.verbosity();

    let dataset = load_golden(golden)?;
    if dataset.is_empty() {
        eprintln!("{}: golden dataset is empty", "Warning".yellow());
        return Ok(());
    }

    let pb = spinner(verbosity, "Loading embedding model...");
    let engine = EmbeddingEngine::new(&config.embedding.model_id)?;
    pb.finish_and_clear();

    let store = VectorStore::connect(
        &config.store.url,
        &config.store.collection,
        engine.dimension(),
    )
    .await?;

    let telemetry = TelemetryCollector::new();
    let pipeline = AnalysisPipeline::new(
        config,
        &engine,
        &store,
        telemetry.clone(),
        verbosity.show_events(),
    )?;

    let pb = spinner(verbosity, "Ingesting corpus...");
    let indexed = match pipeline.ingest_corpus(input_dir).await {
        Ok(indexed) => indexed,
        Err(SiftError::EmptyCorpus(dir)) => {
            pb.finish_and_clear();
            eprintln!("{}: no PDF files found in {:?}", "Warning".yellow(), dir);
            return Ok(());
        }
        Err(e) => {
            pb.finish_and_clear();
            return Err(e.into());
        }
    };
    pb.finish_and_clear();

    if verbosity.show_progress() {
        println!("Indexed {} chunks. Evaluating {} queries...", indexed, dataset.len());
    }

    let evaluator = Evaluator::new(&store, &engine, top_k);
    let report = evaluator.run(&dataset).await?;

    for outcome in &report.outcomes {
        match outcome.rank {
            Some(rank) => println!(
                "{} rank {} (RR {:.2}): {}",
                "hit ".green(),
                rank,
                outcome.reciprocal_rank,
                outcome.goal
            ),
            None => println!(
                "{} (best word overlap {:.2}): {}",
                "miss".red(),
                outcome.best_similarity,
                outcome.goal
            ),
        }
    }

    println!("\n==================== EVALUATION RESULT ====================");
    println!("Mean Reciprocal Rank (MRR): {:.4}", report.mrr);
    println!("===========================================================");

    if verbosity.show_events() {
        telemetry.display_summary();
    }

    Ok(())
}

async fn run_doctor(config: &Config) {
    let working_dir = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| ".".to_string());

    let doctor = Doctor::new(
        config.store.url.clone(),
        config.embedding.model_id.clone(),
        config.extraction.ocr_language.clone(),
        working_dir,
    );

    let checks = doctor.run_diagnostics().await;
    Doctor::display_results(&checks);

    std::process::exit(if Doctor::overall_status(&checks) { 0 } else { 1 });
}

fn show_config(config: &Config) -> Result<()> {
    println!("\ndocsift configuration ({:?})\n", Config::config_path()?);
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
