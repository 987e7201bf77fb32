// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use wavedex::build::{Corpus, CorpusIndex, Query};
use wavedex::IndexConfig;

mod cli;
use cli::{display, Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("WAVEDEX_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Index {
            input,
            output,
            config,
        } => run_index(&input, &output, config.as_deref()),
        Commands::Search {
            file,
            terms,
            properties,
            filters,
            limit,
            fuzzy,
            json,
        } => {
            let mut query = Query::new(terms).fuzzy(fuzzy);
            for (name, weight) in properties {
                query = query.property(name, weight);
            }
            for (attr, value) in filters {
                query = query.filter(attr, value);
            }
            if let Some(limit) = limit {
                query = query.limit(limit);
            }
            run_search(&file, &query, json)
        }
        Commands::Inspect { file, json } => run_inspect(&file, json),
    };

    if let Err(e) = outcome {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn load_index(path: &Path) -> Result<(CorpusIndex, usize)> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let index = CorpusIndex::from_bytes(&bytes)
        .with_context(|| format!("loading index {}", path.display()))?;
    Ok((index, bytes.len()))
}

fn run_index(input: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    let config = match config {
        Some(path) => IndexConfig::from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => IndexConfig::default(),
    };
    let corpus =
        Corpus::from_file(input).with_context(|| format!("reading corpus {}", input.display()))?;
    tracing::info!(documents = corpus.len(), input = %input.display(), "loaded corpus");

    let start = Instant::now();
    #[cfg(feature = "parallel")]
    let index = {
        let progress = indicatif::ProgressBar::new(0);
        progress.set_style(display::create_progress_style());
        progress.set_prefix("Building");
        let index = CorpusIndex::build_with_progress(&corpus, &config, &progress);
        progress.finish_and_clear();
        index
    };
    #[cfg(not(feature = "parallel"))]
    let index = CorpusIndex::build(&corpus, &config);
    let index = index.context("building index")?;

    let bytes = index.to_bytes()?;
    fs::write(output, &bytes).with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(
        output = %output.display(),
        bytes = bytes.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "wrote index"
    );

    display::print_summary(&output.display().to_string(), bytes.len(), &index.inspect());
    Ok(())
}

fn run_search(path: &Path, query: &Query, json: bool) -> Result<()> {
    let (index, _) = load_index(path)?;
    let start = Instant::now();
    let results = index.search(query).context("running query")?;
    tracing::debug!(elapsed_us = start.elapsed().as_micros() as u64, "query finished");

    if json {
        let rows: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "doc": r.doc_id.get(),
                    "key": index.doc_key(r.doc_id),
                    "score": r.score,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        display::print_results(query, &results, |r| index.doc_key(r.doc_id).map(str::to_string));
    }
    Ok(())
}

fn run_inspect(path: &Path, json: bool) -> Result<()> {
    let (index, file_size) = load_index(path)?;
    let summary = index.inspect();
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        display::print_summary(&path.display().to_string(), file_size, &summary);
    }
    Ok(())
}
