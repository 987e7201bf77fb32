// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the wavedex command-line interface.
//!
//! Three subcommands: `index` builds a `.wvdx` file from a JSON corpus,
//! `search` runs a ranked query against one, and `inspect` reports what a
//! file holds.

pub mod display;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "wavedex",
    about = "Compressed full-text index over wavelet-backed document arrays",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a corpus index from a JSON document list
    Index {
        /// Corpus JSON file (`{"documents": [...]}`)
        #[arg(short, long)]
        input: PathBuf,

        /// Output .wvdx file
        #[arg(short, long)]
        output: PathBuf,

        /// Index configuration JSON; defaults apply when omitted
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Search a .wvdx file and display ranked documents
    Search {
        /// Path to .wvdx file
        file: PathBuf,

        /// Query terms, matched as exact byte substrings
        #[arg(required = true)]
        terms: Vec<String>,

        /// Property to search, as NAME or NAME:WEIGHT (repeatable)
        #[arg(short, long = "property", value_parser = parse_property)]
        properties: Vec<(String, f64)>,

        /// Restrict to documents with ATTR=VALUE (repeatable)
        #[arg(short, long = "filter", value_parser = parse_filter)]
        filters: Vec<(String, String)>,

        /// Maximum number of results; the index default when omitted
        #[arg(short, long)]
        limit: Option<usize>,

        /// Score terms that do not fully occur by their longest match
        #[arg(long)]
        fuzzy: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Inspect a .wvdx file
    Inspect {
        /// Path to .wvdx file
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_property(arg: &str) -> Result<(String, f64), String> {
    let (name, weight) = match arg.rsplit_once(':') {
        Some((name, weight)) => {
            let weight: f64 = weight
                .parse()
                .map_err(|_| format!("invalid weight {:?}", weight))?;
            (name, weight)
        }
        None => (arg, 1.0),
    };
    if name.is_empty() {
        return Err("property name is empty".to_string());
    }
    if !weight.is_finite() || weight < 0.0 {
        return Err(format!("weight must be finite and non-negative, got {}", weight));
    }
    Ok((name.to_string(), weight))
}

fn parse_filter(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((attr, value)) if !attr.is_empty() => Ok((attr.to_string(), value.to_string())),
        _ => Err(format!("expected ATTR=VALUE, got {:?}", arg)),
    }
}
