//! CLI argument parsing for pdfbind.
//!
//! Defines the command-line interface with `clap` plus the helpers that
//! turn arguments into engine inputs: glob expansion of input patterns
//! and JSON merge manifests with per-source options.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Deserialize;

use pdfbind::OutlineMode;

/// Assemble PDF documents.
///
/// pdfbind merges PDF files with outline reconciliation, stamps overlays
/// and page numbers, re-lays pages onto new page sizes and reports
/// document information.
#[derive(Parser, Debug)]
#[command(name = "pdfbind")]
#[command(version)]
#[command(about = "Assemble PDF documents", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress all non-error output
    ///
    /// Only errors and warnings will be printed.
    /// Useful for scripts and automation.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output - show detailed information per document
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge PDF files into a single document
    Merge(MergeArgs),
    /// Stamp the same text onto every page
    Overlay(OverlayArgs),
    /// Add page numbers at the bottom center
    Number(NumberArgs),
    /// Re-lay every page onto a new page size
    Resize(ResizeArgs),
    /// Print document information as JSON
    Info(InfoArgs),
}

#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Input PDF files to merge (in order)
    ///
    /// Specify multiple files or glob patterns; matches of a pattern are
    /// merged in sorted order. Either inputs or --manifest is required.
    ///
    /// Examples:
    ///   pdfbind merge a.pdf b.pdf -o combined.pdf
    ///   pdfbind merge 'chapter*.pdf' -o book.pdf
    #[arg(value_name = "FILE")]
    pub inputs: Vec<String>,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// JSON manifest with per-source options
    ///
    /// An array of entries:
    ///   [{"path": "a.pdf", "title": "Part A",
    ///     "outline": "whole-hierarchy", "start_on_odd_page": true,
    ///     "bookmark_styles": {"Color": "1 0 0", "Open": null}}]
    ///
    /// Omitted fields use the command-line defaults. A null style value
    /// removes the attribute.
    #[arg(long, value_name = "FILE", conflicts_with = "inputs")]
    pub manifest: Option<PathBuf>,

    /// Outline contribution for every input
    ///
    /// One of: none, this-only, descendants-only, whole-hierarchy.
    /// A manifest entry's "outline" field overrides this per source.
    #[arg(long, value_name = "MODE", default_value = "whole-hierarchy")]
    pub outline: String,

    /// Start every input on an odd page, padding with blank pages
    #[arg(long)]
    pub start_on_odd_page: bool,

    /// Resize all pages onto this page size before merging
    ///
    /// For example A4, Letter or B5. Without this flag pages keep their
    /// original size.
    #[arg(long, value_name = "SIZE")]
    pub page_size: Option<String>,

    /// Use landscape orientation for --page-size
    #[arg(long, requires = "page_size")]
    pub landscape: bool,

    /// Number of inputs to load concurrently
    ///
    /// Defaults to the number of CPU cores.
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct OverlayArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Text to stamp onto every page
    #[arg(short, long, value_name = "TEXT")]
    pub text: String,

    /// Vertical placement: top, bottom or center
    #[arg(long, value_name = "WHERE", default_value = "bottom")]
    pub vertical: String,

    /// Horizontal placement: left, right or center
    #[arg(long, value_name = "WHERE", default_value = "center")]
    pub horizontal: String,

    /// Font name (mapped onto a standard base font)
    #[arg(long, value_name = "NAME", default_value = "Helvetica")]
    pub font: String,

    /// Font size in points
    #[arg(long, value_name = "PT", default_value_t = 10.0)]
    pub size: f32,

    /// Distance from the page edges in points
    #[arg(long, value_name = "PT", default_value_t = 20.0)]
    pub margin: f32,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct NumberArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Number of leading pages that receive no number
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub skip: u32,

    /// Number given to the first numbered page
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub first: u32,

    /// Total page count; adds "n / last" style numbers
    ///
    /// Give the total number of pages in the document, not the number of
    /// pages that receive a number.
    #[arg(long, value_name = "N")]
    pub total: Option<u32>,

    /// Font name (mapped onto a standard base font)
    #[arg(long, value_name = "NAME", default_value = "Helvetica")]
    pub font: String,

    /// Font size in points
    #[arg(long, value_name = "PT", default_value_t = 10.0)]
    pub size: f32,

    /// Distance from the page edges in points
    #[arg(long, value_name = "PT", default_value_t = 20.0)]
    pub margin: f32,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct ResizeArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Output PDF file path
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Target page size, for example A4, Letter or B5
    #[arg(long, value_name = "SIZE", default_value = "A4")]
    pub page_size: String,

    /// Use landscape orientation
    #[arg(long)]
    pub landscape: bool,

    /// Margin kept free on every side, in points
    #[arg(long, value_name = "PT", default_value_t = 18.0)]
    pub margin: f32,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    pub input: PathBuf,
}

/// One source in a JSON merge manifest.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    /// Path of the source file.
    pub path: PathBuf,
    /// Outline entry title; defaults to the file stem.
    #[serde(default)]
    pub title: Option<String>,
    /// Outline contribution mode; `None` falls back to the CLI default.
    #[serde(default)]
    pub outline: Option<OutlineMode>,
    /// Start this source on an odd page.
    #[serde(default)]
    pub start_on_odd_page: bool,
    /// Outline attribute overrides; a `null` value removes the attribute.
    #[serde(default)]
    pub bookmark_styles: BTreeMap<String, Option<String>>,
}

/// Title used when neither the manifest nor the path yields one.
pub fn default_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Document".to_string())
}

/// Expand input patterns into concrete paths.
///
/// Patterns containing `*`, `?` or `[` are expanded with their matches in
/// sorted order; plain paths pass through untouched so missing files
/// surface as read errors later.
pub fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if pattern.contains(['*', '?', '[']) {
            let mut matches = Vec::new();
            for entry in glob::glob(pattern)
                .with_context(|| format!("invalid glob pattern: {pattern}"))?
            {
                matches.push(entry.with_context(|| format!("failed to expand: {pattern}"))?);
            }
            matches.sort();
            anyhow::ensure!(!matches.is_empty(), "pattern matched no files: {pattern}");
            paths.extend(matches);
        } else {
            paths.push(PathBuf::from(pattern));
        }
    }
    Ok(paths)
}

/// Load and parse a JSON merge manifest.
pub async fn load_manifest(path: &Path) -> anyhow::Result<Vec<ManifestEntry>> {
    let raw = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read manifest: {}", path.display()))?;
    let entries: Vec<ManifestEntry> = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse manifest: {}", path.display()))?;
    anyhow::ensure!(!entries.is_empty(), "manifest lists no documents");
    Ok(entries)
}
