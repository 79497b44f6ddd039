// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line arguments.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use docscan_export::OutputFormat;

/// Detect, straighten, and clean up photographed documents.
#[derive(Parser, Debug)]
#[command(name = "docscan", version, about, long_about = None)]
pub struct Cli {
    /// JSON file overriding detector and enhancer thresholds.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the detected page corners as JSON.
    Detect(DetectArgs),
    /// Rectify and enhance one or more photos and write the results.
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Input image.
    pub input: PathBuf,

    /// Pretty-print the JSON report.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Input images.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Directory for the processed pages.
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Output encoding: jpg, png, or pdf.
    #[arg(short, long, default_value_t = OutputFormat::Jpeg)]
    pub format: OutputFormat,

    /// JPEG quality (1-100).
    #[arg(short, long, default_value_t = 95)]
    pub quality: u8,

    /// Page corners from an interactive cropper, as `x,y;x,y;x,y;x,y` or a
    /// JSON array of four `[x, y]` pairs. Only valid with a single input.
    #[arg(long)]
    pub corners: Option<String>,

    /// Skip boundary detection and keep the full frame.
    #[arg(long)]
    pub no_detect: bool,

    /// Skip adaptive enhancement.
    #[arg(long)]
    pub no_enhance: bool,

    /// Pages processed at once. Defaults to the available CPU parallelism.
    #[arg(short, long)]
    pub jobs: Option<NonZeroUsize>,
}
