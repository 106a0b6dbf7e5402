// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command-line surface: argument parsing, config resolution, and the mapping
// from errors to exit codes.

use std::path::PathBuf;

use clap::Parser;
use photobooth_core::error::Result;
use photobooth_core::{BoundsPolicy, CropConfig, CropperError};
use photobooth_image::{CropOutcome, ImageCropper};
use tracing::info;

/// Crop the latest booth snapshot to a 95x140 portrait, in place.
///
/// With no arguments, crops `temporary_files/photo.png`.
#[derive(Debug, Parser)]
#[command(name = "photobooth-crop", version, about, long_about = None)]
pub struct Args {
    /// Image to crop (defaults to the config's input path).
    pub path: Option<PathBuf>,

    /// Write the result here instead of overwriting the input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// JSON config file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// What to do when the crop box leaves the image: strict, clamp, or pad.
    #[arg(long)]
    pub policy: Option<BoundsPolicy>,

    /// Overwrite the file directly instead of writing a temp file and
    /// renaming it.
    #[arg(long)]
    pub in_place: bool,

    /// Print the crop box and output size without writing anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Merge the config file (if any) with command-line overrides.
pub fn resolve_config(args: &Args) -> Result<CropConfig> {
    let mut config = match &args.config {
        Some(path) => CropConfig::load(path)?,
        None => CropConfig::default(),
    };

    if let Some(path) = &args.path {
        config.input_path = path.clone();
    }
    if let Some(policy) = args.policy {
        config.bounds_policy = policy;
    }
    if args.in_place {
        config.atomic_write = false;
    }

    config.validate()?;
    Ok(config)
}

/// Run one crop as described by `args`.
pub fn run(args: &Args) -> Result<CropOutcome> {
    let config = resolve_config(args)?;
    info!(
        input = %config.input_path.display(),
        policy = %config.bounds_policy,
        atomic = config.atomic_write,
        "Photobooth crop starting"
    );

    let cropper = ImageCropper::from_config(&config);

    if args.dry_run {
        let outcome = cropper.plan(&config.input_path)?;
        println!(
            "{}: {}x{} -> crop box {} -> {}x{}",
            config.input_path.display(),
            outcome.source_width,
            outcome.source_height,
            outcome.crop_box,
            outcome.output_width,
            outcome.output_height,
        );
        return Ok(outcome);
    }

    match &args.output {
        Some(output) => cropper.crop_centered_to(&config.input_path, output),
        None => cropper.crop_centered(&config.input_path),
    }
}

/// Process exit code for a failed run.
pub fn exit_code(err: &CropperError) -> u8 {
    match err {
        CropperError::Decode { .. } => 2,
        CropperError::CropBounds { .. } => 3,
        CropperError::Write { .. } => 4,
        CropperError::Config(_) | CropperError::Io(_) | CropperError::Serialization(_) => 1,
    }
}
