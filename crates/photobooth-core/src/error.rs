// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for the photobooth cropper.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::CropBox;

/// Top-level error type for all cropper operations.
#[derive(Debug, Error)]
pub enum CropperError {
    // -- Pipeline errors --
    /// The input is missing, unreadable, or not a decodable image.
    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },

    /// The computed crop box does not fit inside the source image.
    #[error("crop box {crop_box} lies outside the {width}x{height} image")]
    CropBounds {
        crop_box: CropBox,
        width: u32,
        height: u32,
    },

    /// The cropped image could not be encoded or persisted.
    #[error("failed to write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CropperError {
    /// Build a `Decode` error from any displayable cause.
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a `Write` error from any displayable cause.
    pub fn write(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, CropperError>;
