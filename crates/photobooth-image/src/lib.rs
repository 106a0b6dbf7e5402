// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// photobooth-image — Image handling for the photobooth cropper.
//
// Provides the in-memory image processor (decode, crop under a bounds policy,
// encode, in-place or atomic save) and the centered portrait cropper built on
// top of it.

pub mod cropper;
pub mod image;

// Re-export the primary structs so callers can use `photobooth_image::ImageCropper` etc.
pub use cropper::{CropOutcome, ImageCropper, crop_centered};
pub use crate::image::processor::ImageProcessor;
