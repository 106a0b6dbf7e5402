// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Centered portrait crop — decode a booth photo, cut the fixed-size box out
// of its middle, and write the result back.

use std::path::Path;

use image::ImageFormat;
use photobooth_core::error::Result;
use photobooth_core::{BoundsPolicy, CropBox, CropConfig, CropSpec};
use tracing::{info, instrument};

use crate::image::processor::ImageProcessor;

/// What a crop did: the box that was applied and the sizes on either side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropOutcome {
    pub crop_box: CropBox,
    pub source_width: u32,
    pub source_height: u32,
    pub output_width: u32,
    pub output_height: u32,
}

/// Crops images to a fixed-size box centered on the source, shifted by the
/// configured offsets.
///
/// Defaults reproduce the booth layout: 95x140, 9 px left, 10 px down,
/// strict bounds, atomic overwrite.
#[derive(Debug, Clone)]
pub struct ImageCropper {
    spec: CropSpec,
    policy: BoundsPolicy,
    atomic_write: bool,
}

impl Default for ImageCropper {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageCropper {
    pub fn new() -> Self {
        Self {
            spec: CropSpec::default(),
            policy: BoundsPolicy::default(),
            atomic_write: true,
        }
    }

    /// Build a cropper from a loaded config. The config's input path is not
    /// used here; callers pass paths to the crop methods.
    pub fn from_config(config: &CropConfig) -> Self {
        Self {
            spec: config.spec,
            policy: config.bounds_policy,
            atomic_write: config.atomic_write,
        }
    }

    /// Set the output size and offsets.
    pub fn spec(mut self, spec: CropSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Set the handling of crop boxes that leave the image.
    pub fn bounds_policy(mut self, policy: BoundsPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Choose between temp-file-and-rename (`true`) and in-place overwrite.
    pub fn atomic_write(mut self, enable: bool) -> Self {
        self.atomic_write = enable;
        self
    }

    /// Crop `path` and overwrite it with the result.
    ///
    /// Fails with `Decode` before anything is written if the file is missing
    /// or not an image, with `CropBounds` (under the strict policy) if the
    /// box does not fit, and with `Write` if the result cannot be persisted.
    pub fn crop_centered(&self, path: impl AsRef<Path>) -> Result<CropOutcome> {
        let path = path.as_ref();
        self.crop_centered_to(path, path)
    }

    /// Crop `input` and write the result to `output`.
    ///
    /// When `output` differs from `input` and has a recognised image
    /// extension, the result is encoded in that format; otherwise the input's
    /// detected format is kept.
    #[instrument(
        skip_all,
        fields(input = %input.as_ref().display(), output = %output.as_ref().display())
    )]
    pub fn crop_centered_to(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> Result<CropOutcome> {
        let (input, output) = (input.as_ref(), output.as_ref());

        let source = ImageProcessor::open(input)?;
        let (cropped, outcome) = self.crop_processor(source)?;

        let cropped = match ImageFormat::from_path(output) {
            Ok(format) if output != input => cropped.with_format(format),
            _ => cropped,
        };

        if self.atomic_write {
            cropped.save_atomic(output)?;
        } else {
            cropped.save(output)?;
        }

        info!(
            crop_box = %outcome.crop_box,
            out_w = outcome.output_width,
            out_h = outcome.output_height,
            "Crop complete"
        );
        Ok(outcome)
    }

    /// Decode `path` and compute the crop without writing anything.
    ///
    /// Reports the same errors a real run would before its write step.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn plan(&self, path: impl AsRef<Path>) -> Result<CropOutcome> {
        let source = ImageProcessor::open(path)?;
        let (_, outcome) = self.crop_processor(source)?;
        Ok(outcome)
    }

    /// Apply the crop to an already-decoded image.
    ///
    /// The spec is validated first, so sizes or offsets set through
    /// [`ImageCropper::spec`] fail with `Config` rather than reaching the
    /// pixel code.
    pub fn crop_processor(
        &self,
        source: ImageProcessor,
    ) -> Result<(ImageProcessor, CropOutcome)> {
        self.spec.validate()?;
        let (source_width, source_height) = (source.width(), source.height());
        let crop_box = self.spec.crop_box(source_width, source_height)?;
        info!(
            source_width,
            source_height,
            crop_box = %crop_box,
            "Computed crop box"
        );

        let cropped = source.crop_box(crop_box, self.policy)?;
        let outcome = CropOutcome {
            crop_box,
            source_width,
            source_height,
            output_width: cropped.width(),
            output_height: cropped.height(),
        };
        Ok((cropped, outcome))
    }
}

/// Crop `path` in place with the default booth settings.
pub fn crop_centered(path: impl AsRef<Path>) -> Result<CropOutcome> {
    ImageCropper::new().crop_centered(path)
}
