// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the photobooth cropper: the crop box, the constants
// that produce it, and the policy for boxes that leave the image.

use serde::{Deserialize, Serialize};

use crate::error::{CropperError, Result};

/// Output width of a booth portrait, in pixels.
pub const PORTRAIT_WIDTH: u32 = 95;

/// Output height of a booth portrait, in pixels.
pub const PORTRAIT_HEIGHT: u32 = 140;

/// Horizontal shift applied after centering (negative moves left).
pub const PORTRAIT_OFFSET_X: i64 = -9;

/// Vertical shift applied after centering (positive moves down).
pub const PORTRAIT_OFFSET_Y: i64 = 10;

/// Largest accepted crop width or height. Keeps padded canvases allocatable
/// and box coordinates inside `i32`.
pub const MAX_CROP_SIDE: u32 = 1 << 16;

/// A half-open rectangle `[left, right) x [top, bottom)` in source pixel
/// coordinates. Coordinates are signed: a box computed for a small image may
/// start left of or above the origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CropBox {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl CropBox {
    /// Build a box from its top-left corner and size. Edges past `i64::MAX`
    /// saturate.
    pub fn from_origin(left: i64, top: i64, width: u32, height: u32) -> Self {
        Self {
            left,
            top,
            right: left.saturating_add(i64::from(width)),
            bottom: top.saturating_add(i64::from(height)),
        }
    }

    pub fn width(&self) -> u32 {
        (self.right - self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        (self.bottom - self.top).max(0) as u32
    }

    /// Whether the whole box lies inside an image of the given size.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.left >= 0
            && self.top >= 0
            && self.right <= i64::from(width)
            && self.bottom <= i64::from(height)
            && self.right > self.left
            && self.bottom > self.top
    }
}

impl std::fmt::Display for CropBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// The constants of the centered-crop formula.
///
/// For a `width` x `height` source the box is
///
/// ```text
/// left   = (width  - spec.width)  // 2 + offset_x
/// top    = (height - spec.height) // 2 + offset_y
/// right  = left + spec.width
/// bottom = top  + spec.height
/// ```
///
/// where `//` is floor division.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSpec {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Horizontal shift from the centered position.
    pub offset_x: i64,
    /// Vertical shift from the centered position.
    pub offset_y: i64,
}

impl Default for CropSpec {
    fn default() -> Self {
        Self {
            width: PORTRAIT_WIDTH,
            height: PORTRAIT_HEIGHT,
            offset_x: PORTRAIT_OFFSET_X,
            offset_y: PORTRAIT_OFFSET_Y,
        }
    }
}

impl CropSpec {
    /// Reject sizes that are zero or above [`MAX_CROP_SIDE`], and offsets
    /// outside the `i32` range.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CropperError::Config(format!(
                "crop size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.width > MAX_CROP_SIDE || self.height > MAX_CROP_SIDE {
            return Err(CropperError::Config(format!(
                "crop size {}x{} exceeds the {MAX_CROP_SIDE} px limit",
                self.width, self.height
            )));
        }
        let in_i32 = |offset: i64| i32::try_from(offset).is_ok();
        if !in_i32(self.offset_x) || !in_i32(self.offset_y) {
            return Err(CropperError::Config(format!(
                "crop offsets ({}, {}) out of range",
                self.offset_x, self.offset_y
            )));
        }
        Ok(())
    }

    /// Compute the crop box for a source image of the given dimensions.
    ///
    /// Fails with `Config` if the offsets push an edge past `i64`.
    pub fn crop_box(&self, source_width: u32, source_height: u32) -> Result<CropBox> {
        let slack_x = i64::from(source_width) - i64::from(self.width);
        let slack_y = i64::from(source_height) - i64::from(self.height);

        // div_euclid by a positive divisor rounds toward negative infinity.
        let left = slack_x.div_euclid(2).checked_add(self.offset_x);
        let top = slack_y.div_euclid(2).checked_add(self.offset_y);
        let right = left.and_then(|left| left.checked_add(i64::from(self.width)));
        let bottom = top.and_then(|top| top.checked_add(i64::from(self.height)));

        match (left, top, right, bottom) {
            (Some(left), Some(top), Some(right), Some(bottom)) => Ok(CropBox {
                left,
                top,
                right,
                bottom,
            }),
            _ => Err(CropperError::Config(format!(
                "crop offsets ({}, {}) overflow for a {source_width}x{source_height} image",
                self.offset_x, self.offset_y
            ))),
        }
    }
}

/// What to do when the computed crop box extends past the source image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundsPolicy {
    /// Refuse to crop; report a crop-bounds error.
    #[default]
    Strict,
    /// Crop only the part of the box that overlaps the image.
    Clamp,
    /// Keep the full box size, filling pixels outside the image with zero.
    Pad,
}

impl BoundsPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundsPolicy::Strict => "strict",
            BoundsPolicy::Clamp => "clamp",
            BoundsPolicy::Pad => "pad",
        }
    }
}

impl std::fmt::Display for BoundsPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BoundsPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(BoundsPolicy::Strict),
            "clamp" => Ok(BoundsPolicy::Clamp),
            "pad" => Ok(BoundsPolicy::Pad),
            other => Err(format!(
                "unknown bounds policy '{other}' (expected strict, clamp, or pad)"
            )),
        }
    }
}
