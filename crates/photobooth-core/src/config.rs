// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Cropper configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CropperError, Result};
use crate::types::{BoundsPolicy, CropSpec};

/// Where the booth front-end drops the latest snapshot.
pub const DEFAULT_INPUT_PATH: &str = "temporary_files/photo.png";

/// Settings for a crop run. Any field missing from a config file keeps its
/// default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Image to crop; also the output unless the caller redirects it.
    pub input_path: PathBuf,
    /// Output size and offsets.
    pub spec: CropSpec,
    /// Handling of crop boxes that leave the image.
    pub bounds_policy: BoundsPolicy,
    /// Write to a temp file and rename over the destination instead of
    /// truncating it in place.
    pub atomic_write: bool,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            spec: CropSpec::default(),
            bounds_policy: BoundsPolicy::default(),
            atomic_write: true,
        }
    }
}

impl CropConfig {
    /// Read a JSON config file and validate it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        let config: CropConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Write this config as pretty-printed JSON.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.spec.validate()?;
        if self.input_path.as_os_str().is_empty() {
            return Err(CropperError::Config("input path is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_booth_layout() {
        let config = CropConfig::default();
        assert_eq!(config.input_path, PathBuf::from("temporary_files/photo.png"));
        assert_eq!(config.spec.width, 95);
        assert_eq!(config.spec.height, 140);
        assert_eq!(config.spec.offset_x, -9);
        assert_eq!(config.spec.offset_y, 10);
        assert_eq!(config.bounds_policy, BoundsPolicy::Strict);
        assert!(config.atomic_write);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn persist_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("crop.json");

        let config = CropConfig {
            input_path: PathBuf::from("/srv/booth/shot.png"),
            bounds_policy: BoundsPolicy::Pad,
            atomic_write: false,
            ..CropConfig::default()
        };
        config.persist(&path).expect("persist");

        let loaded = CropConfig::load(&path).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("crop.json");
        std::fs::write(&path, r#"{ "bounds_policy": "clamp" }"#).expect("write");

        let loaded = CropConfig::load(&path).expect("load");
        assert_eq!(loaded.bounds_policy, BoundsPolicy::Clamp);
        assert_eq!(loaded.spec, CropSpec::default());
        assert!(loaded.atomic_write);
    }

    #[test]
    fn zero_size_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("crop.json");
        std::fs::write(
            &path,
            r#"{ "spec": { "width": 0, "height": 140, "offset_x": 0, "offset_y": 0 } }"#,
        )
        .expect("write");

        let result = CropConfig::load(&path);
        assert!(matches!(result, Err(CropperError::Config(_))));
    }

    #[test]
    fn huge_offset_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("crop.json");
        std::fs::write(
            &path,
            r#"{ "spec": { "width": 95, "height": 140, "offset_x": 9223372036854775807, "offset_y": 0 } }"#,
        )
        .expect("write");

        let result = CropConfig::load(&path);
        assert!(matches!(result, Err(CropperError::Config(_))), "{result:?}");
    }

    #[test]
    fn oversized_crop_is_rejected() {
        let config = CropConfig {
            spec: CropSpec {
                width: 95,
                height: u32::MAX,
                offset_x: 0,
                offset_y: 0,
            },
            ..CropConfig::default()
        };
        assert!(matches!(config.validate(), Err(CropperError::Config(_))));
    }

    #[test]
    fn malformed_json_is_a_serialization_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("crop.json");
        std::fs::write(&path, "{ not json").expect("write");

        let result = CropConfig::load(&path);
        assert!(matches!(result, Err(CropperError::Serialization(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = CropConfig::load("/nonexistent/photobooth/crop.json");
        assert!(matches!(result, Err(CropperError::Io(_))));
    }
}
