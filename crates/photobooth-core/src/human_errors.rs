// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for booth operators.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity tells the caller whether trying again can help.

use crate::error::CropperError;

/// Severity of an error from the operator's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A passing disk or filesystem fault. Running again may work.
    Transient,
    /// The operator must do something (retake the photo, fix a path).
    ActionRequired,
    /// Running again on the same input will fail the same way.
    Permanent,
}

/// A human-readable error with a plain English message and a suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary.
    pub message: String,
    /// What the operator should try.
    pub suggestion: String,
    /// Whether running the crop again could succeed without changes.
    pub retriable: bool,
    pub severity: Severity,
}

impl std::fmt::Display for HumanError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.message, self.suggestion)
    }
}

/// Convert a `CropperError` into a `HumanError`.
pub fn humanize_error(err: &CropperError) -> HumanError {
    match err {
        CropperError::Decode { path, reason } => {
            let lower = reason.to_ascii_lowercase();
            if lower.contains("no such file") || lower.contains("not found") {
                HumanError {
                    message: "The photo couldn't be found.".into(),
                    suggestion: format!(
                        "Take the photo again so it is saved to {}.",
                        path.display()
                    ),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The photo file is damaged or not an image.".into(),
                    suggestion: "Take the photo again. Only PNG, JPEG, and similar image files can be cropped.".into(),
                    retriable: false,
                    severity: Severity::Permanent,
                }
            }
        }

        CropperError::CropBounds {
            width, height, ..
        } => HumanError {
            message: "The photo is too small to crop.".into(),
            suggestion: format!(
                "The photo is {width}x{height} pixels. It may already have been cropped; take a new photo and try again."
            ),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CropperError::Write { reason, .. } => {
            let lower = reason.to_ascii_lowercase();
            if lower.contains("permission denied") || lower.contains("read-only") {
                HumanError {
                    message: "The cropped photo couldn't be saved.".into(),
                    suggestion: "Check that the photo folder is writable, then try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if lower.contains("no space") {
                HumanError {
                    message: "The disk is full.".into(),
                    suggestion: "Free up some space, then try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The cropped photo couldn't be saved.".into(),
                    suggestion: format!("Try again. (Detail: {reason})"),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        CropperError::Config(detail) => HumanError {
            message: "The cropper settings are invalid.".into(),
            suggestion: format!("Fix the config file and try again. ({detail})"),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        CropperError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "A file couldn't be found.".into(),
                    suggestion: "Check the path you gave and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The cropper doesn't have permission to use that file.".into(),
                    suggestion: "Check the file permissions and try again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, the disk may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        CropperError::Serialization(_) => HumanError {
            message: "The config file couldn't be read.".into(),
            suggestion: "Make sure the config file is valid JSON.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },
    }
}
