// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — decode with format detection, crop to a box under a
// bounds policy, and re-encode in place or via temp-file-and-rename.
// Operates on in-memory images using the `image` and `imageproc` crates.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Pixel, imageops};
use imageproc::rect::Rect;
use photobooth_core::error::{CropperError, Result};
use photobooth_core::{BoundsPolicy, CropBox, MAX_CROP_SIDE};
use tracing::{debug, info, instrument, warn};

/// Stand-in path for errors on images that never touched the filesystem.
const IN_MEMORY: &str = "<memory>";

/// Image processing pipeline operating on a single in-memory image.
///
/// Transformations consume `self` and return a new `ImageProcessor`, so calls
/// chain:
///
/// ```ignore
/// ImageProcessor::open("temporary_files/photo.png")?
///     .crop_box(CropBox::from_origin(43, 90, 95, 140), BoundsPolicy::Strict)?
///     .save_atomic("temporary_files/photo.png")?;
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
    /// Encoding used by `to_bytes` / `save`. Detected on decode.
    format: Option<ImageFormat>,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Load an image from a file path.
    ///
    /// The format is sniffed from the file's magic bytes, falling back to the
    /// extension, and remembered for re-encoding.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)
            .map_err(|err| CropperError::decode(path, err))?
            .with_guessed_format()
            .map_err(|err| CropperError::decode(path, err))?;
        let format = reader.format();
        let img = reader
            .decode()
            .map_err(|err| CropperError::decode(path, err))?;
        info!(
            width = img.width(),
            height = img.height(),
            format = ?format,
            "Image loaded"
        );
        Ok(Self { image: img, format })
    }

    /// Create a processor from raw encoded bytes (PNG, JPEG, etc.).
    #[instrument(skip(data), fields(data_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let format = image::guess_format(data).ok();
        let img = image::load_from_memory(data)
            .map_err(|err| CropperError::decode(IN_MEMORY, err))?;
        debug!(
            width = img.width(),
            height = img.height(),
            "Image decoded from bytes"
        );
        Ok(Self { image: img, format })
    }

    /// Wrap an already-decoded `DynamicImage`. Encodes as PNG unless a
    /// format is set with [`ImageProcessor::with_format`].
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self {
            image,
            format: None,
        }
    }

    /// Override the encoding used on output.
    pub fn with_format(self, format: ImageFormat) -> Self {
        Self {
            format: Some(format),
            ..self
        }
    }

    // -- Accessors ------------------------------------------------------------

    /// Current image width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Current image height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Format detected on decode (or set explicitly), if any.
    pub fn format(&self) -> Option<ImageFormat> {
        self.format
    }

    /// Borrow the underlying `DynamicImage`.
    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations ------------------------------------------------------

    /// Crop the image to `crop_box`.
    ///
    /// A box that lies fully inside the image is cropped exactly. Otherwise
    /// `policy` decides: `Strict` fails, `Clamp` keeps the overlap with the
    /// image, `Pad` keeps the full box and zero-fills the missing pixels in
    /// the source's own pixel type.
    #[instrument(skip(self), fields(crop_box = %crop_box, policy = %policy))]
    pub fn crop_box(self, crop_box: CropBox, policy: BoundsPolicy) -> Result<Self> {
        let (img_w, img_h) = (self.image.width(), self.image.height());
        let out_of_bounds = || CropperError::CropBounds {
            crop_box,
            width: img_w,
            height: img_h,
        };

        if crop_box.width() == 0 || crop_box.height() == 0 {
            return Err(out_of_bounds());
        }

        if crop_box.fits_within(img_w, img_h) {
            info!(
                x = crop_box.left,
                y = crop_box.top,
                w = crop_box.width(),
                h = crop_box.height(),
                "Cropping image"
            );
            let cropped = self.image.crop_imm(
                crop_box.left as u32,
                crop_box.top as u32,
                crop_box.width(),
                crop_box.height(),
            );
            return Ok(Self {
                image: cropped,
                format: self.format,
            });
        }

        match policy {
            BoundsPolicy::Strict => {
                warn!(img_w, img_h, "Crop box outside image");
                Err(out_of_bounds())
            }
            BoundsPolicy::Clamp => {
                // Rect works in i32; a box outside that range cannot overlap.
                let in_i32 = |v: i64| i32::try_from(v).ok();
                let (Some(left), Some(top), Some(_), Some(_)) = (
                    in_i32(crop_box.left),
                    in_i32(crop_box.top),
                    in_i32(crop_box.right),
                    in_i32(crop_box.bottom),
                ) else {
                    return Err(out_of_bounds());
                };
                if i32::try_from(crop_box.width()).is_err()
                    || i32::try_from(crop_box.height()).is_err()
                {
                    return Err(out_of_bounds());
                }
                let requested = Rect::at(left, top).of_size(crop_box.width(), crop_box.height());
                let overlap = if img_w == 0 || img_h == 0 {
                    None
                } else {
                    Rect::at(0, 0).of_size(img_w, img_h).intersect(requested)
                };
                let Some(overlap) = overlap else {
                    warn!(img_w, img_h, "Crop box does not overlap image");
                    return Err(out_of_bounds());
                };
                info!(
                    x = overlap.left(),
                    y = overlap.top(),
                    w = overlap.width(),
                    h = overlap.height(),
                    "Cropping clamped region"
                );
                let cropped = self.image.crop_imm(
                    overlap.left() as u32,
                    overlap.top() as u32,
                    overlap.width(),
                    overlap.height(),
                );
                Ok(Self {
                    image: cropped,
                    format: self.format,
                })
            }
            BoundsPolicy::Pad => {
                let (w, h) = (crop_box.width(), crop_box.height());
                if w > MAX_CROP_SIDE || h > MAX_CROP_SIDE {
                    warn!(w, h, "Padded canvas too large");
                    return Err(out_of_bounds());
                }
                let (Some(x), Some(y)) = (crop_box.left.checked_neg(), crop_box.top.checked_neg())
                else {
                    return Err(out_of_bounds());
                };
                info!(w, h, "Cropping with zero padding");
                Ok(Self {
                    image: pad(&self.image, w, h, x, y),
                    format: self.format,
                })
            }
        }
    }

    // -- Output ---------------------------------------------------------------

    /// Encode the current image in its remembered format (PNG if none).
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.encode().map_err(|err| CropperError::write(IN_MEMORY, err))
    }

    /// Overwrite `path` directly. The image is fully encoded before the file
    /// is opened, but a crash during the write can still truncate it.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.encode().map_err(|err| CropperError::write(path, err))?;
        check_writable(path).map_err(|err| CropperError::write(path, err))?;
        std::fs::write(path, &bytes).map_err(|err| CropperError::write(path, err))?;
        info!(bytes = bytes.len(), "Image written in place");
        Ok(())
    }

    /// Replace `path` atomically: write a temp file in the same directory,
    /// sync it, then rename it over the destination. The destination's
    /// permissions are carried over when it already exists.
    ///
    /// A symlink at `path` is followed, so the file it points to is replaced
    /// and the link survives. An existing destination that cannot be written
    /// fails with `Write` before anything is staged.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn save_atomic(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.encode().map_err(|err| CropperError::write(path, err))?;

        let target = resolve_destination(path);
        check_writable(&target).map_err(|err| CropperError::write(path, err))?;

        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".photobooth-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|err| CropperError::write(path, err))?;
        debug!(tmp = %tmp.path().display(), "Staging output");

        tmp.write_all(&bytes)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|err| CropperError::write(path, err))?;

        if let Ok(meta) = std::fs::metadata(&target) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|err| CropperError::write(path, err))?;
        }

        tmp.persist(&target)
            .map_err(|err| CropperError::write(path, err.error))?;
        info!(bytes = bytes.len(), "Image replaced atomically");
        Ok(())
    }

    fn encode(&self) -> std::result::Result<Vec<u8>, image::ImageError> {
        let format = self.format.unwrap_or(ImageFormat::Png);
        let mut buffer = Vec::new();
        let mut cursor = std::io::Cursor::new(&mut buffer);
        self.image.write_to(&mut cursor, format)?;
        Ok(buffer)
    }
}

/// Place `image` at (`x`, `y`) on a zeroed `width` x `height` canvas without
/// leaving its pixel type.
fn pad(image: &DynamicImage, width: u32, height: u32, x: i64, y: i64) -> DynamicImage {
    use DynamicImage as D;
    match image {
        D::ImageLuma8(buf) => D::ImageLuma8(pad_buffer(buf, width, height, x, y)),
        D::ImageLumaA8(buf) => D::ImageLumaA8(pad_buffer(buf, width, height, x, y)),
        D::ImageRgb8(buf) => D::ImageRgb8(pad_buffer(buf, width, height, x, y)),
        D::ImageRgba8(buf) => D::ImageRgba8(pad_buffer(buf, width, height, x, y)),
        D::ImageLuma16(buf) => D::ImageLuma16(pad_buffer(buf, width, height, x, y)),
        D::ImageLumaA16(buf) => D::ImageLumaA16(pad_buffer(buf, width, height, x, y)),
        D::ImageRgb16(buf) => D::ImageRgb16(pad_buffer(buf, width, height, x, y)),
        D::ImageRgba16(buf) => D::ImageRgba16(pad_buffer(buf, width, height, x, y)),
        D::ImageRgb32F(buf) => D::ImageRgb32F(pad_buffer(buf, width, height, x, y)),
        D::ImageRgba32F(buf) => D::ImageRgba32F(pad_buffer(buf, width, height, x, y)),
        // Layouts added to `image` later go through 8-bit RGBA.
        other => {
            let mut canvas = DynamicImage::new(width, height, other.color());
            imageops::replace(&mut canvas, other, x, y);
            canvas
        }
    }
}

fn pad_buffer<P: Pixel>(
    source: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    x: i64,
    y: i64,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let mut canvas = ImageBuffer::new(width, height);
    imageops::replace(&mut canvas, source, x, y);
    canvas
}

/// The file a write to `path` should land on: the target of a symlink, or
/// `path` itself.
fn resolve_destination(path: &Path) -> PathBuf {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => std::fs::canonicalize(path)
            .or_else(|_| {
                // Dangling link: create the file it names.
                std::fs::read_link(path).map(|target| match path.parent() {
                    Some(parent) => parent.join(target),
                    None => target,
                })
            })
            .unwrap_or_else(|_| path.to_path_buf()),
        _ => path.to_path_buf(),
    }
}

/// Fail if `path` exists but cannot be written. Neither creates nor
/// truncates.
fn check_writable(path: &Path) -> io::Result<()> {
    let Ok(meta) = std::fs::metadata(path) else {
        return Ok(());
    };
    if meta.permissions().readonly() {
        return Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "destination is read-only",
        ));
    }
    OpenOptions::new().write(true).open(path).map(drop)
}
