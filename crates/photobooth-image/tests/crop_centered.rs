// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end tests for the centered crop: real files in temp directories,
// decoded and overwritten through the public API.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use photobooth_core::{BoundsPolicy, CropBox, CropperError};
use photobooth_image::{ImageCropper, crop_centered};

/// Every pixel unique within the image, so a shifted crop cannot pass.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x / 256) * 16 + (y / 256)) as u8])
    })
}

fn write_png(dir: &Path, name: &str, img: &RgbImage) -> PathBuf {
    let path = dir.join(name);
    img.save_with_format(&path, ImageFormat::Png)
        .expect("write fixture");
    path
}

fn read_rgb(path: &Path) -> RgbImage {
    image::open(path).expect("reopen").to_rgb8()
}

#[test]
fn crops_200x300_to_reference_region() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = gradient(200, 300);
    let path = write_png(dir.path(), "photo.png", &source);

    let outcome = crop_centered(&path).expect("crop");

    assert_eq!(
        outcome.crop_box,
        CropBox {
            left: 43,
            top: 90,
            right: 138,
            bottom: 230,
        }
    );
    assert_eq!((outcome.output_width, outcome.output_height), (95, 140));

    let cropped = read_rgb(&path);
    assert_eq!((cropped.width(), cropped.height()), (95, 140));
    for (x, y, pixel) in cropped.enumerate_pixels() {
        assert_eq!(
            pixel,
            source.get_pixel(x + 43, y + 90),
            "pixel mismatch at ({x}, {y})"
        );
    }
}

#[test]
fn output_is_portrait_for_any_large_enough_source() {
    let dir = tempfile::tempdir().expect("tempdir");
    let sizes = [(113, 159), (114, 160), (640, 480), (1280, 720), (301, 999)];

    for (width, height) in sizes {
        let name = format!("{width}x{height}.png");
        let path = write_png(dir.path(), &name, &gradient(width, height));
        let outcome = crop_centered(&path).expect("crop");
        assert_eq!(
            (outcome.output_width, outcome.output_height),
            (95, 140),
            "{width}x{height}"
        );

        let cropped = read_rgb(&path);
        assert_eq!((cropped.width(), cropped.height()), (95, 140), "{width}x{height}");
    }
}

#[test]
fn second_run_fails_and_leaves_file_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(dir.path(), "photo.png", &gradient(200, 300));

    crop_centered(&path).expect("first crop");
    let after_first = std::fs::read(&path).expect("read");

    match crop_centered(&path) {
        Err(CropperError::CropBounds {
            crop_box,
            width,
            height,
        }) => {
            assert_eq!(crop_box.left, -9);
            assert_eq!((width, height), (95, 140));
        }
        other => panic!("expected CropBounds, got {other:?}"),
    }

    assert_eq!(std::fs::read(&path).expect("read"), after_first);
}

#[test]
fn missing_input_is_a_decode_error_and_creates_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("temporary_files").join("photo.png");

    let result = crop_centered(&path);

    assert!(matches!(result, Err(CropperError::Decode { .. })), "{result:?}");
    assert!(!path.exists());
}

#[test]
fn corrupt_input_is_a_decode_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("photo.png");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nthis is not really a png").expect("write");

    let result = crop_centered(&path);

    assert!(matches!(result, Err(CropperError::Decode { .. })), "{result:?}");
    assert_eq!(
        std::fs::read(&path).expect("read"),
        b"\x89PNG\r\n\x1a\nthis is not really a png"
    );
}

#[test]
fn unwritable_output_fails_after_decode_and_crop() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_png(dir.path(), "photo.png", &gradient(200, 300));
    // A regular file where the output's parent directory should be: no
    // process, root included, can create a file beneath it.
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"").expect("write blocker");
    let output = blocker.join("photo.png");

    for atomic in [true, false] {
        let cropper = ImageCropper::new().atomic_write(atomic);

        // Decode and crop succeed on their own...
        let plan = cropper.plan(&input).expect("plan");
        assert_eq!((plan.output_width, plan.output_height), (95, 140));

        // ...so the failure is in the write step.
        let result = cropper.crop_centered_to(&input, &output);
        match result {
            Err(CropperError::Write { path, .. }) => assert_eq!(path, output),
            other => panic!("expected Write (atomic = {atomic}), got {other:?}"),
        }
    }

    // The input was never touched.
    assert_eq!(read_rgb(&input).dimensions(), (200, 300));
}

#[test]
fn in_place_write_matches_atomic_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = gradient(320, 240);
    let atomic_path = write_png(dir.path(), "atomic.png", &source);
    let in_place_path = write_png(dir.path(), "in_place.png", &source);

    ImageCropper::new()
        .crop_centered(&atomic_path)
        .expect("atomic crop");
    ImageCropper::new()
        .atomic_write(false)
        .crop_centered(&in_place_path)
        .expect("in-place crop");

    assert_eq!(read_rgb(&atomic_path), read_rgb(&in_place_path));
}

#[test]
fn atomic_write_leaves_no_temp_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(dir.path(), "photo.png", &gradient(200, 300));

    crop_centered(&path).expect("crop");

    let names: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read_dir")
        .map(|entry| entry.expect("entry").file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("photo.png")]);
}

#[test]
fn plan_does_not_write() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(dir.path(), "photo.png", &gradient(200, 300));
    let before = std::fs::read(&path).expect("read");

    let outcome = ImageCropper::new().plan(&path).expect("plan");

    assert_eq!(outcome.crop_box, CropBox::from_origin(43, 90, 95, 140));
    assert_eq!(std::fs::read(&path).expect("read"), before);
}

#[test]
fn plan_reports_bounds_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(dir.path(), "photo.png", &gradient(95, 140));

    let result = ImageCropper::new().plan(&path);

    assert!(matches!(result, Err(CropperError::CropBounds { .. })), "{result:?}");
}

#[test]
fn pad_policy_always_yields_portrait() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(dir.path(), "photo.png", &gradient(95, 140));

    let outcome = ImageCropper::new()
        .bounds_policy(BoundsPolicy::Pad)
        .crop_centered(&path)
        .expect("crop");

    assert_eq!((outcome.output_width, outcome.output_height), (95, 140));
    let cropped = read_rgb(&path);
    assert_eq!(cropped.dimensions(), (95, 140));
    // Column 9 of the output is column 0 of the source, row 0 is source row 10.
    assert_eq!(cropped.get_pixel(9, 0), &Rgb([0, 10, 0]));
    assert_eq!(cropped.get_pixel(0, 0), &Rgb([0, 0, 0]));
}

#[test]
fn clamp_policy_keeps_overlap() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(dir.path(), "photo.png", &gradient(95, 140));

    let outcome = ImageCropper::new()
        .bounds_policy(BoundsPolicy::Clamp)
        .crop_centered(&path)
        .expect("crop");

    assert_eq!((outcome.output_width, outcome.output_height), (86, 130));
    assert_eq!(read_rgb(&path).dimensions(), (86, 130));
}

#[test]
fn jpeg_input_stays_jpeg() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("photo.jpg");
    DynamicImage::ImageRgb8(gradient(200, 300))
        .save_with_format(&path, ImageFormat::Jpeg)
        .expect("write jpeg");

    crop_centered(&path).expect("crop");

    let bytes = std::fs::read(&path).expect("read");
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    assert_eq!(image::load_from_memory(&bytes).expect("decode").width(), 95);
}

#[test]
fn redirected_output_uses_its_extension() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write_png(dir.path(), "photo.png", &gradient(200, 300));
    let output = dir.path().join("portrait.jpg");

    ImageCropper::new()
        .crop_centered_to(&input, &output)
        .expect("crop");

    let bytes = std::fs::read(&output).expect("read");
    assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    // Input left as it was.
    assert_eq!(read_rgb(&input).dimensions(), (200, 300));
}

#[test]
fn read_only_destination_is_a_write_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_png(dir.path(), "photo.png", &gradient(200, 300));
    let mut perms = std::fs::metadata(&path).expect("metadata").permissions();
    perms.set_readonly(true);
    std::fs::set_permissions(&path, perms).expect("chmod");
    let before = std::fs::read(&path).expect("read");

    for atomic in [true, false] {
        let result = ImageCropper::new().atomic_write(atomic).crop_centered(&path);
        match result {
            Err(CropperError::Write { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected Write (atomic = {atomic}), got {other:?}"),
        }
        assert_eq!(std::fs::read(&path).expect("read"), before, "atomic = {atomic}");
        assert!(std::fs::metadata(&path).expect("metadata").permissions().readonly());
    }
}

#[cfg(unix)]
#[test]
fn symlinked_snapshot_is_cropped_through_the_link() {
    let dir = tempfile::tempdir().expect("tempdir");
    let real = write_png(dir.path(), "real.png", &gradient(200, 300));
    let link = dir.path().join("photo.png");
    std::os::unix::fs::symlink("real.png", &link).expect("symlink");

    for atomic in [true, false] {
        // Restore the full-size source for the second pass.
        write_png(dir.path(), "real.png", &gradient(200, 300));

        ImageCropper::new()
            .atomic_write(atomic)
            .crop_centered(&link)
            .expect("crop");

        let meta = std::fs::symlink_metadata(&link).expect("lstat");
        assert!(meta.file_type().is_symlink(), "atomic = {atomic}");
        assert_eq!(read_rgb(&real).dimensions(), (95, 140), "atomic = {atomic}");
    }
}
