use super::command::run_tool;
use super::error::{ThumbnailError, ThumbnailErrorCode, ThumbnailResult};
use super::strategy::{Attempt, ThumbnailStrategy};
use super::THUMB_BOX;
use crate::binary_resolver::resolve_binary;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::fs;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::process::Command;
use std::time::Duration;

/// `vipsthumbnail`: much faster than decoding in-process, used whenever installed.
pub struct VipsThumbnail {
    pub timeout: Option<Duration>,
}

impl ThumbnailStrategy for VipsThumbnail {
    fn name(&self) -> &'static str {
        "vipsthumbnail"
    }

    fn attempt(&self, src: &Path, dst: &Path) -> Attempt {
        let Some(vips) = resolve_binary("vipsthumbnail", Some("LK_VIPSTHUMBNAIL")) else {
            return Attempt::Unavailable("vipsthumbnail not found".into());
        };
        let mut cmd = Command::new(vips);
        cmd.arg("-t")
            .arg("-s")
            .arg(format!("{THUMB_BOX}x{THUMB_BOX}"))
            .arg("-o")
            .arg(dst)
            .arg(src);
        match run_tool(cmd, self.timeout) {
            Ok(()) => Attempt::Generated,
            Err(err) => Attempt::Failed(err),
        }
    }
}

/// Decodes the JPEG with the `image` crate and writes a nearest-neighbour
/// downscale that fits the thumbnail box.
pub struct DecodeResizeJpeg;

impl ThumbnailStrategy for DecodeResizeJpeg {
    fn name(&self) -> &'static str {
        "decode-resize"
    }

    fn attempt(&self, src: &Path, dst: &Path) -> Attempt {
        match render_jpeg_thumbnail(src, dst, THUMB_BOX) {
            Ok(()) => Attempt::Generated,
            Err(err) => Attempt::Failed(err),
        }
    }
}

pub(super) fn render_jpeg_thumbnail(src: &Path, dst: &Path, max_dim: u32) -> ThumbnailResult<()> {
    let file = fs::File::open(src).map_err(|e| {
        ThumbnailError::from_io_error(ThumbnailErrorCode::Filesystem, "Open failed", e)
    })?;
    let img = ImageReader::with_format(BufReader::new(file), ImageFormat::Jpeg)
        .decode()
        .map_err(|e| ThumbnailError::new(ThumbnailErrorCode::DecodeFailed, format!("Decode failed: {e}")))?;

    let thumb = fit_within(img, max_dim);

    let out = fs::File::create(dst).map_err(|e| {
        ThumbnailError::from_io_error(ThumbnailErrorCode::CacheFailed, "Save thumbnail failed", e)
    })?;
    let mut writer = BufWriter::new(out);
    // JPEG has no alpha channel; encode everything as RGB at the encoder's default quality.
    DynamicImage::ImageRgb8(thumb.to_rgb8())
        .write_with_encoder(JpegEncoder::new(&mut writer))
        .map_err(|e| {
            ThumbnailError::new(ThumbnailErrorCode::CacheFailed, format!("Save thumbnail failed: {e}"))
        })?;
    writer.flush().map_err(|e| {
        ThumbnailError::from_io_error(ThumbnailErrorCode::CacheFailed, "Save thumbnail failed", e)
    })
}

/// Scales down to fit `max_dim`×`max_dim` keeping the aspect ratio; never enlarges.
fn fit_within(img: DynamicImage, max_dim: u32) -> DynamicImage {
    let (w, h) = img.dimensions();
    if w <= max_dim && h <= max_dim {
        return img;
    }
    img.resize(max_dim, max_dim, FilterType::Nearest)
}
