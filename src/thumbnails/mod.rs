//! Thumbnail cache: one JPEG per source file, stored under the cache root at the
//! source's own absolute path, generated on first request.
//!
//! A cached file is served as long as it exists. Changes to the source are only
//! noticed when revalidation is switched on.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

mod command;
mod error;
mod inflight;
mod strategy;
mod thumbnails_jpeg;
mod thumbnails_video;

pub use error::{ThumbnailError, ThumbnailErrorCode, ThumbnailResult};
pub use strategy::{StrategyChain, ThumbnailStrategy};
#[cfg(test)]
pub use strategy::Attempt;
use strategy::run_chain;
pub use thumbnails_jpeg::{DecodeResizeJpeg, VipsThumbnail};
pub use thumbnails_video::FfmpegFrame;

use crate::config::Config;
use crate::media::MediaKind;
use crate::path_guard::{guard_path, mirror_under};
use inflight::InflightLocks;

/// Thumbnails fit inside a square of this many pixels.
pub const THUMB_BOX: u32 = 460;

pub struct ThumbnailCache {
    root: PathBuf,
    thumb_dir: PathBuf,
    revalidate: bool,
    jpeg_chain: StrategyChain,
    video_chain: StrategyChain,
    inflight: InflightLocks,
}

impl ThumbnailCache {
    pub fn new(config: &Config) -> Self {
        Self::with_strategies(
            config,
            default_jpeg_chain(config.tool_timeout),
            default_video_chain(config.tool_timeout),
        )
    }

    pub fn with_strategies(
        config: &Config,
        jpeg_chain: StrategyChain,
        video_chain: StrategyChain,
    ) -> Self {
        Self {
            root: config.root.clone(),
            thumb_dir: config.thumb_dir.clone(),
            revalidate: config.revalidate_thumbnails,
            jpeg_chain,
            video_chain,
            inflight: InflightLocks::default(),
        }
    }

    /// Where the thumbnail of `source` lives (or will live).
    pub fn thumb_path(&self, source: &Path) -> PathBuf {
        mirror_under(&self.thumb_dir, source)
    }

    /// Returns the cached thumbnail for a request path, generating it on a miss.
    pub fn get_thumbnail(&self, requested: &str) -> ThumbnailResult<PathBuf> {
        let source = guard_path(&self.root, requested).map_err(ThumbnailError::from_guard)?;
        let thumb = self.thumb_path(&source);

        if self.is_fresh(&source, &thumb) {
            debug!(thumb = %thumb.display(), "thumbnail cache hit");
            return Ok(thumb);
        }

        self.inflight.run(&thumb, || -> ThumbnailResult<PathBuf> {
            // Someone else may have generated it while we waited.
            if self.is_fresh(&source, &thumb) {
                return Ok(thumb.clone());
            }
            debug!(thumb = %thumb.display(), "thumbnail cache miss");

            if let Err(e) = fs::metadata(&source) {
                warn!(source = %source.display(), error = %e, "thumbnail source missing");
                return Err(ThumbnailError::new(
                    ThumbnailErrorCode::NotFound,
                    format!("{} does not exist: {e}", source.display()),
                ));
            }

            info!(source = %source.display(), "generating thumbnail");
            self.generate(&source, &thumb)?;
            info!(thumb = %thumb.display(), "created thumbnail");
            Ok(thumb.clone())
        })
    }

    /// Removes the cached thumbnail of `source`, if any.
    pub fn prune(&self, source: &Path) -> std::io::Result<bool> {
        let thumb = self.thumb_path(source);
        match fs::remove_file(&thumb) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn generate(&self, source: &Path, thumb: &Path) -> ThumbnailResult<()> {
        let chain = match MediaKind::from_path(source) {
            Some(MediaKind::Jpeg) => &self.jpeg_chain,
            Some(MediaKind::Mp4) => &self.video_chain,
            Some(MediaKind::Png) | None => {
                let ext = source
                    .extension()
                    .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
                    .unwrap_or_default();
                return Err(ThumbnailError::new(
                    ThumbnailErrorCode::UnsupportedMediaType,
                    format!("unknown mediatype: {ext}"),
                ));
            }
        };

        if let Some(parent) = thumb.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                ThumbnailError::from_io_error(
                    ThumbnailErrorCode::CacheFailed,
                    &format!("Failed to create thumbnail cache dir {}", parent.display()),
                    e,
                )
            })?;
        }

        run_chain(chain, source, thumb)
    }

    fn is_fresh(&self, source: &Path, thumb: &Path) -> bool {
        let Ok(thumb_meta) = fs::metadata(thumb) else {
            return false;
        };
        if !self.revalidate {
            return true;
        }
        let source_mtime = fs::metadata(source).and_then(|m| m.modified());
        match (source_mtime, thumb_meta.modified()) {
            (Ok(src), Ok(cached)) => cached >= src,
            // Without timestamps there is nothing to compare; keep the cached copy.
            _ => true,
        }
    }
}

pub fn default_jpeg_chain(timeout: Option<Duration>) -> StrategyChain {
    vec![Box::new(VipsThumbnail { timeout }), Box::new(DecodeResizeJpeg)]
}

pub fn default_video_chain(timeout: Option<Duration>) -> StrategyChain {
    vec![Box::new(FfmpegFrame { timeout })]
}

#[cfg(test)]
mod tests;
