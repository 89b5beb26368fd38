//! Media items and the directory scan that produces the listing.

use serde::{Deserialize, Serialize};
use std::path::Path;

mod error;
mod scan;

pub use error::{ScanError, ScanResult};
#[cfg(test)]
pub use error::ScanErrorCode;
pub use scan::scan;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Jpeg,
    Png,
    Mp4,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|s| s.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") => Some(Self::Jpeg),
            Some("png") => Some(Self::Png),
            Some("mp4") => Some(Self::Mp4),
            _ => None,
        }
    }

    pub fn ext(self) -> &'static str {
        match self {
            Self::Jpeg => ".jpg",
            Self::Png => ".png",
            Self::Mp4 => ".mp4",
        }
    }
}

/// One listed file. Batch requests only need `filename`; the rest is echoed back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaItem {
    pub filename: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub size: String,
    #[serde(skip)]
    pub size_bytes: u64,
}

impl MediaItem {
    pub fn new(path: &Path, kind: MediaKind, size_bytes: u64) -> Self {
        Self {
            filename: path.to_string_lossy().into_owned(),
            ext: kind.ext().to_string(),
            size: format_size(size_bytes),
            size_bytes,
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        Path::new(&self.filename)
    }
}

pub fn format_size(bytes: u64) -> String {
    const KI: f64 = 1024.0;
    const MI: f64 = KI * 1024.0;
    const GI: f64 = MI * 1024.0;
    let value = bytes as f64;
    if value >= GI {
        format!("{:.1}GB", value / GI)
    } else if value >= MI {
        format!("{:.1}MB", value / MI)
    } else if value >= KI {
        format!("{:.1}KB", value / KI)
    } else {
        format!("{bytes}B")
    }
}
