//! Startup configuration: CLI arguments plus the directories derived from `$HOME`.
//!
//! Everything here is resolved once in `main` and shared read-only afterwards.

use crate::mutation::BatchMode;
use crate::path_guard::clean_path;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod error;

pub use error::{ConfigError, ConfigErrorCode, ConfigResult};

const THUMB_SUBDIR: &str = ".cache/lk";
const TRASH_SUBDIR: &str = ".Trash";
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Parser)]
#[command(name = "lk", version, about = "Browse and prune the media under a directory")]
pub struct Cli {
    /// Directory to browse
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Listen port (0 picks a free one)
    #[arg(long, env = "PORT", default_value_t = 0)]
    pub port: u16,

    /// Where generated thumbnails are kept
    #[arg(long, env = "LK_THUMB_DIR")]
    pub thumb_dir: Option<PathBuf>,

    /// Where trashed files are moved to
    #[arg(long, env = "LK_TRASH_DIR")]
    pub trash_dir: Option<PathBuf>,

    /// Regenerate a cached thumbnail when its source is newer
    #[arg(long)]
    pub revalidate_thumbnails: bool,

    /// Remove the cached thumbnail of files that are deleted or trashed
    #[arg(long)]
    pub prune_thumbnails: bool,

    /// Keep going after a failed item in a delete/trash batch
    #[arg(long)]
    pub keep_going: bool,

    /// Kill thumbnail tools that run longer than this; 0 waits forever
    #[arg(long, default_value_t = DEFAULT_TOOL_TIMEOUT_SECS)]
    pub tool_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute, lexically cleaned directory being browsed.
    pub root: PathBuf,
    pub thumb_dir: PathBuf,
    pub trash_dir: PathBuf,
    pub port: u16,
    pub revalidate_thumbnails: bool,
    pub prune_thumbnails: bool,
    pub batch_mode: BatchMode,
    pub tool_timeout: Option<Duration>,
}

impl Config {
    pub fn from_cli(cli: Cli) -> ConfigResult<Self> {
        let root = absolute_clean(&cli.root)?;
        if !root.is_dir() {
            return Err(ConfigError::new(
                ConfigErrorCode::RootNotDirectory,
                format!("{} is not a directory", root.display()),
            ));
        }

        let (thumb_dir, trash_dir) = match (cli.thumb_dir, cli.trash_dir) {
            (Some(thumbs), Some(trash)) => (absolute_clean(&thumbs)?, absolute_clean(&trash)?),
            (thumbs, trash) => {
                let home = dirs_next::home_dir().ok_or_else(|| {
                    ConfigError::new(ConfigErrorCode::HomeNotFound, "Home directory not found")
                })?;
                let thumbs = match thumbs {
                    Some(p) => absolute_clean(&p)?,
                    None => home.join(THUMB_SUBDIR),
                };
                let trash = match trash {
                    Some(p) => absolute_clean(&p)?,
                    None => home.join(TRASH_SUBDIR),
                };
                (thumbs, trash)
            }
        };

        Ok(Self {
            root,
            thumb_dir,
            trash_dir,
            port: cli.port,
            revalidate_thumbnails: cli.revalidate_thumbnails,
            prune_thumbnails: cli.prune_thumbnails,
            batch_mode: if cli.keep_going {
                BatchMode::CollectAll
            } else {
                BatchMode::StopOnFirstError
            },
            tool_timeout: (cli.tool_timeout_secs > 0)
                .then(|| Duration::from_secs(cli.tool_timeout_secs)),
        })
    }

    /// Configuration with explicit directories and default behaviour flags.
    #[cfg(test)]
    pub fn with_dirs(root: &Path, thumb_dir: &Path, trash_dir: &Path) -> Self {
        Self {
            root: clean_path(root),
            thumb_dir: clean_path(thumb_dir),
            trash_dir: clean_path(trash_dir),
            port: 0,
            revalidate_thumbnails: false,
            prune_thumbnails: false,
            batch_mode: BatchMode::StopOnFirstError,
            tool_timeout: Some(Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS)),
        }
    }
}

fn absolute_clean(path: &Path) -> ConfigResult<PathBuf> {
    if path.is_absolute() {
        return Ok(clean_path(path));
    }
    let cwd = std::env::current_dir().map_err(|e| {
        ConfigError::new(
            ConfigErrorCode::WorkingDirUnavailable,
            format!("Failed to read working directory: {e}"),
        )
    })?;
    Ok(clean_path(&cwd.join(path)))
}
