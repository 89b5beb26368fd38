//! Delete and trash for batches of listed media files.
//!
//! Batches are not atomic: whatever was mutated before a failure stays mutated.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

mod delete_ops;
mod error;
mod trash_ops;

pub use error::{MutationError, MutationErrorCode, MutationResult};

use crate::config::Config;
use crate::media::MediaItem;
use crate::path_guard::guard_path;
use crate::thumbnails::ThumbnailCache;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BatchMode {
    #[default]
    StopOnFirstError,
    CollectAll,
}

#[derive(Debug)]
pub struct ItemOutcome {
    pub filename: String,
    pub result: MutationResult<()>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<ItemOutcome>,
}

impl BatchReport {
    /// Collapses the report into the first failure, if any.
    pub fn into_result(self) -> MutationResult<()> {
        match self.outcomes.into_iter().find_map(|o| o.result.err()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

pub(crate) fn run_batch<F>(items: &[MediaItem], mode: BatchMode, mut op: F) -> BatchReport
where
    F: FnMut(&str) -> MutationResult<()>,
{
    let mut report = BatchReport {
        outcomes: Vec::with_capacity(items.len()),
    };
    for item in items {
        let result = op(&item.filename);
        let stop = result.is_err() && mode == BatchMode::StopOnFirstError;
        report.outcomes.push(ItemOutcome {
            filename: item.filename.clone(),
            result,
        });
        if stop {
            break;
        }
    }
    report
}

pub struct FileMutator<'a> {
    config: &'a Config,
    thumbnails: Option<&'a ThumbnailCache>,
}

impl<'a> FileMutator<'a> {
    /// `thumbnails` is only consulted when thumbnail pruning is enabled.
    pub fn new(config: &'a Config, thumbnails: Option<&'a ThumbnailCache>) -> Self {
        Self { config, thumbnails }
    }

    pub fn delete(&self, items: &[MediaItem], mode: BatchMode) -> BatchReport {
        let report = run_batch(items, mode, |requested| {
            let path = self.resolve(requested)?;
            delete_ops::delete_file(&path)?;
            self.prune_thumbnail(&path);
            Ok(())
        });
        log_report("delete", items.len(), &report);
        report
    }

    pub fn trash(&self, items: &[MediaItem], mode: BatchMode) -> BatchReport {
        let report = run_batch(items, mode, |requested| {
            let path = self.resolve(requested)?;
            trash_ops::trash_file(&self.config.trash_dir, &path)?;
            self.prune_thumbnail(&path);
            Ok(())
        });
        log_report("trash", items.len(), &report);
        report
    }

    fn resolve(&self, requested: &str) -> MutationResult<PathBuf> {
        let path = guard_path(&self.config.root, requested).map_err(MutationError::from_guard)?;
        // The guard admits the root itself; moving it would take the whole tree along.
        if path == self.config.root {
            return Err(MutationError::new(
                MutationErrorCode::PathTraversal,
                format!("Refusing to mutate the browsed root {}", path.display()),
            ));
        }
        Ok(path)
    }

    fn prune_thumbnail(&self, source: &Path) {
        if !self.config.prune_thumbnails {
            return;
        }
        let Some(cache) = self.thumbnails else {
            return;
        };
        match cache.prune(source) {
            Ok(removed) => debug!(source = %source.display(), removed, "pruned thumbnail"),
            Err(e) => warn!(source = %source.display(), error = %e, "failed to prune thumbnail"),
        }
    }
}

fn log_report(op: &str, requested: usize, report: &BatchReport) {
    let failed = report.failed();
    if failed == 0 {
        debug!(op, requested, "batch finished");
        return;
    }
    for outcome in &report.outcomes {
        if let Err(e) = &outcome.result {
            warn!(op, filename = %outcome.filename, error = %e, "batch item failed");
        }
    }
    warn!(
        op,
        requested,
        attempted = report.outcomes.len(),
        failed,
        "batch finished with errors"
    );
}
