use super::error::{ThumbnailError, ThumbnailResult};
use std::path::Path;
use tracing::debug;

/// Outcome of one generation strategy.
#[derive(Debug)]
pub enum Attempt {
    Generated,
    /// The strategy cannot run here (tool missing); the next one is tried.
    Unavailable(String),
    /// The strategy ran and failed; the chain stops.
    Failed(ThumbnailError),
}

pub trait ThumbnailStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn attempt(&self, src: &Path, dst: &Path) -> Attempt;
}

pub type StrategyChain = Vec<Box<dyn ThumbnailStrategy>>;

/// Tries each strategy in order until one generates or one fails outright.
pub fn run_chain(
    chain: &[Box<dyn ThumbnailStrategy>],
    src: &Path,
    dst: &Path,
) -> ThumbnailResult<()> {
    let mut skipped = Vec::new();
    for strategy in chain {
        match strategy.attempt(src, dst) {
            Attempt::Generated => {
                debug!(strategy = strategy.name(), src = %src.display(), "thumbnail generated");
                return Ok(());
            }
            Attempt::Unavailable(reason) => {
                debug!(strategy = strategy.name(), %reason, "thumbnail strategy unavailable");
                skipped.push(format!("{}: {reason}", strategy.name()));
            }
            Attempt::Failed(err) => return Err(err),
        }
    }
    Err(ThumbnailError::external_tool(if skipped.is_empty() {
        "No thumbnail tool available".to_string()
    } else {
        format!("No thumbnail tool available ({})", skipped.join("; "))
    }))
}
