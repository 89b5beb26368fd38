use std::path::{Path, PathBuf};
use tracing::debug;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Locates an external tool: explicit override path, then `PATH`, then the
/// working directory (for a binary shipped next to the server).
pub fn resolve_binary(name: &str, override_env: Option<&str>) -> Option<PathBuf> {
    let overrides = override_env
        .and_then(|var| std::env::var_os(var))
        .map(PathBuf::from);
    resolve_binary_with_overrides(name, overrides)
}

pub fn resolve_binary_with_overrides<I>(name: &str, overrides: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    let name = tool_name(name)?;

    // An override has to point at a file; bare command names would just re-run the PATH lookup.
    let explicit = overrides.into_iter().find_map(|candidate| {
        if !candidate.is_absolute() && candidate.components().count() < 2 {
            debug!(candidate = %candidate.display(), "ignoring non-path binary override");
            return None;
        }
        executable(&candidate)
    });
    if explicit.is_some() {
        return explicit;
    }

    which::which(name)
        .ok()
        .filter(|found| named(found, name))
        .and_then(|found| executable(&found))
        .or_else(|| executable(&Path::new(".").join(name)))
}

/// A single path component, e.g. `ffmpeg`; anything else never resolves.
fn tool_name(name: &str) -> Option<&str> {
    let name = name.trim();
    (!name.is_empty() && Path::new(name).components().count() == 1).then_some(name)
}

fn executable(candidate: &Path) -> Option<PathBuf> {
    let canonical = candidate.canonicalize().ok()?;
    if !canonical.is_file() {
        return None;
    }
    #[cfg(unix)]
    {
        if canonical.metadata().ok()?.permissions().mode() & 0o111 == 0 {
            return None;
        }
    }
    Some(canonical)
}

fn named(path: &Path, expected: &str) -> bool {
    let Some(file_name) = path.file_name().and_then(|f| f.to_str()) else {
        return false;
    };
    if file_name.eq_ignore_ascii_case(expected) {
        return true;
    }
    cfg!(windows)
        && [".exe", ".cmd", ".bat"]
            .iter()
            .any(|ext| file_name.eq_ignore_ascii_case(&format!("{expected}{ext}")))
}
