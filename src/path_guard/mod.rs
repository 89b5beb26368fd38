//! Lexical path checks that keep request-supplied paths inside the browsed root.
//!
//! The checks never touch the filesystem: a symlink under the root that points
//! elsewhere is still accepted.

use std::path::{Component, Path, PathBuf};

mod error;

pub(crate) use error::{PathGuardError, PathGuardErrorCode, PathGuardResult};

/// Lexically normalizes `path`: drops `.` segments and resolves `..` against the
/// preceding segment. `..` directly under the root stays at the root.
pub(crate) fn clean_path(path: &Path) -> PathBuf {
    let mut prefix: Option<PathBuf> = None;
    let mut rooted = false;
    let mut parts: Vec<&std::ffi::OsStr> = Vec::new();
    // Leading `..` segments of a relative path that cannot be resolved.
    let mut leading_parents = 0usize;

    for comp in path.components() {
        match comp {
            Component::Prefix(p) => prefix = Some(PathBuf::from(p.as_os_str())),
            Component::RootDir => rooted = true,
            Component::CurDir => {}
            Component::ParentDir => {
                if parts.pop().is_none() && !rooted {
                    leading_parents += 1;
                }
            }
            Component::Normal(seg) => parts.push(seg),
        }
    }

    let mut out = prefix.unwrap_or_default();
    if rooted {
        out.push(Component::RootDir.as_os_str());
    }
    for _ in 0..leading_parents {
        out.push("..");
    }
    for seg in parts {
        out.push(seg);
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

/// Resolves a request path fragment to a cleaned absolute path under `root`.
///
/// Fragments without a leading separator are treated as absolute, which is how
/// they arrive once a URL prefix has been stripped.
pub(crate) fn guard_path(root: &Path, requested: &str) -> PathGuardResult<PathBuf> {
    if requested.contains('\0') {
        return Err(PathGuardError::new(
            PathGuardErrorCode::InvalidPath,
            "Path contains nul byte",
        ));
    }
    let raw = Path::new(requested);
    let cleaned = if raw.has_root() {
        clean_path(raw)
    } else {
        clean_path(&Path::new("/").join(raw))
    };
    if !cleaned.starts_with(root) {
        return Err(PathGuardError::traversal(&cleaned, root));
    }
    Ok(cleaned)
}

/// Re-roots an absolute `path` below `base`, keeping its full directory structure.
pub(crate) fn mirror_under(base: &Path, path: &Path) -> PathBuf {
    let mut out = base.to_path_buf();
    for comp in path.components() {
        match comp {
            Component::Normal(seg) => out.push(seg),
            // Inputs are cleaned first; a stray `..` must never climb out of `base`.
            Component::Prefix(_) | Component::RootDir | Component::CurDir | Component::ParentDir => {}
        }
    }
    out
}
