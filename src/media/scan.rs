use super::error::{ScanError, ScanResult};
use super::{MediaItem, MediaKind};
use std::ffi::OsStr;
use std::path::Path;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

/// Names starting with `.` or `_` are excluded; for directories the whole subtree is.
fn is_excluded_name(name: &OsStr) -> bool {
    let name = name.to_string_lossy();
    name.starts_with('.') || name.starts_with('_')
}

fn keep_entry(entry: &DirEntry) -> bool {
    // The root is browsed even when its own name looks hidden.
    entry.depth() == 0 || !is_excluded_name(entry.file_name())
}

/// Walks `root` and returns every allow-listed media file, largest first.
///
/// Any walk error aborts the scan; a partial listing is never returned.
pub fn scan(root: &Path) -> ScanResult<Vec<MediaItem>> {
    let mut items = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(keep_entry);

    for entry in walker {
        let entry = entry.map_err(ScanError::from_walk_error)?;
        if entry.file_type().is_dir() {
            continue;
        }
        let Some(kind) = MediaKind::from_path(entry.path()) else {
            continue;
        };
        let meta = entry.metadata().map_err(ScanError::from_walk_error)?;
        items.push(MediaItem::new(entry.path(), kind, meta.len()));
    }

    // Stable: equal sizes keep walk order.
    items.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));
    debug!(root = %root.display(), items = items.len(), "media scan finished");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::super::ScanErrorCode;
    use super::*;
    use std::fs::{self, OpenOptions};
    use std::io::Write;
    use std::path::PathBuf;
    use std::time::{Duration, SystemTime};

    fn uniq_path(label: &str) -> PathBuf {
        let ts = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_nanos();
        std::env::temp_dir().join(format!("lk-scan-test-{label}-{ts}"))
    }

    fn write_sized(path: &Path, len: usize) {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .expect("open file");
        file.write_all(&vec![7u8; len]).expect("write file");
    }

    fn names(items: &[MediaItem]) -> Vec<String> {
        items
            .iter()
            .map(|i| {
                i.path()
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default()
            })
            .collect()
    }

    #[test]
    fn lists_allowed_media_largest_first() {
        let dir = uniq_path("basic");
        write_sized(&dir.join("photo.jpg"), 2_000);
        write_sized(&dir.join("clip.mp4"), 5_000);
        write_sized(&dir.join(".hidden.jpg"), 1_000);
        write_sized(&dir.join("note.txt"), 9_000);

        let items = scan(&dir).expect("scan");
        assert_eq!(names(&items), vec!["clip.mp4", "photo.jpg"]);
        assert_eq!(items[0].ext, ".mp4");
        assert_eq!(items[0].size_bytes, 5_000);
        assert_eq!(items[0].size, "4.9KB");
        assert_eq!(items[1].filename, dir.join("photo.jpg").to_string_lossy());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn recurses_and_prunes_hidden_and_underscore_dirs() {
        let dir = uniq_path("nested");
        write_sized(&dir.join("2019/summer/beach.PNG"), 300);
        write_sized(&dir.join("2019/.thumbs/cached.jpg"), 900);
        write_sized(&dir.join("_export/render.mp4"), 800);
        write_sized(&dir.join("2019/_drafts/deep/raw.jpg"), 700);
        write_sized(&dir.join("2019/_skip.jpg"), 600);
        write_sized(&dir.join("top.jpg"), 100);

        let items = scan(&dir).expect("scan");
        assert_eq!(names(&items), vec!["beach.PNG", "top.jpg"]);
        assert_eq!(items[0].ext, ".png");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn equal_sizes_keep_walk_order() {
        let dir = uniq_path("ties");
        write_sized(&dir.join("c.jpg"), 10);
        write_sized(&dir.join("a.jpg"), 10);
        write_sized(&dir.join("b.mp4"), 10);
        write_sized(&dir.join("big.png"), 50);

        let items = scan(&dir).expect("scan");
        assert_eq!(names(&items), vec!["big.png", "a.jpg", "b.mp4", "c.jpg"]);
        assert!(items.windows(2).all(|w| w[0].size_bytes >= w[1].size_bytes));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn hidden_root_is_still_scanned() {
        let dir = uniq_path("root").join(".photos");
        write_sized(&dir.join("a.jpg"), 10);

        let items = scan(&dir).expect("scan");
        assert_eq!(names(&items), vec!["a.jpg"]);

        let _ = fs::remove_dir_all(dir.parent().unwrap_or(&dir));
    }

    #[test]
    fn missing_root_fails_without_partial_result() {
        let dir = uniq_path("missing");
        let err = scan(&dir).expect_err("missing root");
        assert_eq!(err.code(), ScanErrorCode::NotFound);
        assert!(err.to_string().contains("Failed to walk"), "unexpected: {err}");
    }
}
