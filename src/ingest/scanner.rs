use std::path::{Component, Path, PathBuf};

use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Thumbnail cache created under every scanned root.
pub const THUMB_DIRNAME: &str = ".vault_thumbs";

/// Folder names never indexed and never turned into tags.
pub const EXCLUDED_DIRS: &[&str] = &[
    THUMB_DIRNAME,
    "thumbs",
    "cache",
    ".git",
    ".DS_Store",
    "__pycache__",
];

pub const ALLOWED_EXTS: &[&str] = &["jpg", "jpeg", "png", "webp"];

pub fn is_excluded_dir(name: &str) -> bool {
    EXCLUDED_DIRS.contains(&name)
}

pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_EXTS.iter().any(|allowed| ext.eq_ignore_ascii_case(allowed)))
        .unwrap_or(false)
}

/// Whether any component of `path` below `root` is in the exclusion set.
pub fn is_excluded_path(path: &Path, root: &Path) -> bool {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative.components().any(|component| match component {
        Component::Normal(name) => name.to_str().map(is_excluded_dir).unwrap_or(false),
        _ => false,
    })
}

/// Every image file under `root`, in walk order. Excluded folders are pruned
/// and unreadable entries are logged and skipped.
pub fn iter_image_files(root: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    WalkDir::new(root)
        .into_iter()
        .filter_entry(move |e| e.depth() == 0 || !is_excluded_entry(e))
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(is_file_or_file_link)
        .map(DirEntry::into_path)
        .filter(move |path| has_image_extension(path) && !is_excluded_path(path, root))
}

/// Directories are never followed, but a link to a regular file counts as one.
fn is_file_or_file_link(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn is_excluded_entry(entry: &DirEntry) -> bool {
    entry.file_name().to_str().map(is_excluded_dir).unwrap_or(false)
}
