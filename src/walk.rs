use std::path::{Path, PathBuf};

/// Recursively collects regular files under `root` in the order the
/// directory listing reports them.
///
/// Directories that can't be listed are skipped along with their subtree.
/// Symbolic links are never descended into, but a link that resolves to a
/// regular file is returned like one.
#[must_use]
pub fn collect_files(root: &Path) -> Vec<PathBuf> {
    let mut files = vec![];
    for entry in walkdir::WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(v) => v,
            Err(e) => {
                log::debug!("{e}");
                continue;
            }
        };
        let t = entry.file_type();
        if t.is_file() || (t.is_symlink() && entry.path().is_file()) {
            files.push(entry.into_path());
        }
    }
    files
}

/// Collects files under each root in turn.
#[must_use]
pub fn collect_roots<P: AsRef<Path>>(roots: &[P]) -> Vec<PathBuf> {
    let mut files = vec![];
    for root in roots {
        let root = root.as_ref();
        let v = collect_files(root);
        log::debug!("{}: {} files", root.display(), v.len());
        files.extend(v);
    }
    files
}
