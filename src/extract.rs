//! Tarball extraction with path rewriting.
//!
//! Hosting providers wrap archive content in one top-level folder named
//! after the revision; that first segment is stripped unconditionally.
//! When a subdir was requested, only entries under it survive, re-rooted
//! to the destination. Entries that would escape the destination are
//! skipped.

use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use tar::Archive;
use tracing::{debug, warn};

use crate::error::{Result, StencilError};

/// Extract a gzip tarball into `dest`, returning the number of entries
/// written.
///
/// `subdir` is the requested sub-directory in leading-slash form (`"/"` or
/// empty for the whole archive).
pub fn extract_tarball(archive_path: &Path, dest: &Path, subdir: &str) -> Result<usize> {
    let extraction_error = |message: String| StencilError::Extraction {
        path: archive_path.to_path_buf(),
        message,
    };

    let file = File::open(archive_path)
        .map_err(|e| extraction_error(format!("cannot open archive: {e}")))?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.set_preserve_permissions(true);
    archive.set_overwrite(true);

    let subdir = subdir.trim_start_matches('/');
    let mut written = 0;

    for entry_result in archive
        .entries()
        .map_err(|e| extraction_error(format!("cannot read archive: {e}")))?
    {
        let mut entry =
            entry_result.map_err(|e| extraction_error(format!("bad archive entry: {e}")))?;
        let entry_path = entry
            .path()
            .map_err(|e| extraction_error(format!("bad entry path: {e}")))?
            .into_owned();

        let Some(rewritten) = rewrite_entry_path(&entry_path, subdir) else {
            debug!("Skipping archive entry {}", entry_path.display());
            continue;
        };

        let target = dest.join(&rewritten);
        if !target.starts_with(dest) {
            warn!(
                "Skipping archive entry escaping destination: {}",
                entry_path.display()
            );
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        entry
            .unpack(&target)
            .map_err(|e| extraction_error(format!("cannot write {}: {e}", target.display())))?;
        written += 1;
    }

    Ok(written)
}

/// Apply the two per-entry rewrites: strip the first path segment, then
/// re-root to `subdir` when one was requested.
///
/// Returns `None` for entries that must not be written: the wrapper folder
/// itself, entries outside the requested subdir, and entries carrying
/// parent/root components.
fn rewrite_entry_path(entry_path: &Path, subdir: &str) -> Option<PathBuf> {
    let mut components = entry_path.components();

    // First segment is the provider's wrapper folder.
    match components.next()? {
        Component::Normal(_) => {}
        _ => return None,
    }

    let mut remaining = PathBuf::new();
    for component in components {
        match component {
            Component::Normal(part) => remaining.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if !subdir.is_empty() {
        remaining = remaining.strip_prefix(subdir).ok()?.to_path_buf();
    }

    if remaining.as_os_str().is_empty() {
        return None;
    }
    Some(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::TempDir;

    fn build_archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let encoder = GzEncoder::new(Vec::new(), Compression::default());
        let mut builder = tar::Builder::new(encoder);

        for (path, contents) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(contents.len() as u64);
            header.set_mode(0o644);
            builder
                .append_data(&mut header, path, contents.as_bytes())
                .unwrap();
        }

        builder.into_inner().unwrap().finish().unwrap()
    }

    fn write_archive(dir: &Path, entries: &[(&str, &str)]) -> PathBuf {
        let path = dir.join("fixture.tar.gz");
        fs::write(&path, build_archive(entries)).unwrap();
        path
    }

    #[test]
    fn strips_wrapper_folder() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(
            temp.path(),
            &[
                ("repo-main/README.md", "readme"),
                ("repo-main/src/lib.rs", "lib"),
            ],
        );
        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();

        let written = extract_tarball(&archive, &dest, "/").unwrap();

        assert_eq!(written, 2);
        assert_eq!(fs::read_to_string(dest.join("README.md")).unwrap(), "readme");
        assert_eq!(fs::read_to_string(dest.join("src/lib.rs")).unwrap(), "lib");
        assert!(!dest.join("repo-main").exists());
    }

    #[test]
    fn subdir_reroots_and_filters() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(
            temp.path(),
            &[
                ("repo-main/README.md", "readme"),
                ("repo-main/packages/app/main.rs", "app"),
                ("repo-main/packages/lib/lib.rs", "lib"),
            ],
        );
        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();

        let written = extract_tarball(&archive, &dest, "/packages/app").unwrap();

        assert_eq!(written, 1);
        assert_eq!(fs::read_to_string(dest.join("main.rs")).unwrap(), "app");
        assert!(!dest.join("README.md").exists());
        assert!(!dest.join("packages").exists());
        assert!(!dest.join("lib.rs").exists());
    }

    #[test]
    fn empty_subdir_means_whole_archive() {
        let temp = TempDir::new().unwrap();
        let archive = write_archive(temp.path(), &[("top/a.txt", "a")]);
        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();

        assert_eq!(extract_tarball(&archive, &dest, "").unwrap(), 1);
        assert!(dest.join("a.txt").exists());
    }

    #[test]
    fn rewrite_strips_first_segment() {
        assert_eq!(
            rewrite_entry_path(Path::new("repo-main/a/b.txt"), ""),
            Some(PathBuf::from("a/b.txt"))
        );
    }

    #[test]
    fn rewrite_drops_wrapper_entry_itself() {
        assert_eq!(rewrite_entry_path(Path::new("repo-main"), ""), None);
        assert_eq!(rewrite_entry_path(Path::new("repo-main/"), ""), None);
    }

    #[test]
    fn rewrite_filters_outside_subdir() {
        assert_eq!(rewrite_entry_path(Path::new("top/README.md"), "docs"), None);
        assert_eq!(
            rewrite_entry_path(Path::new("top/docs/guide.md"), "docs"),
            Some(PathBuf::from("guide.md"))
        );
    }

    #[test]
    fn rewrite_drops_subdir_entry_itself() {
        assert_eq!(rewrite_entry_path(Path::new("top/docs"), "docs"), None);
    }

    #[test]
    fn rewrite_rejects_parent_traversal() {
        assert_eq!(rewrite_entry_path(Path::new("top/../escape.txt"), ""), None);
        assert_eq!(
            rewrite_entry_path(Path::new("top/a/../../escape.txt"), ""),
            None
        );
    }

    #[test]
    fn missing_archive_is_an_extraction_error() {
        let temp = TempDir::new().unwrap();
        let err = extract_tarball(
            &temp.path().join("nope.tar.gz"),
            temp.path(),
            "/",
        )
        .unwrap_err();
        assert!(matches!(err, StencilError::Extraction { .. }));
    }
}
