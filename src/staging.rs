//! Frontend asset staging
//!
//! The static directory is owned by the launcher: it is emptied and refilled
//! from the frontend directory on every run, so nothing from an earlier run
//! survives. Success is judged solely by the marker file landing in place.

use crate::error::LaunchError;
use crate::fs::{FileSystem, FileType};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StageReport {
    pub removed_entries: usize,
    pub files_copied: usize,
    pub source_missing: bool,
}

pub struct AssetStager<'a, F: FileSystem + ?Sized> {
    fs: &'a F,
}

impl<'a, F: FileSystem + ?Sized> AssetStager<'a, F> {
    pub fn new(fs: &'a F) -> Self {
        Self { fs }
    }

    /// Replaces the contents of `dest` with a copy of `source` and checks
    /// that `marker` exists below `dest` afterwards
    pub fn stage(&self, source: &Path, dest: &Path, marker: &str) -> Result<StageReport, LaunchError> {
        let mut report = StageReport::default();

        self.fs
            .create_dir_all(dest)
            .map_err(|source| LaunchError::PrepareFailed {
                path: dest.to_path_buf(),
                source,
            })?;

        report.removed_entries = self.clear(dest)?;
        debug!(
            path = %dest.display(),
            removed = report.removed_entries,
            "Cleared static directory"
        );

        if self.fs.is_dir(source) {
            report.files_copied = self.copy_tree(source, dest)?;
        } else {
            warn!(path = %source.display(), "Frontend directory not found, nothing to copy");
            report.source_missing = true;
        }

        let marker_path = dest.join(marker);
        if !self.fs.is_file(&marker_path) {
            return Err(LaunchError::MarkerMissing { path: marker_path });
        }

        info!(
            source = %source.display(),
            dest = %dest.display(),
            files = report.files_copied,
            "Staged frontend assets"
        );
        Ok(report)
    }

    fn clear(&self, dest: &Path) -> Result<usize, LaunchError> {
        let clear_err = |source| LaunchError::ClearFailed {
            path: dest.to_path_buf(),
            source,
        };

        let entries = self.fs.read_dir(dest).map_err(clear_err)?;
        for entry in &entries {
            let removed = if entry.is_dir() {
                self.fs.remove_dir_all(entry.path())
            } else {
                self.fs.remove_file(entry.path())
            };
            removed.map_err(|source| LaunchError::ClearFailed {
                path: entry.path().to_path_buf(),
                source,
            })?;
        }
        Ok(entries.len())
    }

    fn copy_tree(&self, from: &Path, to: &Path) -> Result<usize, LaunchError> {
        let entries = self
            .fs
            .read_dir(from)
            .map_err(|source| LaunchError::CopyFailed {
                path: from.to_path_buf(),
                source,
            })?;

        let mut copied = 0;
        for entry in entries {
            let target = to.join(entry.file_name());
            match entry.file_type() {
                FileType::Directory => {
                    self.fs
                        .create_dir_all(&target)
                        .map_err(|source| LaunchError::CopyFailed {
                            path: entry.path().to_path_buf(),
                            source,
                        })?;
                    copied += self.copy_tree(entry.path(), &target)?;
                }
                FileType::Symlink if !self.fs.is_file(entry.path()) => {
                    warn!(path = %entry.path().display(), "Skipping symlink that is not a file");
                }
                FileType::File | FileType::Symlink => {
                    self.fs
                        .copy_file(entry.path(), &target)
                        .map_err(|source| LaunchError::CopyFailed {
                            path: entry.path().to_path_buf(),
                            source,
                        })?;
                    copied += 1;
                }
            }
        }
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{MockFileSystem, RealFileSystem};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn stage(fs: &MockFileSystem) -> Result<StageReport, LaunchError> {
        AssetStager::new(fs).stage(Path::new("frontend"), Path::new("static"), "index.html")
    }

    #[test]
    fn test_creates_missing_destination() {
        let fs = MockFileSystem::new();
        fs.add_file("frontend/index.html", "<html>");

        let report = stage(&fs).unwrap();

        assert_eq!(report.files_copied, 1);
        assert_eq!(fs.files_under("static"), vec!["index.html"]);
    }

    #[test]
    fn test_replaces_stale_contents() {
        let fs = MockFileSystem::new();
        fs.add_file("frontend/index.html", "<html>");
        fs.add_file("frontend/app.js", "app");
        fs.add_file("static/old.html", "old");
        fs.add_file("static/assets/old.css", "old");

        let report = stage(&fs).unwrap();

        assert_eq!(report.removed_entries, 2);
        assert_eq!(fs.files_under("static"), vec!["app.js", "index.html"]);
    }

    #[test]
    fn test_copies_nested_directories() {
        let fs = MockFileSystem::new();
        fs.add_file("frontend/index.html", "<html>");
        fs.add_file("frontend/js/lib/vendor.js", "v");
        fs.add_dir("frontend/empty");

        let report = stage(&fs).unwrap();

        assert_eq!(report.files_copied, 2);
        assert!(fs.is_dir(Path::new("static/empty")));
        assert_eq!(
            fs.read_to_string(Path::new("static/js/lib/vendor.js")).unwrap(),
            "v"
        );
    }

    #[test]
    fn test_repeated_runs_match_source() {
        let fs = MockFileSystem::new();
        fs.add_file("frontend/index.html", "<html>");
        fs.add_file("frontend/app.js", "app");

        stage(&fs).unwrap();
        let first = fs.files_under("static");
        stage(&fs).unwrap();

        assert_eq!(first, fs.files_under("static"));
        assert_eq!(fs.files_under("static"), fs.files_under("frontend"));
    }

    #[test]
    fn test_empty_source_fails_marker_check() {
        let fs = MockFileSystem::new();
        fs.add_dir("frontend");
        fs.add_file("static/index.html", "stale");

        let err = stage(&fs).unwrap_err();

        assert!(matches!(err, LaunchError::MarkerMissing { .. }));
        assert!(fs.files_under("static").is_empty());
    }

    #[test]
    fn test_missing_source_fails_marker_check() {
        let fs = MockFileSystem::new();

        let err = stage(&fs).unwrap_err();

        assert!(matches!(err, LaunchError::MarkerMissing { .. }));
        assert!(fs.is_dir(Path::new("static")));
    }

    #[test]
    fn test_copy_failure_is_distinct() {
        let fs = MockFileSystem::new();
        fs.add_file("frontend/index.html", "<html>");
        fs.fail_copy_from("frontend/index.html");

        let err = stage(&fs).unwrap_err();
        assert!(matches!(err, LaunchError::CopyFailed { .. }));
    }

    #[test]
    fn test_clear_failure_is_distinct() {
        let fs = MockFileSystem::new();
        fs.add_file("frontend/index.html", "<html>");
        fs.add_file("static/old.html", "old");
        fs.fail_remove("static/old.html");

        let err = stage(&fs).unwrap_err();

        match err {
            LaunchError::ClearFailed { path, .. } => {
                assert_eq!(path, PathBuf::from("/mock/static/old.html"));
            }
            other => panic!("expected ClearFailed, got {:?}", other),
        }
        assert!(fs.files_under("static").contains(&"old.html".to_string()));
        assert!(!fs.exists(Path::new("static/index.html")));
    }

    #[test]
    fn test_destination_is_a_file() {
        let fs = MockFileSystem::new();
        fs.add_file("frontend/index.html", "<html>");
        fs.add_file("static", "not a dir");

        let err = stage(&fs).unwrap_err();
        assert!(matches!(err, LaunchError::PrepareFailed { .. }));
    }

    #[test]
    fn test_real_filesystem_with_hidden_files() {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("frontend");
        let dest = temp.path().join("static");
        fs::create_dir_all(source.join("css")).unwrap();
        fs::write(source.join("index.html"), "<html>").unwrap();
        fs::write(source.join(".well-known"), "x").unwrap();
        fs::write(source.join("css/site.css"), "body{}").unwrap();
        fs::create_dir_all(dest.join("stale")).unwrap();
        fs::write(dest.join(".old"), "x").unwrap();

        let real = RealFileSystem::new();
        let report = AssetStager::new(&real)
            .stage(&source, &dest, "index.html")
            .unwrap();

        assert_eq!(report.files_copied, 3);
        assert_eq!(report.removed_entries, 2);
        assert!(dest.join(".well-known").is_file());
        assert!(dest.join("css/site.css").is_file());
        assert!(!dest.join("stale").exists());
        assert!(!dest.join(".old").exists());
    }
}
