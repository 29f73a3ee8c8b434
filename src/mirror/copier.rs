// file: src/mirror/copier.rs
// description: Recursive tree copying with exclusions and permission preservation
// reference: https://docs.rs/walkdir

use crate::error::{MirrorError, Result};
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

/// Reproduces a source tree under a target path. The mirror is additive:
/// files are overwritten in place, but entries removed upstream are never
/// deleted from the target.
pub struct TreeMirror {
    excluded: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MirrorStats {
    pub files: usize,
    pub dirs: usize,
}

/// Exclusion rule for walk entries. Only directories are excluded; a file
/// that happens to share a metadata name (a gitlink, for instance) is copied
/// like any other file.
fn is_excluded(name: &str, is_dir: bool, excluded: &[String]) -> bool {
    is_dir && excluded.iter().any(|e| e == name)
}

impl TreeMirror {
    pub fn new() -> Self {
        Self {
            excluded: vec![".git".to_string()],
        }
    }

    pub fn with_excluded(excluded: Vec<String>) -> Self {
        Self { excluded }
    }

    /// Copies `source` (a file or directory) under `target`, creating the
    /// target directory if needed. Contents and permission bits follow the
    /// source; relative positions are preserved exactly. The walk aborts on
    /// the first I/O failure, leaving a partial mirror for the next cycle to
    /// overwrite.
    pub fn copy(&self, source: &Path, target: &Path) -> Result<MirrorStats> {
        if !source.exists() {
            return Err(MirrorError::SourceMissing(source.to_path_buf()));
        }

        fs::create_dir_all(target).map_err(|e| MirrorError::FileOperation {
            path: target.to_path_buf(),
            source: e,
        })?;

        let metadata = fs::metadata(source).map_err(|e| MirrorError::FileOperation {
            path: source.to_path_buf(),
            source: e,
        })?;

        let stats = if metadata.is_dir() {
            self.copy_tree(source, target)?
        } else {
            self.copy_single_file(source, target)?
        };

        info!(
            "Mirrored {} files and {} directories to {}",
            stats.files,
            stats.dirs,
            target.display()
        );

        Ok(stats)
    }

    fn copy_single_file(&self, source: &Path, target: &Path) -> Result<MirrorStats> {
        let name = source.file_name().ok_or_else(|| MirrorError::FileOperation {
            path: source.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "source has no base name"),
        })?;

        let dest = target.join(name);
        copy_file(source, &dest)?;

        Ok(MirrorStats { files: 1, dirs: 0 })
    }

    fn copy_tree(&self, source: &Path, target: &Path) -> Result<MirrorStats> {
        let mut stats = MirrorStats::default();

        let walker = WalkDir::new(source).follow_links(false).into_iter();

        for entry in walker.filter_entry(|e| {
            !is_excluded(
                &e.file_name().to_string_lossy(),
                e.file_type().is_dir(),
                &self.excluded,
            )
        }) {
            let entry = entry.map_err(|e| {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| source.to_path_buf());
                MirrorError::FileOperation {
                    path,
                    source: e.into(),
                }
            })?;

            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(|_| MirrorError::FileOperation {
                    path: entry.path().to_path_buf(),
                    source: io::Error::new(io::ErrorKind::InvalidInput, "path outside source root"),
                })?;

            if relative.as_os_str().is_empty() {
                continue;
            }

            let dest = target.join(relative);

            if entry.file_type().is_dir() {
                fs::create_dir_all(&dest).map_err(|e| MirrorError::FileOperation {
                    path: dest.clone(),
                    source: e,
                })?;
                copy_permissions(entry.path(), &dest)?;
                stats.dirs += 1;
            } else {
                debug!("Copying {}", relative.display());
                copy_file(entry.path(), &dest)?;
                stats.files += 1;
            }
        }

        Ok(stats)
    }
}

impl Default for TreeMirror {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte-for-byte copy; `fs::copy` carries the source permission bits over to
/// the destination.
fn copy_file(source: &Path, dest: &Path) -> Result<()> {
    fs::copy(source, dest).map_err(|e| MirrorError::FileOperation {
        path: dest.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn copy_permissions(source: &Path, dest: &Path) -> Result<()> {
    let permissions = fs::metadata(source)
        .map_err(|e| MirrorError::FileOperation {
            path: source.to_path_buf(),
            source: e,
        })?
        .permissions();

    fs::set_permissions(dest, permissions).map_err(|e| MirrorError::FileOperation {
        path: dest.to_path_buf(),
        source: e,
    })
}
