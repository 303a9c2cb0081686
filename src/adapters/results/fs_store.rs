//! Filesystem results bundle.
//!
//! Each run gets a directory named after its local start time
//! (`YYYY-MM-DD HH:MM:SS`) holding `methods_outcomes.json`, `results.json`,
//! `logs.txt` and `parameters.json`, assembled in a hidden staging directory
//! and renamed into place once complete. A `latest` symlink points at the newest run.

use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::domain::results::RunResults;
use crate::ports::{ResultsStore, StorageError};

pub const RUN_DIR_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const LATEST_LINK: &str = "latest";

/// Results store writing one directory per run under a base directory.
#[derive(Debug, Clone)]
pub struct FsResultsStore {
    base_path: PathBuf,
}

impl FsResultsStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Directory a run's bundle is written to.
    pub fn run_dir(&self, results: &RunResults) -> PathBuf {
        let name = results
            .started_at
            .with_timezone(&Local)
            .format(RUN_DIR_FORMAT)
            .to_string();
        self.base_path.join(name)
    }

    fn write(&self, path: PathBuf, contents: &str) -> Result<(), StorageError> {
        fs::write(&path, contents).map_err(|source| StorageError::Io { path, source })
    }

    fn write_json<T: Serialize + ?Sized>(
        &self,
        path: PathBuf,
        value: &T,
        pretty: bool,
    ) -> Result<(), StorageError> {
        let json = if pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        self.write(path, &json)
    }

    /// Hidden sibling a bundle is assembled in before it is renamed into place.
    fn staging_dir(&self, dir: &Path) -> PathBuf {
        let name = dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.base_path.join(format!(".{name}.partial"))
    }

    fn write_bundle(&self, dir: &Path, results: &RunResults, logs: &str) -> Result<(), StorageError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        self.write_json(dir.join("methods_outcomes.json"), &results.selections(), false)?;
        self.write_json(dir.join("results.json"), &results.report(), true)?;
        self.write(dir.join("logs.txt"), logs)?;
        self.write_json(dir.join("parameters.json"), &results.parameters, true)
    }

    /// Points `latest` at `target`, replacing an older link.
    fn update_latest(&self, target: &Path) -> Result<(), StorageError> {
        let link = self.base_path.join(LATEST_LINK);
        match fs::symlink_metadata(&link) {
            Ok(meta) if meta.file_type().is_symlink() => {
                fs::remove_file(&link).map_err(|source| StorageError::Io {
                    path: link.clone(),
                    source,
                })?;
            }
            Ok(_) => return Err(StorageError::LatestNotSymlink(link)),
            Err(_) => {}
        }

        let target = fs::canonicalize(target).map_err(|source| StorageError::Io {
            path: target.to_path_buf(),
            source,
        })?;
        symlink_dir(&target, &link).map_err(|source| StorageError::Io { path: link, source })
    }
}

impl ResultsStore for FsResultsStore {
    fn save(&self, results: &RunResults, logs: &str) -> Result<PathBuf, StorageError> {
        let dir = self.run_dir(results);
        if dir.exists() {
            return Err(StorageError::AlreadyExists(dir));
        }

        let staging = self.staging_dir(&dir);
        let staged = self
            .write_bundle(&staging, results, logs)
            .and_then(|()| {
                fs::rename(&staging, &dir).map_err(|source| StorageError::Io {
                    path: dir.clone(),
                    source,
                })
            });
        if let Err(err) = staged {
            // Cleanup is best effort; the write error is what gets reported.
            let _ = fs::remove_dir_all(&staging);
            return Err(err);
        }
        self.update_latest(&dir)?;

        info!(path = %dir.display(), run_id = %results.run_id, "results saved");
        Ok(dir)
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}
