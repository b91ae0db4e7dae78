use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::core::errors::{Error, Result};
use crate::models::{Breadcrumb, FileEntry};
use crate::services::fs::breadcrumbs::breadcrumbs;
use crate::services::fs::mime::{icon_class, mime_for_path};
use crate::services::fs::resolve::{is_missing, relative_to_root, resolve_within, split_segments};

/// Directory tree accessor scoped to a single root.
///
/// Every operation resolves its relative path through [`resolve`](Self::resolve),
/// so nothing outside the root is ever read or written. Operations block on
/// filesystem I/O and keep no state between calls.
#[derive(Debug, Clone)]
pub struct PathScopedFileStore {
    root: PathBuf,
    base_url: String,
}

impl PathScopedFileStore {
    /// Fails with [`Error::RootUnavailable`] when `root_path` is missing or not a directory.
    pub fn new(root_path: impl AsRef<Path>, base_url: impl Into<String>) -> Result<Self> {
        let requested = root_path.as_ref();
        let root = fs::canonicalize(requested).map_err(|err| {
            warn!(root = %requested.display(), error = %err, "cannot resolve root directory");
            Error::RootUnavailable(requested.to_path_buf())
        })?;
        if !root.is_dir() {
            return Err(Error::RootUnavailable(root));
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(root = %root.display(), base_url = %base_url, "file store initialised");
        Ok(Self { root, base_url })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stats the root. Never errors; a vanished or unreadable root yields `false`.
    pub fn check_accessible(&self) -> bool {
        match fs::metadata(&self.root) {
            Ok(metadata) if metadata.is_dir() => true,
            Ok(_) => {
                warn!(root = %self.root.display(), "root is no longer a directory");
                false
            }
            Err(err) => {
                warn!(root = %self.root.display(), error = %err, "root is not accessible");
                false
            }
        }
    }

    pub fn resolve(&self, relative_path: &str) -> Result<PathBuf> {
        let resolved = resolve_within(&self.root, relative_path);
        match &resolved {
            Ok(path) => debug!(requested = relative_path, resolved = %path.display(), "resolved path"),
            Err(err) => warn!(requested = relative_path, error = %err, "rejected path"),
        }
        resolved
    }

    /// Immediate children of a directory: directories first, then names ignoring case.
    pub fn list(&self, relative_path: &str) -> Result<Vec<FileEntry>> {
        let dir = self.resolve(relative_path)?;
        let metadata = fs::metadata(&dir).map_err(|err| missing_or_io(err, relative_path))?;
        if !metadata.is_dir() {
            return Err(Error::NotADirectory(relative_path.into()));
        }

        let mut entries = Vec::new();
        for item in fs::read_dir(&dir)? {
            let item = match item {
                Ok(item) => item,
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = item.path();
            match self.describe(&path) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => debug!(path = %path.display(), "hiding entry that cannot be addressed"),
                Err(err) => warn!(path = %path.display(), error = %err, "skipping entry"),
            }
        }

        sort_entries(&mut entries);
        debug!(dir = %dir.display(), count = entries.len(), "listed directory");
        Ok(entries)
    }

    // `Ok(None)` hides entries whose target escapes the root or whose name can't round-trip.
    fn describe(&self, path: &Path) -> Result<Option<FileEntry>> {
        let target = fs::canonicalize(path)?;
        if !target.starts_with(&self.root) {
            return Ok(None);
        }
        let Some(relative_path) = relative_to_root(&self.root, path) else {
            return Ok(None);
        };
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return Ok(None);
        };

        let metadata = fs::metadata(&target)?;
        let is_directory = metadata.is_dir();
        let mime_type = if is_directory {
            None
        } else {
            Some(mime_for_path(path))
        };
        let modified_time = metadata
            .modified()
            .map(OffsetDateTime::from)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);

        Ok(Some(FileEntry {
            name: name.to_string(),
            relative_path,
            is_directory,
            size_bytes: if metadata.is_file() { metadata.len() } else { 0 },
            modified_time,
            mime_type,
            icon_class: icon_class(mime_type, is_directory),
        }))
    }

    pub fn breadcrumbs(&self, relative_path: &str) -> Vec<Breadcrumb> {
        breadcrumbs(relative_path)
    }

    /// Absolute path and MIME type of a regular file, ready to be streamed.
    pub fn get_file(&self, relative_path: &str) -> Result<(PathBuf, &'static str)> {
        let path = self.resolve(relative_path)?;
        let metadata = fs::metadata(&path).map_err(|err| missing_or_io(err, relative_path))?;
        if !metadata.is_file() {
            return Err(Error::NotAFile(relative_path.into()));
        }
        let mime = mime_for_path(&path);
        debug!(path = %path.display(), mime, "serving file");
        Ok((path, mime))
    }

    pub fn download_url(&self, relative_path: &str) -> String {
        format!(
            "{}/static/{}",
            self.base_url,
            relative_path.trim_matches('/')
        )
    }

    /// Creates the directory and any missing parents. Succeeds if it already exists.
    pub fn create_directory(&self, relative_path: &str) -> Result<()> {
        let created = self.resolve(relative_path).and_then(|path| {
            fs::create_dir_all(&path)?;
            Ok(path)
        });

        match created {
            Ok(path) => {
                info!(path = %path.display(), "directory created");
                Ok(())
            }
            Err(err) => {
                warn!(requested = relative_path, error = %err, "error creating directory");
                Err(Error::invalid_path(relative_path, err))
            }
        }
    }

    /// Writes `content` to the destination, replacing any existing file.
    /// The parent directory must already exist. Returns the bytes written.
    /// If `content` fails partway the destination is removed.
    pub fn save_upload<R: Read>(&self, relative_path: &str, mut content: R) -> Result<u64> {
        let saved = self.resolve(relative_path).and_then(|path| {
            if path == self.root {
                return Err(Error::NotAFile(relative_path.into()));
            }
            let mut file = File::create(&path)?;
            let copied = io::copy(&mut content, &mut file)
                .and_then(|written| file.flush().map(|()| written));
            match copied {
                Ok(written) => Ok((path, written)),
                Err(err) => {
                    drop(file);
                    // A half-written upload is never left behind.
                    if let Err(cleanup) = fs::remove_file(&path) {
                        warn!(path = %path.display(), error = %cleanup, "could not remove partial upload");
                    }
                    Err(err.into())
                }
            }
        });

        match saved {
            Ok((path, written)) => {
                info!(path = %path.display(), bytes = written, "file uploaded");
                Ok(written)
            }
            Err(err) => {
                warn!(requested = relative_path, error = %err, "error uploading file");
                Err(Error::invalid_path(relative_path, err))
            }
        }
    }

    /// Removes a file, symlink or directory tree. The final component is not followed.
    pub fn delete(&self, relative_path: &str) -> Result<()> {
        let segments = split_segments(relative_path)
            .map_err(|err| Error::invalid_path(relative_path, err))?;
        let Some((name, parent)) = segments.split_last() else {
            return Err(Error::Forbidden("refusing to delete the root directory".to_string()));
        };

        let removed = self.remove_child(&parent.join("/"), name);
        match removed {
            Ok(path) => {
                info!(path = %path.display(), "item deleted");
                Ok(())
            }
            Err(err) => {
                warn!(requested = relative_path, error = %err, "error deleting item");
                Err(Error::invalid_path(relative_path, err))
            }
        }
    }

    fn remove_child(&self, parent: &str, name: &str) -> Result<PathBuf> {
        if name == ".." {
            return Err(Error::PathTraversal(format!("{parent}/{name}")));
        }
        let target = self.resolve(parent)?.join(name);
        let metadata = fs::symlink_metadata(&target)
            .map_err(|err| missing_or_io(err, &format!("{parent}/{name}")))?;
        if metadata.is_dir() {
            fs::remove_dir_all(&target)?;
        } else {
            fs::remove_file(&target)?;
        }
        Ok(target)
    }
}

// Errors name the requested relative path; the physical root stays private.
fn missing_or_io(err: io::Error, relative_path: &str) -> Error {
    if is_missing(&err) {
        Error::NotFound(relative_path.into())
    } else {
        Error::Io(err)
    }
}

fn sort_entries(entries: &mut [FileEntry]) {
    entries.sort_by(|a, b| {
        b.is_directory
            .cmp(&a.is_directory)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
            .then_with(|| a.name.cmp(&b.name))
    });
}
