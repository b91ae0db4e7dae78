//! Root-scoped path resolution.
//!
//! Every user-supplied path is joined onto a canonical root and the result is
//! canonicalised before it is compared against that root. Targets that do not
//! exist yet (upload destinations, new directories) are resolved through their
//! deepest existing ancestor, and the missing tail must be plain names.

use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};

use crate::core::errors::{Error, Result};

/// Splits a requested path into segments. Both `/` and `\` separate segments;
/// empty and `.` segments are dropped.
pub fn split_segments(requested: &str) -> Result<Vec<String>> {
    let normalized = requested.replace('\\', "/");
    let mut segments = Vec::new();

    for segment in normalized.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        // Rejects anything the platform would parse as a prefix or root.
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_) | Component::ParentDir), None) => {
                segments.push(segment.to_string())
            }
            _ => return Err(Error::PathTraversal(requested.to_string())),
        }
    }

    Ok(segments)
}

/// Resolves `requested` beneath `root`, which must already be canonical.
pub fn resolve_within(root: &Path, requested: &str) -> Result<PathBuf> {
    let segments = split_segments(requested)?;
    if segments.is_empty() {
        return Ok(root.to_path_buf());
    }

    let mut joined = root.to_path_buf();
    joined.extend(&segments);

    match fs::canonicalize(&joined) {
        Ok(canonical) => ensure_within(root, canonical, requested),
        Err(err) if is_missing(&err) => resolve_missing(root, &joined, requested),
        Err(err) => Err(err.into()),
    }
}

fn resolve_missing(root: &Path, joined: &Path, requested: &str) -> Result<PathBuf> {
    let mut previous = joined;

    for ancestor in joined.ancestors().skip(1) {
        if !ancestor.starts_with(root) {
            break;
        }
        match fs::canonicalize(ancestor) {
            Ok(base) => {
                let base = ensure_within(root, base, requested)?;

                // `previous` failed to canonicalize; if it still has an entry it is a dangling link.
                if fs::symlink_metadata(previous).is_ok() {
                    return Err(Error::PathTraversal(requested.to_string()));
                }

                let tail = joined
                    .strip_prefix(ancestor)
                    .map_err(|_| Error::PathTraversal(requested.to_string()))?;
                if !tail.components().all(|c| matches!(c, Component::Normal(_))) {
                    return Err(Error::PathTraversal(requested.to_string()));
                }
                return Ok(base.join(tail));
            }
            Err(err) if is_missing(&err) => previous = ancestor,
            Err(err) => return Err(err.into()),
        }
    }

    Err(Error::RootUnavailable(root.to_path_buf()))
}

/// A path that does not exist, including one that runs through a regular file.
pub fn is_missing(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

fn ensure_within(root: &Path, candidate: PathBuf, requested: &str) -> Result<PathBuf> {
    // Component-wise: `/data/xx` does not start with `/data/x`.
    if candidate.starts_with(root) {
        Ok(candidate)
    } else {
        Err(Error::PathTraversal(requested.to_string()))
    }
}

/// `/`-separated form of `path` relative to `root`, or `None` when `path` is
/// outside the root or has a name that cannot be addressed again.
pub fn relative_to_root(root: &Path, path: &Path) -> Option<String> {
    let tail = path.strip_prefix(root).ok()?;
    let parts = tail
        .components()
        .map(|component| match component {
            Component::Normal(name) => name.to_str().filter(|s| !s.contains('\\')),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
