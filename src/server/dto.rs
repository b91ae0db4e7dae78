use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;

use crate::models::{Breadcrumb, FileEntry, IconClass};
use crate::services::fs::PathScopedFileStore;

#[derive(Debug, Serialize, Clone)]
pub struct FileEntryDto {
    pub name: String,
    pub path: String,
    pub is_dir: bool,
    pub size: u64,
    pub modified: Option<String>,
    pub mime_type: Option<&'static str>,
    pub icon: IconClass,
    pub download_url: Option<String>,
}

impl FileEntryDto {
    pub fn from_entry(entry: &FileEntry, store: &PathScopedFileStore) -> Self {
        Self {
            name: entry.name.clone(),
            path: entry.relative_path.clone(),
            is_dir: entry.is_directory,
            size: entry.size_bytes,
            modified: entry.modified_time.format(&Rfc3339).ok(),
            mime_type: entry.mime_type,
            icon: entry.icon_class,
            download_url: (!entry.is_directory).then(|| store.download_url(&entry.relative_path)),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub path: String,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub entries: Vec<FileEntryDto>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct MkdirRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub path: String,
    pub bytes: u64,
    pub download_url: String,
}
