use serde::Serialize;
use time::OffsetDateTime;

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq)]
pub struct FileEntry {
    pub name: String,
    /// Root-relative path, always `/`-separated.
    pub relative_path: String,
    pub is_directory: bool,
    pub size_bytes: u64,
    pub modified_time: OffsetDateTime,
    pub mime_type: Option<&'static str>,
    pub icon_class: IconClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconClass {
    Folder,
    Image,
    Video,
    Audio,
    Pdf,
    Word,
    Excel,
    Generic,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub path: String,
}

impl Breadcrumb {
    pub fn new(label: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            path: path.into(),
        }
    }
}
