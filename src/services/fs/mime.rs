use std::path::Path;

use crate::models::IconClass;

pub const OCTET_STREAM: &str = "application/octet-stream";

const WORD_TYPES: &[&str] = &[
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

const EXCEL_TYPES: &[&str] = &[
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
];

/// Guesses a MIME type from the file extension, ignoring case.
pub fn mime_for_path(path: &Path) -> &'static str {
    mime_guess::from_path(path).first_raw().unwrap_or(OCTET_STREAM)
}

pub fn icon_class(mime_type: Option<&str>, is_directory: bool) -> IconClass {
    if is_directory {
        return IconClass::Folder;
    }
    let Some(mime) = mime_type else {
        return IconClass::Generic;
    };

    if mime.starts_with("image/") {
        IconClass::Image
    } else if mime.starts_with("video/") {
        IconClass::Video
    } else if mime.starts_with("audio/") {
        IconClass::Audio
    } else if mime == "application/pdf" {
        IconClass::Pdf
    } else if WORD_TYPES.contains(&mime) {
        IconClass::Word
    } else if EXCEL_TYPES.contains(&mime) {
        IconClass::Excel
    } else {
        IconClass::Generic
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_ignore_case() {
        assert_eq!(mime_for_path(Path::new("report.PDF")), "application/pdf");
        assert_eq!(mime_for_path(Path::new("a/b/photo.JpG")), "image/jpeg");
    }

    #[test]
    fn unknown_or_missing_extension_is_octet_stream() {
        assert_eq!(mime_for_path(Path::new("archive.weird")), OCTET_STREAM);
        assert_eq!(mime_for_path(Path::new("Makefile")), OCTET_STREAM);
        assert_eq!(mime_for_path(Path::new(".bashrc")), OCTET_STREAM);
    }

    #[test]
    fn less_common_media_types_are_recognized() {
        assert_eq!(mime_for_path(Path::new("clip.mpg")), "video/mpeg");
        assert_eq!(
            icon_class(Some(mime_for_path(Path::new("clip.MPG"))), false),
            IconClass::Video
        );
        assert_eq!(
            icon_class(Some(mime_for_path(Path::new("movie.mkv"))), false),
            IconClass::Video
        );
        assert_eq!(
            icon_class(Some(mime_for_path(Path::new("album/track.flac"))), false),
            IconClass::Audio
        );
        assert_eq!(mime_for_path(Path::new("book.epub")), "application/epub+zip");
    }

    #[test]
    fn icon_classes_follow_mime_families() {
        assert_eq!(icon_class(None, true), IconClass::Folder);
        assert_eq!(icon_class(Some("image/png"), false), IconClass::Image);
        assert_eq!(icon_class(Some("video/mp4"), false), IconClass::Video);
        assert_eq!(icon_class(Some("audio/mpeg"), false), IconClass::Audio);
        assert_eq!(icon_class(Some("application/pdf"), false), IconClass::Pdf);
        assert_eq!(
            icon_class(Some(mime_for_path(Path::new("cv.docx"))), false),
            IconClass::Word
        );
        assert_eq!(
            icon_class(Some(mime_for_path(Path::new("q3.xls"))), false),
            IconClass::Excel
        );
        assert_eq!(icon_class(Some(OCTET_STREAM), false), IconClass::Generic);
        assert_eq!(
            icon_class(Some(mime_for_path(Path::new("report.pdf"))), false),
            IconClass::Pdf
        );
        assert_eq!(icon_class(None, false), IconClass::Generic);
    }
}
