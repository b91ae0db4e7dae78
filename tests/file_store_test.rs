use anyhow::Result;
use std::fs;
use std::io::Cursor;
use stockshare::core::errors::Error;
use stockshare::services::fs::PathScopedFileStore;
use tempfile::{tempdir, TempDir};

fn create_store() -> Result<(PathScopedFileStore, TempDir)> {
    let dir = tempdir()?;
    let root = dir.path();

    fs::create_dir_all(root.join("docs").join("archive"))?;
    fs::write(root.join("docs").join("guide.md"), "Getting started guide")?;
    fs::write(root.join("docs").join("archive").join("2023.xlsx"), [0u8; 16])?;
    fs::create_dir_all(root.join("media"))?;
    fs::write(root.join("media").join("Clip.MP4"), [0u8; 32])?;
    fs::write(root.join("README.txt"), "top level")?;

    let store = PathScopedFileStore::new(root, "/share")?;
    Ok((store, dir))
}

#[test]
fn upload_then_download_is_byte_identical() -> Result<()> {
    let (store, _dir) = create_store()?;
    let payload: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();

    let written = store.save_upload("docs/blob.bin", Cursor::new(payload.clone()))?;
    assert_eq!(written, payload.len() as u64);

    let (path, mime) = store.get_file("docs/blob.bin")?;
    assert_eq!(mime, "application/octet-stream");
    assert_eq!(fs::read(path)?, payload);
    Ok(())
}

#[test]
fn every_listed_entry_round_trips() -> Result<()> {
    let (store, _dir) = create_store()?;
    let mut pending = vec![String::new()];
    let mut visited = 0;

    while let Some(dir) = pending.pop() {
        for entry in store.list(&dir)? {
            visited += 1;
            let resolved = store.resolve(&entry.relative_path)?;
            assert!(resolved.starts_with(store.root()));

            if entry.is_directory {
                pending.push(entry.relative_path.clone());
            } else {
                let (path, mime) = store.get_file(&entry.relative_path)?;
                assert_eq!(path, resolved);
                assert_eq!(Some(mime), entry.mime_type);
            }
        }
    }

    assert_eq!(visited, 7);
    Ok(())
}

#[test]
fn traversal_attempts_fail_everywhere() -> Result<()> {
    let (store, dir) = create_store()?;
    let outside = dir
        .path()
        .parent()
        .expect("tempdir should have a parent")
        .to_path_buf();
    let escape = "docs/../../";

    assert!(matches!(store.resolve(escape), Err(Error::PathTraversal(_))));
    assert!(matches!(store.list(escape), Err(Error::PathTraversal(_))));
    assert!(matches!(store.get_file("../x"), Err(Error::PathTraversal(_))));
    assert!(store.create_directory("../escaped-dir").unwrap_err().is_traversal());
    assert!(store
        .save_upload("media/../../escaped.txt", Cursor::new(b"x".to_vec()))
        .unwrap_err()
        .is_traversal());

    assert!(!outside.join("escaped-dir").exists());
    assert!(!outside.join("escaped.txt").exists());
    Ok(())
}

#[test]
fn new_directory_is_immediately_browsable() -> Result<()> {
    let (store, _dir) = create_store()?;

    store.create_directory("/media/2024/")?;
    store.save_upload("media/2024/cover.jpg", Cursor::new(vec![0xFF, 0xD8]))?;

    let entries = store.list("media")?;
    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["2024", "Clip.MP4"]);

    let nested = store.list("media/2024")?;
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].relative_path, "media/2024/cover.jpg");
    assert_eq!(nested[0].mime_type, Some("image/jpeg"));

    let crumbs = store.breadcrumbs("media/2024");
    assert_eq!(crumbs.last().map(|c| c.path.as_str()), Some("media/2024"));
    Ok(())
}

#[test]
fn windows_style_separators_are_accepted() -> Result<()> {
    let (store, _dir) = create_store()?;

    let (path, _) = store.get_file("docs\\archive\\2023.xlsx")?;
    assert!(path.ends_with("2023.xlsx"));
    assert!(matches!(
        store.resolve("docs\\..\\..\\"),
        Err(Error::PathTraversal(_))
    ));
    Ok(())
}
