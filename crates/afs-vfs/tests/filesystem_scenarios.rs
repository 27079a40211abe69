//! Integration tests for lookups, writes and labels.
//!
//! Covers version addressing, path shape errors, read-only filesystems and
//! the copy-on-label behaviour.

use afs_core::{FileRef, same_file};
use afs_vfs::{AFile, AFileSystem, Directory, SlotSequence, Version};
use serde_json::json;

fn file(name: &str, data: &str) -> FileRef {
    AFile::new(name, data).into_ref()
}

fn is(found: Option<&FileRef>, expected: &FileRef) -> bool {
    found.is_some_and(|found| same_file(found, expected))
}

/// An empty tree resolves every name to absent, with or without a leading slash
#[tokio::test]
async fn test_missing_file_is_absent() {
    let fs = AFileSystem::new(Directory::new());

    let with_slash = fs.find("/missing").await.unwrap();
    let without_slash = fs.find("missing").await.unwrap();

    assert!(!with_slash.is_found());
    assert!(!without_slash.is_found());
    assert_eq!(with_slash.text().await.unwrap(), None);
    assert!(fs.root().read().await.is_empty());
}

/// Positive, negative and keyword versions address the right slots
#[tokio::test]
async fn test_version_addressing() {
    let v1 = file("a", "one");
    let v2 = file("a", "two");
    let fs = AFileSystem::new(
        Directory::new().with_files("a", SlotSequence::from_files([v1.clone(), v2.clone()])),
    );

    let find = |path: &'static str| {
        let fs = &fs;
        async move { fs.find(path).await.unwrap().into_inner() }
    };

    assert!(is(find("/a@1").await.as_ref(), &v1));
    assert!(is(find("/a@2").await.as_ref(), &v2));
    assert!(is(find("/a@latest").await.as_ref(), &v2));
    assert!(is(find("/a@earliest").await.as_ref(), &v1));
    assert!(is(find("/a@-1").await.as_ref(), &v2));
    assert!(is(find("/a@-2").await.as_ref(), &v1));
    assert!(is(find("/a").await.as_ref(), &v2));
    assert!(find("/a@-3").await.is_none());
    assert!(find("/a@0").await.is_none());
    assert!(find("/a@3").await.is_none());
    assert!(find("/a@nolabel").await.is_none());
}

/// Writes against a read-only filesystem fail and change nothing
#[tokio::test]
async fn test_read_only_rejects_writes() {
    let fs = AFileSystem::builder()
        .root(Directory::new().with_files("a", SlotSequence::file("a", "x")))
        .read_only(true)
        .build()
        .unwrap();

    let err = fs.add("/b", file("b", "y")).await.unwrap_err();
    assert!(err.is_read_only());
    assert!(err.to_string().ends_with("Read only filesystem."));

    assert!(fs.add("/a", file("a", "z")).await.unwrap_err().is_read_only());
    assert!(fs.copy("/a", "/c").await.unwrap_err().is_read_only());
    assert!(fs.label("/a", "tag").await.unwrap_err().is_read_only());

    let root = fs.root().read().await;
    assert_eq!(root.len(), 1);
    assert!(root.get("b").is_none());
    drop(root);
    assert_eq!(fs.find("/a").await.unwrap().text().await.unwrap().as_deref(), Some("x"));
}

/// A label keeps pointing at the labeled file after new versions are added
#[tokio::test]
async fn test_label_survives_new_versions() {
    let fs = AFileSystem::new(Directory::new());

    fs.add("/cow", AFile::new("cow", json!(1)).into_ref()).await.unwrap();
    fs.label("/cow@1", "beef").await.unwrap();
    fs.add("/cow", AFile::new("cow", json!(2)).into_ref()).await.unwrap();

    assert_eq!(fs.find("/cow@beef").await.unwrap().json().await.unwrap(), Some(json!(1)));
    assert_eq!(fs.find("/cow").await.unwrap().json().await.unwrap(), Some(json!(2)));
    assert_eq!(fs.find("/cow@2").await.unwrap().json().await.unwrap(), Some(json!(2)));
}

/// Labeling stores the same reference that was found
#[tokio::test]
async fn test_label_is_same_reference() {
    let original = file("doc", "text");
    let fs = AFileSystem::new(
        Directory::new().with_dir(
            "docs",
            Directory::new().with_files("doc", SlotSequence::from_files([original.clone()])),
        ),
    );

    let labeled = fs.label("/docs/doc@latest", "release").await.unwrap();
    assert!(is(labeled.as_ref(), &original));

    let found = fs.find("/docs/doc@release").await.unwrap().into_inner();
    assert!(is(found.as_ref(), &original));
}

/// Path shape mismatches raise the matching errors
#[tokio::test]
async fn test_directory_file_mismatch() {
    let fs = AFileSystem::builder()
        .name("SUT")
        .root(
            Directory::new()
                .with_dir("dir", Directory::new())
                .with_files("file", SlotSequence::file("file", "x")),
        )
        .build()
        .unwrap();

    let err = fs.find("/dir").await.unwrap_err();
    assert!(err.is_not_file());
    assert_eq!(err.to_string(), r#"SUT.find("/dir") /dir is a directory"#);

    let err = fs.find("/file/inner").await.unwrap_err();
    assert!(err.is_not_directory());

    assert!(fs.metadata("/dir").await.unwrap_err().is_not_file());
    assert!(fs.add("/file/inner", file("inner", "y")).await.unwrap_err().is_not_directory());
}

/// Addressing the root as a file is an error
#[tokio::test]
async fn test_root_access() {
    let fs = AFileSystem::new(Directory::new());

    assert!(fs.find("/").await.unwrap_err().is_root_access());
    assert!(fs.find("").await.unwrap_err().is_root_access());
    assert!(fs.add("/", file("x", "x")).await.unwrap_err().is_root_access());
}

/// Adding creates intermediate directories and appends versions
#[tokio::test]
async fn test_add_creates_directories() {
    let fs = AFileSystem::new(Directory::new());

    fs.add("/a/b/c", file("c", "1")).await.unwrap();
    fs.add("/a/b/c", file("c", "2")).await.unwrap();
    fs.add("/a/b/c@latest", file("c", "3")).await.unwrap();

    let c1 = fs.find("/a/b/c@1").await.unwrap();
    assert_eq!(c1.text().await.unwrap().as_deref(), Some("1"));
    let latest = fs.find("/a/b/c").await.unwrap();
    assert_eq!(latest.text().await.unwrap().as_deref(), Some("3"));
    assert_eq!(latest.name(), Some("c"));
}

/// Adding at an explicit version leaves holes before it
#[tokio::test]
async fn test_add_at_explicit_version() {
    let fs = AFileSystem::new(Directory::new());

    fs.add("/a@3", file("a", "three")).await.unwrap();

    assert!(!fs.find("/a@1").await.unwrap().is_found());
    assert!(!fs.find("/a@2").await.unwrap().is_found());
    assert!(fs.find("/a@3").await.unwrap().is_found());

    let err = fs.add("/a@-9", file("a", "x")).await.unwrap_err();
    assert!(err.is_invalid_version());
}

/// Very large versions are stored without allocating the holes before them
#[tokio::test]
async fn test_add_at_huge_version() {
    let fs = AFileSystem::new(Directory::new());
    let big = file("a", "big");

    fs.add("/a@9223372036854775807", big.clone()).await.unwrap();
    fs.add("/b@4000000000", file("b", "b")).await.unwrap();

    let latest = fs.find("/a").await.unwrap();
    assert!(is(latest.file(), &big));
    assert!(!fs.find("/a@1").await.unwrap().is_found());
    assert!(fs.find("/b@-1").await.unwrap().is_found());
    assert_eq!(fs.update_count(), 2);
}

/// Copy shares the reference between both paths
#[tokio::test]
async fn test_copy_between_directories() {
    let table = AFile::new("table2", json!([[1, 5, 3], [2, 6, 4]])).into_ref();
    let fs = AFileSystem::new(
        Directory::new().with_dir(
            "data",
            Directory::new().with_files("table2", SlotSequence::from_files([table.clone()])),
        ),
    );

    let copied = fs.copy("/data/table2", "/test/table2").await.unwrap();
    assert!(is(copied.as_ref(), &table));

    let found = fs.find("/test/table2").await.unwrap().exists().unwrap();
    assert!(same_file(&found, &table));
}

/// Removing versions, labels and whole sequences
#[tokio::test]
async fn test_remove() {
    let fs = AFileSystem::new(Directory::new());
    fs.add("/a", file("a", "1")).await.unwrap();
    fs.add("/a", file("a", "2")).await.unwrap();
    fs.label("/a@1", "first").await.unwrap();

    fs.remove("/a@2").await.unwrap();
    assert!(!fs.find("/a").await.unwrap().is_found());
    assert!(fs.find("/a@1").await.unwrap().is_found());

    fs.remove("/a@first").await.unwrap();
    assert!(!fs.find("/a@first").await.unwrap().is_found());
    assert!(fs.find("/a@1").await.unwrap().is_found());

    fs.remove("/a@*").await.unwrap();
    assert!(!fs.find("/a@1").await.unwrap().is_found());

    fs.remove("/never/there").await.unwrap();
}

/// Sequence metadata survives deleting every version
#[tokio::test]
async fn test_remove_all_keeps_sequence_metadata() {
    let fs = AFileSystem::new(
        Directory::new().with_files("doc", SlotSequence::file("doc", "text")),
    );

    fs.remove("/doc@*").await.unwrap();
    assert_eq!(fs.metadata("/doc").await.unwrap(), None);

    fs.add("/doc", AFile::new("doc", vec![1_u8, 2]).into_ref()).await.unwrap();
    let meta = fs.metadata("/doc").await.unwrap().unwrap();
    assert_eq!(meta.name.as_deref(), Some("doc"));
    assert_eq!(meta.content_type.as_deref(), Some("text/plain"));
}

/// Sequences built with explicit versions and labels
#[tokio::test]
async fn test_versions_helper() {
    let config = file("config", "v");
    let fs = AFileSystem::new(Directory::new().with_files(
        "config",
        SlotSequence::with_versions(&config, &[Version::Index(2), "prod".into()]).unwrap(),
    ));

    assert!(!fs.find("/config@1").await.unwrap().is_found());
    assert!(is(fs.find("/config@2").await.unwrap().file(), &config));
    assert!(is(fs.find("/config@prod").await.unwrap().file(), &config));
}
