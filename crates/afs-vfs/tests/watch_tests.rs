//! Integration tests for change notification.
//!
//! `wait_for` resolves once, `watch` streams distinct values, and every
//! write attempt (failed ones included) wakes subscribers.

use afs_core::{FileRef, same_file};
use afs_vfs::{AFile, AFileSystem, Directory, Outcome};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

fn file(name: &str, data: &str) -> FileRef {
    AFile::new(name, data).into_ref()
}

/// `wait_for` returns at once when the file already exists
#[tokio::test]
async fn test_wait_for_existing() {
    let fs = AFileSystem::new(Directory::new());
    let existing = file("here", "x");
    fs.add("/here", existing.clone()).await.unwrap();

    let found = fs.wait_for("/here").await.unwrap();
    assert!(same_file(&found, &existing));
}

/// `wait_for` resolves after the file is added
#[tokio::test]
async fn test_wait_for_later_add() {
    let fs = Arc::new(AFileSystem::new(Directory::new()));
    let waiter = {
        let fs = Arc::clone(&fs);
        tokio::spawn(async move { fs.wait_for("/notYet").await })
    };

    tokio::task::yield_now().await;
    fs.add("/other", file("other", "o")).await.unwrap();
    let added = file("notYet", "data");
    fs.add("/notYet", added.clone()).await.unwrap();

    let found = tokio::time::timeout(Duration::from_secs(5), waiter)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert!(same_file(&found, &added));
}

/// `watch` yields the current value, then each distinct change
#[tokio::test]
async fn test_watch_yields_distinct_values() {
    let fs = AFileSystem::new(Directory::new());
    let first = file("f", "1");
    fs.add("/f", first.clone()).await.unwrap();

    let mut stream = fs.watch("/f", false);
    let initial = stream.next().await.unwrap().unwrap().unwrap();
    assert!(same_file(&initial, &first));

    // Storing a label does not change what "/f" resolves to.
    fs.label("/f", "tag").await.unwrap();
    let second = file("f", "2");
    fs.add("/f", second.clone()).await.unwrap();

    let next = stream.next().await.unwrap().unwrap().unwrap();
    assert!(same_file(&next, &second));
}

/// Absent values are skipped unless requested
#[tokio::test]
async fn test_watch_absent_handling() {
    let fs = AFileSystem::new(Directory::new());

    let mut with_absent = fs.watch("/w", true);
    assert!(with_absent.next().await.unwrap().unwrap().is_none());

    let mut without_absent = fs.watch("/w", false);
    let pending = tokio::time::timeout(Duration::from_millis(50), without_absent.next()).await;
    assert!(pending.is_err());

    let added = file("w", "x");
    fs.add("/w", added.clone()).await.unwrap();

    let from_with = with_absent.next().await.unwrap().unwrap().unwrap();
    let from_without = without_absent.next().await.unwrap().unwrap().unwrap();
    assert!(same_file(&from_with, &added));
    assert!(same_file(&from_without, &added));

    fs.remove("/w").await.unwrap();
    assert!(with_absent.next().await.unwrap().unwrap().is_none());
}

/// Failed writes still wake subscribers, with an error outcome
#[tokio::test]
async fn test_failed_write_notifies() {
    let fs = AFileSystem::new(Directory::new());
    let mut subscription = fs.subscribe();

    fs.add("/bad@0", file("bad", "x")).await.unwrap_err();

    let notification = subscription.changed().await.unwrap();
    assert_eq!(notification.generation, 1);
    assert!(matches!(
        notification.outcome,
        Outcome::Errored(ref message) if message.contains("Cannot set version 0")
    ));
    assert_eq!(fs.update_count(), 1);
}

/// Independent subscribers each see the same write
#[tokio::test]
async fn test_subscribers_are_independent() {
    let fs = AFileSystem::new(Directory::new());
    let mut first = fs.subscribe();
    let mut second = fs.subscribe();

    fs.add("/x", file("x", "1")).await.unwrap();

    assert_eq!(first.changed().await.unwrap().outcome, Outcome::Updated);
    assert_eq!(second.changed().await.unwrap().outcome, Outcome::Updated);
}
