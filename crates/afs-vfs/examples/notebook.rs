//! A notebook-style session against an attachment filesystem.
//!
//! Builds a small tree, copies and labels files, waits for a file that a
//! background task adds later, and follows a file as new versions arrive.
//!
//! ```bash
//! RUST_LOG=afs_vfs=debug cargo run --example notebook
//! ```

use afs_vfs::{AFile, AFileSystem, Directory, SlotSequence};
use anyhow::Result;
use futures::StreamExt;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,afs_vfs=debug")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .init();

    let root = Directory::new()
        .with_dir(
            "data",
            Directory::new()
                .with_files("table1", SlotSequence::file("table1", json!({"rows": 1})))
                .with_files("table2", SlotSequence::file("table2", json!([[1, 5, 3], [2, 6, 4]]))),
        )
        .with_dir(
            "generated",
            Directory::new().with_file_fn(|request| async move {
                let body = format!("generated on demand for {}", request.path);
                Ok(Some(SlotSequence::file(&request.name, body)))
            }),
        );
    let fs = Arc::new(AFileSystem::builder().name("NOTEBOOK").root(root).build()?);

    // Make table2 appear in /test as well, then pin version 1 of table1.
    fs.copy("/data/table2", "/test/table2").await?;
    fs.add("/data/table1", AFile::new("table1", json!({"rows": 2})).into_ref())
        .await?;
    fs.label("/data/table1@1", "release").await?;

    println!("table1        = {}", fs.find("/data/table1").await?.exists()?.json().await?);
    println!("table1@release = {}", fs.find("/data/table1@release").await?.exists()?.json().await?);
    println!("noFile        = {:?}", fs.find("/noFile").await?.json().await?);
    println!("virtual       = {:?}", fs.find("/generated/summary").await?.text().await?);

    if let Err(e) = fs.find("/noFile").await?.exists() {
        println!("exists()      = {e}");
    }
    if let Some(metadata) = fs.metadata("/test/table2").await? {
        println!("metadata      = {}", serde_json::to_string(&metadata)?);
    }

    let writer = {
        let fs = Arc::clone(&fs);
        tokio::spawn(async move {
            for i in 0..3 {
                tokio::time::sleep(Duration::from_millis(100)).await;
                fs.add("/updatedFile", AFile::new("updatedFile", json!({"data": i})).into_ref())
                    .await?;
            }
            fs.add("/notYet", AFile::new("notYet", json!({"some": "data"})).into_ref())
                .await?;
            anyhow::Ok(())
        })
    };

    let mut updates = fs.watch("/updatedFile", false).take(3);
    while let Some(update) = updates.next().await {
        if let Some(file) = update? {
            println!("updatedFile   = {}", file.json().await?);
        }
    }

    let not_yet = fs.wait_for("/notYet").await?;
    println!("notYet        = {}", not_yet.json().await?);

    writer.await??;
    println!("updates       = {}", fs.update_count());
    Ok(())
}
