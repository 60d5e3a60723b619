//! Append-only JSON Lines fallback for when the document store is
//! unavailable

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Serialized writer appending one JSON document per line.
///
/// Appends are guarded by a mutex; concurrent writers to the same file would
/// otherwise interleave partial lines.
#[derive(Debug)]
pub struct LocalFallback {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalFallback {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one payload as a single line, creating parent directories as
    /// needed
    pub async fn append(&self, payload: &serde_json::Value) -> io::Result<()> {
        let line = payload.to_string();

        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_append_writes_one_line_per_payload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("results.jsonl");
        let fallback = LocalFallback::new(path.clone());

        fallback.append(&json!({"ticket": "first"})).await.expect("append");
        fallback.append(&json!({"ticket": "second"})).await.expect("append");

        let contents = std::fs::read_to_string(&path).expect("read");
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json line");
        assert_eq!(first["ticket"], json!("first"));
    }

    #[tokio::test]
    async fn test_append_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("deep").join("results.jsonl");
        let fallback = LocalFallback::new(path.clone());

        fallback.append(&json!({"ticket": "x"})).await.expect("append");

        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_appends_do_not_interleave() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("results.jsonl");
        let fallback = std::sync::Arc::new(LocalFallback::new(path.clone()));

        let long_a = "a".repeat(4096);
        let long_b = "b".repeat(4096);
        let payload_a = json!({ "ticket": long_a });
        let payload_b = json!({ "ticket": long_b });
        let (ra, rb) = tokio::join!(fallback.append(&payload_a), fallback.append(&payload_b));
        ra.expect("append a");
        rb.expect("append b");

        let contents = std::fs::read_to_string(&path).expect("read");
        for line in contents.lines() {
            serde_json::from_str::<serde_json::Value>(line).expect("each line is intact json");
        }
    }
}
