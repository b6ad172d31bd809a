//! Async filesystem helpers.

use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use tracing::warn;

/// Recursively copy the contents of `src` into `dest`, creating directories
/// as needed.
pub async fn copy_dir_recursive(src: &Path, dest: &Path) -> io::Result<()> {
    fn copy(src: PathBuf, dest: PathBuf) -> Pin<Box<dyn Future<Output = io::Result<()>> + Send>> {
        Box::pin(async move {
            tokio::fs::create_dir_all(&dest).await?;
            let mut entries = tokio::fs::read_dir(&src).await?;
            while let Some(entry) = entries.next_entry().await? {
                let src_path = entry.path();
                let dest_path = dest.join(entry.file_name());
                if entry.file_type().await?.is_dir() {
                    copy(src_path, dest_path).await?;
                } else {
                    tokio::fs::copy(&src_path, &dest_path).await?;
                }
            }
            Ok(())
        })
    }
    copy(src.to_path_buf(), dest.to_path_buf()).await
}

/// Remove a directory tree. Failures other than "not found" are logged and
/// swallowed; cleanup never decides the outcome of a request.
pub async fn remove_dir_best_effort(path: &Path) {
    if let Err(e) = tokio::fs::remove_dir_all(path).await {
        if e.kind() != io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "Failed to remove directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn copies_nested_tree() {
        let src = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();

        tokio::fs::create_dir_all(src.path().join("a/b")).await.unwrap();
        tokio::fs::write(src.path().join("root.txt"), "root").await.unwrap();
        tokio::fs::write(src.path().join("a/b/leaf.txt"), "leaf").await.unwrap();

        copy_dir_recursive(src.path(), &dest.path().join("out"))
            .await
            .unwrap();

        let root = tokio::fs::read_to_string(dest.path().join("out/root.txt"))
            .await
            .unwrap();
        let leaf = tokio::fs::read_to_string(dest.path().join("out/a/b/leaf.txt"))
            .await
            .unwrap();
        assert_eq!(root, "root");
        assert_eq!(leaf, "leaf");
    }

    #[tokio::test]
    async fn remove_missing_dir_is_silent() {
        remove_dir_best_effort(Path::new("/nonexistent/appio-test-dir")).await;
    }
}
