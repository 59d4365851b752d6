//! Environment/runtime helpers
//!
//! Sanity checks run once at startup, before the listener is bound.

use std::path::Path;

use tracing::warn;

/// Check that the static page directory exists and holds an `index.html`.
///
/// A missing directory is not fatal: the API keeps working and only the
/// form pages 404. Returns whether the directory looked usable.
pub async fn ensure_public_dir(public_dir: &str) -> bool {
    match tokio::fs::metadata(public_dir).await {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            warn!(%public_dir, "public path is not a directory; form pages will 404");
            return false;
        }
        Err(_) => {
            warn!(%public_dir, "public directory not found; form pages will 404");
            return false;
        }
    }
    let index = Path::new(public_dir).join("index.html");
    if tokio::fs::metadata(&index).await.is_err() {
        warn!(index = %index.display(), "index.html missing; fallback route will 404");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_dir_is_reported() {
        assert!(!ensure_public_dir("/definitely/not/here").await);
    }

    #[tokio::test]
    async fn dir_with_index_is_usable() -> anyhow::Result<()> {
        let dir = std::env::temp_dir().join(format!("survey-public-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await?;
        tokio::fs::write(dir.join("index.html"), "<html></html>").await?;
        let ok = ensure_public_dir(dir.to_str().unwrap_or_default()).await;
        tokio::fs::remove_dir_all(&dir).await?;
        assert!(ok);
        Ok(())
    }
}
