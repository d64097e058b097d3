use super::template::Artifact;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Destination for generated artifacts.
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Where [`ArtifactSink::write`] puts the artifact.
    fn destination(&self, artifact: &Artifact) -> PathBuf {
        artifact.path.clone()
    }

    /// Write the artifact, replacing any previous version. Returns where it
    /// was written.
    async fn write(&self, artifact: &Artifact) -> std::io::Result<PathBuf>;
}

/// Writes artifacts below a root directory, creating parents as needed.
pub struct FsArtifactSink {
    root: PathBuf,
}

impl FsArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactSink for FsArtifactSink {
    fn destination(&self, artifact: &Artifact) -> PathBuf {
        self.root.join(&artifact.path)
    }

    async fn write(&self, artifact: &Artifact) -> std::io::Result<PathBuf> {
        let path = self.destination(artifact);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, artifact.content.as_bytes()).await?;
        debug!("Wrote artifact {:?} ({} bytes)", path, artifact.content.len());
        Ok(path)
    }
}

/// Keeps artifacts in memory, keyed by relative path.
#[derive(Default)]
pub struct MemoryArtifactSink {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl MemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ArtifactSink for MemoryArtifactSink {
    async fn write(&self, artifact: &Artifact) -> std::io::Result<PathBuf> {
        self.files
            .lock()
            .unwrap()
            .insert(artifact.path.clone(), artifact.content.clone());
        Ok(artifact.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::generate;
    use crate::entity_store::EntityKind;

    #[tokio::test]
    async fn test_fs_sink_creates_directories_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsArtifactSink::new(dir.path());
        let artifact = generate(EntityKind::CuratedPlaylist).unwrap();

        let target = dir.path().join("api/made-for-you/query.sql");
        std::fs::create_dir_all(target.parent().unwrap()).unwrap();
        std::fs::write(&target, "stale").unwrap();

        let written = sink.write(&artifact).await.unwrap();
        assert_eq!(written, target);
        assert_eq!(std::fs::read_to_string(&target).unwrap(), artifact.content);
    }

    #[tokio::test]
    async fn test_fs_sink_reports_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A file where the root directory should be.
        let root = dir.path().join("blocked");
        std::fs::write(&root, "").unwrap();

        let sink = FsArtifactSink::new(&root);
        let artifact = generate(EntityKind::CuratedAlbum).unwrap();
        assert!(sink.write(&artifact).await.is_err());
        assert_eq!(
            sink.destination(&artifact),
            root.join("api/popular-albums/query.sql")
        );
    }

    #[tokio::test]
    async fn test_memory_sink_keeps_latest_content() {
        let sink = MemoryArtifactSink::new();
        let mut artifact = generate(EntityKind::PlayHistory).unwrap();
        sink.write(&artifact).await.unwrap();
        artifact.content = "replaced".to_string();
        sink.write(&artifact).await.unwrap();

        assert_eq!(sink.len(), 1);
        assert_eq!(
            sink.get("api/recently-played/query.sql").as_deref(),
            Some("replaced")
        );
    }
}
