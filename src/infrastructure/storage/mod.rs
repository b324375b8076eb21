//! File-based destination storage

use async_trait::async_trait;
use std::path::PathBuf;

use crate::application::errors::StorageError;
use crate::domain::entities::Destination;
use crate::domain::traits::DestinationStore;

/// Single-value store: one `local@domain` line in a file.
///
/// Writes go to a temp file in the same directory and are renamed over the
/// target, so readers see either the old or the new value.
pub struct FileDestinationStore {
    path: PathBuf,
}

impl FileDestinationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "destination".to_string());
        self.path
            .with_file_name(format!(".{}.{}.tmp", name, uuid::Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl DestinationStore for FileDestinationStore {
    async fn read(&self) -> Option<Destination> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::error!("Failed to read {}: {}", self.path.display(), e);
                return None;
            }
        };

        if content.trim().is_empty() {
            return None;
        }

        match content.parse() {
            Ok(destination) => Some(destination),
            Err(e) => {
                tracing::warn!("Ignoring invalid destination in {}: {}", self.path.display(), e);
                None
            }
        }
    }

    async fn write(&self, destination: &Destination) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        if let Err(source) = tokio::fs::write(&temp_path, destination.to_string()).await {
            return Err(StorageError::Write { path: temp_path, source });
        }

        if let Err(source) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::Write {
                path: self.path.clone(),
                source,
            });
        }

        Ok(())
    }
}
