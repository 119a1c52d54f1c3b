//! Share connector over an already-mounted directory
//!
//! The share is expected to be mounted (for example with `mount.cifs`) by
//! the host before ShareSync connects. Connecting only verifies that the
//! mount point is a directory; nothing is mounted or unmounted here.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sharesync_core::{
    domain::EndpointConfig,
    ports::{IEndpointConnector, RemoteEntry},
};
use tracing::{debug, instrument};

use crate::error::AdapterError;

/// Mount point used when the config does not name one
pub const DEFAULT_MOUNT_POINT: &str = "/mnt/smb";

/// Resolves the `mount_point` parameter of a share config
pub fn mount_point(config: &EndpointConfig) -> PathBuf {
    PathBuf::from(config.get_str("mount_point").unwrap_or(DEFAULT_MOUNT_POINT))
}

#[derive(Debug, Clone, Default)]
pub struct MountedShareConnector;

impl MountedShareConnector {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IEndpointConnector for MountedShareConnector {
    fn validate(&self, config: &EndpointConfig) -> anyhow::Result<()> {
        if config.get_str("server").is_none() && config.get_str("mount_point").is_none() {
            return Err(AdapterError::MissingField("server").into());
        }
        Ok(())
    }

    #[instrument(skip_all)]
    async fn connect(&self, config: &EndpointConfig) -> anyhow::Result<()> {
        let path = mount_point(config);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => {
                debug!(mount_point = %path.display(), "Share mount point present");
                Ok(())
            }
            _ => Err(AdapterError::NotADirectory(path).into()),
        }
    }

    async fn disconnect(&self, config: &EndpointConfig) -> anyhow::Result<()> {
        debug!(mount_point = %mount_point(config).display(), "Share released");
        Ok(())
    }

    #[instrument(skip_all)]
    async fn list_entries(&self, config: &EndpointConfig) -> anyhow::Result<Vec<RemoteEntry>> {
        let path = mount_point(config);
        let mut dir = tokio::fs::read_dir(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir.next_entry().await? {
            let meta = entry.metadata().await?;
            let is_directory = meta.is_dir();
            entries.push(RemoteEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_directory,
                size: if is_directory { 0 } else { meta.len() },
                modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn config_for(dir: &TempDir) -> EndpointConfig {
        EndpointConfig::new()
            .with("server", "10.0.0.5/share")
            .with("mount_point", dir.path().to_string_lossy().into_owned())
    }

    #[test]
    fn test_mount_point_default() {
        let config = EndpointConfig::new().with("server", "10.0.0.5/share");
        assert_eq!(mount_point(&config), PathBuf::from("/mnt/smb"));
    }

    #[test]
    fn test_validate_requires_server_or_mount_point() {
        let connector = MountedShareConnector::new();
        assert!(connector.validate(&EndpointConfig::new().with("share", "x")).is_err());
        assert!(connector
            .validate(&EndpointConfig::new().with("mount_point", "/srv/share"))
            .is_ok());
    }

    #[tokio::test]
    async fn test_connect_checks_directory() {
        let dir = TempDir::new().unwrap();
        let connector = MountedShareConnector::new();
        connector.connect(&config_for(&dir)).await.unwrap();

        let missing = EndpointConfig::new()
            .with("mount_point", dir.path().join("absent").to_string_lossy().into_owned());
        let err = connector.connect(&missing).await.unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }

    #[tokio::test]
    async fn test_list_entries_reads_directory() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"12345").unwrap();
        std::fs::create_dir(dir.path().join("archive")).unwrap();

        let entries = MountedShareConnector::new()
            .list_entries(&config_for(&dir))
            .await
            .unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "archive");
        assert!(entries[0].is_directory);
        assert_eq!(entries[0].size, 0);
        assert_eq!(entries[1].name, "report.pdf");
        assert_eq!(entries[1].size, 5);
        assert!(entries[1].modified_at.is_some());
    }
}
