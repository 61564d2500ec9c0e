use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use crate::app::ports::SnapshotSourcePort;
use crate::domain::RawRecord;
use crate::error::Result;

use super::decode_snapshot;

/// Reads a snapshot exported to a local JSON file.
pub struct FileSnapshotSource {
    path: PathBuf,
}

impl FileSnapshotSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotSourcePort for FileSnapshotSource {
    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }

    async fn fetch(&self) -> Result<Vec<RawRecord>> {
        let bytes = tokio::fs::read(&self.path).await?;
        debug!("Read {} bytes from {}", bytes.len(), self.path.display());
        decode_snapshot(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FacetError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_fetch_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"venue_venue_id": 5, "venue_name_original": "Barasti", "venue_lat": 25.09, "venue_lng": 55.14}}]"#
        )
        .unwrap();

        let source = FileSnapshotSource::new(file.path());
        let records = source.fetch().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Barasti");
        assert!(source.describe().starts_with("file:"));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSnapshotSource::new(dir.path().join("missing.json"));
        assert!(matches!(source.fetch().await, Err(FacetError::Io(_))));
    }
}
