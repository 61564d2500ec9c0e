use async_trait::async_trait;

use crate::domain::RawRecord;
use crate::error::Result;

/// Full-snapshot record source. Implementations drop rows that lack
/// identity or coordinates before returning.
#[async_trait]
pub trait SnapshotSourcePort: Send + Sync {
    /// Short label for logs.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<Vec<RawRecord>>;
}
