use async_trait::async_trait;
use chrono::NaiveDate;

use crate::types::Digest;
use crate::Result;

/// Produces a fresh digest for a date. Implementations do not cache.
#[async_trait]
pub trait DigestBuilder: Send + Sync {
    async fn build(&self, date: NaiveDate) -> Result<Digest>;
}
