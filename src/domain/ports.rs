use crate::domain::model::{CourseHoleMetadata, HoleEntry, RoundTotals};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 遠端球局儲存。以 (round_id, hole) 為自然鍵，upsert 必須可安全重放。
#[async_trait]
pub trait RoundStore: Send + Sync {
    /// Insert-or-update one hole entry. A second call with the same key
    /// overwrites; it never duplicates.
    async fn upsert_hole(&self, round_id: &str, entry: &HoleEntry) -> Result<()>;

    /// All persisted hole entries for a round, used on (re)load.
    async fn query_holes(&self, round_id: &str) -> Result<Vec<HoleEntry>>;

    /// One-shot write of the finished round's totals.
    async fn update_round_totals(&self, round_id: &str, totals: &RoundTotals) -> Result<()>;
}

/// 球場目錄：每洞 par 與距離
#[async_trait]
pub trait CourseCatalog: Send + Sync {
    async fn query_holes(&self, course_id: &str) -> Result<Vec<CourseHoleMetadata>>;
}

/// Small durable key/value store for the resume marker. No transactions.
pub trait MarkerStore: Send + Sync {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Result<Option<String>>> + Send;
    fn set(
        &self,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove(&self, key: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}
