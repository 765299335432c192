use crate::domain::model::{CourseHoleMetadata, HoleEntry, RoundTotals};
use crate::domain::ports::{CourseCatalog, RoundStore};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Client;

/// 遠端球局儲存的 HTTP 實作。
///
/// Upserts are PUTs on the natural key (round id, hole number), so the remote
/// table overwrites instead of duplicating and a retried request is safe to
/// repeat.
pub struct HttpRoundStore {
    client: Client,
    base_url: String,
}

impl HttpRoundStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RoundStore for HttpRoundStore {
    async fn upsert_hole(&self, round_id: &str, entry: &HoleEntry) -> Result<()> {
        let url = format!("{}/rounds/{}/holes/{}", self.base_url, round_id, entry.hole);
        tracing::debug!("PUT {}", url);
        self.client
            .put(&url)
            .json(entry)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    async fn query_holes(&self, round_id: &str) -> Result<Vec<HoleEntry>> {
        let url = format!("{}/rounds/{}/holes", self.base_url, round_id);
        tracing::debug!("GET {}", url);
        let entries = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<HoleEntry>>()
            .await?;
        Ok(entries)
    }

    async fn update_round_totals(&self, round_id: &str, totals: &RoundTotals) -> Result<()> {
        let url = format!("{}/rounds/{}/totals", self.base_url, round_id);
        tracing::debug!("PUT {}", url);
        self.client
            .put(&url)
            .json(totals)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// 球場目錄的 HTTP 實作
pub struct HttpCourseCatalog {
    client: Client,
    base_url: String,
}

impl HttpCourseCatalog {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CourseCatalog for HttpCourseCatalog {
    async fn query_holes(&self, course_id: &str) -> Result<Vec<CourseHoleMetadata>> {
        let url = format!("{}/courses/{}/holes", self.base_url, course_id);
        tracing::debug!("GET {}", url);
        let holes = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<CourseHoleMetadata>>()
            .await?;
        Ok(holes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_upsert_puts_entry_on_natural_key() {
        let server = MockServer::start();
        let mut entry = HoleEntry::unplayed(7);
        entry.score = 4;
        entry.putts = 2;

        let upsert_mock = server.mock(|when, then| {
            when.method(PUT)
                .path("/rounds/round-1/holes/7")
                .json_body_obj(&entry);
            then.status(200);
        });

        let store = HttpRoundStore::new(server.base_url());
        store.upsert_hole("round-1", &entry).await.unwrap();

        upsert_mock.assert();
    }

    #[tokio::test]
    async fn test_upsert_maps_server_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(PUT).path("/rounds/round-1/holes/3");
            then.status(503);
        });

        let store = HttpRoundStore::new(server.base_url());
        let err = store
            .upsert_hole("round-1", &HoleEntry::unplayed(3))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_query_holes_deserializes_entries() {
        let server = MockServer::start();
        let mock_data = serde_json::json!([
            {"hole": 1, "par": 4, "distance": 390, "score": 5, "putts": 2,
             "fairway_hit": true, "green_in_regulation": false},
            {"hole": 2, "par": 3, "distance": 165, "score": 3, "putts": 1,
             "fairway_hit": false, "green_in_regulation": true}
        ]);

        let query_mock = server.mock(|when, then| {
            when.method(GET).path("/rounds/round-9/holes");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_data);
        });

        let store = HttpRoundStore::new(server.base_url());
        let entries = store.query_holes("round-9").await.unwrap();

        query_mock.assert();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].score, 5);
        assert!(entries[1].green_in_regulation);
    }

    #[tokio::test]
    async fn test_catalog_fetch_with_tee_distances() {
        let server = MockServer::start();
        let mock_data = serde_json::json!([
            {"hole": 1, "par": 5, "distance": 505,
             "tee_distances": {"blue": 530, "red": 480}}
        ]);

        let catalog_mock = server.mock(|when, then| {
            when.method(GET).path("/courses/pebble/holes");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(mock_data);
        });

        let catalog = HttpCourseCatalog::new(server.base_url());
        let holes = catalog.query_holes("pebble").await.unwrap();

        catalog_mock.assert();
        assert_eq!(holes[0].distance_for(Some("blue")), 530);
        assert_eq!(holes[0].distance_for(None), 505);
    }
}
