use crate::domain::model::{CourseHoleMetadata, CourseId, DEFAULT_PAR};
use crate::domain::ports::CourseCatalog;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

/// 取得並快取球場每洞屬性。同一 course id 每個 session 只向目錄查一次。
pub struct CourseMetadataResolver<C: CourseCatalog> {
    catalog: C,
    cache: Mutex<HashMap<CourseId, Vec<CourseHoleMetadata>>>,
}

impl<C: CourseCatalog> CourseMetadataResolver<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve per-hole metadata for a course, never failing the caller: the
    /// round must stay playable even with an unknown course. Holes the catalog
    /// does not return are synthesized as par 4 / distance 0. The returned
    /// rows are ordered by hole number and the distance already reflects the
    /// requested tee.
    pub async fn resolve(
        &self,
        course_id: &str,
        tee_id: Option<&str>,
        hole_count: u8,
    ) -> Vec<CourseHoleMetadata> {
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(course_id)
            .cloned();

        let fetched = match cached {
            Some(rows) => rows,
            None => match self.catalog.query_holes(course_id).await {
                Ok(rows) => {
                    tracing::debug!("Course {} metadata fetched: {} holes", course_id, rows.len());
                    self.cache
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .insert(course_id.to_string(), rows.clone());
                    rows
                }
                Err(e) => {
                    // 查詢失敗不快取，下次 resolve 再試；本次先用合成預設值
                    tracing::warn!(
                        "⛳ Course {} metadata unavailable, playing with defaults: {}",
                        course_id,
                        e
                    );
                    Vec::new()
                }
            },
        };

        (1..=hole_count)
            .map(|hole| {
                let row = fetched.iter().find(|m| m.hole == hole);
                let par = row
                    .map(|m| m.par)
                    .filter(|p| (3..=5).contains(p))
                    .unwrap_or(DEFAULT_PAR);
                let distance = row.map(|m| m.distance_for(tee_id)).unwrap_or(0);
                CourseHoleMetadata {
                    hole,
                    par,
                    distance,
                    tee_distances: HashMap::new(),
                }
            })
            .collect()
    }
}
