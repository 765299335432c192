use crate::core::scheduler::PersistenceScheduler;
use crate::domain::model::{NavigationMarker, RoundId};
use crate::domain::ports::{MarkerStore, RoundStore};

/// 單次導航動作的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Moved(u8),
    AtFirst,
    /// 在最後一洞按下一洞：改走結算流程
    Finish,
}

/// 洞序狀態機加上續局標記的讀寫。
/// 離開一洞之前一定先請排程器 flush；導航本身不等待寫入結果。
pub struct NavigationController<M: MarkerStore> {
    markers: M,
    round_id: RoundId,
    hole_count: u8,
    current: u8,
}

impl<M: MarkerStore> NavigationController<M> {
    pub fn new(markers: M, round_id: RoundId, hole_count: u8) -> Self {
        Self {
            markers,
            round_id,
            hole_count,
            current: 1,
        }
    }

    pub fn current(&self) -> u8 {
        self.current
    }

    /// (重新)進入球局時決定起始洞。
    ///
    /// Precedence is load-bearing: explicit caller intent (deep link) beats
    /// the persisted marker, which beats hole 1. A stale marker must never
    /// override what the user explicitly asked for.
    pub async fn resume(&mut self, explicit: Option<u8>) -> u8 {
        let resolved = match explicit {
            Some(hole) => hole,
            None => match self.read_marker().await {
                Some(marker) => marker.hole,
                None => 1,
            },
        };
        // 球局中途從 18 洞改宣告 9 洞時，標記可能超界
        self.current = resolved.clamp(1, self.hole_count);
        self.current
    }

    pub async fn next<S: RoundStore + 'static>(
        &mut self,
        scheduler: &PersistenceScheduler<S>,
    ) -> NavOutcome {
        if self.current >= self.hole_count {
            // 最後一洞不在這裡 flush：結算流程會等所有寫入完成
            return NavOutcome::Finish;
        }
        scheduler.flush_detached(self.current);
        self.current += 1;
        self.record_marker().await;
        NavOutcome::Moved(self.current)
    }

    pub async fn previous<S: RoundStore + 'static>(
        &mut self,
        scheduler: &PersistenceScheduler<S>,
    ) -> NavOutcome {
        scheduler.flush_detached(self.current);
        if self.current <= 1 {
            return NavOutcome::AtFirst;
        }
        self.current -= 1;
        self.record_marker().await;
        NavOutcome::Moved(self.current)
    }

    /// 把目前洞號寫進續局標記。成績編輯時也會呼叫。
    /// 標記失敗只記 log，不影響記分流程。
    pub async fn record_marker(&self) {
        let marker = NavigationMarker {
            round_id: self.round_id.clone(),
            hole: self.current,
        };
        let payload = match serde_json::to_string(&marker) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("Could not serialize resume marker: {}", e);
                return;
            }
        };
        if let Err(e) = self.markers.set(&self.marker_key(), &payload).await {
            tracing::warn!("Could not persist resume marker: {}", e);
        }
    }

    /// 球局結束或放棄時刪除標記
    pub async fn clear_marker(&self) {
        if let Err(e) = self.markers.remove(&self.marker_key()).await {
            tracing::warn!("Could not remove resume marker: {}", e);
        }
    }

    async fn read_marker(&self) -> Option<NavigationMarker> {
        let raw = match self.markers.get(&self.marker_key()).await {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("Could not read resume marker: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<NavigationMarker>(&raw) {
            // 防呆：標記內容屬於別場球就當作不存在
            Ok(marker) if marker.round_id == self.round_id => Some(marker),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Resume marker is unreadable, ignoring: {}", e);
                None
            }
        }
    }

    fn marker_key(&self) -> String {
        format!("round/{}/marker", self.round_id)
    }
}
