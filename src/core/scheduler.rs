use crate::core::scorecard::SharedScorecard;
use crate::domain::model::RoundId;
use crate::domain::ports::RoundStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Debounce 與重試節奏，測試與 TOML 設定檔都可覆寫
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub debounce: Duration,
    pub retry_delays: Vec<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(800),
            retry_delays: vec![
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4),
            ],
        }
    }
}

impl SchedulerConfig {
    pub fn total_attempts(&self) -> u32 {
        1 + self.retry_delays.len() as u32
    }
}

/// 非致命事件通知，由 session 轉交給 UI 顯示
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// 單洞寫入在重試耗盡後放棄；記憶體中的記錄仍保留
    WriteFailed { hole: u8, attempts: u32 },
    /// 結算總桿寫入失敗；本地總桿仍可顯示
    TotalsWriteFailed,
}

pub type NoticeSender = mpsc::UnboundedSender<Notice>;
pub type NoticeReceiver = mpsc::UnboundedReceiver<Notice>;

struct PendingTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

struct SchedulerInner<S> {
    round_id: RoundId,
    store: Arc<S>,
    scorecard: SharedScorecard,
    config: SchedulerConfig,
    pending: Mutex<HashMap<u8, PendingTimer>>,
    next_generation: AtomicU64,
    notices: NoticeSender,
}

/// 把單洞編輯去抖動後寫到遠端球局儲存，失敗時按指數退避重試。
///
/// Per-hole task lifecycle: idle → pending (debounce) → in-flight →
/// {success, bounded retries → abandoned}. A new edit replaces a pending
/// timer for the same hole only; an in-flight write is never aborted, the
/// keyed idempotent upsert makes a late landing harmless.
pub struct PersistenceScheduler<S: RoundStore> {
    inner: Arc<SchedulerInner<S>>,
}

impl<S: RoundStore + 'static> PersistenceScheduler<S> {
    pub fn new(
        round_id: RoundId,
        store: Arc<S>,
        scorecard: SharedScorecard,
        config: SchedulerConfig,
        notices: NoticeSender,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                round_id,
                store,
                scorecard,
                config,
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
                notices,
            }),
        }
    }

    /// 每次編輯呼叫一次。同一洞在 debounce 窗內的編輯合併成一次寫入，
    /// 寫入時取當下最新的記錄（最後一次輸入為準）。
    pub fn schedule(&self, hole: u8) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);
        let task_inner = Arc::clone(&self.inner);

        // 持鎖中 spawn + 插入，讓任務的註銷一定看得到自己的登記
        let mut pending = self.inner.lock_pending();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(task_inner.config.debounce).await;
            task_inner.deregister(hole, generation);
            task_inner.write_with_retry(hole).await;
        });
        if let Some(prev) = pending.insert(hole, PendingTimer { generation, handle }) {
            // 只取消同一洞還在等 debounce 的計時器
            prev.handle.abort();
        }
    }

    /// 立即寫入，略過 debounce 窗；導航與結算用。回傳最終是否成功。
    pub async fn flush(&self, hole: u8) -> bool {
        self.cancel_pending(hole);
        self.inner.write_with_retry(hole).await
    }

    /// 背景 flush：導航不等待寫入完成，失敗會走通知管道。
    pub fn flush_detached(&self, hole: u8) {
        self.cancel_pending(hole);
        let task_inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            task_inner.write_with_retry(hole).await;
        });
    }

    /// Flush every hole that still has a pending debounce timer. Used before
    /// the totals write; returns false if any hole ultimately failed.
    pub async fn flush_all(&self) -> bool {
        let holes: Vec<u8> = {
            let mut pending = self.inner.lock_pending();
            pending
                .drain()
                .map(|(hole, timer)| {
                    timer.handle.abort();
                    hole
                })
                .collect()
        };

        let mut all_ok = true;
        for hole in holes {
            if !self.inner.write_with_retry(hole).await {
                all_ok = false;
            }
        }
        all_ok
    }

    /// Session 結束：取消所有還在 debounce 的計時器。
    /// 已送出網路的寫入不中斷，其結果在通知接收端關閉後被忽略。
    pub fn shutdown(&self) {
        let mut pending = self.inner.lock_pending();
        for (_, timer) in pending.drain() {
            timer.handle.abort();
        }
    }

    pub fn pending_holes(&self) -> Vec<u8> {
        let pending = self.inner.lock_pending();
        let mut holes: Vec<u8> = pending.keys().copied().collect();
        holes.sort_unstable();
        holes
    }

    fn cancel_pending(&self, hole: u8) {
        let mut pending = self.inner.lock_pending();
        if let Some(timer) = pending.remove(&hole) {
            timer.handle.abort();
        }
    }
}

impl<S: RoundStore> SchedulerInner<S> {
    fn lock_pending(&self) -> std::sync::MutexGuard<'_, HashMap<u8, PendingTimer>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Debounce 到期時任務自行註銷；generation 比對避免誤刪新任務的登記
    fn deregister(&self, hole: u8, generation: u64) {
        let mut pending = self.lock_pending();
        if pending
            .get(&hole)
            .is_some_and(|timer| timer.generation == generation)
        {
            pending.remove(&hole);
        }
    }

    /// 寫入單洞記錄，失敗時以固定梯度退避重試。
    ///
    /// The snapshot is taken once, here, at fire time: the last keystroke
    /// wins and intermediate states are never persisted. Retries resend the
    /// same snapshot; the upsert is idempotent by (round, hole).
    async fn write_with_retry(&self, hole: u8) -> bool {
        let entry = self.scorecard.get(hole);
        let total = self.config.total_attempts();
        let mut delays = self.config.retry_delays.iter();
        let mut attempt: u32 = 1;

        loop {
            match self.store.upsert_hole(&self.round_id, &entry).await {
                Ok(()) => {
                    tracing::debug!(
                        "💾 Hole {} persisted (attempt {}/{})",
                        hole,
                        attempt,
                        total
                    );
                    return true;
                }
                Err(e) => {
                    tracing::warn!(
                        "Hole {} write attempt {}/{} failed: {}",
                        hole,
                        attempt,
                        total,
                        e
                    );
                    match delays.next() {
                        Some(delay) => {
                            tokio::time::sleep(*delay).await;
                            attempt += 1;
                        }
                        None => {
                            tracing::error!(
                                "❌ Hole {} abandoned after {} attempts; entry kept locally",
                                hole,
                                attempt
                            );
                            // 接收端可能已關閉（session 拆除），失敗通知直接丟棄
                            let _ = self.notices.send(Notice::WriteFailed {
                                hole,
                                attempts: attempt,
                            });
                            return false;
                        }
                    }
                }
            }
        }
    }
}
