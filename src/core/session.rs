use crate::core::aggregate::RoundAggregator;
use crate::core::metadata::CourseMetadataResolver;
use crate::core::navigation::{NavOutcome, NavigationController};
use crate::core::scheduler::{Notice, NoticeReceiver, NoticeSender, PersistenceScheduler, SchedulerConfig};
use crate::core::scorecard::{ScorecardStore, SharedScorecard};
use crate::domain::model::{HoleEdit, HoleEntry, Round, RoundStatus, RoundTotals};
use crate::domain::ports::{CourseCatalog, MarkerStore, RoundStore};
use crate::utils::error::{Result, RoundError};
use std::sync::Arc;
use tokio::sync::mpsc;

/// UI 導航動作的結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    Moved(u8),
    AtFirst,
    Finished(RoundTotals),
}

/// 一場球的同步引擎門面。
///
/// Explicitly constructed and handed to the UI layer; there is no ambient
/// global round state anywhere. The UI calls in on every field edit and on
/// next/previous/finish, and rendering reads back through the accessors.
pub struct RoundSession<S, C, M>
where
    S: RoundStore + 'static,
    C: CourseCatalog,
    M: MarkerStore,
{
    round: Round,
    store: Arc<S>,
    resolver: CourseMetadataResolver<C>,
    scorecard: SharedScorecard,
    scheduler: PersistenceScheduler<S>,
    navigation: NavigationController<M>,
    notice_tx: NoticeSender,
    notices: NoticeReceiver,
}

impl<S, C, M> RoundSession<S, C, M>
where
    S: RoundStore + 'static,
    C: CourseCatalog,
    M: MarkerStore,
{
    pub fn new(round: Round, store: Arc<S>, catalog: C, markers: M, config: SchedulerConfig) -> Self {
        let scorecard = SharedScorecard::new(ScorecardStore::new(round.hole_count));
        let (notice_tx, notices) = mpsc::unbounded_channel();
        let scheduler = PersistenceScheduler::new(
            round.id.clone(),
            Arc::clone(&store),
            scorecard.clone(),
            config,
            notice_tx.clone(),
        );
        let navigation =
            NavigationController::new(markers, round.id.clone(), round.hole_count.as_u8());

        Self {
            round,
            store,
            resolver: CourseMetadataResolver::new(catalog),
            scorecard,
            scheduler,
            navigation,
            notice_tx,
            notices,
        }
    }

    /// 開新球局：只需要球場屬性，不查遠端成績。
    pub async fn load_new(&mut self) -> Result<()> {
        self.ensure_loadable("load")?;
        self.set_status(RoundStatus::Loading);

        let metadata = self
            .resolver
            .resolve(
                &self.round.course_id,
                self.round.tee_id.as_deref(),
                self.round.hole_count.as_u8(),
            )
            .await;
        self.scorecard.initialize(&metadata);
        self.navigation.resume(None).await;

        self.set_status(RoundStatus::Active);
        tracing::info!(
            "🏌️ Round {} started on course {} ({} holes)",
            self.round.id,
            self.round.course_id,
            self.round.hole_count.as_u8()
        );
        Ok(())
    }

    /// 重新進入既有球局：抓遠端成績、與球場屬性對帳合併，再決定起始洞。
    ///
    /// `explicit_hole` (e.g. a deep link) beats the persisted resume marker,
    /// which beats hole 1. On fetch failure the session lands in `Error`;
    /// calling `resume` again retries.
    pub async fn resume(&mut self, explicit_hole: Option<u8>) -> Result<u8> {
        self.ensure_loadable("resume")?;
        self.set_status(RoundStatus::Loading);

        let metadata = self
            .resolver
            .resolve(
                &self.round.course_id,
                self.round.tee_id.as_deref(),
                self.round.hole_count.as_u8(),
            )
            .await;

        let remote = match self.store.query_holes(&self.round.id).await {
            Ok(remote) => remote,
            Err(e) => {
                self.set_status(RoundStatus::Error);
                return Err(RoundError::LoadError {
                    round_id: self.round.id.clone(),
                    details: e.to_string(),
                });
            }
        };

        self.scorecard.merge(&remote, &metadata);
        let hole = self.navigation.resume(explicit_hole).await;

        self.set_status(RoundStatus::Active);
        tracing::info!("🏌️ Round {} resumed at hole {}", self.round.id, hole);
        Ok(hole)
    }

    /// 當前洞的一筆欄位編輯：更新記分卡、排程寫入、更新續局標記。
    pub async fn edit_hole(&mut self, edit: HoleEdit) -> Result<HoleEntry> {
        self.ensure_active("edit")?;
        let hole = self.navigation.current();
        let entry = self.scorecard.update(hole, &edit);
        tracing::debug!("✏️ Hole {} {} updated", hole, edit.field_name());
        self.scheduler.schedule(hole);
        self.navigation.record_marker().await;
        Ok(entry)
    }

    pub async fn go_next(&mut self) -> Result<SessionStep> {
        self.ensure_active("navigate")?;
        self.set_status(RoundStatus::Saving);
        let outcome = self.navigation.next(&self.scheduler).await;
        self.set_status(RoundStatus::Active);

        match outcome {
            NavOutcome::Finish => {
                let totals = self.finish_round().await?;
                Ok(SessionStep::Finished(totals))
            }
            NavOutcome::Moved(hole) => Ok(SessionStep::Moved(hole)),
            NavOutcome::AtFirst => Ok(SessionStep::AtFirst),
        }
    }

    pub async fn go_previous(&mut self) -> Result<SessionStep> {
        self.ensure_active("navigate")?;
        self.set_status(RoundStatus::Saving);
        let outcome = self.navigation.previous(&self.scheduler).await;
        self.set_status(RoundStatus::Active);

        match outcome {
            NavOutcome::Moved(hole) => Ok(SessionStep::Moved(hole)),
            NavOutcome::AtFirst => Ok(SessionStep::AtFirst),
            // previous 不會觸發結算
            NavOutcome::Finish => Ok(SessionStep::AtFirst),
        }
    }

    /// 結算：先把所有待寫的洞 flush 完，才寫一次性的總桿記錄。
    /// 總桿寫失敗只發通知，本地算出的總桿照樣回傳顯示。
    pub async fn finish_round(&mut self) -> Result<RoundTotals> {
        self.ensure_active("finish")?;
        self.set_status(RoundStatus::Saving);
        tracing::info!("🏁 Finishing round {}", self.round.id);

        if !self.scheduler.flush_all().await {
            tracing::warn!("Some hole writes did not reach the server before finish");
        }

        let totals = RoundAggregator::compute(
            &self.scorecard.entries(),
            self.round.hole_count.as_u8(),
        );
        RoundAggregator::publish(&*self.store, &self.round.id, &totals, &self.notice_tx).await;

        self.navigation.clear_marker().await;
        self.scheduler.shutdown();
        self.set_status(RoundStatus::Finished);
        tracing::info!(
            "✅ Round {} finished: {} strokes, {} putts",
            self.round.id,
            totals.score,
            totals.putts
        );
        Ok(totals)
    }

    /// 放棄球局：清掉續局標記與待寫任務，不寫總桿。
    pub async fn abandon(&mut self) {
        tracing::info!("🚪 Abandoning round {}", self.round.id);
        self.scheduler.shutdown();
        self.navigation.clear_marker().await;
        self.set_status(RoundStatus::Idle);
    }

    pub fn current_hole(&self) -> u8 {
        self.navigation.current()
    }

    pub fn current_hole_entry(&self) -> HoleEntry {
        self.scorecard.get(self.navigation.current())
    }

    pub fn status(&self) -> RoundStatus {
        self.round.status
    }

    pub fn round(&self) -> &Round {
        &self.round
    }

    pub fn scorecard_entries(&self) -> Vec<HoleEntry> {
        self.scorecard.entries()
    }

    /// 取出一則待顯示的非致命通知（沒有就回 None）
    pub fn poll_notice(&mut self) -> Option<Notice> {
        self.notices.try_recv().ok()
    }

    fn set_status(&mut self, status: RoundStatus) {
        self.round.status = status;
    }

    fn ensure_active(&self, operation: &str) -> Result<()> {
        if self.round.status == RoundStatus::Active {
            Ok(())
        } else {
            Err(RoundError::SessionStateError {
                operation: operation.to_string(),
                status: self.round.status.to_string(),
            })
        }
    }

    fn ensure_loadable(&self, operation: &str) -> Result<()> {
        match self.round.status {
            RoundStatus::Idle | RoundStatus::Error => Ok(()),
            status => Err(RoundError::SessionStateError {
                operation: operation.to_string(),
                status: status.to_string(),
            }),
        }
    }
}
