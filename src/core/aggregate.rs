use crate::core::scheduler::{Notice, NoticeSender};
use crate::domain::model::{HoleEntry, RoundTotals};
use crate::domain::ports::RoundStore;

/// 球局結算：把整張記分卡彙總成總桿數據
pub struct RoundAggregator;

impl RoundAggregator {
    /// Sum score, putts, fairways and greens over holes 1..=hole_count.
    ///
    /// Entries beyond the declared count are excluded: a round re-declared
    /// from 18 to 9 holes mid-session must not drag stray holes into the
    /// totals. Fairway hits on par-3 holes are not counted either; the flag
    /// carries no meaning there.
    pub fn compute(entries: &[HoleEntry], hole_count: u8) -> RoundTotals {
        entries
            .iter()
            .filter(|e| (1..=hole_count).contains(&e.hole))
            .fold(RoundTotals::default(), |mut totals, entry| {
                totals.score += u32::from(entry.score);
                totals.putts += u32::from(entry.putts);
                if entry.fairway_hit && entry.par > 3 {
                    totals.fairways_hit += 1;
                }
                if entry.green_in_regulation {
                    totals.greens_in_regulation += 1;
                }
                totals
            })
    }

    /// 一次寫入整場總桿（不逐洞）。失敗時送出通知；本地總桿照常顯示。
    pub async fn publish<S: RoundStore>(
        store: &S,
        round_id: &str,
        totals: &RoundTotals,
        notices: &NoticeSender,
    ) -> bool {
        match store.update_round_totals(round_id, totals).await {
            Ok(()) => {
                tracing::info!(
                    "📊 Round {} totals saved: {} strokes, {} putts",
                    round_id,
                    totals.score,
                    totals.putts
                );
                true
            }
            Err(e) => {
                tracing::warn!("Round {} totals write failed: {}", round_id, e);
                let _ = notices.send(Notice::TotalsWriteFailed);
                false
            }
        }
    }
}
