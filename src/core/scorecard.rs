use crate::domain::model::{CourseHoleMetadata, HoleCount, HoleEdit, HoleEntry};
use crate::utils::validation::coerce_count;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 當前球局的記分卡，純記憶體資料與合併邏輯
#[derive(Debug)]
pub struct ScorecardStore {
    hole_count: u8,
    entries: BTreeMap<u8, HoleEntry>,
}

impl ScorecardStore {
    pub fn new(hole_count: HoleCount) -> Self {
        Self {
            hole_count: hole_count.as_u8(),
            entries: BTreeMap::new(),
        }
    }

    pub fn hole_count(&self) -> u8 {
        self.hole_count
    }

    /// 依球場屬性建立每一洞的預設記錄。重複呼叫會得到相同結果。
    pub fn initialize(&mut self, metadata: &[CourseHoleMetadata]) -> Vec<HoleEntry> {
        self.entries.clear();
        for hole in 1..=self.hole_count {
            let mut entry = HoleEntry::unplayed(hole);
            if let Some(meta) = metadata.iter().find(|m| m.hole == hole) {
                entry.apply_metadata(meta.par, meta.distance);
            }
            self.entries.insert(hole, entry);
        }
        self.entries()
    }

    /// 套用一筆欄位編輯並回傳新的整洞記錄。
    ///
    /// Lookup-and-replace keyed by hole number: the entry is rebuilt in place,
    /// a second entry for the same hole can never appear.
    pub fn update(&mut self, hole: u8, edit: &HoleEdit) -> HoleEntry {
        let mut entry = self.get(hole);
        match edit {
            HoleEdit::Score(raw) => entry.score = coerce_count(raw),
            HoleEdit::Putts(raw) => entry.putts = coerce_count(raw),
            HoleEdit::FairwayHit(value) => entry.fairway_hit = *value,
            HoleEdit::GreenInRegulation(value) => entry.green_in_regulation = *value,
        }
        self.entries.insert(hole, entry);
        entry
    }

    /// 取得單洞記錄。未初始化時合成預設值，呼叫端永遠拿得到完整資料。
    pub fn get(&self, hole: u8) -> HoleEntry {
        self.entries
            .get(&hole)
            .copied()
            .unwrap_or_else(|| HoleEntry::unplayed(hole))
    }

    /// 重新載入既有球局時的對帳合併。
    ///
    /// Asymmetric by design: remote entries win for score/putts/fairway/green,
    /// course metadata always wins for par/distance. A stale round record can
    /// never corrupt course data, and vice versa.
    pub fn merge(
        &mut self,
        remote: &[HoleEntry],
        metadata: &[CourseHoleMetadata],
    ) -> Vec<HoleEntry> {
        self.entries.clear();
        for hole in 1..=self.hole_count {
            let mut entry = HoleEntry::unplayed(hole);
            if let Some(meta) = metadata.iter().find(|m| m.hole == hole) {
                entry.apply_metadata(meta.par, meta.distance);
            }
            if let Some(remote_entry) = remote.iter().find(|e| e.hole == hole) {
                entry.adopt_scores(remote_entry);
            }
            self.entries.insert(hole, entry);
        }
        self.entries()
    }

    pub fn entries(&self) -> Vec<HoleEntry> {
        (1..=self.hole_count).map(|hole| self.get(hole)).collect()
    }
}

/// 讓排程器的背景任務與 session 共用同一份記分卡
#[derive(Debug, Clone)]
pub struct SharedScorecard {
    inner: Arc<Mutex<ScorecardStore>>,
}

impl SharedScorecard {
    pub fn new(store: ScorecardStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ScorecardStore> {
        // 任務不會在持鎖狀態 panic 到一半留下壞資料，污染時直接取回
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn hole_count(&self) -> u8 {
        self.lock().hole_count()
    }

    pub fn initialize(&self, metadata: &[CourseHoleMetadata]) -> Vec<HoleEntry> {
        self.lock().initialize(metadata)
    }

    pub fn update(&self, hole: u8, edit: &HoleEdit) -> HoleEntry {
        self.lock().update(hole, edit)
    }

    pub fn get(&self, hole: u8) -> HoleEntry {
        self.lock().get(hole)
    }

    pub fn merge(&self, remote: &[HoleEntry], metadata: &[CourseHoleMetadata]) -> Vec<HoleEntry> {
        self.lock().merge(remote, metadata)
    }

    pub fn entries(&self) -> Vec<HoleEntry> {
        self.lock().entries()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::DEFAULT_PAR;
    use std::collections::HashMap;

    fn meta(hole: u8, par: u8, distance: u16) -> CourseHoleMetadata {
        CourseHoleMetadata {
            hole,
            par,
            distance,
            tee_distances: HashMap::new(),
        }
    }

    fn remote_entry(hole: u8, score: u8, putts: u8) -> HoleEntry {
        let mut entry = HoleEntry::unplayed(hole);
        entry.score = score;
        entry.putts = putts;
        entry
    }

    #[test]
    fn test_get_is_total_before_initialize() {
        let store = ScorecardStore::new(HoleCount::Eighteen);
        for hole in 1..=18 {
            let entry = store.get(hole);
            assert_eq!(entry.hole, hole);
            assert_eq!(entry.par, DEFAULT_PAR);
        }
    }

    #[test]
    fn test_initialize_overlays_metadata_and_is_idempotent() {
        let mut store = ScorecardStore::new(HoleCount::Nine);
        let metadata = vec![meta(1, 5, 520), meta(2, 3, 165)];

        let first = store.initialize(&metadata);
        let second = store.initialize(&metadata);

        assert_eq!(first, second);
        assert_eq!(first.len(), 9);
        assert_eq!(first[0].par, 5);
        assert_eq!(first[0].distance, 520);
        assert_eq!(first[1].par, 3);
        // 沒有球場資料的洞退回預設
        assert_eq!(first[2].par, DEFAULT_PAR);
        assert_eq!(first[2].distance, 0);
    }

    #[test]
    fn test_update_replaces_never_appends() {
        let mut store = ScorecardStore::new(HoleCount::Nine);
        store.initialize(&[]);

        store.update(4, &HoleEdit::Score("5".to_string()));
        store.update(4, &HoleEdit::Score("6".to_string()));
        let updated = store.update(4, &HoleEdit::Putts("2".to_string()));

        assert_eq!(updated.score, 6);
        assert_eq!(updated.putts, 2);
        assert_eq!(store.entries().len(), 9);
    }

    #[test]
    fn test_update_coerces_invalid_numeric_input() {
        let mut store = ScorecardStore::new(HoleCount::Nine);
        store.initialize(&[]);

        store.update(1, &HoleEdit::Score("4".to_string()));
        let entry = store.update(1, &HoleEdit::Score("not a number".to_string()));
        assert_eq!(entry.score, 0);

        let entry = store.update(1, &HoleEdit::FairwayHit(true));
        assert!(entry.fairway_hit);
    }

    #[test]
    fn test_merge_remote_wins_scores_metadata_wins_course_fields() {
        let mut store = ScorecardStore::new(HoleCount::Nine);
        let metadata = vec![meta(7, 5, 498)];
        // 遠端舊記錄帶著預設 par，不可污染球場資料
        let remote = vec![remote_entry(7, 6, 2)];

        let merged = store.merge(&remote, &metadata);
        let hole7 = merged[6];
        assert_eq!(hole7.par, 5);
        assert_eq!(hole7.distance, 498);
        assert_eq!(hole7.score, 6);
        assert_eq!(hole7.putts, 2);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut store = ScorecardStore::new(HoleCount::Nine);
        let metadata = vec![meta(1, 4, 390), meta(2, 3, 170)];
        let remote = vec![remote_entry(1, 4, 2), remote_entry(2, 3, 1)];

        let once = store.merge(&remote, &metadata);
        let twice = store.merge(&remote, &metadata);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_drops_entries_beyond_hole_count() {
        // 18 洞改宣告為 9 洞後殘留的記錄不得回到記分卡
        let mut store = ScorecardStore::new(HoleCount::Nine);
        let remote = vec![remote_entry(3, 4, 2), remote_entry(14, 5, 2)];

        let merged = store.merge(&remote, &[]);
        assert_eq!(merged.len(), 9);
        assert_eq!(merged[2].score, 4);
        assert!(merged.iter().all(|e| e.hole <= 9));
    }

    #[test]
    fn test_shared_scorecard_reflects_updates() {
        let shared = SharedScorecard::new(ScorecardStore::new(HoleCount::Nine));
        shared.initialize(&[]);

        let reader = shared.clone();
        shared.update(2, &HoleEdit::Score("4".to_string()));
        assert_eq!(reader.get(2).score, 4);
    }
}
