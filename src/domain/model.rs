use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type RoundId = String;
pub type CourseId = String;
pub type TeeId = String;

/// 一場球的洞數：9 或 18
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HoleCount {
    Nine,
    Eighteen,
}

impl HoleCount {
    pub fn as_u8(self) -> u8 {
        match self {
            HoleCount::Nine => 9,
            HoleCount::Eighteen => 18,
        }
    }
}

impl TryFrom<u8> for HoleCount {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            9 => Ok(HoleCount::Nine),
            18 => Ok(HoleCount::Eighteen),
            other => Err(format!("hole count must be 9 or 18, got {}", other)),
        }
    }
}

impl From<HoleCount> for u8 {
    fn from(value: HoleCount) -> u8 {
        value.as_u8()
    }
}

/// 球局生命週期狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    Idle,
    Loading,
    Active,
    Saving,
    Error,
    Finished,
}

impl std::fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RoundStatus::Idle => "idle",
            RoundStatus::Loading => "loading",
            RoundStatus::Active => "active",
            RoundStatus::Saving => "saving",
            RoundStatus::Error => "error",
            RoundStatus::Finished => "finished",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    pub id: RoundId,
    pub course_id: CourseId,
    pub tee_id: Option<TeeId>,
    pub hole_count: HoleCount,
    pub status: RoundStatus,
    pub started_at: DateTime<Utc>,
}

impl Round {
    pub fn new(
        id: impl Into<RoundId>,
        course_id: impl Into<CourseId>,
        tee_id: Option<TeeId>,
        hole_count: HoleCount,
    ) -> Self {
        Self {
            id: id.into(),
            course_id: course_id.into(),
            tee_id,
            hole_count,
            status: RoundStatus::Idle,
            started_at: Utc::now(),
        }
    }
}

pub const DEFAULT_PAR: u8 = 4;

/// 單洞記錄。score/putts 為 0 代表尚未填寫；distance 為 0 代表未知。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoleEntry {
    pub hole: u8,
    pub par: u8,
    pub distance: u16,
    pub score: u8,
    pub putts: u8,
    pub fairway_hit: bool,
    pub green_in_regulation: bool,
}

impl HoleEntry {
    /// The single place where per-hole defaults are decided: every field is
    /// filled here, so read sites never have to default anything themselves.
    pub fn unplayed(hole: u8) -> Self {
        Self {
            hole,
            par: DEFAULT_PAR,
            distance: 0,
            score: 0,
            putts: 0,
            fairway_hit: false,
            green_in_regulation: false,
        }
    }

    /// 只覆寫球場屬性（par / distance），不動成績欄位
    pub fn apply_metadata(&mut self, par: u8, distance: u16) {
        self.par = par;
        self.distance = distance;
    }

    /// 只採用遠端的成績欄位，不動 par / distance
    pub fn adopt_scores(&mut self, remote: &HoleEntry) {
        self.score = remote.score;
        self.putts = remote.putts;
        self.fairway_hit = remote.fairway_hit;
        self.green_in_regulation = remote.green_in_regulation;
    }
}

/// 球場單洞屬性，來自球場目錄，對本引擎而言唯讀
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseHoleMetadata {
    pub hole: u8,
    pub par: u8,
    pub distance: u16,
    #[serde(default)]
    pub tee_distances: HashMap<TeeId, u16>,
}

impl CourseHoleMetadata {
    /// Tee-specific distance wins over the generic one; 0 means unknown.
    pub fn distance_for(&self, tee_id: Option<&str>) -> u16 {
        tee_id
            .and_then(|tee| self.tee_distances.get(tee).copied())
            .unwrap_or(self.distance)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTotals {
    pub score: u32,
    pub putts: u32,
    pub fairways_hit: u32,
    pub greens_in_regulation: u32,
}

/// 續局標記：記住使用者停在哪一洞
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationMarker {
    pub round_id: RoundId,
    pub hole: u8,
}

/// 來自 UI 的單一欄位編輯。數字欄位帶原始輸入文字，由引擎統一轉換。
#[derive(Debug, Clone)]
pub enum HoleEdit {
    Score(String),
    Putts(String),
    FairwayHit(bool),
    GreenInRegulation(bool),
}

impl HoleEdit {
    pub fn field_name(&self) -> &'static str {
        match self {
            HoleEdit::Score(_) => "score",
            HoleEdit::Putts(_) => "putts",
            HoleEdit::FairwayHit(_) => "fairway_hit",
            HoleEdit::GreenInRegulation(_) => "green_in_regulation",
        }
    }
}
