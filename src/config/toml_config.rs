use crate::core::scheduler::SchedulerConfig;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// TOML 檔描述的球局設定
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundConfig {
    pub round: RoundSection,
    pub api: ApiSection,
    pub sync: Option<SyncSection>,
    pub markers: Option<MarkerSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundSection {
    pub course_id: String,
    pub tee: Option<String>,
    pub holes: u8,
    /// 指定既有球局代號則續局，否則開新局
    pub round_id: Option<String>,
    /// 明確指定起始洞（等同 deep link），優先於續局標記
    pub start_hole: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSection {
    pub round_endpoint: String,
    pub course_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSection {
    pub debounce_ms: Option<u64>,
    pub retry_delays_ms: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerSection {
    pub path: Option<String>,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            round: RoundSection {
                course_id: "demo-course".to_string(),
                tee: None,
                holes: 18,
                round_id: None,
                start_hole: None,
            },
            api: ApiSection {
                round_endpoint: "http://localhost:8080".to_string(),
                course_endpoint: None,
            },
            sync: None,
            markers: None,
        }
    }
}

impl RoundConfig {
    /// 從 TOML 檔載入設定
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: RoundConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// 球場目錄端點，未指定時共用球局端點
    pub fn course_endpoint(&self) -> &str {
        self.api
            .course_endpoint
            .as_deref()
            .unwrap_or(&self.api.round_endpoint)
    }

    pub fn marker_path(&self) -> &str {
        self.markers
            .as_ref()
            .and_then(|m| m.path.as_deref())
            .unwrap_or(".roundkeeper")
    }

    pub fn debounce_ms(&self) -> u64 {
        self.sync
            .as_ref()
            .and_then(|s| s.debounce_ms)
            .unwrap_or(800)
    }

    pub fn retry_delays_ms(&self) -> Vec<u64> {
        self.sync
            .as_ref()
            .and_then(|s| s.retry_delays_ms.clone())
            .unwrap_or_else(|| vec![1000, 2000, 4000])
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            debounce: Duration::from_millis(self.debounce_ms()),
            retry_delays: self
                .retry_delays_ms()
                .into_iter()
                .map(Duration::from_millis)
                .collect(),
        }
    }
}

impl Validate for RoundConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("round.course_id", &self.round.course_id)?;
        validate_url("api.round_endpoint", &self.api.round_endpoint)?;
        if let Some(endpoint) = &self.api.course_endpoint {
            validate_url("api.course_endpoint", endpoint)?;
        }

        if self.round.holes != 9 && self.round.holes != 18 {
            return Err(crate::utils::error::RoundError::InvalidConfigValueError {
                field: "round.holes".to_string(),
                value: self.round.holes.to_string(),
                reason: "A round is either 9 or 18 holes".to_string(),
            });
        }

        if let Some(start) = self.round.start_hole {
            validate_range("round.start_hole", start, 1, self.round.holes)?;
        }

        validate_positive_number("sync.debounce_ms", self.debounce_ms(), 1)?;
        for delay in self.retry_delays_ms() {
            validate_positive_number("sync.retry_delays_ms", delay, 1)?;
        }

        Ok(())
    }
}
