use crate::config::toml_config::RoundConfig;
use clap::Parser;

/// 命令列參數；給了 --config 時其餘旗標覆寫 TOML 內容
#[derive(Debug, Clone, Parser)]
#[command(name = "roundkeeper")]
#[command(about = "Hole-by-hole golf scorecard tracker with offline-safe syncing")]
pub struct CliConfig {
    /// Path to a TOML round profile
    #[arg(short, long)]
    pub config: Option<String>,

    /// Round store API endpoint
    #[arg(long)]
    pub round_api: Option<String>,

    /// Course catalog API endpoint (defaults to the round store endpoint)
    #[arg(long)]
    pub course_api: Option<String>,

    /// Course to play
    #[arg(long)]
    pub course_id: Option<String>,

    /// Tee to play from
    #[arg(long)]
    pub tee: Option<String>,

    /// Declared hole count (9 or 18)
    #[arg(long)]
    pub holes: Option<u8>,

    /// Resume an existing round instead of starting a new one
    #[arg(long)]
    pub round_id: Option<String>,

    /// Jump straight to this hole (overrides the resume marker)
    #[arg(long)]
    pub start_hole: Option<u8>,

    /// Directory for the local resume marker
    #[arg(long)]
    pub marker_dir: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit JSON logs (for log collectors) instead of the compact format
    #[arg(long)]
    pub log_json: bool,
}

impl CliConfig {
    /// 合併出實際生效的設定：TOML 為底，CLI 旗標覆寫
    pub fn effective_config(&self) -> crate::utils::error::Result<RoundConfig> {
        let mut config = match &self.config {
            Some(path) => RoundConfig::from_file(path)?,
            None => RoundConfig::default(),
        };

        if let Some(endpoint) = &self.round_api {
            config.api.round_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.course_api {
            config.api.course_endpoint = Some(endpoint.clone());
        }
        if let Some(course_id) = &self.course_id {
            config.round.course_id = course_id.clone();
        }
        if let Some(tee) = &self.tee {
            config.round.tee = Some(tee.clone());
        }
        if let Some(holes) = self.holes {
            config.round.holes = holes;
        }
        if let Some(round_id) = &self.round_id {
            config.round.round_id = Some(round_id.clone());
        }
        if let Some(start_hole) = self.start_hole {
            config.round.start_hole = Some(start_hole);
        }
        if let Some(dir) = &self.marker_dir {
            config.markers = Some(crate::config::toml_config::MarkerSection {
                path: Some(dir.clone()),
            });
        }

        Ok(config)
    }
}
