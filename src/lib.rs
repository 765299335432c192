pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::RoundConfig;

pub use adapters::{FileMarkerStore, HttpCourseCatalog, HttpRoundStore};
pub use core::scheduler::{Notice, SchedulerConfig};
pub use core::session::{RoundSession, SessionStep};
pub use domain::model::{
    HoleCount, HoleEdit, HoleEntry, Round, RoundStatus, RoundTotals,
};
pub use utils::error::{Result, RoundError};
