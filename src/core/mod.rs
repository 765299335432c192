pub mod aggregate;
pub mod metadata;
pub mod navigation;
pub mod scheduler;
pub mod scorecard;
pub mod session;

pub use crate::domain::model::{HoleEdit, HoleEntry, Round, RoundStatus, RoundTotals};
pub use crate::domain::ports::{CourseCatalog, MarkerStore, RoundStore};
pub use crate::utils::error::Result;
