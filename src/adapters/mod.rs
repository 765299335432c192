// Adapters layer: concrete implementations for the external systems the
// engine talks to (remote round store, course catalog, marker store).

pub mod http;
pub mod marker;

pub use http::{HttpCourseCatalog, HttpRoundStore};
pub use marker::FileMarkerStore;
