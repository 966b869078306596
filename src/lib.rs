// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod api;
pub mod config;
pub mod ingest;
pub mod links;
pub mod metrics;
pub mod poster;
pub mod suggest;

// ---- Re-exports for stable public API ----
pub use crate::api::{router, AppState};
pub use crate::config::AppConfig;
pub use crate::ingest::types::{FetchError, Trend};
pub use crate::ingest::TrendFetcher;
pub use crate::suggest::{PostSuggestion, PostVariant, Suggester};
