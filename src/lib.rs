// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod catalog;
pub mod diff;
pub mod error;
pub mod export;
pub mod feedback;
pub mod metrics;
pub mod practice;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod store;
pub mod time_series;
pub mod util;
pub mod viewport;
