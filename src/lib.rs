// Library crate for the QCVOC membership and attendance API
// This file exposes the public API for the binary and integration tests

pub mod accounts;
pub mod app;
pub mod database;
pub mod events;
pub mod pagination;
pub mod patrons;
pub mod reports;
pub mod scans;
pub mod security;
pub mod services;
pub mod settings;
pub mod shared;
pub mod validation;
pub mod values;

// Re-export commonly used types for easier access in tests
pub use app::build_router;
pub use settings::Settings;
pub use shared::{AppError, AppState};
