// Public API - what other modules can use
pub use handlers::{delete_scan, list_scans, record_scan};
pub use service::ScanService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
