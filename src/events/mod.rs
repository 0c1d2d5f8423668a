// Public API - what other modules can use
pub use handlers::{create_event, delete_event, get_event, list_events, update_event};
pub use service::EventService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
