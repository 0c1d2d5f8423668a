// Public API - what other modules can use
pub use handlers::{create_service, delete_service, get_service, list_services, update_service};
pub use manager::ServiceManager;

// Internal modules
mod handlers;
mod manager;
pub mod models;
pub mod repository;
pub mod types;
