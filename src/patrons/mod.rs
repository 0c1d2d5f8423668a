// Public API - what other modules can use
pub use handlers::{create_patron, delete_patron, get_patron, list_patrons, update_patron};
pub use service::PatronService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
