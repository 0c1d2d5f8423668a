// Public API - what other modules can use
pub use handlers::{create_account, delete_account, get_account, list_accounts, update_account};
pub use service::AccountService;

// Internal modules
mod handlers;
pub mod models;
pub mod repository;
mod service;
pub mod types;
