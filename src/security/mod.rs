// Public API - what other modules can use
pub use cleanup_task::{start_cleanup_task, CleanupConfig};
pub use handlers::{login, logout, refresh, whoami};
pub use middleware::jwt_auth;
pub use service::SecurityService;
pub use token::TokenConfig;
pub use types::AccountClaims;

// Internal modules
mod cleanup_task;
mod handlers;
mod middleware;
pub mod models;
pub mod password;
pub mod repository;
mod service;
mod token;
pub mod types;
