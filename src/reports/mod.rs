pub use handlers::event_master_report;

mod handlers;
mod service;
pub mod types;
