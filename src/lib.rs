pub mod api;
pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod netting;
pub mod service;
pub mod split;

pub use error::LedgerError;
pub use infrastructure::groups::in_memory::InMemoryGroupDirectory;
pub use infrastructure::logging::in_memory::InMemoryAuditSink;
pub use infrastructure::notify::in_memory::InMemoryNotifier;
pub use infrastructure::storage::in_memory::InMemoryBillStore;
pub use service::LedgerService;

#[cfg(test)]
mod tests;
