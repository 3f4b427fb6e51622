//! Database layer for Tally

mod connection;
mod migrations;
mod repository;
mod store;

pub use connection::Database;
pub use repository::LibSqlBillingRepository;
pub use store::LocalStore;
