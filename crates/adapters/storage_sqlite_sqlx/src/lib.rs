//! # minishop-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the repository port traits defined in `minishop-app::ports::storage`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows, including the joined
//!   `products` / `laptops` / `phones` tables
//! - Keep order placement atomic: stock decrement and order insert share one
//!   transaction
//!
//! ## Dependency rule
//! Depends on `minishop-app` (for port traits) and `minishop-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod customer_repo;
mod error;
mod order_repo;
mod pool;
mod product_repo;
mod row;
mod user_repo;

pub use customer_repo::SqliteCustomerRepository;
pub use error::StorageError;
pub use order_repo::SqliteOrderRepository;
pub use pool::{Config, Database};
pub use product_repo::SqliteProductRepository;
pub use user_repo::SqliteUserRepository;
