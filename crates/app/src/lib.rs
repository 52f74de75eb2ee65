//! # minishop-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `CustomerRepository`: CRUD and name search for customers
//!   - `ProductRepository`: CRUD, model search and restocking for products
//!   - `OrderRepository`: atomic order placement, lookup and removal
//!   - `UserRepository`: account storage and lookup by email/username
//!   - `Mailer`: delivery of verification and recovery codes
//! - Define **driving/inbound ports** as use-case structs:
//!   - `CustomerService`, `ProductService`, `OrderService`, `AuthService`
//! - Orchestrate domain objects without knowing *how* persistence or IO works
//!
//! ## Dependency rule
//! Depends on `minishop-domain` only (plus password hashing and randomness).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod password;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
