//! Application services: use-case implementations.
//!
//! Each service struct accepts port trait implementations via generic parameters
//! (constructor injection), keeping this layer decoupled from concrete adapters.

pub mod auth_service;
pub mod customer_service;
pub mod order_service;
pub mod product_service;
