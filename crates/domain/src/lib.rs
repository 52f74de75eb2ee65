//! # minishop-domain
//!
//! Pure domain model for the minishop back-office.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Customers** (people who place orders)
//! - Define **Products** (a catalog entry that is either a laptop or a phone)
//! - Define **Orders** (a customer buying a quantity of one product)
//! - Define **Users** (back-office accounts with verification and recovery codes)
//! - Contain all invariant enforcement and domain logic, in particular the
//!   stock check performed when an order is placed
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod search;
pub mod time;

pub mod customer;
pub mod order;
pub mod product;
pub mod user;
