//! # minishop-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **REST-ish JSON API** under `/api` for programmatic access
//!   (`/api/customers`, `/api/laptops`, `/api/orders`, `/api/auth/login`, …)
//! - Serve the **server-side-rendered back-office** (askama templates) that
//!   works with **zero JavaScript**: plain HTML forms, Post/Redirect/Get and
//!   one-shot flash messages kept in the session
//! - Guard every route with a session-based access filter
//! - Map application results into HTTP responses (JSON or HTML)
//!
//! ## Dependency rule
//! Depends on `minishop-app` (for port traits and services) and
//! `minishop-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain. The session store is chosen by
//! the caller of [`router::build`].

pub mod api;
pub mod dashboard;
pub mod error;
pub mod router;
pub mod session;
pub mod state;
