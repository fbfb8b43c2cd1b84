//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers delegate to the repositories in `basket_db` and map errors via
//! [`crate::error::AppError`].

pub mod admin;
pub mod audit;
pub mod auth;
pub mod catalog;
pub mod categories;
pub mod lists;
pub mod products;
pub mod statistics;
pub mod users;
