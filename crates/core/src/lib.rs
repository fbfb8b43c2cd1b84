//! Domain logic for the basket shopping-list platform.
//!
//! This crate is I/O-free: it holds the shared id/timestamp aliases, the
//! error taxonomy, role constants, status enums, the list permission
//! resolution algorithm, and the statistics aggregation engine. Persistence
//! lives in `basket-db`, HTTP in `basket-api`.

pub mod error;
pub mod permissions;
pub mod roles;
pub mod stats;
pub mod status;
pub mod types;
