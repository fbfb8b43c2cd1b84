//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`rbac::RequireAuth`] -- Requires any authenticated user.
//! - [`list_access`] -- Resolves the caller's permission on the list named
//!   in the request path and carries the fetched list into the handler.

pub mod auth;
pub mod list_access;
pub mod rbac;
