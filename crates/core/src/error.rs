//! Domain-level error taxonomy.
//!
//! Every component-level operation maps its failures into one of these
//! variants; the HTTP layer (`basket-api`) translates them into status
//! codes and JSON bodies. Nothing is retried automatically.

/// Domain error shared across crates.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// A referenced entity, looked up by name, does not exist.
    #[error("{entity} '{name}' not found")]
    NotFoundNamed { entity: &'static str, name: String },

    /// A required field is missing or a supplied value is invalid.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness or concurrent-edit conflict.
    #[error("{0}")]
    Conflict(String),

    /// The caller is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// The caller is authenticated but not allowed to perform the action.
    #[error("{0}")]
    Forbidden(String),

    /// An unexpected internal failure. The message is logged server-side
    /// and never sent to the client verbatim.
    #[error("{0}")]
    Internal(String),
}
