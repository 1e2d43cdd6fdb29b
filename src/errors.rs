use std::collections::BTreeMap;

use thiserror::Error;

/// Field name to human-readable message, as rendered in validation payloads.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed")]
    Validation(FieldErrors),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error(transparent)]
    Database(#[from] sea_orm::DbErr),
}

impl CoreError {
    pub fn not_found(entity: &'static str, id: i32) -> Self {
        CoreError::NotFound { entity, id }
    }

    /// Single-field validation failure.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut fields = FieldErrors::new();
        fields.insert(field.into(), message.into());
        CoreError::Validation(fields)
    }

    pub fn fields(&self) -> Option<&FieldErrors> {
        match self {
            CoreError::Validation(fields) => Some(fields),
            _ => None,
        }
    }
}
