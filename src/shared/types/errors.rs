use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.into(),
        }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Map a SeaORM error into the domain taxonomy.
///
/// Unique-constraint violations surface as `Conflict`, everything else is a
/// storage failure.
pub fn db_err(e: sea_orm::DbErr) -> DomainError {
    match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => {
            DomainError::Conflict(format!("unique constraint violated: {}", msg))
        }
        Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(msg)) => {
            DomainError::Conflict(format!("referenced by other records: {}", msg))
        }
        _ => DomainError::Storage(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity_and_id() {
        let err = DomainError::not_found("Battery", "b-1");
        assert_eq!(err.to_string(), "Not found: Battery with id=b-1");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
    }

    #[test]
    fn invalid_input_message_names_field() {
        let err = DomainError::invalid("amount", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Invalid input: amount: must be greater than zero"
        );
    }

    #[test]
    fn generic_db_error_maps_to_storage() {
        let err = db_err(sea_orm::DbErr::Custom("boom".into()));
        assert!(matches!(err, DomainError::Storage(_)));
    }
}
