use thiserror::Error;

use crate::database::manager::DatabaseError;
use crate::filter::FilterError;
use crate::services::validator::ValidationError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{entity} not found (id = {id})")]
    NotFound { entity: &'static str, id: i64 },

    #[error("{entity} already exists: {name}")]
    AlreadyExists { entity: &'static str, name: String },

    #[error("Invalid {entity}: {}", fields(.errors))]
    InvalidEntity {
        entity: &'static str,
        errors: Vec<ValidationError>,
    },

    #[error(transparent)]
    InvalidSort(#[from] FilterError),

    #[error("Invalid pagination: {0}")]
    InvalidPagination(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        ServiceError::NotFound { entity, id }
    }

    pub fn invalid(entity: &'static str, errors: Vec<ValidationError>) -> Self {
        ServiceError::InvalidEntity { entity, errors }
    }
}

fn fields(errors: &[ValidationError]) -> String {
    errors.iter().map(|e| e.field()).collect::<Vec<_>>().join(", ")
}

pub type ServiceResult<T> = Result<T, ServiceError>;
