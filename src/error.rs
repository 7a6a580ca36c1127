use std::fmt;
use thiserror::Error;

/// A single failed rule from application validation.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum SafraError {
    #[error("Invalid input for '{field}': value must be a finite number greater than zero")]
    InvalidInput { field: &'static str },

    #[error("Invalid dosage: product volume {product:.2} L exceeds total mix volume {mix:.2} L")]
    InvalidDosage { product: f64, mix: f64 },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error("Insufficient stock for '{supply}': {available:.2} available, {requested:.2} requested")]
    InsufficientStock {
        supply: String,
        available: f64,
        requested: f64,
    },

    #[error("Record store error: {0}")]
    Persistence(#[from] rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, SafraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message_lists_every_field() {
        let err = SafraError::Validation(vec![
            ValidationError::new("supply_id", "is required"),
            ValidationError::new("dosage_per_ha", "must be greater than zero"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: supply_id: is required; dosage_per_ha: must be greater than zero"
        );
    }

    #[test]
    fn invalid_input_names_field() {
        let err = SafraError::InvalidInput { field: "area_ha" };
        assert!(err.to_string().contains("'area_ha'"));
    }
}
