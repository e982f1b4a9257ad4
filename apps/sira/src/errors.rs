use serde::Serialize;
use thiserror::Error;

use crate::export::ExportError;
use crate::llm_client::GenerationError;
use crate::models::form::FormField;

/// Precondition failure on user input. Recoverable by asking the user to
/// fill in or correct the named fields.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvalidInputError {
    #[error("required fields are empty: {}", join_field_names(.0))]
    MissingFields(Vec<FormField>),
}

fn join_field_names(fields: &[FormField]) -> String {
    fields
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Application-level error type.
/// Every variant maps to an `ErrorNotice` so the view always has something
/// visible to show for a failure.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// The visible form of an error: a stable code plus a message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNotice {
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn notice(&self) -> ErrorNotice {
        let (code, message) = match self {
            AppError::InvalidInput(InvalidInputError::MissingFields(fields)) => (
                "INVALID_INPUT",
                format!(
                    "Please fill in every field before generating. Missing: {}",
                    join_field_names(fields)
                ),
            ),
            AppError::Generation(e) => {
                tracing::warn!("Generation failed: {e}");
                (
                    "GENERATION_ERROR",
                    format!("The CV could not be generated ({e}). You can try again."),
                )
            }
            AppError::Export(ExportError::NothingToExport) => (
                "EXPORT_ERROR",
                "There is no generated CV to export yet.".to_string(),
            ),
            AppError::Export(e) => {
                tracing::error!("Export error: {e}");
                (
                    "EXPORT_ERROR",
                    format!("The Word document could not be saved ({e})."),
                )
            }
            AppError::Unauthorized => ("UNAUTHORIZED", "Please sign in first.".to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        ErrorNotice { code, message }
    }
}
