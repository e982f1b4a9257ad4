//! Turns a complete `FormRecord` into a `GenerationRequest`.
//!
//! Output is a pure function of (language, record): the same record always
//! yields a byte-identical request.

use std::fmt::Write;

use crate::errors::InvalidInputError;
use crate::generation::prompts::{header, instructions};
use crate::models::form::{FormField, FormRecord};
use crate::models::generation::{GenerationRequest, ResponseFormat};
use crate::models::language::Language;

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder {
    language: Language,
}

impl PromptBuilder {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Builds the request. Fails if any field is blank; the error lists them.
    pub fn build(&self, record: &FormRecord) -> Result<GenerationRequest, InvalidInputError> {
        let missing = record.missing_fields();
        if !missing.is_empty() {
            return Err(InvalidInputError::MissingFields(missing));
        }

        let mut prompt = String::new();
        prompt.push_str(header(self.language));
        prompt.push('\n');
        for field in FormField::ALL {
            // Writing into a String cannot fail.
            let _ = writeln!(
                prompt,
                "{}: {}",
                field.label(self.language),
                record.get(field).trim()
            );
        }
        prompt.push('\n');
        prompt.push_str(instructions(self.language));

        Ok(GenerationRequest {
            prompt_text: prompt,
            response_format: ResponseFormat::Text,
        })
    }
}
