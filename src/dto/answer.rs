use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use crate::dto::validation::validate_guess_title;

/// Body sent to `POST /game/answer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub title: String,
}

impl Validate for AnswerRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_guess_title(&self.title) {
            errors.add("title", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Verdict returned by the server for a submitted answer.
///
/// The service currently answers `ok` or `ko` but the field is free-form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub message: String,
}
