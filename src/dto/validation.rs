//! Validation helpers for outgoing request payloads.

use validator::ValidationError;

/// Longest guess the client is willing to send.
const MAX_GUESS_LENGTH: usize = 200;

/// Validates that a guessed title is neither blank nor unreasonably long.
///
/// # Examples
///
/// ```ignore
/// validate_guess_title("Inception") // Ok
/// validate_guess_title("   ")       // Err - blank
/// ```
pub fn validate_guess_title(title: &str) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        let mut err = ValidationError::new("guess_blank");
        err.message = Some("Guess must not be blank".into());
        return Err(err);
    }

    let length = title.chars().count();
    if length > MAX_GUESS_LENGTH {
        let mut err = ValidationError::new("guess_length");
        err.message = Some(
            format!("Guess must be at most {MAX_GUESS_LENGTH} characters (got {length})").into(),
        );
        return Err(err);
    }

    Ok(())
}
