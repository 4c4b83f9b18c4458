use serde::{Deserialize, Serialize};
use validator::Validate;

/// Body sent to `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub username: String,
}

/// Server acknowledgement of a login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
}
