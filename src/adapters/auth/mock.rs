//! Mock authentication adapter for testing.
//!
//! Implements the `SessionValidator` port without a real identity provider.
//! Tokens map to principal ids; anything unknown is invalid.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::foundation::{AuthError, UserId};
use crate::ports::SessionValidator;

/// Mock session validator for testing.
///
/// Stores a map of tokens to principal ids. Tokens not in the map return
/// `InvalidToken`.
#[derive(Debug, Default)]
pub struct MockSessionValidator {
    tokens: RwLock<HashMap<String, UserId>>,
    /// Optional error to return for all validations (for error testing)
    force_error: RwLock<Option<AuthError>>,
}

impl MockSessionValidator {
    /// Creates a new empty mock validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a valid token that maps to a principal.
    pub fn with_token(self, token: impl Into<String>, uid: impl Into<String>) -> Self {
        let uid = UserId::new(uid.into()).expect("test uid must be non-empty");
        self.tokens.write().unwrap().insert(token.into(), uid);
        self
    }

    /// Forces all validations to return the specified error.
    pub fn with_error(self, error: AuthError) -> Self {
        *self.force_error.write().unwrap() = Some(error);
        self
    }
}

#[async_trait]
impl SessionValidator for MockSessionValidator {
    async fn verify_token(&self, token: &str) -> Result<UserId, AuthError> {
        if let Some(err) = self.force_error.read().unwrap().clone() {
            return Err(err);
        }
        self.tokens
            .read()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)
    }
}
