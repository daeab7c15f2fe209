//! E-mail/password verification against stored admin accounts.

use std::sync::Arc;

use once_cell::sync::Lazy;
use tracing::error;

use super::{password::PasswordService, session::SessionClaims};
use crate::store::{StoreError, UserRepository};

/// Verified when the e-mail is unknown so both failure paths cost the same.
static DUMMY_HASH: Lazy<Option<String>> =
    Lazy::new(|| PasswordService::hash_password_with_cost("dummy-password", 4).ok());

#[derive(Clone)]
pub struct CredentialVerifier {
    users: Arc<dyn UserRepository>,
}

impl CredentialVerifier {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Returns the session claims on a match and `None` otherwise, without
    /// revealing whether the e-mail or the password was wrong.
    pub fn verify(&self, email: &str, password: &str) -> Result<Option<SessionClaims>, StoreError> {
        let Some(user) = self.users.find_by_email(email)? else {
            if let Some(hash) = DUMMY_HASH.as_deref() {
                let _ = PasswordService::verify_password(password, hash);
            }
            return Ok(None);
        };

        match PasswordService::verify_password(password, &user.password_hash) {
            Ok(true) => Ok(Some(SessionClaims {
                id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
            })),
            Ok(false) => Ok(None),
            Err(e) => {
                error!(user_id = %user.id, error = %e, "Stored password hash is unreadable");
                Ok(None)
            }
        }
    }
}
