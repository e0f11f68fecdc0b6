// Public API - what other modules can use
pub use middleware::caller_auth;
pub use token::TokenConfig;
pub use types::CallerClaims;

mod middleware;
mod token;
mod types;

use tracing::warn;

use crate::shared::AppError;

/// Who may run admin commands: the owner, or holders of the admin role
#[derive(Debug, Clone)]
pub struct AdminPolicy {
    owner_id: String,
    admin_role_id: Option<String>,
}

impl AdminPolicy {
    pub fn new(owner_id: String, admin_role_id: Option<String>) -> Self {
        Self {
            owner_id,
            admin_role_id,
        }
    }

    pub fn is_admin(&self, claims: &CallerClaims) -> bool {
        claims.sub == self.owner_id
            || self
                .admin_role_id
                .as_deref()
                .is_some_and(|role| claims.has_role(role))
    }

    /// Must run before any admin mutation
    pub fn require_admin(&self, claims: &CallerClaims) -> Result<(), AppError> {
        if self.is_admin(claims) {
            return Ok(());
        }
        warn!(user_id = %claims.sub, "Admin command refused");
        Err(AppError::Forbidden(
            "This command is reserved to administrators".to_string(),
        ))
    }
}
