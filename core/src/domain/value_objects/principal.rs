//! Already-authenticated caller identity supplied by the identity layer.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role required for every mutating marketplace operation
pub const ROLE_USER: &str = "ROLE_USER";

/// Resolved principal: the core authorizes, it never authenticates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(user_id: Uuid, roles: Vec<String>) -> Self {
        Self { user_id, roles }
    }

    /// Principal holding the standard user role
    pub fn user(user_id: Uuid) -> Self {
        Self::new(user_id, vec![ROLE_USER.to_string()])
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
