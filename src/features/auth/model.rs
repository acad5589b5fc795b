use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_DEPARTMENT};

/// Caller identity extracted from a validated access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject claim; stored as `reports.user_id` / `votes.user_id`
    pub sub: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    pub fn is_department_staff(&self) -> bool {
        self.has_role(ROLE_DEPARTMENT)
    }

    /// Admins and department staff may triage and update reports
    pub fn has_staff_access(&self) -> bool {
        self.is_admin() || self.is_department_staff()
    }

    /// Owner of the report, or an admin acting on their behalf
    pub fn can_act_as_owner(&self, owner_id: &str) -> bool {
        self.sub == owner_id || self.is_admin()
    }
}

/// Application claims carried under the namespaced custom claim
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomClaims {
    #[serde(default)]
    pub roles: Vec<String>,
}
