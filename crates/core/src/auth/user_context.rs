//! Identity and permission view over decoded claims

use authkit_domain::{AssuranceLevel, JwtClaims};
use serde::{Deserialize, Serialize};

use crate::rbac::check_permission;

pub const ADMIN_ROLE: &str = "admin";
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Permission and role checks over whatever grants a type carries.
///
/// Matching follows [`matches_permission`](crate::rbac::matches_permission)
/// against the type's own permission list; no role catalog is consulted.
pub trait Grants {
    fn granted_permissions(&self) -> &[String];

    fn granted_roles(&self) -> &[String];

    fn has_permission(&self, required: &str) -> bool {
        check_permission(self.granted_permissions(), required)
    }

    /// `false` for an empty list.
    fn has_any_permission(&self, required: &[&str]) -> bool {
        required.iter().any(|permission| self.has_permission(permission))
    }

    /// `true` for an empty list.
    fn has_all_permissions(&self, required: &[&str]) -> bool {
        required.iter().all(|permission| self.has_permission(permission))
    }

    fn has_role(&self, role: &str) -> bool {
        self.granted_roles().iter().any(|granted| granted == role)
    }

    fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }

    fn is_admin(&self) -> bool {
        self.has_any_role(&[ADMIN_ROLE, SUPER_ADMIN_ROLE])
    }

    fn is_super_admin(&self) -> bool {
        self.has_role(SUPER_ADMIN_ROLE)
    }
}

/// Read-only identity built fresh from a token on every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserContext {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub tenant_id: Option<String>,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    pub scopes: Vec<String>,
    pub assurance_level: AssuranceLevel,
    /// The full decoded payload, including unmodelled claims.
    pub claims: JwtClaims,
}

impl From<JwtClaims> for UserContext {
    fn from(claims: JwtClaims) -> Self {
        Self {
            user_id: claims.sub.clone(),
            email: claims.email.clone(),
            name: claims.name.clone(),
            tenant_id: claims.tenant_id.clone(),
            roles: claims.roles.clone(),
            permissions: claims.permissions.clone(),
            scopes: claims.scopes().map(str::to_string).collect(),
            assurance_level: claims.assurance_level(),
            claims,
        }
    }
}

impl UserContext {
    #[must_use]
    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.iter().any(|granted| granted == scope)
    }
}

impl Grants for UserContext {
    fn granted_permissions(&self) -> &[String] {
        &self.permissions
    }

    fn granted_roles(&self) -> &[String] {
        &self.roles
    }
}

impl Grants for JwtClaims {
    fn granted_permissions(&self) -> &[String] {
        &self.permissions
    }

    fn granted_roles(&self) -> &[String] {
        &self.roles
    }
}
