use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::directory::domain::Profile;

/// Portal role, as stored in `profiles.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Gestor,
    User,
}

impl Role {
    /// Unknown or missing roles get the least privileged role.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
            Some("admin") => Role::Admin,
            Some("gestor") => Role::Gestor,
            _ => Role::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Gestor => "gestor",
            Role::User => "user",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// User as reported by the identity provider for a valid access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
}

/// Everything the functions know about the caller for the duration of one request.
/// Built fresh per request and never cached across requests.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerContext {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub school_id: Option<Uuid>,
}

impl CallerContext {
    /// Merge the provider's view of the user with the portal profile row.
    /// Profile fields win; the provider fills the gaps.
    pub fn from_parts(user: &AuthUser, profile: Option<&Profile>) -> Self {
        let email = profile
            .and_then(|p| p.email.clone())
            .or_else(|| user.email.clone())
            .unwrap_or_default();
        let name = profile
            .and_then(|p| p.name.clone())
            .or_else(|| user.name.clone())
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());
        Self {
            user_id: user.id,
            email,
            name,
            role: profile.map(|p| p.role).unwrap_or(Role::User),
            school_id: profile.and_then(|p| p.school_id),
        }
    }
}
