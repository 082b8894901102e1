use uuid::Uuid;

use crate::identity::Role;

/// Portal profile of an authenticated user.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Role,
    pub school_id: Option<Uuid>,
}

impl From<models::profile::Model> for Profile {
    fn from(m: models::profile::Model) -> Self {
        Self {
            user_id: m.id,
            email: m.email,
            name: m.name,
            role: Role::parse(m.role.as_deref()),
            school_id: m.school_id,
        }
    }
}

/// External identifiers configured for one school. Either id may be missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TenantScope {
    pub school_id: Uuid,
    pub proesc_id: Option<String>,
    pub zendesk_organization_id: Option<String>,
}

impl From<models::school_customization::Model> for TenantScope {
    fn from(m: models::school_customization::Model) -> Self {
        Self {
            school_id: m.school_id,
            proesc_id: non_blank(m.proesc_id),
            zendesk_organization_id: non_blank(m.zendesk_organization_id),
        }
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
