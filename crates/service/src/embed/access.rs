use std::sync::Arc;

use tracing::{instrument, warn, Span};

use common::metrics::EMBED_FAILURES_TOTAL;

use super::domain::{EmbedRequest, EmbedToken};
use super::errors::EmbedError;
use super::service::EmbedTokenIssuer;
use crate::directory::TenantDirectory;
use crate::identity::{resolve_caller, CallerContext, IdentityProvider};

/// Issues embed tokens on behalf of an authenticated caller.
///
/// Non-admins may only embed their own school's tenant: the requested
/// `proescId` must equal the `proesc_id` configured for the caller's school.
pub struct EmbedService {
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn TenantDirectory>,
    issuer: EmbedTokenIssuer,
}

impl EmbedService {
    pub fn new(identity: Arc<dyn IdentityProvider>, directory: Arc<dyn TenantDirectory>, issuer: EmbedTokenIssuer) -> Self {
        Self { identity, directory, issuer }
    }

    #[instrument(skip_all, fields(user_id = tracing::field::Empty, role = tracing::field::Empty))]
    pub async fn issue(&self, access_token: &str, req: &EmbedRequest) -> Result<EmbedToken, EmbedError> {
        let caller: CallerContext =
            resolve_caller::<EmbedError>(self.identity.as_ref(), self.directory.as_ref(), access_token).await?;
        let span = Span::current();
        span.record("user_id", tracing::field::display(caller.user_id));
        span.record("role", caller.role.as_str());

        if let Some(requested) = req.proesc_id.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if let Err(e) = self.authorize_tenant(&caller, requested).await {
                EMBED_FAILURES_TOTAL.with_label_values(&[e.kind()]).inc();
                return Err(e);
            }
        }
        self.issuer.issue(req)
    }

    async fn authorize_tenant(&self, caller: &CallerContext, requested: &str) -> Result<(), EmbedError> {
        if caller.role.is_admin() {
            return Ok(());
        }
        let own = match caller.school_id {
            Some(school_id) => self.directory.find_tenant_scope(school_id).await?.and_then(|s| s.proesc_id),
            None => None,
        };
        if own.as_deref() == Some(requested) {
            Ok(())
        } else {
            warn!(requested, own = ?own, school_id = ?caller.school_id, "embed requested for another tenant");
            Err(EmbedError::TenantNotAllowed(requested.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::repository::mock::MockTenantDirectory;
    use crate::directory::{Profile, TenantScope};
    use crate::identity::provider::mock::MockIdentityProvider;
    use crate::identity::{AuthUser, IdentityError, Role};
    use configs::MetabaseConfig;
    use uuid::Uuid;

    fn service(role: Role, school: Option<Uuid>, proesc: Option<&str>) -> EmbedService {
        let user = AuthUser { id: Uuid::new_v4(), email: Some("a@escola.br".into()), name: None };
        let identity = MockIdentityProvider::default().with_user("tok", user.clone());
        let mut directory = MockTenantDirectory::default().with_profile(Profile {
            user_id: user.id,
            email: None,
            name: None,
            role,
            school_id: school,
        });
        if let Some(school_id) = school {
            directory = directory.with_scope(TenantScope {
                school_id,
                proesc_id: proesc.map(str::to_string),
                zendesk_organization_id: None,
            });
        }
        let issuer = EmbedTokenIssuer::new(&MetabaseConfig { secret_key: Some("s".into()), ..Default::default() });
        EmbedService::new(Arc::new(identity), Arc::new(directory), issuer)
    }

    #[tokio::test]
    async fn own_tenant_is_signed() {
        let svc = service(Role::Gestor, Some(Uuid::new_v4()), Some("4442"));
        let tok = svc.issue("tok", &EmbedRequest::new("financeiro", "4442")).await.unwrap();
        assert_eq!(tok.dashboard_id, 52);
    }

    #[tokio::test]
    async fn other_tenant_is_refused() {
        let svc = service(Role::Gestor, Some(Uuid::new_v4()), Some("4442"));
        let err = svc.issue("tok", &EmbedRequest::new("financeiro", "9999")).await.unwrap_err();
        assert!(matches!(err, EmbedError::TenantNotAllowed(ref id) if id == "9999"));
    }

    #[tokio::test]
    async fn caller_without_school_or_mapping_is_refused() {
        let svc = service(Role::User, None, None);
        let err = svc.issue("tok", &EmbedRequest::new("agenda", "4442")).await.unwrap_err();
        assert!(matches!(err, EmbedError::TenantNotAllowed(_)));

        let svc = service(Role::Gestor, Some(Uuid::new_v4()), None);
        let err = svc.issue("tok", &EmbedRequest::new("agenda", "4442")).await.unwrap_err();
        assert!(matches!(err, EmbedError::TenantNotAllowed(_)));
    }

    #[tokio::test]
    async fn admin_may_embed_any_tenant() {
        let svc = service(Role::Admin, None, None);
        let tok = svc.issue("tok", &EmbedRequest::new("secretaria", "123")).await.unwrap();
        assert_eq!(tok.dashboard_id, 55);
    }

    #[tokio::test]
    async fn missing_tenant_id_still_reported_as_missing_parameter() {
        let svc = service(Role::User, None, None);
        let err = svc
            .issue("tok", &EmbedRequest { dashboard_type: Some("agenda".into()), proesc_id: None })
            .await
            .unwrap_err();
        assert!(matches!(err, EmbedError::MissingParameter("proescId")));
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let svc = service(Role::Admin, None, None);
        let err = svc.issue("forged", &EmbedRequest::new("agenda", "1")).await.unwrap_err();
        assert!(matches!(err, EmbedError::Identity(IdentityError::Unauthorized)));
    }
}
