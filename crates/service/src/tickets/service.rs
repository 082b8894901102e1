use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument, warn, Span};

use common::metrics::DEGRADED_RESULTS_TOTAL;

use super::action::TicketAction;
use super::client::HelpdeskClient;
use super::domain::{
    DegradedReason, DegradedResult, GatewayResponse, NewTicket, NewTicketBody, NewTicketComment,
    Requester, SearchInfo, Ticket, TicketPage, TicketScope,
};
use super::errors::GatewayError;
use crate::directory::TenantDirectory;
use crate::identity::{resolve_caller, CallerContext, IdentityProvider};

/// Outcome of tenant-scope resolution for one caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeResolution {
    Scoped(TicketScope),
    Degraded(DegradedReason),
}

/// Authenticates the caller, pins them to their school's helpdesk
/// organization and relays one ticket operation.
pub struct TicketGateway {
    identity: Arc<dyn IdentityProvider>,
    directory: Arc<dyn TenantDirectory>,
    helpdesk: Arc<dyn HelpdeskClient>,
    ticket_tag: String,
}

impl TicketGateway {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        directory: Arc<dyn TenantDirectory>,
        helpdesk: Arc<dyn HelpdeskClient>,
        ticket_tag: impl Into<String>,
    ) -> Self {
        Self { identity, directory, helpdesk, ticket_tag: ticket_tag.into() }
    }

    /// Run one request end to end: authenticate, resolve scope, dispatch.
    #[instrument(
        skip(self, access_token, body),
        fields(
            user_id = tracing::field::Empty,
            role = tracing::field::Empty,
            school_id = tracing::field::Empty,
            action = body.get("action").and_then(serde_json::Value::as_str).unwrap_or("")
        )
    )]
    pub async fn handle(&self, access_token: &str, body: &Value) -> Result<GatewayResponse, GatewayError> {
        let caller = self.resolve_caller(access_token).await?;
        let span = Span::current();
        span.record("user_id", tracing::field::display(caller.user_id));
        span.record("role", caller.role.as_str());
        if let Some(school) = caller.school_id {
            span.record("school_id", tracing::field::display(school));
        }

        let scope = match self.resolve_scope(&caller).await? {
            ScopeResolution::Scoped(scope) => scope,
            ScopeResolution::Degraded(reason) => {
                DEGRADED_RESULTS_TOTAL.with_label_values(&[reason.as_str()]).inc();
                warn!(reason = reason.as_str(), "ticket request answered with degraded result");
                return Ok(GatewayResponse::Degraded(DegradedResult::new(reason)));
            }
        };

        let action = TicketAction::from_value(body)?;
        let result = self.dispatch(&caller, scope, action).await;
        if let Err(e) = &result {
            error!(code = e.code(), err = %e, organization_id = ?scope.organization_id(), "ticket request failed");
        }
        result
    }

    pub async fn resolve_caller(&self, access_token: &str) -> Result<CallerContext, GatewayError> {
        resolve_caller(self.identity.as_ref(), self.directory.as_ref(), access_token).await
    }

    /// Non-admins are pinned to their school's organization. An admin without a
    /// school sees every organization.
    pub async fn resolve_scope(&self, caller: &CallerContext) -> Result<ScopeResolution, GatewayError> {
        let Some(school_id) = caller.school_id else {
            return Ok(if caller.role.is_admin() {
                info!("admin without school: global ticket scope");
                ScopeResolution::Scoped(TicketScope::Global)
            } else {
                ScopeResolution::Degraded(DegradedReason::UserWithoutSchool)
            });
        };

        let raw_org = self
            .directory
            .find_tenant_scope(school_id)
            .await?
            .and_then(|s| s.zendesk_organization_id);
        let Some(raw_org) = raw_org else {
            return Ok(ScopeResolution::Degraded(DegradedReason::OrganizationNotConfigured));
        };
        let organization_id = raw_org.parse::<u64>().map_err(|_| {
            GatewayError::Configuration(format!(
                "school {school_id} has non-numeric zendesk organization id {raw_org:?}"
            ))
        })?;
        Ok(ScopeResolution::Scoped(TicketScope::Organization { school_id, organization_id }))
    }

    async fn dispatch(
        &self,
        caller: &CallerContext,
        scope: TicketScope,
        action: TicketAction,
    ) -> Result<GatewayResponse, GatewayError> {
        info!(action = action.name(), organization_id = ?scope.organization_id(), "dispatching ticket action");
        match action {
            TicketAction::ListTickets => {
                let page = self.helpdesk.list_tickets(scope.organization_id()).await?;
                Ok(self.ticket_list(caller, scope, page))
            }
            TicketAction::SearchTickets { query } => {
                let page = self.helpdesk.search_tickets(&search_expression(&query, scope)).await?;
                Ok(self.ticket_list(caller, scope, page))
            }
            TicketAction::CreateTicket { subject, description, priority } => {
                let payload = NewTicket {
                    ticket: NewTicketBody {
                        subject,
                        comment: NewTicketComment { body: description },
                        priority: priority.to_external().as_str(),
                        requester: Requester { name: caller.name.clone(), email: caller.email.clone() },
                        organization_id: scope.organization_id(),
                        tags: vec![self.ticket_tag.clone()],
                    },
                };
                let created = self.helpdesk.create_ticket(&payload).await?;
                info!(ticket_id = created.id, "ticket created");
                Ok(GatewayResponse::Created { ticket: self.normalize(created), message: "Ticket criado com sucesso" })
            }
            TicketAction::GetTicket { ticket_id } => {
                let ticket = self.helpdesk.get_ticket(ticket_id).await?;
                Ok(GatewayResponse::Ticket { ticket: self.normalize(ticket) })
            }
        }
    }

    fn normalize(&self, t: super::domain::ZendeskTicket) -> Ticket {
        let url = self.helpdesk.ticket_url(t.id);
        Ticket::from_external(t, url)
    }

    fn ticket_list(&self, caller: &CallerContext, scope: TicketScope, page: TicketPage) -> GatewayResponse {
        let tickets: Vec<Ticket> = page.tickets.into_iter().map(|t| self.normalize(t)).collect();
        let search_info = SearchInfo {
            organization_id: scope.organization_id().map(|id| id.to_string()),
            total_results: page.count.unwrap_or(tickets.len() as u64),
            user_role: caller.role,
            school_id: caller.school_id,
        };
        GatewayResponse::TicketList { tickets, search_info }
    }
}

/// `type:ticket {query}` plus the organization qualifier when scoped.
pub fn search_expression(query: &str, scope: TicketScope) -> String {
    match scope.organization_id() {
        Some(org) => format!("type:ticket {} organization:{}", query.trim(), org),
        None => format!("type:ticket {}", query.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::repository::mock::MockTenantDirectory;
    use crate::directory::{Profile, TenantScope};
    use crate::identity::provider::mock::MockIdentityProvider;
    use crate::identity::{AuthUser, IdentityError, Role};
    use crate::tickets::client::mock::{HelpdeskCall, RecordingHelpdesk};
    use crate::tickets::domain::{TicketPriority, TicketStatus, ZendeskTicket};
    use crate::tickets::errors::HelpdeskError;
    use serde_json::json;
    use uuid::Uuid;

    struct Fixture {
        gateway: TicketGateway,
        helpdesk: Arc<RecordingHelpdesk>,
    }

    fn fixture(role: Role, school: Option<Uuid>, org: Option<&str>, helpdesk: RecordingHelpdesk) -> Fixture {
        let user = AuthUser { id: Uuid::new_v4(), email: Some("auth@escola.br".into()), name: None };
        let identity = MockIdentityProvider::default().with_user("tok", user.clone());
        let mut directory = MockTenantDirectory::default().with_profile(Profile {
            user_id: user.id,
            email: Some("gestora@escola.br".into()),
            name: Some("Gestora".into()),
            role,
            school_id: school,
        });
        if let Some(school_id) = school {
            directory = directory.with_scope(TenantScope {
                school_id,
                proesc_id: Some("4442".into()),
                zendesk_organization_id: org.map(str::to_string),
            });
        }
        let helpdesk = Arc::new(helpdesk);
        let gateway = TicketGateway::new(Arc::new(identity), Arc::new(directory), helpdesk.clone(), "prime_hub");
        Fixture { gateway, helpdesk }
    }

    fn sample_tickets() -> Vec<ZendeskTicket> {
        vec![
            ZendeskTicket { id: 2, subject: Some("Boleto".into()), status: Some("open".into()), priority: Some("urgent".into()), ..Default::default() },
            ZendeskTicket { id: 1, subject: Some("Acesso".into()), status: Some("solved".into()), priority: Some("low".into()), ..Default::default() },
        ]
    }

    #[tokio::test]
    async fn user_without_school_gets_degraded_result_and_no_helpdesk_call() {
        let f = fixture(Role::User, None, None, RecordingHelpdesk::with_tickets(sample_tickets()));
        let resp = f.gateway.handle("tok", &json!({"action": "list_tickets"})).await.unwrap();
        assert_eq!(resp, GatewayResponse::Degraded(DegradedResult::new(DegradedReason::UserWithoutSchool)));
        assert!(f.helpdesk.calls().is_empty());
    }

    #[tokio::test]
    async fn gestor_without_school_cannot_create_either() {
        let f = fixture(Role::Gestor, None, None, RecordingHelpdesk::default());
        let resp = f
            .gateway
            .handle("tok", &json!({"action": "create_ticket", "subject": "s", "description": "d"}))
            .await
            .unwrap();
        assert!(matches!(resp, GatewayResponse::Degraded(ref d) if d.error == DegradedReason::UserWithoutSchool));
        assert!(f.helpdesk.calls().is_empty());
    }

    #[tokio::test]
    async fn school_without_organization_is_degraded() {
        let f = fixture(Role::Gestor, Some(Uuid::new_v4()), None, RecordingHelpdesk::default());
        let resp = f.gateway.handle("tok", &json!({"action": "list_tickets"})).await.unwrap();
        assert!(matches!(resp, GatewayResponse::Degraded(ref d) if d.error == DegradedReason::OrganizationNotConfigured));
        assert!(f.helpdesk.calls().is_empty());
    }

    #[tokio::test]
    async fn admin_with_school_but_no_organization_is_degraded_too() {
        let f = fixture(Role::Admin, Some(Uuid::new_v4()), None, RecordingHelpdesk::default());
        let resp = f.gateway.handle("tok", &json!({"action": "list_tickets"})).await.unwrap();
        assert!(matches!(resp, GatewayResponse::Degraded(ref d) if d.error == DegradedReason::OrganizationNotConfigured));
    }

    #[tokio::test]
    async fn admin_without_school_lists_globally() {
        let f = fixture(Role::Admin, None, None, RecordingHelpdesk::with_tickets(sample_tickets()));
        let resp = f.gateway.handle("tok", &json!({"action": "list_tickets"})).await.unwrap();
        assert_eq!(f.helpdesk.calls(), vec![HelpdeskCall::List(None)]);
        match resp {
            GatewayResponse::TicketList { tickets, search_info } => {
                assert_eq!(tickets.len(), 2);
                assert_eq!(search_info.organization_id, None);
                assert_eq!(search_info.user_role, Role::Admin);
                assert_eq!(search_info.total_results, 2);
            }
            other => panic!("unexpected response: {other:?}"),
        }
    }

    #[tokio::test]
    async fn gestor_lists_own_organization_with_normalized_vocabulary() {
        let school = Uuid::new_v4();
        let f = fixture(Role::Gestor, Some(school), Some("987"), RecordingHelpdesk::with_tickets(sample_tickets()));
        let resp = f.gateway.handle("tok", &json!({"action": "list_tickets"})).await.unwrap();
        assert_eq!(f.helpdesk.calls(), vec![HelpdeskCall::List(Some(987))]);
        let GatewayResponse::TicketList { tickets, search_info } = resp else { panic!("expected ticket list") };
        assert_eq!(search_info.organization_id.as_deref(), Some("987"));
        assert_eq!(search_info.school_id, Some(school));
        assert_eq!(tickets[0].status, TicketStatus::Pending);
        assert_eq!(tickets[0].priority, TicketPriority::High);
        assert_eq!(tickets[1].status, TicketStatus::Resolved);
        assert_eq!(tickets[1].external_url, "https://helpdesk.test/agent/tickets/1");
    }

    #[tokio::test]
    async fn search_is_scoped_to_organization() {
        let f = fixture(Role::Gestor, Some(Uuid::new_v4()), Some("987"), RecordingHelpdesk::default());
        f.gateway.handle("tok", &json!({"action": "search_tickets", "query": "matrícula"})).await.unwrap();
        let calls = f.helpdesk.calls();
        let HelpdeskCall::Search(q) = &calls[0] else { panic!("expected search") };
        assert!(q.contains("type:ticket matrícula"));
        assert!(q.contains("organization:987"));
    }

    #[tokio::test]
    async fn create_uses_resolved_identity_and_scope_not_body() {
        let f = fixture(Role::Gestor, Some(Uuid::new_v4()), Some("987"), RecordingHelpdesk::default());
        let resp = f
            .gateway
            .handle(
                "tok",
                &json!({
                    "action": "create_ticket",
                    "subject": "Erro na matrícula",
                    "description": "Não consigo matricular",
                    "priority": "Alta",
                    "organization_id": 1,
                    "organizationId": "1",
                    "requester": {"name": "Intruso", "email": "intruso@x.com"},
                    "email": "intruso@x.com"
                }),
            )
            .await
            .unwrap();

        let calls = f.helpdesk.calls();
        let HelpdeskCall::Create(payload) = &calls[0] else { panic!("expected create") };
        assert_eq!(payload.ticket.organization_id, Some(987));
        assert_eq!(payload.ticket.requester.email, "gestora@escola.br");
        assert_eq!(payload.ticket.requester.name, "Gestora");
        assert_eq!(payload.ticket.priority, "high");
        assert_eq!(payload.ticket.tags, vec!["prime_hub".to_string()]);
        assert!(matches!(resp, GatewayResponse::Created { .. }));
    }

    #[tokio::test]
    async fn get_ticket_passes_id_through() {
        let f = fixture(Role::Gestor, Some(Uuid::new_v4()), Some("987"), RecordingHelpdesk::with_tickets(sample_tickets()));
        let resp = f.gateway.handle("tok", &json!({"action": "get_ticket", "ticketId": "2"})).await.unwrap();
        assert_eq!(f.helpdesk.calls(), vec![HelpdeskCall::Get(2)]);
        let GatewayResponse::Ticket { ticket } = resp else { panic!("expected ticket") };
        assert_eq!(ticket.title, "Boleto");
    }

    #[tokio::test]
    async fn bad_token_is_unauthorized() {
        let f = fixture(Role::Gestor, Some(Uuid::new_v4()), Some("987"), RecordingHelpdesk::default());
        let err = f.gateway.handle("nope", &json!({"action": "list_tickets"})).await.unwrap_err();
        assert!(matches!(err, GatewayError::Identity(IdentityError::Unauthorized)));
        assert!(f.helpdesk.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_action_is_invalid() {
        let f = fixture(Role::Gestor, Some(Uuid::new_v4()), Some("987"), RecordingHelpdesk::default());
        let err = f.gateway.handle("tok", &json!({"action": "close_all"})).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidAction(_)));
    }

    #[tokio::test]
    async fn upstream_failures_are_reported_not_emptied() {
        let f = fixture(Role::Gestor, Some(Uuid::new_v4()), Some("987"), RecordingHelpdesk::failing(503));
        let err = f.gateway.handle("tok", &json!({"action": "list_tickets"})).await.unwrap_err();
        assert!(matches!(err, GatewayError::Helpdesk(HelpdeskError::Upstream { status: 503, .. })));
    }

    #[tokio::test]
    async fn non_numeric_organization_is_configuration_error() {
        let f = fixture(Role::Gestor, Some(Uuid::new_v4()), Some("org-987"), RecordingHelpdesk::default());
        let err = f.gateway.handle("tok", &json!({"action": "list_tickets"})).await.unwrap_err();
        assert!(matches!(err, GatewayError::Configuration(_)));
        assert!(f.helpdesk.calls().is_empty());
    }

    #[test]
    fn global_search_has_no_organization_qualifier() {
        assert_eq!(search_expression(" boleto ", TicketScope::Global), "type:ticket boleto");
    }
}
