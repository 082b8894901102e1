use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::Role;

/// Local ticket status shown by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TicketStatus {
    #[serde(rename = "Pendente")]
    Pending,
    #[serde(rename = "Em Andamento")]
    InProgress,
    #[serde(rename = "Resolvido")]
    Resolved,
}

/// Local ticket priority shown by the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TicketPriority {
    #[serde(rename = "Alta")]
    High,
    #[serde(rename = "Média")]
    Medium,
    #[serde(rename = "Baixa")]
    Low,
}

/// Zendesk ticket status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZendeskStatus {
    New,
    Open,
    Pending,
    Hold,
    Solved,
    Closed,
}

/// Zendesk ticket priority vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZendeskPriority {
    Urgent,
    High,
    Normal,
    Low,
}

impl ZendeskStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "new" => Some(ZendeskStatus::New),
            "open" => Some(ZendeskStatus::Open),
            "pending" => Some(ZendeskStatus::Pending),
            "hold" => Some(ZendeskStatus::Hold),
            "solved" => Some(ZendeskStatus::Solved),
            "closed" => Some(ZendeskStatus::Closed),
            _ => None,
        }
    }

    pub fn to_local(self) -> TicketStatus {
        match self {
            ZendeskStatus::New | ZendeskStatus::Open => TicketStatus::Pending,
            ZendeskStatus::Pending | ZendeskStatus::Hold => TicketStatus::InProgress,
            ZendeskStatus::Solved | ZendeskStatus::Closed => TicketStatus::Resolved,
        }
    }
}

impl ZendeskPriority {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "urgent" => Some(ZendeskPriority::Urgent),
            "high" => Some(ZendeskPriority::High),
            "normal" => Some(ZendeskPriority::Normal),
            "low" => Some(ZendeskPriority::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ZendeskPriority::Urgent => "urgent",
            ZendeskPriority::High => "high",
            ZendeskPriority::Normal => "normal",
            ZendeskPriority::Low => "low",
        }
    }

    pub fn to_local(self) -> TicketPriority {
        match self {
            ZendeskPriority::Urgent | ZendeskPriority::High => TicketPriority::High,
            ZendeskPriority::Normal => TicketPriority::Medium,
            ZendeskPriority::Low => TicketPriority::Low,
        }
    }
}

impl TicketStatus {
    /// Unknown or missing statuses read as `Pendente`.
    pub fn from_external(raw: Option<&str>) -> Self {
        raw.and_then(ZendeskStatus::parse)
            .map(ZendeskStatus::to_local)
            .unwrap_or(TicketStatus::Pending)
    }
}

impl TicketPriority {
    /// Unknown or missing priorities read as `Média`.
    pub fn from_external(raw: Option<&str>) -> Self {
        raw.and_then(ZendeskPriority::parse)
            .map(ZendeskPriority::to_local)
            .unwrap_or(TicketPriority::Medium)
    }

    /// Parse a caller-supplied priority, in the portal's labels or Zendesk's.
    pub fn parse_requested(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "alta" | "high" | "urgent" | "urgente" => Some(TicketPriority::High),
            "média" | "media" | "medium" | "normal" => Some(TicketPriority::Medium),
            "baixa" | "low" => Some(TicketPriority::Low),
            _ => None,
        }
    }

    pub fn to_external(self) -> ZendeskPriority {
        match self {
            TicketPriority::High => ZendeskPriority::High,
            TicketPriority::Medium => ZendeskPriority::Normal,
            TicketPriority::Low => ZendeskPriority::Low,
        }
    }
}

/// Ticket as Zendesk returns it. Only the fields the portal reads.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct ZendeskTicket {
    pub id: u64,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, rename = "type")]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub organization_id: Option<u64>,
}

/// Ticket in the portal's vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ticket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: Option<String>,
    pub category: String,
    pub external_id: u64,
    pub external_url: String,
    pub tags: Vec<String>,
}

const DEFAULT_CATEGORY: &str = "Suporte";

impl Ticket {
    pub fn from_external(t: ZendeskTicket, external_url: String) -> Self {
        Self {
            id: t.id.to_string(),
            title: t.subject.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| "(sem assunto)".to_string()),
            description: t.description.unwrap_or_default(),
            status: TicketStatus::from_external(t.status.as_deref()),
            priority: TicketPriority::from_external(t.priority.as_deref()),
            created_at: t.created_at,
            category: t.ticket_type.filter(|s| !s.trim().is_empty()).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            external_id: t.id,
            external_url,
            tags: t.tags,
        }
    }
}

/// One page of tickets from a list or search call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketPage {
    pub tickets: Vec<ZendeskTicket>,
    pub count: Option<u64>,
}

/// Outgoing Zendesk create payload: `{"ticket": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTicket {
    pub ticket: NewTicketBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTicketBody {
    pub subject: String,
    pub comment: NewTicketComment,
    pub priority: &'static str,
    pub requester: Requester,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<u64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewTicketComment {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Requester {
    pub name: String,
    pub email: String,
}

/// Where the caller is allowed to look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketScope {
    Organization { school_id: Uuid, organization_id: u64 },
    /// Admin without a school: every organization.
    Global,
}

impl TicketScope {
    pub fn organization_id(&self) -> Option<u64> {
        match self {
            TicketScope::Organization { organization_id, .. } => Some(*organization_id),
            TicketScope::Global => None,
        }
    }
}

/// Why a request was answered with an empty, successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradedReason {
    UserWithoutSchool,
    OrganizationNotConfigured,
}

impl DegradedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegradedReason::UserWithoutSchool => "user_without_school",
            DegradedReason::OrganizationNotConfigured => "organization_not_configured",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            DegradedReason::UserWithoutSchool => "Usuário não está vinculado a nenhuma escola",
            DegradedReason::OrganizationNotConfigured => {
                "Organização do Zendesk não configurada para esta escola"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchInfo {
    pub organization_id: Option<String>,
    pub total_results: u64,
    pub user_role: Role,
    pub school_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegradedResult {
    pub error: DegradedReason,
    pub message: &'static str,
    pub tickets: Vec<Ticket>,
}

impl DegradedResult {
    pub fn new(reason: DegradedReason) -> Self {
        Self { error: reason, message: reason.message(), tickets: Vec::new() }
    }
}

/// Successful gateway outcomes, serialized as the response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GatewayResponse {
    TicketList { tickets: Vec<Ticket>, search_info: SearchInfo },
    Created { ticket: Ticket, message: &'static str },
    Ticket { ticket: Ticket },
    Degraded(DegradedResult),
}
