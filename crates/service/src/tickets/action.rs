use serde_json::Value;

use super::domain::TicketPriority;
use super::errors::GatewayError;

/// One helpdesk operation requested by the portal.
///
/// Parsed by hand from the raw body: an unknown `action` maps to
/// `InvalidAction`, absent fields to `MissingParameter`. Requester and
/// organization are never read from the body.
#[derive(Debug, Clone, PartialEq)]
pub enum TicketAction {
    ListTickets,
    SearchTickets { query: String },
    CreateTicket { subject: String, description: String, priority: TicketPriority },
    GetTicket { ticket_id: u64 },
}

impl TicketAction {
    pub fn name(&self) -> &'static str {
        match self {
            TicketAction::ListTickets => "list_tickets",
            TicketAction::SearchTickets { .. } => "search_tickets",
            TicketAction::CreateTicket { .. } => "create_ticket",
            TicketAction::GetTicket { .. } => "get_ticket",
        }
    }

    pub fn from_value(body: &Value) -> Result<Self, GatewayError> {
        let action = body.get("action").and_then(Value::as_str).unwrap_or_default();
        match action {
            "list_tickets" => Ok(TicketAction::ListTickets),
            "search_tickets" => Ok(TicketAction::SearchTickets {
                query: required_str(body, "query")?,
            }),
            "create_ticket" => {
                let subject = required_str(body, "subject")?;
                let description = required_str(body, "description")?;
                let priority = body
                    .get("priority")
                    .and_then(Value::as_str)
                    .and_then(TicketPriority::parse_requested)
                    .unwrap_or(TicketPriority::Medium);
                Ok(TicketAction::CreateTicket { subject, description, priority })
            }
            "get_ticket" => Ok(TicketAction::GetTicket { ticket_id: ticket_id(body)? }),
            other => Err(GatewayError::InvalidAction(other.to_string())),
        }
    }
}

fn required_str(body: &Value, field: &'static str) -> Result<String, GatewayError> {
    body.get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(GatewayError::MissingParameter(field))
}

fn ticket_id(body: &Value) -> Result<u64, GatewayError> {
    match body.get("ticketId") {
        None | Some(Value::Null) => Err(GatewayError::MissingParameter("ticketId")),
        Some(Value::Number(n)) => n.as_u64().ok_or(GatewayError::InvalidParameter("ticketId")),
        Some(Value::String(s)) if s.trim().is_empty() => Err(GatewayError::MissingParameter("ticketId")),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| GatewayError::InvalidParameter("ticketId")),
        Some(_) => Err(GatewayError::InvalidParameter("ticketId")),
    }
}
