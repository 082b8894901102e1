use async_trait::async_trait;

use super::domain::{NewTicket, TicketPage, ZendeskTicket};
use super::errors::HelpdeskError;

/// The helpdesk REST operations the gateway relays. All listings are sorted
/// by creation time, newest first.
#[async_trait]
pub trait HelpdeskClient: Send + Sync {
    /// Tickets of one organization, or of every organization when `None`.
    async fn list_tickets(&self, organization_id: Option<u64>) -> Result<TicketPage, HelpdeskError>;
    /// Raw helpdesk search expression, qualifiers included.
    async fn search_tickets(&self, query: &str) -> Result<TicketPage, HelpdeskError>;
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<ZendeskTicket, HelpdeskError>;
    async fn get_ticket(&self, ticket_id: u64) -> Result<ZendeskTicket, HelpdeskError>;
    /// Agent-facing deep link for a ticket.
    fn ticket_url(&self, ticket_id: u64) -> String;
}

/// Recording helpdesk for tests: canned tickets, every call logged.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    pub enum HelpdeskCall {
        List(Option<u64>),
        Search(String),
        Create(NewTicket),
        Get(u64),
    }

    #[derive(Default)]
    pub struct RecordingHelpdesk {
        tickets: Vec<ZendeskTicket>,
        fail_with: Option<u16>,
        calls: Mutex<Vec<HelpdeskCall>>,
    }

    impl RecordingHelpdesk {
        pub fn with_tickets(tickets: Vec<ZendeskTicket>) -> Self {
            Self { tickets, ..Default::default() }
        }

        pub fn failing(status: u16) -> Self {
            Self { fail_with: Some(status), ..Default::default() }
        }

        pub fn calls(&self) -> Vec<HelpdeskCall> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: HelpdeskCall) -> Result<(), HelpdeskError> {
            self.calls.lock().unwrap().push(call);
            match self.fail_with {
                Some(status) => Err(HelpdeskError::Upstream { status, body: "mock failure".into() }),
                None => Ok(()),
            }
        }

        fn page(&self) -> TicketPage {
            TicketPage { tickets: self.tickets.clone(), count: Some(self.tickets.len() as u64) }
        }
    }

    #[async_trait]
    impl HelpdeskClient for RecordingHelpdesk {
        async fn list_tickets(&self, organization_id: Option<u64>) -> Result<TicketPage, HelpdeskError> {
            self.record(HelpdeskCall::List(organization_id))?;
            Ok(self.page())
        }

        async fn search_tickets(&self, query: &str) -> Result<TicketPage, HelpdeskError> {
            self.record(HelpdeskCall::Search(query.to_string()))?;
            Ok(self.page())
        }

        async fn create_ticket(&self, ticket: &NewTicket) -> Result<ZendeskTicket, HelpdeskError> {
            self.record(HelpdeskCall::Create(ticket.clone()))?;
            Ok(ZendeskTicket {
                id: 1000,
                subject: Some(ticket.ticket.subject.clone()),
                description: Some(ticket.ticket.comment.body.clone()),
                status: Some("new".into()),
                priority: Some(ticket.ticket.priority.to_string()),
                tags: ticket.ticket.tags.clone(),
                organization_id: ticket.ticket.organization_id,
                ..Default::default()
            })
        }

        async fn get_ticket(&self, ticket_id: u64) -> Result<ZendeskTicket, HelpdeskError> {
            self.record(HelpdeskCall::Get(ticket_id))?;
            self.tickets
                .iter()
                .find(|t| t.id == ticket_id)
                .cloned()
                .ok_or(HelpdeskError::Upstream { status: 404, body: "RecordNotFound".into() })
        }

        fn ticket_url(&self, ticket_id: u64) -> String {
            format!("https://helpdesk.test/agent/tickets/{ticket_id}")
        }
    }
}
