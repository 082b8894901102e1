//! Zendesk ticket relay scoped to the caller's school.

pub mod action;
pub mod client;
pub mod domain;
pub mod errors;
pub mod service;
pub mod zendesk;

pub use action::TicketAction;
pub use client::HelpdeskClient;
pub use domain::{DegradedReason, GatewayResponse, Ticket, TicketPriority, TicketStatus};
pub use errors::{GatewayError, HelpdeskError};
pub use service::{ScopeResolution, TicketGateway};
pub use zendesk::ZendeskClient;
