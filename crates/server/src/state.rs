use std::sync::Arc;

use service::embed::EmbedService;
use service::tickets::TicketGateway;

/// Shared per-process handles. Nothing request-scoped lives here.
#[derive(Clone)]
pub struct ServerState {
    pub embed: Arc<EmbedService>,
    pub tickets: Arc<TicketGateway>,
}
