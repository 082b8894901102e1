use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// `dashboardType` is one of financeiro, pedagogico, agenda, secretaria.
#[derive(ToSchema)]
#[schema(example = json!({"dashboardType": "financeiro", "proescId": "4442"}))]
pub struct EmbedRequestDoc {
    #[schema(rename = "dashboardType")]
    pub dashboard_type: String,
    #[schema(rename = "proescId")]
    pub proesc_id: String,
}

#[derive(ToSchema)]
pub struct EmbedTokenDoc {
    #[schema(rename = "iframeUrl")]
    pub iframe_url: String,
    #[schema(rename = "dashboardId")]
    pub dashboard_id: u32,
    #[schema(rename = "expiresIn")]
    pub expires_in: u64,
}

/// `action` is one of list_tickets, search_tickets, create_ticket, get_ticket.
#[derive(ToSchema)]
#[schema(example = json!({"action": "search_tickets", "query": "matrícula"}))]
pub struct TicketRequestDoc {
    pub action: String,
    pub query: Option<String>,
    pub subject: Option<String>,
    pub description: Option<String>,
    /// alta, media or baixa
    pub priority: Option<String>,
    #[schema(rename = "ticketId")]
    pub ticket_id: Option<String>,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::embed::issue,
        crate::routes::tickets::relay,
    ),
    components(
        schemas(
            HealthResponse,
            EmbedRequestDoc,
            EmbedTokenDoc,
            TicketRequestDoc,
            crate::errors::ErrorBody,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "metabase"),
        (name = "zendesk")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_both_functions() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/functions/v1/metabase-embed"));
        assert!(doc.paths.paths.contains_key("/functions/v1/zendesk-tickets"));
        assert!(doc.components.unwrap().security_schemes.contains_key("bearer"));
    }
}
