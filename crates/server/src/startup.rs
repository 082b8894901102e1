use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use configs::AppConfig;
use service::directory::{repo::seaorm::SeaOrmTenantDirectory, TenantDirectory};
use service::embed::{EmbedService, EmbedTokenIssuer};
use service::http_client::build_http_client;
use service::identity::{IdentityProvider, SupabaseIdentityProvider};
use service::retry::RetryPolicy;
use service::tickets::{HelpdeskClient, TicketGateway, ZendeskClient};

use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Wire the production collaborators from configuration.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<ServerState> {
    let http = build_http_client(&cfg.http).context("building HTTP client")?;

    let db = models::db::connect_with_config(&cfg.database).await?;

    let identity: Arc<dyn IdentityProvider> = Arc::new(SupabaseIdentityProvider::new(http.clone(), &cfg.supabase));
    let directory: Arc<dyn TenantDirectory> = Arc::new(SeaOrmTenantDirectory { db });
    let helpdesk: Arc<dyn HelpdeskClient> =
        Arc::new(ZendeskClient::new(http, &cfg.zendesk, RetryPolicy::from_config(&cfg.http.retry)));

    let issuer = EmbedTokenIssuer::new(&cfg.metabase);
    Ok(ServerState {
        embed: Arc::new(EmbedService::new(Arc::clone(&identity), Arc::clone(&directory), issuer)),
        tickets: Arc::new(TicketGateway::new(identity, directory, helpdesk, cfg.zendesk.ticket_tag.clone())),
    })
}

pub fn build_app(state: ServerState) -> Router {
    routes::build_router(state, build_cors())
}

/// Serve until `shutdown` resolves.
pub async fn run(cfg: AppConfig, shutdown: impl std::future::Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
    if cfg.metabase.secret_key.is_none() {
        warn!("METABASE_SECRET_KEY not set; embed requests will fail with a configuration error");
    }
    if cfg.zendesk.api_token.is_none() {
        warn!("ZENDESK_API_TOKEN not set; ticket requests will fail with a configuration error");
    }

    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", cfg.server.host, cfg.server.port))?;
    info!(%addr, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).with_graceful_shutdown(shutdown).await?;
    info!("server stopped");
    Ok(())
}
