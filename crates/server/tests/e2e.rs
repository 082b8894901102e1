use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use configs::{MetabaseConfig, ZendeskConfig};
use service::directory::repository::mock::MockTenantDirectory;
use service::directory::TenantDirectory;
use service::embed::{EmbedService, EmbedTokenIssuer};
use service::identity::provider::mock::MockIdentityProvider;
use service::identity::IdentityProvider;
use service::retry::RetryPolicy;
use service::tickets::{TicketGateway, ZendeskClient};

use server::startup::build_app;
use server::state::ServerState;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let identity: Arc<dyn IdentityProvider> = Arc::new(MockIdentityProvider::default());
    let helpdesk = ZendeskClient::new(reqwest::Client::new(), &ZendeskConfig::default(), RetryPolicy::disabled());
    let directory: Arc<dyn TenantDirectory> = Arc::new(MockTenantDirectory::default());
    let issuer = EmbedTokenIssuer::new(&MetabaseConfig::default());
    let state = ServerState {
        embed: Arc::new(EmbedService::new(Arc::clone(&identity), Arc::clone(&directory), issuer)),
        tickets: Arc::new(TicketGateway::new(identity, directory, Arc::new(helpdesk), "prime_hub")),
    };

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, build_app(state)).await {
            eprintln!("server error: {}", e);
        }
    });
    Ok(TestApp { base_url: format!("http://{}", addr) })
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = res.json().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_metrics_and_openapi_are_public() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/metrics", app.base_url)).await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);

    let res = reqwest::get(format!("{}/api-docs/openapi.json", app.base_url)).await?;
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let doc: serde_json::Value = res.json().await?;
    assert!(doc["paths"]["/functions/v1/zendesk-tickets"].is_object());
    Ok(())
}

#[tokio::test]
async fn e2e_error_responses_carry_cors_header() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::Client::new()
        .post(format!("{}/functions/v1/metabase-embed", app.base_url))
        .header("origin", "https://portal.proesc.com")
        .json(&serde_json::json!({"dashboardType": "financeiro", "proescId": "1"}))
        .send()
        .await?;
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    Ok(())
}
