use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use common::metrics::{HELPDESK_CALLS_TOTAL, HELPDESK_ERRORS_TOTAL, HELPDESK_RETRIES_TOTAL};
use configs::ZendeskConfig;

use super::client::HelpdeskClient;
use super::domain::{NewTicket, TicketPage, ZendeskTicket};
use super::errors::HelpdeskError;
use crate::retry::{parse_retry_after, RetryPolicy};

const SORT: [(&str, &str); 2] = [("sort_by", "created_at"), ("sort_order", "desc")];
const MAX_ERROR_BODY: usize = 2048;

/// Zendesk Support API v2 client using API-token basic auth.
#[derive(Clone)]
pub struct ZendeskClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    api_token: Option<String>,
    retry: RetryPolicy,
}

#[derive(Deserialize)]
struct TicketsEnvelope {
    #[serde(default)]
    tickets: Vec<ZendeskTicket>,
    #[serde(default)]
    count: Option<u64>,
}

#[derive(Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    results: Vec<ZendeskTicket>,
    #[serde(default)]
    count: Option<u64>,
}

#[derive(Deserialize)]
struct TicketEnvelope {
    ticket: ZendeskTicket,
}

impl ZendeskClient {
    pub fn new(http: reqwest::Client, cfg: &ZendeskConfig, retry: RetryPolicy) -> Self {
        Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            email: cfg.email.clone(),
            api_token: cfg.api_token.clone().filter(|t| !t.is_empty()),
            retry,
        }
    }

    fn api(&self, path: &str) -> String {
        format!("{}/api/v2{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, HelpdeskError> {
        if self.base_url.is_empty() {
            return Err(HelpdeskError::NotConfigured("ZENDESK_SUBDOMAIN / zendesk.base_url is not set"));
        }
        let token = self
            .api_token
            .as_deref()
            .ok_or(HelpdeskError::NotConfigured("ZENDESK_API_TOKEN is not set"))?;
        if self.email.is_empty() {
            return Err(HelpdeskError::NotConfigured("ZENDESK_EMAIL is not set"));
        }
        Ok(self
            .http
            .request(method, self.api(path))
            .basic_auth(format!("{}/token", self.email), Some(token)))
    }

    /// GET with retries on throttling, gateway errors and transport failures.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, HelpdeskError> {
        let attempts = self.retry.max_attempts();
        let mut attempt = 0;
        loop {
            attempt += 1;
            HELPDESK_CALLS_TOTAL.with_label_values(&[operation]).inc();
            let sent = self.request(Method::GET, path)?.query(query).send().await;
            match sent {
                Ok(resp) if resp.status().is_success() => return decode(resp).await,
                Ok(resp) => {
                    let status = resp.status();
                    if attempt < attempts && RetryPolicy::is_retryable_status(status) {
                        warn!(operation, %status, attempt, "helpdesk throttled or unavailable, retrying");
                        HELPDESK_RETRIES_TOTAL.inc();
                        self.retry.wait_before_retry(attempt, parse_retry_after(resp.headers())).await;
                        continue;
                    }
                    return Err(upstream_error(resp).await);
                }
                Err(e) if attempt < attempts && RetryPolicy::is_retryable_transport(&e) => {
                    warn!(operation, err = %e, attempt, "helpdesk unreachable, retrying");
                    HELPDESK_RETRIES_TOTAL.inc();
                    self.retry.wait_before_retry(attempt, None).await;
                }
                Err(e) => {
                    HELPDESK_ERRORS_TOTAL.inc();
                    return Err(HelpdeskError::Transport(e.to_string()));
                }
            }
        }
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, HelpdeskError> {
    resp.json::<T>().await.map_err(|e| {
        HELPDESK_ERRORS_TOTAL.inc();
        HelpdeskError::Decode(e.to_string())
    })
}

async fn upstream_error(resp: Response) -> HelpdeskError {
    HELPDESK_ERRORS_TOTAL.inc();
    let status = resp.status().as_u16();
    let mut body = resp.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    HelpdeskError::Upstream { status, body }
}

#[async_trait]
impl HelpdeskClient for ZendeskClient {
    #[instrument(skip(self))]
    async fn list_tickets(&self, organization_id: Option<u64>) -> Result<TicketPage, HelpdeskError> {
        let path = match organization_id {
            Some(org) => format!("/organizations/{org}/tickets.json"),
            None => "/tickets.json".to_string(),
        };
        let env: TicketsEnvelope = self.get_json("list", &path, &SORT).await?;
        debug!(count = env.tickets.len(), "tickets listed");
        Ok(TicketPage { tickets: env.tickets, count: env.count })
    }

    #[instrument(skip(self))]
    async fn search_tickets(&self, query: &str) -> Result<TicketPage, HelpdeskError> {
        let params = [("query", query), SORT[0], SORT[1]];
        let env: SearchEnvelope = self.get_json("search", "/search.json", &params).await?;
        debug!(count = env.results.len(), "tickets found");
        Ok(TicketPage { tickets: env.results, count: env.count })
    }

    /// Not idempotent: sent exactly once.
    #[instrument(skip(self, ticket), fields(organization_id = ?ticket.ticket.organization_id))]
    async fn create_ticket(&self, ticket: &NewTicket) -> Result<ZendeskTicket, HelpdeskError> {
        HELPDESK_CALLS_TOTAL.with_label_values(&["create"]).inc();
        let resp = self
            .request(Method::POST, "/tickets.json")?
            .json(ticket)
            .send()
            .await
            .map_err(|e| {
                HELPDESK_ERRORS_TOTAL.inc();
                HelpdeskError::Transport(e.to_string())
            })?;
        if !resp.status().is_success() {
            return Err(upstream_error(resp).await);
        }
        let env: TicketEnvelope = decode(resp).await?;
        Ok(env.ticket)
    }

    #[instrument(skip(self))]
    async fn get_ticket(&self, ticket_id: u64) -> Result<ZendeskTicket, HelpdeskError> {
        let env: TicketEnvelope = self.get_json("get", &format!("/tickets/{ticket_id}.json"), &[]).await?;
        Ok(env.ticket)
    }

    fn ticket_url(&self, ticket_id: u64) -> String {
        format!("{}/agent/tickets/{}", self.base_url, ticket_id)
    }
}
