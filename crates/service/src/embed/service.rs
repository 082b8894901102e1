use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tracing::{error, info, instrument};

use common::metrics::{EMBED_FAILURES_TOTAL, EMBED_TOKENS_ISSUED_TOTAL};
use configs::{DashboardIds, MetabaseConfig};

use super::domain::{DashboardCategory, EmbedClaims, EmbedRequest, EmbedToken};
use super::errors::EmbedError;

/// Signs Metabase embed URLs. Holds the embedding secret; no `Debug` impl.
#[derive(Clone)]
pub struct EmbedTokenIssuer {
    site_url: String,
    secret_key: Option<String>,
    ttl_secs: u64,
    dashboards: DashboardIds,
}

impl EmbedTokenIssuer {
    pub fn new(cfg: &MetabaseConfig) -> Self {
        Self {
            site_url: cfg.site_url.trim_end_matches('/').to_string(),
            secret_key: cfg.secret_key.clone().filter(|s| !s.is_empty()),
            ttl_secs: cfg.token_ttl_secs,
            dashboards: cfg.dashboards.clone(),
        }
    }

    /// Issue a token valid from now.
    ///
    /// # Examples
    /// ```
    /// use service::embed::{EmbedRequest, EmbedTokenIssuer};
    /// let cfg = configs::MetabaseConfig { secret_key: Some("s3cret".into()), ..Default::default() };
    /// let issuer = EmbedTokenIssuer::new(&cfg);
    /// let token = issuer.issue(&EmbedRequest::new("financeiro", "4442")).unwrap();
    /// assert_eq!(token.dashboard_id, 52);
    /// assert!(token.iframe_url.starts_with("https://graficos.proesc.com/embed/dashboard/"));
    /// ```
    pub fn issue(&self, req: &EmbedRequest) -> Result<EmbedToken, EmbedError> {
        self.issue_at(req, Utc::now())
    }

    /// Validation runs in a fixed order: parameters, category, then secret.
    /// Signing is only reached once all three pass.
    #[instrument(skip(self, req), fields(dashboard_type = ?req.dashboard_type, proesc_id = ?req.proesc_id))]
    pub fn issue_at(&self, req: &EmbedRequest, now: DateTime<Utc>) -> Result<EmbedToken, EmbedError> {
        let result = self.sign(req, now);
        match &result {
            Ok(token) => {
                EMBED_TOKENS_ISSUED_TOTAL.inc();
                info!(dashboard_id = token.dashboard_id, expires_in = token.expires_in, "embed_token_issued");
            }
            Err(e) => {
                EMBED_FAILURES_TOTAL.with_label_values(&[e.kind()]).inc();
                match e {
                    EmbedError::Configuration(_) | EmbedError::Signing(_) => {
                        error!(code = e.code(), err = %e, "embed token issuance failed")
                    }
                    _ => info!(code = e.code(), err = %e, "embed request rejected"),
                }
            }
        }
        result
    }

    fn sign(&self, req: &EmbedRequest, now: DateTime<Utc>) -> Result<EmbedToken, EmbedError> {
        let dashboard_type = present(req.dashboard_type.as_deref()).ok_or(EmbedError::MissingParameter("dashboardType"))?;
        let entity_id = present(req.proesc_id.as_deref()).ok_or(EmbedError::MissingParameter("proescId"))?;

        let category = DashboardCategory::parse(dashboard_type)
            .ok_or_else(|| EmbedError::UnknownDashboardCategory(dashboard_type.to_string()))?;

        let secret = self
            .secret_key
            .as_deref()
            .ok_or(EmbedError::Configuration("METABASE_SECRET_KEY is not set"))?;

        let dashboard_id = category.dashboard_id(&self.dashboards);
        let exp = i64::try_from(self.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(EmbedError::Configuration("metabase.token_ttl_secs is out of range"))?
            .timestamp();
        let claims = EmbedClaims::for_tenant(dashboard_id, entity_id, exp);
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| EmbedError::Signing(e.to_string()))?;

        Ok(EmbedToken {
            iframe_url: format!("{}/embed/dashboard/{}#bordered=true&titled=true", self.site_url, token),
            dashboard_id,
            expires_in: self.ttl_secs,
        })
    }
}

fn present(v: Option<&str>) -> Option<&str> {
    v.map(str::trim).filter(|s| !s.is_empty())
}
