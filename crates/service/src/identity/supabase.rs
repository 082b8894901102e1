use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::domain::AuthUser;
use super::errors::IdentityError;
use super::provider::IdentityProvider;

/// Supabase GoTrue backed provider: `GET {project}/auth/v1/user` with the caller's token.
#[derive(Clone)]
pub struct SupabaseIdentityProvider {
    http: reqwest::Client,
    url: String,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<serde_json::Value>,
}

impl GoTrueUser {
    fn display_name(&self) -> Option<String> {
        let meta = self.user_metadata.as_ref()?;
        ["name", "full_name"]
            .iter()
            .filter_map(|k| meta.get(*k).and_then(|v| v.as_str()))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }
}

impl SupabaseIdentityProvider {
    pub fn new(http: reqwest::Client, cfg: &configs::SupabaseConfig) -> Self {
        Self {
            http,
            url: cfg.url.trim_end_matches('/').to_string(),
            anon_key: cfg.anon_key.clone(),
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    #[instrument(skip_all)]
    async fn authenticate(&self, access_token: &str) -> Result<AuthUser, IdentityError> {
        if self.url.is_empty() || self.anon_key.is_empty() {
            return Err(IdentityError::NotConfigured("supabase url or anon key missing".into()));
        }
        if access_token.trim().is_empty() {
            return Err(IdentityError::Unauthorized);
        }

        let resp = self
            .http
            .get(format!("{}/auth/v1/user", self.url))
            .header("apikey", &self.anon_key)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|e| IdentityError::Upstream(e.to_string()))?;

        let status = resp.status();
        if status.is_server_error() {
            warn!(%status, "identity provider returned server error");
            return Err(IdentityError::Upstream(format!("status {status}")));
        }
        if !status.is_success() {
            debug!(%status, "access token rejected");
            return Err(IdentityError::Unauthorized);
        }

        let user = resp
            .json::<GoTrueUser>()
            .await
            .map_err(|e| IdentityError::Upstream(format!("unexpected user payload: {e}")))?;
        let name = user.display_name();
        Ok(AuthUser { id: user.id, email: user.email, name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn provider(base: &str) -> SupabaseIdentityProvider {
        let cfg = configs::SupabaseConfig { url: base.to_string(), anon_key: "anon".into() };
        SupabaseIdentityProvider::new(reqwest::Client::new(), &cfg)
    }

    #[tokio::test]
    async fn valid_token_resolves_user() {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        let m = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/auth/v1/user")
                    .header("apikey", "anon")
                    .header("authorization", "Bearer good");
                then.status(200).json_body(json!({
                    "id": id,
                    "email": "diretora@escola.br",
                    "user_metadata": {"full_name": "Ana Souza"}
                }));
            })
            .await;

        let user = provider(&server.base_url()).authenticate("good").await.unwrap();
        assert_eq!(user.id, id);
        assert_eq!(user.email.as_deref(), Some("diretora@escola.br"));
        assert_eq!(user.name.as_deref(), Some("Ana Souza"));
        m.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn rejected_token_is_unauthorized() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/auth/v1/user");
                then.status(401).json_body(json!({"msg": "invalid JWT"}));
            })
            .await;

        let err = provider(&server.base_url()).authenticate("bad").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthorized));
    }

    #[tokio::test]
    async fn blank_token_never_reaches_provider() {
        let server = MockServer::start_async().await;
        let m = server
            .mock_async(|when, then| {
                when.path("/auth/v1/user");
                then.status(200);
            })
            .await;

        let err = provider(&server.base_url()).authenticate("  ").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unauthorized));
        m.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn missing_configuration_is_reported() {
        let cfg = configs::SupabaseConfig::default();
        let p = SupabaseIdentityProvider::new(reqwest::Client::new(), &cfg);
        let err = p.authenticate("token").await.unwrap_err();
        assert!(matches!(err, IdentityError::NotConfigured(_)));
    }
}
