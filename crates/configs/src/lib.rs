use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

pub const DEFAULT_METABASE_SITE: &str = "https://graficos.proesc.com";
pub const DEFAULT_EMBED_TTL_SECS: u64 = 600;
/// Longest embed token lifetime accepted from configuration (one day).
pub const MAX_EMBED_TTL_SECS: u64 = 86_400;
pub const DEFAULT_TICKET_TAG: &str = "prime_hub";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub metabase: MetabaseConfig,
    #[serde(default)]
    pub zendesk: ZendeskConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 1 }
fn default_connect_timeout() -> u64 { 30 }
fn default_acquire_timeout() -> u64 { 30 }

/// Supabase project used to validate caller access tokens.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub anon_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetabaseConfig {
    #[serde(default = "default_metabase_site")]
    pub site_url: String,
    /// Embedding secret. Left empty on purpose in config files; read from `METABASE_SECRET_KEY`.
    #[serde(default)]
    pub secret_key: Option<String>,
    #[serde(default = "default_embed_ttl")]
    pub token_ttl_secs: u64,
    #[serde(default)]
    pub dashboards: DashboardIds,
}

impl Default for MetabaseConfig {
    fn default() -> Self {
        Self {
            site_url: default_metabase_site(),
            secret_key: None,
            token_ttl_secs: DEFAULT_EMBED_TTL_SECS,
            dashboards: DashboardIds::default(),
        }
    }
}

fn default_metabase_site() -> String { DEFAULT_METABASE_SITE.to_string() }
fn default_embed_ttl() -> u64 { DEFAULT_EMBED_TTL_SECS }

/// Optional overrides of the built-in dashboard ids, keyed by category.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct DashboardIds {
    pub financeiro: Option<u32>,
    pub pedagogico: Option<u32>,
    pub agenda: Option<u32>,
    pub secretaria: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ZendeskConfig {
    /// Full base URL such as `https://proesc.zendesk.com`. Derived from `subdomain` when empty.
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub subdomain: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub api_token: Option<String>,
    #[serde(default = "default_ticket_tag")]
    pub ticket_tag: String,
}

impl Default for ZendeskConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            subdomain: String::new(),
            email: String::new(),
            api_token: None,
            ticket_tag: default_ticket_tag(),
        }
    }
}

fn default_ticket_tag() -> String { DEFAULT_TICKET_TAG.to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_http_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_http_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_http_connect_timeout(),
            request_timeout_secs: default_http_request_timeout(),
            retry: RetryConfig::default(),
        }
    }
}

fn default_http_connect_timeout() -> u64 { 5 }
fn default_http_request_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    pub enabled: bool,
    pub max_attempts: u32,
    pub backoff_base_ms: u64,
    pub backoff_max_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { enabled: true, max_attempts: 3, backoff_base_ms: 200, backoff_max_ms: 2000 }
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load `config.toml` (or `CONFIG_PATH`), falling back to defaults when the
    /// file is absent, then overlay environment variables and validate.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize_from_env();
        self.server.normalize()?;
        self.database.normalize_from_env();
        self.database.validate()?;
        self.supabase.normalize_from_env();
        self.metabase.normalize_from_env();
        self.metabase.validate()?;
        self.zendesk.normalize_from_env();
        self.http.validate()?;
        Ok(())
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl ServerConfig {
    fn normalize_from_env(&mut self) {
        if let Some(host) = env_non_empty("SERVER_HOST") {
            self.host = host;
        }
        if let Some(port) = env_non_empty("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.port = port;
        }
        if let Some(w) = env_non_empty("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.worker_threads = Some(w);
        }
    }

    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Some(url) = env_non_empty("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    /// The database is optional at load time; when present it must be Postgres.
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Ok(());
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl SupabaseConfig {
    fn normalize_from_env(&mut self) {
        if let Some(url) = env_non_empty("SUPABASE_URL") {
            self.url = url;
        }
        if let Some(key) = env_non_empty("SUPABASE_ANON_KEY") {
            self.anon_key = key;
        }
        self.url = self.url.trim_end_matches('/').to_string();
    }
}

impl MetabaseConfig {
    fn normalize_from_env(&mut self) {
        if let Some(site) = env_non_empty("METABASE_SITE_URL") {
            self.site_url = site;
        }
        if let Some(secret) = env_non_empty("METABASE_SECRET_KEY") {
            self.secret_key = Some(secret);
        }
        if self.secret_key.as_deref().map(|s| s.trim().is_empty()).unwrap_or(false) {
            self.secret_key = None;
        }
        self.site_url = self.site_url.trim_end_matches('/').to_string();
    }

    fn validate(&self) -> Result<()> {
        if self.site_url.trim().is_empty() {
            return Err(anyhow!("metabase.site_url must not be empty"));
        }
        if self.token_ttl_secs == 0 || self.token_ttl_secs > MAX_EMBED_TTL_SECS {
            return Err(anyhow!("metabase.token_ttl_secs must be in 1..={MAX_EMBED_TTL_SECS}"));
        }
        Ok(())
    }
}

impl ZendeskConfig {
    fn normalize_from_env(&mut self) {
        if let Some(sub) = env_non_empty("ZENDESK_SUBDOMAIN") {
            self.subdomain = sub;
        }
        if let Some(email) = env_non_empty("ZENDESK_EMAIL") {
            self.email = email;
        }
        if let Some(token) = env_non_empty("ZENDESK_API_TOKEN") {
            self.api_token = Some(token);
        }
        if self.base_url.trim().is_empty() && !self.subdomain.trim().is_empty() {
            self.base_url = format!("https://{}.zendesk.com", self.subdomain.trim());
        }
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        if self.ticket_tag.trim().is_empty() {
            self.ticket_tag = default_ticket_tag();
        }
    }
}

impl HttpConfig {
    fn validate(&self) -> Result<()> {
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            return Err(anyhow!("http timeouts must be positive seconds"));
        }
        if self.retry.enabled && self.retry.max_attempts == 0 {
            return Err(anyhow!("http.retry.max_attempts must be >= 1 when retries are enabled"));
        }
        Ok(())
    }
}
