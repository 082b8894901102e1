use std::time::Duration;

use configs::HttpConfig;

/// Shared outbound client; connection pooling is per `reqwest::Client`, so build one per process.
pub fn build_http_client(cfg: &HttpConfig) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .timeout(Duration::from_secs(cfg.request_timeout_secs))
        .user_agent(concat!("prime-hub/", env!("CARGO_PKG_VERSION")))
        .build()
}
