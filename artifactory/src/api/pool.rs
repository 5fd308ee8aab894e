//! HTTP client settings for the Artifactory API

use std::time::Duration;

/// Timeouts and idle-connection limits of the shared `reqwest` client
#[derive(Debug, Clone)]
pub struct ConnectionPoolConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for ConnectionPoolConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(90),
            max_idle_per_host: 10,
            user_agent: format!("terraform-provider-artifactory/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ConnectionPoolConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        tracing::debug!(
            "Building HTTP client (timeout {:?}, connect timeout {:?})",
            self.request_timeout,
            self.connect_timeout
        );
        reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(self.user_agent.as_str())
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .pool_idle_timeout(self.idle_timeout)
            .pool_max_idle_per_host(self.max_idle_per_host)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timeouts() {
        let config = ConnectionPoolConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("terraform-provider-artifactory/"));
    }
}
