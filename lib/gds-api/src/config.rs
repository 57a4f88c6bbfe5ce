//! Transport settings.

use std::time::Duration;

/// Settings shared by every request a [`HyperClient`](crate::HyperClient)
/// sends.
///
/// There are no retries: a call that misses `timeout` fails with
/// [`Error::Timeout`](crate::Error::Timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Budget for the response headers, and again for the body.
    pub timeout: Duration,
    /// Budget for establishing the TCP connection.
    pub connect_timeout: Duration,
    /// Idle connections kept open per host.
    pub pool_idle_per_host: usize,
    /// How long an idle connection stays in the pool.
    pub pool_idle_timeout: Duration,
}

impl ClientConfig {
    /// Default request timeout.
    pub const TIMEOUT: Duration = Duration::from_secs(4);
    /// Default connect timeout.
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

    /// Start from the defaults.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Self::TIMEOUT,
            connect_timeout: Self::CONNECT_TIMEOUT,
            pool_idle_per_host: 8,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

/// Builder for [`ClientConfig`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder(ClientConfig);

impl ClientConfigBuilder {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.0.timeout = timeout;
        self
    }

    /// Connect timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.0.connect_timeout = timeout;
        self
    }

    /// Idle connections kept per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.0.pool_idle_per_host = count;
        self
    }

    /// Idle connection lifetime.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.0.pool_idle_timeout = timeout;
        self
    }

    /// Finish.
    #[must_use]
    pub fn build(self) -> ClientConfig {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_govuk_adapters() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(4));
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.pool_idle_per_host, 8);
    }

    #[test]
    fn builder_keeps_unset_defaults() {
        let config = ClientConfig::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .build();

        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.pool_idle_timeout, Duration::from_secs(90));
        assert_eq!(config.pool_idle_per_host, 8);
    }
}
