//! Run configuration.

use crate::pacing::PacingPolicy;
use std::time::Duration;

/// Default Megaverse API root.
pub const DEFAULT_BASE_URL: &str = "https://challenge.crossmint.io/api";

/// Configuration for a reconciliation run against the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MegaverseConfig {
    /// API root, without trailing slash (default: challenge API)
    pub base_url: String,

    /// Opaque identifier scoping every map read and mutation
    pub candidate_id: String,

    /// Wait between mutations (default: 1 per 3s)
    pub pacing: PacingPolicy,

    /// Per-request HTTP timeout (default: 30s)
    pub request_timeout: Duration,
}

impl MegaverseConfig {
    /// Default configuration for the given candidate.
    pub fn new(candidate_id: impl Into<String>) -> Self {
        Self {
            candidate_id: candidate_id.into(),
            ..Default::default()
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

impl Default for MegaverseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            candidate_id: String::new(),
            pacing: PacingPolicy::default(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = MegaverseConfig::new("abc");
        assert_eq!(config.candidate_id, "abc");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.pacing.delay(), Duration::from_secs(3));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_config_builders() {
        let config = MegaverseConfig::new("abc")
            .with_base_url("http://localhost:9999")
            .with_pacing(PacingPolicy::none())
            .with_request_timeout(Duration::from_secs(1));
        assert_eq!(config.base_url, "http://localhost:9999");
        assert_eq!(config.pacing, PacingPolicy::none());
        assert_eq!(config.request_timeout, Duration::from_secs(1));
    }
}
