//! # Dispatch configuration
//!
//! Module dedicated to the configuration of the dispatcher.

use url::Url;

use crate::client::RedirectPolicy;

/// The endpoint of the hosted mail service, used when no
/// autodiscovery address is given.
pub const DEFAULT_ENDPOINT: &str = "https://outlook.office365.com/EWS/Exchange.asmx";

/// The dispatch configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case", default)
)]
pub struct DispatchConfig {
    /// The endpoint sessions are bound to when no autodiscovery
    /// address is given.
    pub endpoint: Url,

    /// The policy applied to redirections proposed by
    /// autodiscovery.
    pub redirect_policy: RedirectPolicy,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            redirect_policy: RedirectPolicy::default(),
        }
    }
}

impl DispatchConfig {
    pub fn with_endpoint(mut self, endpoint: Url) -> Self {
        self.endpoint = endpoint;
        self
    }

    pub fn with_redirect_policy(mut self, policy: RedirectPolicy) -> Self {
        self.redirect_policy = policy;
        self
    }
}

fn default_endpoint() -> Url {
    Url::parse(DEFAULT_ENDPOINT).expect("default endpoint should be a valid URL")
}

#[cfg(test)]
mod tests {
    use super::{DispatchConfig, DEFAULT_ENDPOINT};
    use crate::client::RedirectPolicy;

    #[test]
    fn default_config() {
        let config = DispatchConfig::default();
        assert_eq!(config.endpoint.as_str(), DEFAULT_ENDPOINT);
        assert_eq!(config.redirect_policy, RedirectPolicy::AcceptAll);
    }
}
