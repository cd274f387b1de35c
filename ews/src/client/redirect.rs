//! # Autodiscovery redirect policy
//!
//! During autodiscovery, the client library may be redirected to
//! another endpoint. The [`RedirectPolicy`] decides whether such an
//! endpoint can be trusted.

use std::{fmt, sync::Arc};

use tracing::{debug, warn};
use url::Url;

/// The redirect predicate alias, used by [`RedirectPolicy::Custom`].
pub type RedirectPredicate = Arc<dyn Fn(&Url) -> bool + Send + Sync>;

/// The policy applied to endpoints proposed by autodiscovery.
#[derive(Clone, Default)]
#[cfg_attr(
    feature = "derive",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "kebab-case")
)]
pub enum RedirectPolicy {
    /// Trust any endpoint.
    ///
    /// This is the behavior of the legacy cmdlet. Every accepted
    /// redirection is logged as a warning.
    #[default]
    AcceptAll,

    /// Trust only endpoints served over HTTPS.
    HttpsOnly,

    /// Trust only HTTPS endpoints whose host belongs to the domain of
    /// the autodiscovery address.
    SameDomain,

    /// Trust endpoints accepted by the given predicate.
    #[cfg_attr(feature = "derive", serde(skip))]
    Custom(RedirectPredicate),
}

impl RedirectPolicy {
    pub fn custom(predicate: impl Fn(&Url) -> bool + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(predicate))
    }

    /// Decide whether the redirection to the given endpoint, proposed
    /// while discovering the endpoint of the given address, can be
    /// followed.
    pub fn accepts(&self, addr: &str, redirect: &str) -> bool {
        if let Self::AcceptAll = self {
            warn!(redirect, "trusting autodiscovery redirection without check");
            return true;
        }

        let url = match Url::parse(redirect) {
            Ok(url) => url,
            Err(err) => {
                debug!(redirect, ?err, "refusing unparsable redirection");
                return false;
            }
        };

        match self {
            Self::AcceptAll => true,
            Self::HttpsOnly => url.scheme() == "https",
            Self::SameDomain => {
                let domain = match addr.rsplit_once('@') {
                    Some((_, domain)) => domain.trim_matches('.').to_ascii_lowercase(),
                    None => return false,
                };

                if domain.is_empty() {
                    return false;
                }

                let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
                url.scheme() == "https"
                    && (host == domain || host.ends_with(&format!(".{domain}")))
            }
            Self::Custom(predicate) => predicate(&url),
        }
    }
}

impl fmt::Debug for RedirectPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AcceptAll => f.write_str("AcceptAll"),
            Self::HttpsOnly => f.write_str("HttpsOnly"),
            Self::SameDomain => f.write_str("SameDomain"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl PartialEq for RedirectPolicy {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::AcceptAll, Self::AcceptAll) => true,
            (Self::HttpsOnly, Self::HttpsOnly) => true,
            (Self::SameDomain, Self::SameDomain) => true,
            (Self::Custom(a), Self::Custom(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Eq for RedirectPolicy {}
