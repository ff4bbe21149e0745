//! Share links for a claimed name

use std::fmt;

use linkspace_core::Name;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ClaimError, ClaimResult};

/// Links under which a bound page can be shared
///
/// The name service resolves `{name}{suffix}` to the bound content, either
/// through an `ar://` aware client or a web gateway subdomain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLinks {
    /// `ar://{name}{suffix}`
    pub protocol: String,
    /// `https://{name}{suffix}.{gateway}/`
    pub web: Url,
}

impl ShareLinks {
    pub fn new(name: &Name, suffix: &str, gateway: &str) -> ClaimResult<Self> {
        let label = format!("{}{}", name, suffix);
        let gateway = gateway.trim().trim_matches('/');
        if gateway.is_empty() {
            return Err(ClaimError::InvalidConfig("gateway is empty".into()));
        }

        let web = Url::parse(&format!("https://{}.{}/", label, gateway))
            .map_err(|e| ClaimError::InvalidConfig(format!("gateway {}: {}", gateway, e)))?;
        Ok(Self {
            protocol: format!("ar://{}", label),
            web,
        })
    }

    /// Links using the configured suffix and gateway
    pub fn for_config(name: &Name, config: &ClientConfig) -> ClaimResult<Self> {
        Self::new(name, &config.name_suffix, &config.gateway)
    }
}

impl fmt::Display for ShareLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.web, self.protocol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_links() {
        let name = Name::parse("john-doe").unwrap();
        let links = ShareLinks::for_config(&name, &ClientConfig::default()).unwrap();
        assert_eq!(links.protocol, "ar://john-doe_linkspace");
        assert_eq!(links.web.as_str(), "https://john-doe_linkspace.ar-io.dev/");
    }

    #[test]
    fn test_custom_gateway() {
        let name = Name::parse("alice").unwrap();
        let links = ShareLinks::new(&name, "_linkspace", "arweave.net/").unwrap();
        assert_eq!(links.web.as_str(), "https://alice_linkspace.arweave.net/");
        assert_eq!(links.web.host_str(), Some("alice_linkspace.arweave.net"));
    }

    #[test]
    fn test_empty_gateway_rejected() {
        let name = Name::parse("alice").unwrap();
        assert!(matches!(
            ShareLinks::new(&name, "_linkspace", "  "),
            Err(ClaimError::InvalidConfig(_))
        ));
    }
}
