//! `whois.nic.<zone>` fallback probing

use async_trait::async_trait;

use crate::error::{OverridesError, Result};
use crate::validator::HostnameValidator;

/// Conventional WHOIS host prefix for registries that do not publish one
pub const FALLBACK_PREFIX: &str = "whois.nic.";

/// Hostname to address resolution
#[async_trait]
pub trait HostResolver: Send + Sync {
    /// Succeeds when `host` resolves to at least one address
    async fn resolve(&self, host: &str) -> Result<()>;
}

/// Resolver backed by the system's name resolution
pub struct DnsResolver;

#[async_trait]
impl HostResolver for DnsResolver {
    async fn resolve(&self, host: &str) -> Result<()> {
        let mut addrs = tokio::net::lookup_host((host, 0))
            .await
            .map_err(|e| OverridesError::resolution(host, e.to_string()))?;

        match addrs.next() {
            Some(addr) => {
                tracing::debug!(host = %host, addr = %addr.ip(), "Resolved");
                Ok(())
            }
            None => Err(OverridesError::resolution(host, "no addresses")),
        }
    }
}

/// Synthesizes and verifies fallback server names
pub struct FallbackProber {
    resolver: Box<dyn HostResolver>,
    validator: HostnameValidator,
    prefix: String,
}

impl FallbackProber {
    pub fn new(resolver: Box<dyn HostResolver>) -> Result<Self> {
        Ok(Self {
            resolver,
            validator: HostnameValidator::new()?,
            prefix: FALLBACK_PREFIX.to_string(),
        })
    }

    /// Candidate server name for a zone
    pub fn candidate(&self, zone_name: &str) -> String {
        format!("{}{}", self.prefix, zone_name)
    }

    /// Return the candidate if it is well formed and resolves
    pub async fn probe(&self, zone_name: &str) -> Result<String> {
        let candidate = self.candidate(zone_name);
        self.validator.validate(&candidate)?;
        self.resolver.resolve(&candidate).await?;
        Ok(candidate)
    }
}
