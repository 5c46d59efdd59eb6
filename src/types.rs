//! Core types and structures for whois-overrides

use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::error::{OverridesError, Result};

/// IANA root zone database listing
pub const ROOT_ZONE_DB: &str = "https://www.iana.org/domains/root/db";

/// IANA IPv4 address space registry, CSV rendition
pub const IPV4_ASSIGNMENTS: &str =
    "https://www.iana.org/assignments/ipv4-address-space/ipv4-address-space.csv";

/// Which extraction job a run performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    /// Root zone database to `[overrides]`
    #[default]
    Zones,
    /// IPv4 address space to bare `prefix=server` lines
    Ipv4,
}

impl std::fmt::Display for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Pipeline::Zones => write!(f, "zones"),
            Pipeline::Ipv4 => write!(f, "ipv4"),
        }
    }
}

impl FromStr for Pipeline {
    type Err = OverridesError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "zones" | "tld" | "tlds" => Ok(Pipeline::Zones),
            "ipv4" | "ip" => Ok(Pipeline::Ipv4),
            other => Err(OverridesError::config(format!("Unknown pipeline '{}'", other))),
        }
    }
}

/// One row of the root zone listing that survived the exclusion rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZoneEntry {
    /// Link text as shown in the listing, e.g. `.com`
    pub raw_label: String,
    /// Type column (`generic`, `country-code`, `test`, ...)
    pub status: String,
    /// Delegation/manager column
    pub delegation: String,
    /// Absolute URL of the zone's detail page
    pub detail_url: Option<Url>,
}

/// Where a zone's WHOIS server came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerSource {
    /// Published on the zone's detail page
    Published,
    /// `whois.nic.<zone>` answered a DNS lookup
    Fallback,
}

impl std::fmt::Display for ServerSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerSource::Published => write!(f, "published"),
            ServerSource::Fallback => write!(f, "fallback"),
        }
    }
}

/// A zone after its detail page has been processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedZone {
    /// Lowercase ASCII-compatible zone label, without a leading dot
    pub zone_name: String,
    /// Lowercase hostname; `None` when neither the page nor the fallback gave one
    pub whois_server: Option<String>,
    pub source: Option<ServerSource>,
}

impl ResolvedZone {
    pub fn unresolved(zone_name: impl Into<String>) -> Self {
        Self {
            zone_name: zone_name.into(),
            whois_server: None,
            source: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.whois_server.is_some()
    }
}

/// One /8 block of the IPv4 address space
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpPrefixEntry {
    /// Numeric first octet, e.g. `10` for `010/8`
    pub prefix: u16,
    /// Server exactly as published; `None` when the column is empty
    pub whois_server: Option<String>,
}

/// Configuration for a scrape run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    pub pipeline: Pipeline,
    pub root_zone_url: String,
    pub ipv4_assignments_url: String,
    /// Pause before each zone detail fetch
    pub request_delay: Duration,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            pipeline: Pipeline::Zones,
            root_zone_url: ROOT_ZONE_DB.to_string(),
            ipv4_assignments_url: IPV4_ASSIGNMENTS.to_string(),
            request_delay: Duration::ZERO,
            timeout: Duration::from_secs(30),
            user_agent: format!("whois-overrides/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScrapeConfig {
    /// Defaults overlaid with `WHOIS_OVERRIDES_*` environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(url) = env::var("WHOIS_OVERRIDES_ROOT_ZONE_DB") {
            config.root_zone_url = url;
        }
        if let Ok(url) = env::var("WHOIS_OVERRIDES_IPV4_CSV") {
            config.ipv4_assignments_url = url;
        }
        if let Ok(ms) = env::var("WHOIS_OVERRIDES_DELAY_MS") {
            config.request_delay = Duration::from_millis(parse_number("WHOIS_OVERRIDES_DELAY_MS", &ms)?);
        }
        if let Ok(secs) = env::var("WHOIS_OVERRIDES_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_number("WHOIS_OVERRIDES_TIMEOUT_SECS", &secs)?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that both source URLs are absolute and the timeout is usable
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("root zone URL", &self.root_zone_url),
            ("IPv4 assignments URL", &self.ipv4_assignments_url),
        ] {
            Url::parse(value).map_err(|e| {
                OverridesError::config(format!("Invalid {} '{}': {}", name, value, e))
            })?;
        }

        if self.timeout.is_zero() {
            return Err(OverridesError::config("Timeout must be greater than zero"));
        }

        Ok(())
    }
}

/// Parse a non-negative integer setting
pub fn parse_number(name: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        OverridesError::config(format!("{} must be a non-negative integer, got '{}'", name, value))
    })
}
