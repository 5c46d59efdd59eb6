//! whois-overrides - WHOIS server overrides from the IANA registries
//!
//! Scrapes the root zone database (or the IPv4 address space table) and
//! produces the `key=value` overrides a WHOIS proxy loads at startup.

pub mod emitter;
pub mod error;
pub mod fetch;
pub mod ipv4;
pub mod pipeline;
pub mod types;
pub mod validator;
pub mod zones;

// Re-export commonly used types
pub use error::{OverridesError, Result};
pub use types::{
    IpPrefixEntry, Pipeline, ResolvedZone, ScrapeConfig, ServerSource, ZoneEntry,
};

// Re-export main functionality
pub use emitter::OverrideDocument;
pub use fetch::{DocumentFetcher, HttpFetcher};
pub use pipeline::{OverrideScraper, ScrapeOutput, ScrapeSummary};
pub use zones::{HostResolver, ServerExtractor};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
pub fn init() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();
    Ok(())
}
