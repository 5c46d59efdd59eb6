//! Root zone database scraping
//!
//! The listing page yields one [`ZoneEntry`](crate::types::ZoneEntry) per
//! delegated zone; each entry's detail page is then resolved to a WHOIS
//! server, falling back to probing `whois.nic.<zone>`.

pub mod detail;
pub mod fallback;
pub mod idn;
pub mod listing;
pub mod resolver;

pub use detail::{parse_detail, DetailPage, LabelSiblingExtractor, ServerExtractor};
pub use fallback::{DnsResolver, FallbackProber, HostResolver};
pub use listing::{ListingRow, SkipReason, ZoneListing};
pub use resolver::ZoneResolver;

use crate::error::{OverridesError, Result};
use scraper::{ElementRef, Selector};

/// Compile a CSS selector, reporting failures as parse errors
pub(crate) fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| {
        OverridesError::parse(format!("Invalid selector '{}': {:?}", css, e), None)
    })
}

/// All descendant text of an element, trimmed
pub(crate) fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
