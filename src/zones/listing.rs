//! Root zone listing parser

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{element_text, selector};
use crate::error::{OverridesError, Result};
use crate::types::ZoneEntry;

/// Delegation values that mean the zone has no operator to ask
const UNDELEGATED: &[&str] = &["Not assigned", "Retired"];

/// Why a listing row was left out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Link without `href`, e.g. a group header
    NoLink,
    /// Reserved test zone
    TestZone,
    /// Not assigned or retired
    Undelegated,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::NoLink => write!(f, "no link"),
            SkipReason::TestZone => write!(f, "test zone"),
            SkipReason::Undelegated => write!(f, "not delegated"),
        }
    }
}

/// Outcome of classifying one listing row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingRow {
    Zone(ZoneEntry),
    Skipped { label: String, reason: SkipReason },
}

/// Parsed root zone listing
pub struct ZoneListing {
    document: Html,
    base: Url,
    link_selector: Selector,
    cell_selector: Selector,
}

impl ZoneListing {
    /// Parse the listing page fetched from `base`.
    ///
    /// Fails when the page has no `#tld-table`.
    pub fn parse(text: &str, base: &Url) -> Result<Self> {
        let document = Html::parse_document(text);

        let table_selector = selector("#tld-table")?;
        if document.select(&table_selector).next().is_none() {
            return Err(OverridesError::parse(
                "Listing table #tld-table not found",
                None,
            ));
        }

        Ok(Self {
            document,
            base: base.clone(),
            link_selector: selector("#tld-table .tld a")?,
            cell_selector: selector("td")?,
        })
    }

    /// Rows in document order, classified lazily
    pub fn rows(&self) -> impl Iterator<Item = ListingRow> + '_ {
        self.document
            .select(&self.link_selector)
            .map(move |link| self.classify(link))
    }

    /// Only the rows that should be resolved
    pub fn entries(&self) -> impl Iterator<Item = ZoneEntry> + '_ {
        self.rows().filter_map(|row| match row {
            ListingRow::Zone(entry) => Some(entry),
            ListingRow::Skipped { .. } => None,
        })
    }

    fn classify(&self, link: ElementRef<'_>) -> ListingRow {
        let label = element_text(link);

        let Some(href) = link.value().attr("href") else {
            return ListingRow::Skipped {
                label,
                reason: SkipReason::NoLink,
            };
        };

        let cells: Vec<String> = link
            .ancestors()
            .filter_map(ElementRef::wrap)
            .find(|element| element.value().name() == "tr")
            .map(|row| row.select(&self.cell_selector).map(element_text).collect())
            .unwrap_or_default();

        let status = cells.get(1).cloned().unwrap_or_default();
        let delegation = cells.get(2).cloned().unwrap_or_default();

        if status == "test" {
            return ListingRow::Skipped {
                label,
                reason: SkipReason::TestZone,
            };
        }
        if UNDELEGATED.contains(&delegation.as_str()) {
            return ListingRow::Skipped {
                label,
                reason: SkipReason::Undelegated,
            };
        }

        let detail_url = match self.base.join(href) {
            Ok(url) => Some(url),
            Err(e) => {
                tracing::warn!(zone = %label, href = %href, error = %e, "Unusable detail link");
                None
            }
        };

        ListingRow::Zone(ZoneEntry {
            raw_label: label,
            status,
            delegation,
            detail_url,
        })
    }
}
