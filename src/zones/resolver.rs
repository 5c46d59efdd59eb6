//! Per-zone WHOIS server resolution

use std::sync::Arc;

use super::detail::{parse_detail, DetailPage, ServerExtractor};
use super::fallback::FallbackProber;
use super::idn;
use crate::error::Result;
use crate::fetch::DocumentFetcher;
use crate::types::{ResolvedZone, ServerSource, ZoneEntry};
use crate::validator::HostnameValidator;

/// Resolves listing entries to WHOIS servers, one at a time.
///
/// Failures never escape [`ZoneResolver::resolve`]: they are logged and the
/// zone comes back unresolved.
pub struct ZoneResolver {
    fetcher: Arc<dyn DocumentFetcher>,
    extractor: Box<dyn ServerExtractor>,
    prober: FallbackProber,
    validator: HostnameValidator,
}

impl ZoneResolver {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        extractor: Box<dyn ServerExtractor>,
        prober: FallbackProber,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            extractor,
            prober,
            validator: HostnameValidator::new()?,
        })
    }

    pub async fn resolve(&self, entry: &ZoneEntry) -> ResolvedZone {
        let key = idn::listing_key(&entry.raw_label, entry.detail_url.as_ref());

        let Some(url) = &entry.detail_url else {
            tracing::warn!(zone = %key, "No detail page for zone");
            return ResolvedZone::unresolved(key);
        };

        let text = match self.fetcher.fetch(url.as_str()).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(zone = %key, url = %url, error = %e, "Could not fetch zone detail page");
                return ResolvedZone::unresolved(key);
            }
        };

        match parse_detail(&text, self.extractor.as_ref()) {
            Ok(page) => self.resolve_page(page).await,
            Err(e) => {
                tracing::warn!(zone = %key, url = %url, kind = e.kind(), error = %e, "Could not parse zone detail page");
                ResolvedZone::unresolved(key)
            }
        }
    }

    async fn resolve_page(&self, page: DetailPage) -> ResolvedZone {
        let DetailPage {
            zone_name,
            published_server,
        } = page;

        if let Some(server) = published_server {
            if self.validator.is_well_formed(&server) {
                tracing::info!(zone = %zone_name, server = %server, "WHOIS server found");
                return ResolvedZone {
                    zone_name,
                    whois_server: Some(server),
                    source: Some(ServerSource::Published),
                };
            }
            tracing::warn!(
                zone = %zone_name,
                server = %server,
                extractor = self.extractor.name(),
                "Ignoring malformed WHOIS server"
            );
        }

        tracing::info!(zone = %zone_name, candidate = %self.prober.candidate(&zone_name), "Trying fallback server");
        match self.prober.probe(&zone_name).await {
            Ok(server) => {
                tracing::info!(zone = %zone_name, server = %server, "WHOIS server found by fallback");
                ResolvedZone {
                    zone_name,
                    whois_server: Some(server),
                    source: Some(ServerSource::Fallback),
                }
            }
            Err(e) => {
                tracing::info!(zone = %zone_name, error = %e, "No WHOIS server found");
                ResolvedZone::unresolved(zone_name)
            }
        }
    }
}
