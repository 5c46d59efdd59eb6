//! Scrape runs: listing to override document

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use url::Url;

use crate::emitter::OverrideDocument;
use crate::error::Result;
use crate::fetch::{DocumentFetcher, HttpFetcher};
use crate::ipv4::parse_assignments;
use crate::types::{Pipeline, ScrapeConfig, ServerSource};
use crate::zones::{
    DnsResolver, FallbackProber, HostResolver, LabelSiblingExtractor, ListingRow,
    ServerExtractor, ZoneListing, ZoneResolver,
};

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeSummary {
    pub entries_seen: usize,
    pub skipped: usize,
    pub published: usize,
    pub fallback: usize,
    pub unresolved: usize,
}

impl ScrapeSummary {
    pub fn resolved(&self) -> usize {
        self.published + self.fallback
    }
}

/// Finished document plus its counters
#[derive(Debug, Clone)]
pub struct ScrapeOutput {
    pub document: OverrideDocument,
    pub summary: ScrapeSummary,
}

/// Runs either pipeline sequentially, one document at a time
pub struct OverrideScraper {
    config: ScrapeConfig,
    fetcher: Arc<dyn DocumentFetcher>,
    resolver: ZoneResolver,
}

impl OverrideScraper {
    /// Scraper using HTTP, system DNS and the `WHOIS Server:` label rule
    pub fn new(config: ScrapeConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config));
        Self::with_parts(
            config,
            fetcher,
            Box::new(DnsResolver),
            Box::new(LabelSiblingExtractor::whois_server()?),
        )
    }

    pub fn with_parts(
        config: ScrapeConfig,
        fetcher: Arc<dyn DocumentFetcher>,
        host_resolver: Box<dyn HostResolver>,
        extractor: Box<dyn ServerExtractor>,
    ) -> Result<Self> {
        config.validate()?;
        let prober = FallbackProber::new(host_resolver)?;
        let resolver = ZoneResolver::new(Arc::clone(&fetcher), extractor, prober)?;

        Ok(Self {
            config,
            fetcher,
            resolver,
        })
    }

    /// Run the configured pipeline
    pub async fn run(&self) -> Result<ScrapeOutput> {
        match self.config.pipeline {
            Pipeline::Zones => self.scrape_zones().await,
            Pipeline::Ipv4 => self.scrape_ipv4().await,
        }
    }

    /// Root zone database to an `[overrides]` section.
    ///
    /// Only a failure to fetch or parse the listing itself is an error.
    pub async fn scrape_zones(&self) -> Result<ScrapeOutput> {
        let started = Instant::now();
        let root = Url::parse(&self.config.root_zone_url)?;

        tracing::info!(url = %root, "Scraping root zone database");
        let text = self.fetcher.fetch(root.as_str()).await?;
        // Html is not Send; finish with the document before the next await
        let rows: Vec<ListingRow> = ZoneListing::parse(&text, &root)?.rows().collect();

        let mut document = OverrideDocument::overrides();
        let mut summary = ScrapeSummary::default();

        for row in rows {
            summary.entries_seen += 1;

            let entry = match row {
                ListingRow::Zone(entry) => entry,
                ListingRow::Skipped { label, reason } => {
                    tracing::debug!(zone = %label, reason = %reason, "Skipping zone");
                    summary.skipped += 1;
                    continue;
                }
            };

            if !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }

            let zone = self.resolver.resolve(&entry).await;
            match (zone.whois_server, zone.source) {
                (Some(server), source) => {
                    if source == Some(ServerSource::Fallback) {
                        summary.fallback += 1;
                    } else {
                        summary.published += 1;
                    }
                    document.push_mapping(zone.zone_name, server);
                }
                (None, _) => {
                    summary.unresolved += 1;
                    document.push_unresolved(zone.zone_name);
                }
            }
        }

        log_summary(Pipeline::Zones, &summary, started);
        Ok(ScrapeOutput { document, summary })
    }

    /// IPv4 address space table to bare `prefix=server` lines
    pub async fn scrape_ipv4(&self) -> Result<ScrapeOutput> {
        let started = Instant::now();
        let url = &self.config.ipv4_assignments_url;

        tracing::info!(url = %url, "Scraping IPv4 address space");
        let text = self.fetcher.fetch(url).await?;
        let table = parse_assignments(&text)?;

        let mut document = OverrideDocument::bare();
        let mut summary = ScrapeSummary {
            entries_seen: table.entries.len() + table.skipped,
            skipped: table.skipped,
            ..Default::default()
        };

        for entry in table.entries {
            match entry.whois_server {
                Some(server) => {
                    tracing::info!(prefix = entry.prefix, server = %server, "WHOIS server found");
                    summary.published += 1;
                    document.push_mapping(entry.prefix.to_string(), server);
                }
                None => {
                    tracing::info!(prefix = entry.prefix, "No WHOIS server found");
                    summary.unresolved += 1;
                    document.push_unresolved(entry.prefix.to_string());
                }
            }
        }

        log_summary(Pipeline::Ipv4, &summary, started);
        Ok(ScrapeOutput { document, summary })
    }
}

fn log_summary(pipeline: Pipeline, summary: &ScrapeSummary, started: Instant) {
    tracing::info!(
        pipeline = %pipeline,
        entries = summary.entries_seen,
        skipped = summary.skipped,
        published = summary.published,
        fallback = summary.fallback,
        unresolved = summary.unresolved,
        duration_ms = %started.elapsed().as_millis(),
        "Done"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OverridesError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    struct Fixed(Option<&'static str>);

    #[async_trait]
    impl DocumentFetcher for Fixed {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.0
                .map(str::to_string)
                .ok_or_else(|| OverridesError::fetch("unreachable", None, Some(url.to_string())))
        }
    }

    struct NoDns;

    #[async_trait]
    impl HostResolver for NoDns {
        async fn resolve(&self, host: &str) -> Result<()> {
            Err(OverridesError::resolution(host, "offline"))
        }
    }

    fn scraper(body: Option<&'static str>, pipeline: Pipeline) -> OverrideScraper {
        let config = ScrapeConfig {
            pipeline,
            ..Default::default()
        };
        OverrideScraper::with_parts(
            config,
            Arc::new(Fixed(body)),
            Box::new(NoDns),
            Box::new(LabelSiblingExtractor::whois_server().unwrap()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_listing_is_fatal() {
        let err = scraper(None, Pipeline::Zones).run().await.unwrap_err();
        assert_eq!(err.kind(), "fetch");
    }

    #[tokio::test]
    async fn test_listing_without_table_is_fatal() {
        let err = scraper(Some("<html></html>"), Pipeline::Zones).run().await.unwrap_err();
        assert_eq!(err.kind(), "parse");
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let output = scraper(Some("<table id=\"tld-table\"></table>"), Pipeline::Zones)
            .run()
            .await
            .unwrap();
        assert_eq!(output.document.render(), "[overrides]\n");
        assert_eq!(output.summary, ScrapeSummary::default());
    }

    #[tokio::test]
    async fn test_ipv4_pipeline() {
        let output = scraper(
            Some("Prefix,WHOIS\n003/8,whois.arin.net\n010/8,\n"),
            Pipeline::Ipv4,
        )
        .run()
        .await
        .unwrap();

        assert_eq!(output.document.render(), "3=whois.arin.net\n; No record for 10\n");
        assert_eq!(output.summary.resolved(), 1);
        assert_eq!(output.summary.unresolved, 1);
    }

    struct Site(HashMap<&'static str, &'static str>);

    #[async_trait]
    impl DocumentFetcher for Site {
        async fn fetch(&self, url: &str) -> Result<String> {
            self.0
                .get(url)
                .map(|body| body.to_string())
                .ok_or_else(|| OverridesError::fetch("not found", Some(404), Some(url.to_string())))
        }
    }

    const PACED_LISTING: &str = r#"<table id="tld-table"><tbody>
<tr><td><span class="domain tld"><a href="/db/aa.html">.aa</a></span></td><td>generic</td><td>AA Registry</td></tr>
<tr><td><span class="domain tld"><a href="/db/test.html">.test</a></span></td><td>test</td><td>Internet Assigned Numbers Authority</td></tr>
<tr><td><span class="domain tld"><a href="/db/bb.html">.bb</a></span></td><td>generic</td><td>BB Registry</td></tr>
</tbody></table>"#;

    #[tokio::test(start_paused = true)]
    async fn test_delay_before_each_detail_fetch() {
        let site = Site(HashMap::from([
            ("https://r.test/db", PACED_LISTING),
            ("https://r.test/db/aa.html", "<h1>Record for .aa</h1><b>WHOIS Server:</b> whois.nic.aa"),
            ("https://r.test/db/bb.html", "<h1>Record for .bb</h1><b>WHOIS Server:</b> whois.nic.bb"),
        ]));
        let config = ScrapeConfig {
            root_zone_url: "https://r.test/db".to_string(),
            request_delay: Duration::from_secs(1),
            ..Default::default()
        };
        let scraper = OverrideScraper::with_parts(
            config,
            Arc::new(site),
            Box::new(NoDns),
            Box::new(LabelSiblingExtractor::whois_server().unwrap()),
        )
        .unwrap();

        let started = tokio::time::Instant::now();
        let output = scraper.run().await.unwrap();

        // Skipped rows are not paced
        assert_eq!(started.elapsed(), Duration::from_secs(2));
        assert_eq!(
            output.document.render(),
            "[overrides]\naa=whois.nic.aa\nbb=whois.nic.bb\n"
        );
        assert_eq!(output.summary.skipped, 1);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ScrapeConfig {
            root_zone_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(OverrideScraper::new(config).is_err());
    }
}
