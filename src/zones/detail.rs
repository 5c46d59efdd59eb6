//! Zone detail page parsing

use scraper::{Html, Selector};

use super::{element_text, idn, selector};
use crate::error::{OverridesError, Result};

/// Rule for pulling the published WHOIS server out of a detail page.
///
/// Markup drift on the registry side should only ever need a new
/// implementation of this trait.
pub trait ServerExtractor: Send + Sync {
    /// The server as published, lowercased, or `None`
    fn extract(&self, document: &Html) -> Option<String>;

    fn name(&self) -> &str;
}

/// Finds an element whose text is exactly `label` and takes the text node
/// that immediately follows it: `<b>WHOIS Server:</b> whois.nic.io`.
pub struct LabelSiblingExtractor {
    label: String,
    selector: Selector,
}

impl LabelSiblingExtractor {
    pub fn new(tag: &str, label: impl Into<String>) -> Result<Self> {
        Ok(Self {
            label: label.into(),
            selector: selector(tag)?,
        })
    }

    /// `<b>WHOIS Server:</b>` as used on the IANA root zone database
    pub fn whois_server() -> Result<Self> {
        Self::new("b", "WHOIS Server:")
    }
}

impl ServerExtractor for LabelSiblingExtractor {
    fn extract(&self, document: &Html) -> Option<String> {
        document
            .select(&self.selector)
            .find(|element| element_text(*element) == self.label)
            .and_then(|element| element.next_sibling())
            .and_then(|node| node.value().as_text().map(|text| text.trim().to_lowercase()))
            .filter(|server| !server.is_empty())
    }

    fn name(&self) -> &str {
        &self.label
    }
}

/// What a detail page tells us about its zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailPage {
    /// Lowercase ACE form of the zone label
    pub zone_name: String,
    /// Server from the page, if any
    pub published_server: Option<String>,
}

/// Parse a zone detail page.
///
/// The canonical zone name comes from the page's `h1`, which reads
/// `<display name>.<zone>`.
pub fn parse_detail(text: &str, extractor: &dyn ServerExtractor) -> Result<DetailPage> {
    let document = Html::parse_document(text);

    let heading_selector = selector("h1")?;
    let heading = document
        .select(&heading_selector)
        .next()
        .map(|h1| h1.text().collect::<String>())
        .ok_or_else(|| OverridesError::parse("No heading found", None))?;

    let label = zone_label_from_heading(&heading)?;
    let zone_name = idn::to_ace(label)?;

    let published_server = extractor.extract(&document);

    Ok(DetailPage {
        zone_name,
        published_server,
    })
}

/// Take the zone label after the first `.` of a heading.
///
/// A label that still contains a dot or whitespace means the display name
/// itself had a period in it; that is rejected rather than guessed at.
pub fn zone_label_from_heading(heading: &str) -> Result<&str> {
    let (_, label) = heading.split_once('.').ok_or_else(|| {
        OverridesError::parse(
            format!("Could not find zone in heading '{}'", heading.trim()),
            Some(heading.to_string()),
        )
    })?;

    let label = label.trim();
    if label.is_empty() || label.contains('.') || label.contains(char::is_whitespace) {
        return Err(OverridesError::parse(
            format!("Ambiguous zone in heading '{}'", heading.trim()),
            Some(heading.to_string()),
        ));
    }

    Ok(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> LabelSiblingExtractor {
        LabelSiblingExtractor::whois_server().unwrap()
    }

    #[test]
    fn test_published_server() {
        let page = r#"
<html><body>
<h1>Delegation Record for .COM</h1>
<h2>Registry Information</h2>
<p>
  <b>URL for registration services:</b> <a href="http://www.verisigninc.com">http://www.verisigninc.com</a><br/>
  <b>WHOIS Server:</b> Whois.Verisign-GRS.com
</p>
</body></html>
"#;
        let detail = parse_detail(page, &extractor()).unwrap();
        assert_eq!(detail.zone_name, "com");
        assert_eq!(detail.published_server.as_deref(), Some("whois.verisign-grs.com"));
    }

    #[test]
    fn test_no_published_server() {
        let page = "<h1>Example Registry.xn--example</h1><p>No WHOIS here.</p>";
        let detail = parse_detail(page, &extractor()).unwrap();
        assert_eq!(detail.zone_name, "xn--example");
        assert_eq!(detail.published_server, None);
    }

    #[test]
    fn test_label_followed_by_element_is_not_a_server() {
        let page = "<h1>Registry.io</h1><p><b>WHOIS Server:</b><i>none</i></p>";
        let detail = parse_detail(page, &extractor()).unwrap();
        assert_eq!(detail.published_server, None);
    }

    #[test]
    fn test_idn_heading_is_ace_encoded() {
        let page = "<h1>Delegation Record for .\u{420}\u{424}</h1>";
        let detail = parse_detail(page, &extractor()).unwrap();
        assert_eq!(detail.zone_name, "xn--p1ai");
    }

    #[test]
    fn test_missing_heading() {
        let err = parse_detail("<p><b>WHOIS Server:</b> whois.nic.io</p>", &extractor());
        assert!(matches!(err, Err(OverridesError::Parse { .. })));
    }

    #[test]
    fn test_heading_without_dot() {
        assert!(zone_label_from_heading("Delegation Record").is_err());
    }

    #[test]
    fn test_ambiguous_heading() {
        assert!(zone_label_from_heading("Example Inc. Registry.tld").is_err());
        assert!(zone_label_from_heading("Registry.").is_err());
        assert_eq!(zone_label_from_heading("Example Registry.tld").unwrap(), "tld");
    }

    #[test]
    fn test_custom_extractor() {
        let page = "<h1>Registry.io</h1><p><span>Whois</span> whois.nic.io</p>";
        let extractor = LabelSiblingExtractor::new("span", "Whois").unwrap();
        let detail = parse_detail(page, &extractor).unwrap();
        assert_eq!(detail.published_server.as_deref(), Some("whois.nic.io"));
        assert_eq!(extractor.name(), "Whois");
    }
}
