//! Zone label normalization

use url::Url;

use crate::error::{OverridesError, Result};

const MAX_LABEL_LEN: usize = 63;

/// Strip dots, whitespace and bidi marks the listing wraps labels in
fn clean_label(label: &str) -> &str {
    label.trim_matches(|c: char| {
        c == '.' || c.is_whitespace() || matches!(c, '\u{200e}' | '\u{200f}')
    })
}

/// Lowercase ASCII-compatible encoding of a single zone label.
///
/// ASCII labels pass through as-is (apart from case), so already-encoded
/// `xn--` labels are never re-validated.
pub fn to_ace(label: &str) -> Result<String> {
    let label = clean_label(label);
    if label.is_empty() {
        return Err(OverridesError::encoding(label, "empty label"));
    }

    let ace = if label.is_ascii() {
        label.to_string()
    } else {
        idna::domain_to_ascii(label)
            .map_err(|e| OverridesError::encoding(label, format!("{:?}", e)))?
    };

    if ace.is_empty() || ace.len() > MAX_LABEL_LEN || ace.contains('.') {
        return Err(OverridesError::encoding(
            label,
            format!("'{}' is not a single label of 1 to {} characters", ace, MAX_LABEL_LEN),
        ));
    }

    let ace = ace.to_lowercase();
    if !ace.chars().all(is_ldh) {
        return Err(OverridesError::encoding(
            label,
            format!("'{}' contains characters outside [-a-z0-9]", ace.escape_debug()),
        ));
    }

    Ok(ace)
}

fn is_ldh(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'
}

/// Key for a listing row whose detail page never produced a zone name.
///
/// Tries the link text, then the detail page's file stem (`com.html`), and
/// finally the link text with everything outside `[-a-z0-9]` replaced.
pub fn listing_key(raw_label: &str, detail_url: Option<&Url>) -> String {
    if let Ok(key) = to_ace(raw_label) {
        return key;
    }

    let from_url = detail_url
        .and_then(|url| url.path_segments()?.last().map(str::to_string))
        .map(|file| match file.rsplit_once('.') {
            Some((stem, _)) => stem.to_string(),
            None => file,
        })
        .and_then(|stem| to_ace(&stem).ok());
    if let Some(key) = from_url {
        tracing::warn!(label = %raw_label.escape_debug(), key = %key, "Zone label unusable, keyed by detail page");
        return key;
    }

    let sanitized: String = clean_label(raw_label)
        .to_lowercase()
        .chars()
        .map(|c| if is_ldh(c) { c } else { '-' })
        .collect();
    let sanitized = sanitized.trim_matches('-');
    let key = if sanitized.is_empty() { "unknown" } else { sanitized };
    tracing::warn!(label = %raw_label.escape_debug(), key = %key, "Zone label unusable, sanitized");
    key.to_string()
}
