//! Override document serialization

use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::error::{OverridesError, Result};

/// Section read by the WHOIS proxy for zone to server overrides
pub const OVERRIDES_SECTION: &str = "overrides";

/// An INI-style block of `key=value` lines.
///
/// Mappings are written in the order they were pushed, followed by one
/// `; No record for <key>` comment per unresolved key, also in push order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverrideDocument {
    section: Option<String>,
    mappings: Vec<(String, String)>,
    unresolved: Vec<String>,
}

impl OverrideDocument {
    /// Document headed by `[section]`
    pub fn with_section(section: impl Into<String>) -> Self {
        Self {
            section: Some(section.into()),
            ..Default::default()
        }
    }

    /// `[overrides]` document for the zone pipeline
    pub fn overrides() -> Self {
        Self::with_section(OVERRIDES_SECTION)
    }

    /// Document without a header
    pub fn bare() -> Self {
        Self::default()
    }

    pub fn push_mapping(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.mappings.push((key.into(), value.into()));
    }

    pub fn push_unresolved(&mut self, key: impl Into<String>) {
        self.unresolved.push(key.into());
    }

    pub fn section(&self) -> Option<&str> {
        self.section.as_deref()
    }

    pub fn mappings(&self) -> &[(String, String)] {
        &self.mappings
    }

    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Full text, one `\n` terminated line per entry
    pub fn render(&self) -> String {
        self.to_string()
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(self.render().as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    pub fn write_to_path(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.render()).map_err(|e| {
            OverridesError::io(e.to_string(), Some(path.display().to_string()))
        })
    }
}

impl fmt::Display for OverrideDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(section) = &self.section {
            writeln!(f, "[{}]", section)?;
        }
        for (key, value) in &self.mappings {
            writeln!(f, "{}={}", key, value)?;
        }
        for key in &self.unresolved {
            writeln!(f, "; No record for {}", key)?;
        }
        Ok(())
    }
}
