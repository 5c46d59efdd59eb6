//! Hostname validation for override values

use crate::error::{OverridesError, Result};
use regex::Regex;

/// ASCII or ACE-encoded FQDN without a trailing dot. The consuming proxy
/// refuses to start on anything else.
pub const FQDN_PATTERN: &str = r"^([-a-z0-9]{1,63})(\.[-a-z0-9]{1,63})+$";

/// Validator for WHOIS server hostnames
pub struct HostnameValidator {
    pattern: Regex,
}

impl HostnameValidator {
    /// Create a new hostname validator
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(FQDN_PATTERN)
            .map_err(|e| OverridesError::config(format!("Invalid FQDN pattern: {}", e)))?;
        Ok(Self { pattern })
    }

    /// Whether `host` is a well-formed lowercase FQDN
    pub fn is_well_formed(&self, host: &str) -> bool {
        host.len() <= 253 && self.pattern.is_match(host)
    }

    /// Validate a hostname, returning it unchanged
    pub fn validate<'a>(&self, host: &'a str) -> Result<&'a str> {
        if host.is_empty() {
            return Err(OverridesError::parse("Hostname cannot be empty", None));
        }

        if !self.is_well_formed(host) {
            return Err(OverridesError::parse(
                format!("'{}' is not a well-formed hostname", host),
                Some(host.to_string()),
            ));
        }

        Ok(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_hosts() {
        let validator = HostnameValidator::new().unwrap();

        assert!(validator.is_well_formed("stereochro.me"));
        assert!(validator.is_well_formed("keithgaughan.co.uk"));
        assert!(validator.is_well_formed("whois.nic.xn--p1ai"));

        assert!(!validator.is_well_formed("stereochro.me."));
        assert!(!validator.is_well_formed("stereochrome"));
        assert!(!validator.is_well_formed("Whois.Example.com"));
        assert!(!validator.is_well_formed("whois example.com"));
    }

    #[test]
    fn test_validate_errors() {
        let validator = HostnameValidator::new().unwrap();

        assert_eq!(validator.validate("whois.nic.io").unwrap(), "whois.nic.io");
        assert!(validator.validate("").is_err());
        assert!(validator.validate("(none)").is_err());
    }
}
