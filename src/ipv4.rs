//! IPv4 address space table parsing

use serde::Deserialize;

use crate::error::{OverridesError, Result};
use crate::types::IpPrefixEntry;

const PREFIX_COLUMN: &str = "Prefix";
const WHOIS_COLUMN: &str = "WHOIS";

#[derive(Debug, Deserialize)]
struct AssignmentRow {
    #[serde(rename = "Prefix")]
    prefix: String,
    #[serde(rename = "WHOIS", default)]
    whois: String,
}

/// Rows of the address space table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentTable {
    pub entries: Vec<IpPrefixEntry>,
    /// Rows dropped because their prefix could not be read
    pub skipped: usize,
}

/// Numeric key from the fixed three character prefix field, `010/8` -> 10.
///
/// Anything not zero-padded to three digits does not parse.
pub fn parse_prefix(raw: &str) -> Result<u16> {
    raw.get(0..3)
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| {
            OverridesError::parse(
                format!("Prefix '{}' does not start with a three digit block", raw),
                Some(raw.to_string()),
            )
        })
}

/// Parse the CSV table. A missing `Prefix` or `WHOIS` column is fatal;
/// unreadable rows are logged and skipped.
pub fn parse_assignments(text: &str) -> Result<AssignmentTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    for column in [PREFIX_COLUMN, WHOIS_COLUMN] {
        if !headers.iter().any(|h| h == column) {
            return Err(OverridesError::parse(
                format!("Column '{}' missing from address space table", column),
                None,
            ));
        }
    }

    let mut table = AssignmentTable::default();
    for (index, row) in reader.deserialize::<AssignmentRow>().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::warn!(row = index + 1, error = %e, "Skipping unreadable row");
                table.skipped += 1;
                continue;
            }
        };

        let prefix = match parse_prefix(&row.prefix) {
            Ok(prefix) => prefix,
            Err(e) => {
                tracing::warn!(row = index + 1, error = %e, "Skipping row");
                table.skipped += 1;
                continue;
            }
        };

        let whois = row.whois.trim();
        let whois_server = if whois.is_empty() {
            None
        } else {
            Some(whois.to_string())
        };

        table.entries.push(IpPrefixEntry {
            prefix,
            whois_server,
        });
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
Prefix,Designation,Date,WHOIS,RDAP,Status [1],Note
000/8,IANA - Local Identification,1981-09,,,RESERVED,[2]
003/8,Administered by ARIN,1994-05,whois.arin.net,\"https://rdap.arin.net/registry
http://rdap.arin.net/registry\",LEGACY,
010/8,IANA - Private Use,1995-06,,,RESERVED,[4]
041/8,AFRINIC,2014-04,whois.afrinic.net,https://rdap.afrinic.net/rdap/,ALLOCATED,
";

    #[test]
    fn test_parse_prefix() {
        assert_eq!(parse_prefix("010/8").unwrap(), 10);
        assert_eq!(parse_prefix("223/8").unwrap(), 223);
        assert!(parse_prefix("10/8").is_err());
        assert!(parse_prefix("").is_err());
    }

    #[test]
    fn test_parse_assignments() {
        let table = parse_assignments(TABLE).unwrap();
        assert_eq!(table.skipped, 0);
        assert_eq!(
            table.entries,
            vec![
                IpPrefixEntry { prefix: 0, whois_server: None },
                IpPrefixEntry { prefix: 3, whois_server: Some("whois.arin.net".to_string()) },
                IpPrefixEntry { prefix: 10, whois_server: None },
                IpPrefixEntry { prefix: 41, whois_server: Some("whois.afrinic.net".to_string()) },
            ]
        );
    }

    #[test]
    fn test_server_case_is_preserved() {
        let table = parse_assignments("Prefix,WHOIS\n012/8,Whois.ARIN.net\n").unwrap();
        assert_eq!(table.entries[0].whois_server.as_deref(), Some("Whois.ARIN.net"));
    }

    #[test]
    fn test_unpadded_prefix_is_skipped() {
        let table = parse_assignments("Prefix,WHOIS\n10/8,whois.example.net\n011/8,\n").unwrap();
        assert_eq!(table.skipped, 1);
        assert_eq!(table.entries, vec![IpPrefixEntry { prefix: 11, whois_server: None }]);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let err = parse_assignments("Prefix,Designation\n000/8,IANA\n").unwrap_err();
        assert!(err.to_string().contains("WHOIS"));
    }
}
