//! Error handling for whois-overrides

use thiserror::Error;

/// Main error type for whois-overrides
#[derive(Error, Debug, Clone)]
pub enum OverridesError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Fetch error: {message}")]
    Fetch {
        message: String,
        status_code: Option<u16>,
        url: Option<String>,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        content: Option<String>,
    },

    #[error("Encoding error for '{label}': {message}")]
    Encoding { label: String, message: String },

    #[error("Resolution error for '{host}': {message}")]
    Resolution { host: String, message: String },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },
}

impl OverridesError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a fetch error
    pub fn fetch(
        message: impl Into<String>,
        status_code: Option<u16>,
        url: Option<String>,
    ) -> Self {
        Self::Fetch {
            message: message.into(),
            status_code,
            url,
        }
    }

    /// Create a parse error
    pub fn parse(message: impl Into<String>, content: Option<String>) -> Self {
        Self::Parse {
            message: message.into(),
            content,
        }
    }

    /// Create an IDNA encoding error
    pub fn encoding(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Encoding {
            label: label.into(),
            message: message.into(),
        }
    }

    /// Create a host resolution error
    pub fn resolution(host: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Resolution {
            host: host.into(),
            message: message.into(),
        }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Io {
            message: message.into(),
            path,
        }
    }

    /// Short name of the error class, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config { .. } => "config",
            Self::Fetch { .. } => "fetch",
            Self::Parse { .. } => "parse",
            Self::Encoding { .. } => "encoding",
            Self::Resolution { .. } => "resolution",
            Self::Io { .. } => "io",
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Config { message } => {
                format!("Configuration problem: {}\nCheck your .env file or command line flags", message)
            }
            Self::Fetch { message, status_code, url } => {
                let status = status_code.map_or(String::new(), |c| format!(" ({})", c));
                let target = url.as_ref().map_or(String::new(), |u| format!(" while fetching {}", u));
                format!("Fetch failed{}{}: {}\nCheck your internet connection and the source URL", status, target, message)
            }
            Self::Parse { message, .. } => {
                format!("Could not parse the source document: {}\nThe registry markup may have changed", message)
            }
            Self::Encoding { label, message } => {
                format!("Could not encode zone label '{}': {}", label, message)
            }
            Self::Resolution { host, message } => {
                format!("Could not resolve '{}': {}", host, message)
            }
            Self::Io { message, path } => {
                let path_info = path.as_ref().map_or(String::new(), |p| format!(" ({})", p));
                format!("File error{}: {}\nCheck file permissions and paths", path_info, message)
            }
        }
    }
}

/// Every transport failure, timeouts included, is a fetch error
impl From<reqwest::Error> for OverridesError {
    fn from(err: reqwest::Error) -> Self {
        let status_code = err.status().map(|s| s.as_u16());
        let url = err.url().map(|u| u.to_string());

        if err.is_timeout() {
            Self::fetch("Request timed out", status_code, url)
        } else if err.is_connect() {
            Self::fetch("Connection failed", status_code, url)
        } else if err.is_decode() {
            Self::fetch("Could not decode response body", status_code, url)
        } else {
            Self::fetch(err.to_string(), status_code, url)
        }
    }
}

impl From<csv::Error> for OverridesError {
    fn from(err: csv::Error) -> Self {
        Self::parse(err.to_string(), None)
    }
}

impl From<url::ParseError> for OverridesError {
    fn from(err: url::ParseError) -> Self {
        Self::parse(format!("Invalid URL: {}", err), None)
    }
}

impl From<std::io::Error> for OverridesError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string(), None)
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, OverridesError>;

/// Helper macros for common error patterns
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::error::OverridesError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::OverridesError::config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! parse_error {
    ($msg:expr) => {
        $crate::error::OverridesError::parse($msg, None)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::OverridesError::parse(format!($fmt, $($arg)*), None)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(OverridesError::fetch("boom", Some(500), None).kind(), "fetch");
        assert_eq!(OverridesError::parse("no table", None).kind(), "parse");
        assert_eq!(OverridesError::encoding("x", "bad").kind(), "encoding");
        assert_eq!(OverridesError::resolution("whois.nic.x", "nxdomain").kind(), "resolution");
    }

    #[test]
    fn test_user_message_includes_context() {
        let err = OverridesError::fetch(
            "HTTP 503",
            Some(503),
            Some("https://www.iana.org/domains/root/db".to_string()),
        );
        let msg = err.user_message();
        assert!(msg.contains("(503)"));
        assert!(msg.contains("https://www.iana.org/domains/root/db"));
    }

    #[test]
    fn test_macros() {
        let err = config_error!("bad delay {}", "abc");
        assert!(err.to_string().contains("bad delay abc"));

        let err = parse_error!("missing #tld-table");
        assert!(matches!(err, OverridesError::Parse { .. }));
    }
}
