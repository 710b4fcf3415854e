//! Error types and handling for apilink operations.
//!
//! Errors only exist on the internal fetch/parse boundary. The page-rewrite
//! entry point never surfaces them to the caller: any failure while building
//! the navigation index degrades to "index unavailable" and the page text
//! passes through untouched.

use thiserror::Error;

/// The main error type for apilink operations.
///
/// All fallible functions in this crate return `Result<T, Error>`. The error
/// type preserves the underlying transport errors for diagnostics while
/// keeping parse and configuration failures as plain messages.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Reading a configuration file is the only I/O this crate performs.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Covers the HTTP request for the navigation document, including
    /// connection failures and timeouts. The underlying `reqwest::Error`
    /// is preserved for detailed connection information.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The navigation document server answered with a non-success status.
    #[error("Unexpected HTTP status {code} from '{url}'")]
    Status {
        /// HTTP status code returned by the server.
        code: u16,
        /// URL of the request that failed.
        url: String,
    },

    /// Parsing the navigation document failed.
    ///
    /// Note that character decoding issues never end up here: the response
    /// body is decoded leniently, replacing undecodable bytes.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration is invalid or inaccessible.
    ///
    /// Malformed TOML, unparsable URLs, or out-of-range values.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// The index builder itself never retries within a process (failure is
    /// memoized), but hosts embedding this crate can use the hint when
    /// deciding whether a rerun of the build is worth attempting.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Status { code, .. } => *code >= 500,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            Self::Parse(_) | Self::Config(_) => false,
        }
    }

    /// Get the error category as a static string identifier.
    ///
    /// Useful for grouping diagnostics in the host build pipeline's logs.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) | Self::Status { .. } => "network",
            Self::Parse(_) => "parse",
            Self::Config(_) => "config",
        }
    }
}

/// A convenient Result type alias for apilink operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_errors_categorized_as_network() {
        let err = Error::Status {
            code: 503,
            url: "https://api.koog.ai/navigation.html".to_string(),
        };
        assert_eq!(err.category(), "network");
        assert!(err.is_recoverable());

        let err = Error::Status {
            code: 404,
            url: "https://api.koog.ai/navigation.html".to_string(),
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_parse_and_config_not_recoverable() {
        assert!(!Error::Parse("bad html".to_string()).is_recoverable());
        assert!(!Error::Config("bad url".to_string()).is_recoverable());
        assert_eq!(Error::Parse("bad html".to_string()).category(), "parse");
    }

    #[test]
    fn test_toml_error_converts_to_config() {
        let toml_err = toml::from_str::<toml::Value>("not = = toml").unwrap_err();
        let err: Error = toml_err.into();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_io_timeout_recoverable() {
        let err = Error::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout"));
        assert!(err.is_recoverable());

        let err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(!err.is_recoverable());
    }
}
