//! Target URL scheme handling.

use serde::{Deserialize, Serialize};

/// Protocol a comparison target is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    #[default]
    Http,
    /// HTTP over TLS
    Https,
}

impl Protocol {
    /// Parse protocol from URL scheme
    pub fn from_scheme(scheme: &str) -> Result<Self, String> {
        match scheme.to_lowercase().as_str() {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            _ => Err(format!("Unsupported protocol scheme: {scheme}")),
        }
    }

    /// Extract the protocol from the scheme of an absolute URL.
    pub fn from_url(url: &str) -> Result<Self, String> {
        match url.split_once("://") {
            Some((scheme, _)) => Self::from_scheme(scheme),
            None => Err(format!("Invalid URL format (missing scheme): {url}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_url() {
        assert_eq!(
            Protocol::from_url("http://localhost:8080"),
            Ok(Protocol::Http)
        );
        assert_eq!(
            Protocol::from_url("HTTPS://api.example.com/v1"),
            Ok(Protocol::Https)
        );
        assert!(Protocol::from_url("localhost:8080").is_err());
        assert!(Protocol::from_url("ftp://files").is_err());
    }
}
