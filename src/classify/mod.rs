//! Coarse string classification: ip, domain, host, url
//!
//! These are shape checks, not validators. `999.1.1.1` is an "ip".

use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

lazy_static! {
    static ref IP: Regex = Regex::new(r"^(\d{1,3}\.){3}\d{1,3}$").unwrap();
    static ref DOMAIN: Regex =
        Regex::new(r"^([A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?\.)+[A-Za-z]{2,}$").unwrap();
    static ref HOST: Regex = Regex::new(r"^[A-Za-z0-9.-]+:\d{1,5}$").unwrap();
    static ref URL: Regex = Regex::new(r"^(?i:https?)://[^\s/$.?#][^\s]*$").unwrap();
}

/// What a string looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Ip,
    Domain,
    Host,
    Url,
    Unknown,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Ip => "ip",
            Kind::Domain => "domain",
            Kind::Host => "host",
            Kind::Url => "url",
            Kind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify `input`; the first matching pattern wins
pub fn classify(input: &str) -> Kind {
    let patterns: [(&Regex, Kind); 4] = [
        (&*IP, Kind::Ip),
        (&*DOMAIN, Kind::Domain),
        (&*HOST, Kind::Host),
        (&*URL, Kind::Url),
    ];

    patterns
        .into_iter()
        .find(|(pattern, _)| pattern.is_match(input))
        .map(|(_, kind)| kind)
        .unwrap_or(Kind::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("192.168.0.1"), Kind::Ip);
        assert_eq!(classify("example.com"), Kind::Domain);
        assert_eq!(classify("example.com:8080"), Kind::Host);
        assert_eq!(classify("http://example.com/x"), Kind::Url);
        assert_eq!(classify("not a url"), Kind::Unknown);
    }

    #[test]
    fn test_shapes_not_validity() {
        assert_eq!(classify("999.999.999.999"), Kind::Ip);
        assert_eq!(classify("10.0.0.1:22"), Kind::Host);
        assert_eq!(classify("sub.example.co.uk"), Kind::Domain);
        assert_eq!(classify("HTTPS://Example.com"), Kind::Url);
        assert_eq!(classify("localhost"), Kind::Unknown);
        assert_eq!(classify("ftp://example.com"), Kind::Unknown);
        assert_eq!(classify(""), Kind::Unknown);
    }

    #[test]
    fn test_display() {
        assert_eq!(Kind::Domain.to_string(), "domain");
        assert_eq!(classify("1.2.3.4").as_str(), "ip");
    }
}
