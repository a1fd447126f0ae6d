// src/callback/extract.rs
// Shared correlation-ID extraction rule for both callback servers (4.4).

use crate::correlation;

/// Extract a candidate correlation ID from an HTTP request path: split on
/// `/`, take the last non-empty segment, and validate it. Returns `None`
/// for paths with no segments or a segment that fails the 16-hex-char
/// pattern.
pub fn from_http_path(path: &str) -> Option<String> {
    let candidate = path.split('/').filter(|s| !s.is_empty()).next_back()?;
    correlation::validate(candidate).map(str::to_string)
}

/// Extract a candidate correlation ID from a DNS QNAME's first label.
pub fn from_dns_first_label(qname: &str) -> Option<String> {
    let candidate = qname.split('.').next()?;
    correlation::validate(candidate).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_last_non_empty_path_segment() {
        assert_eq!(
            from_http_path("/a1b2c3d4e5f60718"),
            Some("a1b2c3d4e5f60718".to_string())
        );
        assert_eq!(
            from_http_path("/callback/a1b2c3d4e5f60718/"),
            Some("a1b2c3d4e5f60718".to_string())
        );
    }

    #[test]
    fn no_segments_yields_none() {
        assert_eq!(from_http_path("/"), None);
        assert_eq!(from_http_path(""), None);
    }

    #[test]
    fn rejects_malformed_candidates() {
        assert_eq!(from_http_path("/0000000000000000000"), None);
        assert_eq!(from_http_path("/A1B2C3D4E5F60718"), None);
    }

    #[test]
    fn dns_label_extraction_takes_first_label() {
        assert_eq!(
            from_dns_first_label("deadbeefcafef00d.attacker.example"),
            Some("deadbeefcafef00d".to_string())
        );
        assert_eq!(from_dns_first_label("attacker.example"), None);
    }
}
