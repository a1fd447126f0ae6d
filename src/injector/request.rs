// src/injector/request.rs
// Stand-in for the external request parser's output (6, "Request parser").
// The core never parses raw HTTP text itself; it consumes this shape.

/// A parsed HTTP request, immutable once built. Mutation sites in
/// `mutate.rs` always construct a new value rather than editing this one in
/// place.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub method: String,
    /// Full target URL including query string.
    pub url: String,
    /// Headers in original order and casing.
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
    pub host: String,
}

impl ParsedRequest {
    /// Case-insensitive header lookup, first match wins.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    pub fn cookie_header(&self) -> Option<&str> {
        self.header("Cookie")
    }
}
