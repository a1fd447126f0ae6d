// src/injector/vectors.rs
// Injection vector taxonomy and extraction (4.3).

use super::request::ParsedRequest;

/// Fixed allowlist of security-relevant headers considered injectable,
/// checked in this order against the request's actual headers.
pub const INJECTABLE_HEADERS: &[&str] = &[
    "User-Agent",
    "Referer",
    "X-Forwarded-For",
    "X-Forwarded-Host",
    "Origin",
    "Forwarded",
    "X-Client-IP",
    "True-Client-IP",
    "X-Original-URL",
    "X-Rewrite-URL",
    "X-Custom-IP-Authorization",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorLocation {
    Query,
    Header,
    Cookie,
    Body,
    Json,
}

impl VectorLocation {
    pub fn as_str(self) -> &'static str {
        match self {
            VectorLocation::Query => "query",
            VectorLocation::Header => "header",
            VectorLocation::Cookie => "cookie",
            VectorLocation::Body => "body",
            VectorLocation::Json => "json",
        }
    }
}

impl std::fmt::Display for VectorLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One concrete `(location, parameter name)` pair on a specific request that
/// can carry a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionVector {
    pub location: VectorLocation,
    pub name: String,
    pub original_value: String,
}

impl InjectionVector {
    /// Location-qualified name as stored on `InjectionRecord.parameter`,
    /// e.g. `query:q` or `header:Referer`.
    pub fn qualified_name(&self) -> String {
        format!("{}:{}", self.location, self.name)
    }
}

/// Enumerate every injectable parameter once, in the deterministic order
/// required by 4.3: query params in URL order, then the header allowlist,
/// then cookies in header order, then body/JSON fields.
pub fn extract_vectors(request: &ParsedRequest) -> Vec<InjectionVector> {
    let mut vectors = Vec::new();
    vectors.extend(extract_query(request));
    vectors.extend(extract_headers(request));
    vectors.extend(extract_cookies(request));
    vectors.extend(extract_body(request));
    vectors
}

fn extract_query(request: &ParsedRequest) -> Vec<InjectionVector> {
    let Some(query) = request.url.splitn(2, '?').nth(1) else {
        return Vec::new();
    };
    // Strip a fragment if present; fragments never reach the server.
    let query = query.split('#').next().unwrap_or("");

    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next().unwrap_or("");
            let key = urlencoding::decode(key).ok()?.into_owned();
            let value = urlencoding::decode(value).ok()?.into_owned();
            Some(InjectionVector {
                location: VectorLocation::Query,
                name: key,
                original_value: value,
            })
        })
        .collect()
}

fn extract_headers(request: &ParsedRequest) -> Vec<InjectionVector> {
    INJECTABLE_HEADERS
        .iter()
        .filter_map(|name| {
            request.header(name).map(|value| InjectionVector {
                location: VectorLocation::Header,
                name: name.to_string(),
                original_value: value.to_string(),
            })
        })
        .collect()
}

fn extract_cookies(request: &ParsedRequest) -> Vec<InjectionVector> {
    let Some(cookie_header) = request.cookie_header() else {
        return Vec::new();
    };

    cookie_header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let mut parts = pair.splitn(2, '=');
            let name = parts.next()?.trim();
            let value = parts.next().unwrap_or("").trim();
            Some(InjectionVector {
                location: VectorLocation::Cookie,
                name: name.to_string(),
                original_value: value.to_string(),
            })
        })
        .collect()
}

fn extract_body(request: &ParsedRequest) -> Vec<InjectionVector> {
    let Some(content_type) = request.content_type() else {
        return Vec::new();
    };
    let Some(body) = &request.body else {
        return Vec::new();
    };
    let Ok(text) = std::str::from_utf8(body) else {
        return Vec::new();
    };

    if content_type.contains("application/x-www-form-urlencoded") {
        text.split('&')
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let mut parts = pair.splitn(2, '=');
                let key = parts.next()?;
                let value = parts.next().unwrap_or("");
                let key = urlencoding::decode(key).ok()?.into_owned();
                let value = urlencoding::decode(value).ok()?.into_owned();
                Some(InjectionVector {
                    location: VectorLocation::Body,
                    name: key,
                    original_value: value,
                })
            })
            .collect()
    } else if content_type.contains("application/json") {
        let Ok(serde_json::Value::Object(map)) = serde_json::from_str(text) else {
            return Vec::new();
        };
        map.into_iter()
            .filter_map(|(key, value)| match value {
                serde_json::Value::String(s) => Some(InjectionVector {
                    location: VectorLocation::Json,
                    name: key,
                    original_value: s,
                }),
                _ => None,
            })
            .collect()
    } else {
        Vec::new()
    }
}
