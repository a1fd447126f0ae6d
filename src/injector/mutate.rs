// src/injector/mutate.rs
// Per-vector mutation (4.3). Every function takes the original value by
// reference and returns a new value; nothing here mutates in place.

use crate::error::{RicochetError, RicochetResult};

/// Re-encode `url`'s query string with `key`'s value replaced. Other keys
/// and their order are preserved untouched.
pub fn mutate_query(url: &str, key: &str, new_value: &str) -> String {
    let mut parts = url.splitn(2, '?');
    let base = parts.next().unwrap_or(url);
    let Some(rest) = parts.next() else {
        return format!("{base}?{}={}", key, urlencoding::encode(new_value));
    };

    let (query, fragment) = match rest.split_once('#') {
        Some((q, f)) => (q, Some(f)),
        None => (rest, None),
    };

    let mut replaced = false;
    let mut pairs: Vec<String> = query
        .split('&')
        .map(|pair| {
            let mut kv = pair.splitn(2, '=');
            let pair_key = kv.next().unwrap_or("");
            let decoded_key = urlencoding::decode(pair_key).unwrap_or_default();
            if decoded_key == key {
                replaced = true;
                format!("{pair_key}={}", urlencoding::encode(new_value))
            } else {
                pair.to_string()
            }
        })
        .collect();

    if !replaced {
        pairs.push(format!("{}={}", key, urlencoding::encode(new_value)));
    }

    let new_query = pairs.join("&");
    match fragment {
        Some(f) => format!("{base}?{new_query}#{f}"),
        None => format!("{base}?{new_query}"),
    }
}

/// Replace the value of the header matching `name` case-insensitively,
/// preserving every other header's original casing and order.
pub fn mutate_header(headers: &[(String, String)], name: &str, new_value: &str) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                (k.clone(), new_value.to_string())
            } else {
                (k.clone(), v.clone())
            }
        })
        .collect()
}

/// Replace `name`'s value inside a `Cookie` header, reassembling with
/// `; ` between pairs.
pub fn mutate_cookie(cookie_header: &str, name: &str, new_value: &str) -> String {
    cookie_header
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let mut kv = pair.splitn(2, '=');
            let pair_name = kv.next().unwrap_or("");
            if pair_name == name {
                format!("{pair_name}={new_value}")
            } else {
                pair.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Replace `key`'s value in a form-urlencoded body, re-encoding every pair.
pub fn mutate_form_body(body: &str, key: &str, new_value: &str) -> String {
    body.split('&')
        .map(|pair| {
            let mut kv = pair.splitn(2, '=');
            let pair_key = kv.next().unwrap_or("");
            let decoded_key = urlencoding::decode(pair_key).unwrap_or_default();
            if decoded_key == key {
                format!("{}={}", urlencoding::encode(pair_key), urlencoding::encode(new_value))
            } else {
                pair.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Replace a top-level string field in a JSON body. Fails with
/// `MalformedRequest` if the body doesn't parse as a JSON object or `key`
/// isn't a top-level string field.
pub fn mutate_json_body(body: &str, key: &str, new_value: &str) -> RicochetResult<String> {
    let mut value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| RicochetError::MalformedRequest(format!("invalid JSON body: {e}")))?;

    let object = value
        .as_object_mut()
        .ok_or_else(|| RicochetError::MalformedRequest("JSON body is not an object".into()))?;

    match object.get(key) {
        Some(serde_json::Value::String(_)) => {
            object.insert(key.to_string(), serde_json::Value::String(new_value.to_string()));
        }
        _ => {
            return Err(RicochetError::MalformedRequest(format!(
                "field {key:?} is not a top-level string field"
            )));
        }
    }

    serde_json::to_string(&value)
        .map_err(|e| RicochetError::MalformedRequest(format!("failed to re-serialize JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_mutation_preserves_other_keys_and_order() {
        let out = mutate_query("http://t.example/s?b=2&a=1", "a", "PAYLOAD");
        assert_eq!(out, "http://t.example/s?b=2&a=PAYLOAD");
    }

    #[test]
    fn header_mutation_preserves_other_headers_casing() {
        let headers = vec![
            ("User-Agent".to_string(), "curl".to_string()),
            ("X-Forwarded-For".to_string(), "1.1.1.1".to_string()),
        ];
        let out = mutate_header(&headers, "user-agent", "PAYLOAD");
        assert_eq!(out[0], ("User-Agent".to_string(), "PAYLOAD".to_string()));
        assert_eq!(out[1], ("X-Forwarded-For".to_string(), "1.1.1.1".to_string()));
    }

    #[test]
    fn cookie_mutation_rebuilds_with_semicolon_space() {
        let out = mutate_cookie("a=1; b=2; c=3", "b", "PAYLOAD");
        assert_eq!(out, "a=1; b=PAYLOAD; c=3");
    }

    #[test]
    fn form_body_mutation_round_trips_other_pairs() {
        let out = mutate_form_body("user=bob&pass=hunter2", "user", "PAYLOAD");
        assert_eq!(out, "user=PAYLOAD&pass=hunter2");
    }

    #[test]
    fn json_body_mutation_replaces_string_field_only() {
        let out = mutate_json_body(r#"{"name":"bob","age":30}"#, "name", "PAYLOAD").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["name"], "PAYLOAD");
        assert_eq!(value["age"], 30);
    }

    #[test]
    fn json_body_mutation_rejects_non_string_field() {
        let err = mutate_json_body(r#"{"age":30}"#, "age", "PAYLOAD").unwrap_err();
        assert!(matches!(err, RicochetError::MalformedRequest(_)));
    }
}
