// src/injector/substitution.rs
// Callback placeholder substitution (4.3). Per the redesign notes, this is a
// linear scan over four literal token forms rather than a regex engine.

const TOKENS: &[&str] = &["{{CALLBACK}}", "{CALLBACK}", "${CALLBACK}"];

/// Replace every occurrence (case-insensitive) of `{{CALLBACK}}`,
/// `{{callback}}`, `{CALLBACK}`, or `${CALLBACK}` in `template` with
/// `callback_url`. A template with no placeholder is returned unchanged.
pub fn substitute_callback(template: &str, callback_url: &str) -> String {
    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut i = 0;

    'outer: while i < bytes.len() {
        for token in TOKENS {
            if matches_at(bytes, i, token.as_bytes()) {
                out.push_str(callback_url);
                i += token.len();
                continue 'outer;
            }
        }
        // `char_indices` would be needed for exact UTF-8 boundaries, but
        // every token above is ASCII, so byte-at-a-time copying is safe as
        // long as we copy whole chars for non-matches.
        let ch_len = template[i..].chars().next().map(char::len_utf8).unwrap_or(1);
        out.push_str(&template[i..i + ch_len]);
        i += ch_len;
    }

    out
}

fn matches_at(haystack: &[u8], pos: usize, needle: &[u8]) -> bool {
    if pos + needle.len() > haystack.len() {
        return false;
    }
    haystack[pos..pos + needle.len()]
        .iter()
        .zip(needle)
        .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

/// Build the full callback URL for a correlation ID, trimming trailing
/// slashes from the configured base.
pub fn callback_url(base: &str, correlation_id: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), correlation_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_four_forms_substitute_identically() {
        let url = "http://cb.example/a1b2c3d4e5f60718";
        let forms = [
            "q={{CALLBACK}}",
            "q={{callback}}",
            "q={CALLBACK}",
            "q=${CALLBACK}",
        ];
        let results: Vec<_> = forms.iter().map(|f| substitute_callback(f, url)).collect();
        assert!(results.iter().all(|r| r == &format!("q={url}")));
    }

    #[test]
    fn template_without_placeholder_is_unchanged() {
        let template = "' OR 1=1 --";
        assert_eq!(substitute_callback(template, "http://cb.example/x"), template);
    }

    #[test]
    fn substitutes_multiple_occurrences() {
        let out = substitute_callback("{{CALLBACK}} and {CALLBACK}", "http://cb.example/x");
        assert_eq!(out, "http://cb.example/x and http://cb.example/x");
    }

    #[test]
    fn callback_url_trims_trailing_slash() {
        assert_eq!(
            callback_url("http://cb.example/", "a1b2c3d4e5f60718"),
            "http://cb.example/a1b2c3d4e5f60718"
        );
    }
}
