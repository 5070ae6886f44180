//! Render an [`ApiRequest`] back into a curl command line.

use serde_json::Value;

use crate::request::ApiRequest;
use crate::url::append_query;

fn double_quote(s: &str) -> String {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

fn single_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Enabled params are appended to the url in their original order, enabled
/// headers follow, then the body: JSON bodies double quoted, anything else
/// single quoted.
pub fn to_curl(request: &ApiRequest) -> String {
    let url = append_query(
        &request.url,
        request
            .enabled_params()
            .map(|p| (p.key.as_str(), p.value.as_str())),
    );
    let mut curl = format!("curl -X {} {}", request.method, double_quote(&url));

    for header in request.enabled_headers() {
        curl.push_str(" -H ");
        curl.push_str(&double_quote(&format!("{}: {}", header.key, header.value)));
    }

    if let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) {
        let quoted = match serde_json::from_str::<Value>(body) {
            Ok(_) => double_quote(body),
            Err(_) => single_quote(body),
        };
        curl.push_str(" -d ");
        curl.push_str(&quoted);
    }

    if request.settings.follow_redirects {
        curl.push_str(" -L");
    }
    if !request.settings.verify_ssl {
        curl.push_str(" -k");
    }
    if request.settings.compressed {
        curl.push_str(" --compressed");
    }

    curl
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::KeyValuePair;
    use rstest::*;

    #[rstest]
    #[case("plain", r#""plain""#)]
    #[case(r#"{"a":"b"}"#, r#""{\"a\":\"b\"}""#)]
    #[case(r"C:\path $HOME `x`", r#""C:\\path \$HOME \`x\`""#)]
    fn test_double_quote(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(double_quote(input), expected);
    }

    #[test]
    fn test_single_quote_escapes_quotes() {
        assert_eq!(single_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_to_curl_minimal() {
        let request = ApiRequest::new("GET", "https://example.com/users");
        assert_eq!(to_curl(&request), r#"curl -X GET "https://example.com/users""#);
    }

    #[test]
    fn test_to_curl_skips_disabled_entries_and_keeps_order() {
        let mut request = ApiRequest::new("POST", "https://example.com/search");
        let mut hidden = KeyValuePair::new("debug", "1");
        hidden.set_enabled(false);
        request.params = vec![
            KeyValuePair::new("q", "rust lang"),
            hidden,
            KeyValuePair::new("page", "2"),
        ];
        let mut hidden_header = KeyValuePair::new("X-Trace", "on");
        hidden_header.set_enabled(false);
        request.headers = vec![KeyValuePair::new("Accept", "*/*"), hidden_header];
        request.body = Some("name=ferris".into());

        assert_eq!(
            to_curl(&request),
            r#"curl -X POST "https://example.com/search?q=rust+lang&page=2" -H "Accept: */*" -d 'name=ferris'"#
        );
    }

    #[test]
    fn test_to_curl_json_body_and_settings() {
        let mut request = ApiRequest::new("PUT", "https://example.com/items/1");
        request.body = Some("{\n  \"a\": 1\n}".into());
        request.settings.follow_redirects = true;
        request.settings.verify_ssl = false;
        assert_eq!(
            to_curl(&request),
            "curl -X PUT \"https://example.com/items/1\" -d \"{\n  \\\"a\\\": 1\n}\" -L -k"
        );
    }
}
