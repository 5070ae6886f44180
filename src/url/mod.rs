//! Url helpers used by the curl parser, the serializer and the swagger importer.
//!
//! Raw splitting is done by the winnow parser in [`parser`]; validity checks
//! lean on the `url` crate.

pub mod parser;
pub mod protocol;

use ::url::{Host, Url, form_urlencoded};

use self::parser::split_url;
use self::protocol::Scheme;

pub fn has_scheme(raw: &str) -> bool {
    split_url(raw).scheme.is_some()
}

/// Prefix `default` when `raw` carries no scheme.
pub fn normalize(raw: &str, default: Scheme) -> String {
    if has_scheme(raw) || default == Scheme::Unknown {
        raw.to_string()
    } else {
        format!("{}://{}", default, raw)
    }
}

fn is_plausible_host(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(domain)) => domain.contains('.') || domain == "localhost",
        Some(Host::Ipv4(_)) | Some(Host::Ipv6(_)) => true,
        None => false,
    }
}

/// True when `raw` on its own is an http(s) url, with or without the scheme.
pub fn is_simple_url(raw: &str) -> bool {
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return false;
    }
    if raw.starts_with('-') || raw.starts_with('@') {
        return false;
    }

    if has_scheme(raw) {
        return match Url::parse(raw) {
            Ok(u) => Scheme::from(u.scheme()).is_http() && is_plausible_host(&u),
            Err(_) => false,
        };
    }

    // bare numbers like `10` would otherwise pass as ipv4 hosts
    let written_host = split_url(raw).host();
    if !(written_host.contains('.') || written_host.starts_with('[') || written_host == "localhost") {
        return false;
    }
    match Url::parse(&format!("https://{}", raw)) {
        Ok(u) => is_plausible_host(&u),
        Err(_) => false,
    }
}

/// Whether a curl argument should be taken as the request target.
pub fn looks_like_url(token: &str) -> bool {
    let lower = token.to_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("www.") {
        return true;
    }
    !has_scheme(token) && is_simple_url(token)
}

/// Decoded query parameters of `raw`, in the order they appear.
pub fn query_params(raw: &str) -> Vec<(String, String)> {
    match split_url(raw).query {
        Some(query) => form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Vec::new(),
    }
}

/// Drop the query string (and whatever follows it) from `raw`, returning the
/// remaining url and the decoded parameters. A `?` inside the fragment does
/// not start a query.
pub fn split_query(raw: &str) -> (String, Vec<(String, String)>) {
    let parts = split_url(raw);
    if parts.query.is_none() {
        return (raw.to_string(), Vec::new());
    }
    let base_len = parts.scheme.map_or(0, |scheme| scheme.len() + "://".len())
        + parts.authority.len()
        + parts.path.len();
    (raw[..base_len].to_string(), query_params(raw))
}

/// Append `pairs` to the query string of `raw`, keeping any fragment last.
pub fn append_query<'p, I>(raw: &str, pairs: I) -> String
where
    I: IntoIterator<Item = (&'p str, &'p str)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut appended = false;
    for (key, value) in pairs {
        serializer.append_pair(key, value);
        appended = true;
    }
    if !appended {
        return raw.to_string();
    }
    let encoded = serializer.finish();

    let (head, fragment) = match raw.split_once('#') {
        Some((head, fragment)) => (head, Some(fragment)),
        None => (raw, None),
    };
    let separator = match head.split_once('?') {
        Some((_, "")) => "",
        Some(_) => "&",
        None => "?",
    };

    let mut url = format!("{}{}{}", head, separator, encoded);
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

/// The last non-empty path segment, else the host, else whatever follows the
/// last `/`.
pub fn last_segment(raw: &str) -> String {
    let normalized = normalize(raw, Scheme::Https);
    match Url::parse(&normalized) {
        Ok(u) => {
            let segment = u
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                .map(str::to_string);
            match segment {
                Some(segment) => segment,
                None => u.host_str().unwrap_or_default().to_string(),
            }
        }
        Err(_) => {
            let parts = split_url(raw);
            match parts.path_segments().last() {
                Some(segment) => segment.to_string(),
                None => match raw.rsplit('/').next() {
                    Some(tail) if !tail.is_empty() => tail.to_string(),
                    _ => raw.to_string(),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::generic_parse;
    use rstest::*;

    #[rstest]
    #[case("https://example.com/path", true)]
    #[case("example.com/path?x=1", true)]
    #[case("localhost:8080/health", true)]
    #[case("http://127.0.0.1:9000", true)]
    #[case("ftp://example.com/file", false)]
    #[case("curl", false)]
    #[case("not a url and not curl", false)]
    #[case("curl https://example.com", false)]
    #[case("-X", false)]
    #[case("10", false)]
    #[case("", false)]
    fn test_is_simple_url(#[case] input: &str, #[case] expected: bool) {
        generic_parse(is_simple_url, input, expected);
    }

    #[rstest]
    #[case("https://api.example.com", true)]
    #[case("HTTP://api.example.com", true)]
    #[case("www.example.com", true)]
    #[case("api.example.com/v1", true)]
    #[case("POST", false)]
    #[case("Content-Type: application/json", false)]
    fn test_looks_like_url(#[case] input: &str, #[case] expected: bool) {
        generic_parse(looks_like_url, input, expected);
    }

    #[test]
    fn test_normalize_only_adds_missing_scheme() {
        assert_eq!(normalize("example.com/a", Scheme::Https), "https://example.com/a");
        assert_eq!(normalize("example.com/a", Scheme::Http), "http://example.com/a");
        assert_eq!(normalize("http://example.com", Scheme::Https), "http://example.com");
    }

    #[test]
    fn test_split_query_keeps_order_and_decodes() {
        let (base, params) = split_query("https://example.com/path?y=2&x=a%20b&y=3#frag");
        assert_eq!(base, "https://example.com/path");
        assert_eq!(
            params,
            vec![
                ("y".to_string(), "2".to_string()),
                ("x".to_string(), "a b".to_string()),
                ("y".to_string(), "3".to_string()),
            ]
        );
    }

    #[rstest]
    #[case("https://example.com/path#frag")]
    #[case("https://example.com/p#frag?a=1")]
    #[case("example.com/p#top?x=1&y=2")]
    fn test_split_query_without_query(#[case] raw: &str) {
        let (base, params) = split_query(raw);
        assert_eq!(base, raw);
        assert!(params.is_empty());
    }

    #[test]
    fn test_split_query_without_scheme() {
        let (base, params) = split_query("example.com/p?x=1#top");
        assert_eq!(base, "example.com/p");
        assert_eq!(params, vec![("x".to_string(), "1".to_string())]);
    }

    #[rstest]
    #[case("https://example.com/p", vec![("a", "1"), ("b", "x y")], "https://example.com/p?a=1&b=x+y")]
    #[case("https://example.com/p?z=0", vec![("a", "1")], "https://example.com/p?z=0&a=1")]
    #[case("https://example.com/p#top", vec![("a", "1")], "https://example.com/p?a=1#top")]
    #[case("https://example.com/p", vec![], "https://example.com/p")]
    fn test_append_query(
        #[case] raw: &str,
        #[case] pairs: Vec<(&str, &str)>,
        #[case] expected: &str,
    ) {
        assert_eq!(append_query(raw, pairs), expected);
    }

    #[rstest]
    #[case("https://api.example.com/users/42", "42")]
    #[case("https://api.example.com/users/", "users")]
    #[case("https://api.example.com", "api.example.com")]
    #[case("example.com/things", "things")]
    fn test_last_segment(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(last_segment(input), expected);
    }
}
