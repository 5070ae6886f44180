//! From tokens to [`Curl`] arguments, and from arguments to an [`ApiRequest`].

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::curl::tokenizer::tokenize;
use crate::curl::{Curl, Header};
use crate::error::ParseError;
use crate::request::{ApiRequest, ApiTest, DEFAULT_REQUEST_NAME, KeyValuePair, RequestSettings};
use crate::url::{is_simple_url, last_segment, looks_like_url, normalize, split_query};

const CURL_CMD: &str = "curl";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Flags whose next argument is their value.
const VALUE_FLAGS: &[&str] = &[
    "-X",
    "--request",
    "-H",
    "--header",
    "-d",
    "--data",
    "--data-raw",
    "--data-binary",
    "--data-ascii",
    "--data-urlencode",
    "--json",
    "-F",
    "--form",
    "--url",
    "-A",
    "--user-agent",
    "-e",
    "--referer",
    "-b",
    "--cookie",
    "-u",
    "--user",
    "-o",
    "--output",
    "-m",
    "--max-time",
    "--connect-timeout",
    "-w",
    "--write-out",
    "-x",
    "--proxy",
    "--retry",
    "-T",
    "--upload-file",
    "--cacert",
    "--cert",
    "-E",
    "--key",
];

fn takes_value(flag: &str) -> bool {
    VALUE_FLAGS.contains(&flag)
}

/// True for the `curl` program name, in any case.
pub fn is_curl(token: &str) -> bool {
    token.eq_ignore_ascii_case(CURL_CMD)
}

/// `--data=x`, `--request=PUT`, `-XPUT`, `-d=x`: a flag with its value
/// attached to the same argument.
fn split_attached(token: &str) -> Option<(&str, &str)> {
    if token.starts_with("--") {
        let (name, value) = token.split_once('=')?;
        return takes_value(name).then_some((name, value));
    }
    if token.len() > 2 && token.is_char_boundary(2) {
        let (flag, value) = token.split_at(2);
        if takes_value(flag) {
            return Some((flag, value.strip_prefix('=').unwrap_or(value)));
        }
    }
    None
}

/// `-sSL` becomes `-s`, `-S`, `-L`; anything else is a single flag.
fn expand_flags(token: &str) -> Vec<Curl> {
    let short = token.strip_prefix('-').filter(|rest| !rest.starts_with('-'));
    match short {
        Some(bundle) if bundle.len() > 1 && bundle.chars().all(|c| c.is_ascii_alphabetic()) => bundle
            .chars()
            .map(|c| Curl::new_as_flag(&format!("-{}", c)))
            .collect(),
        _ => vec![Curl::new_as_flag(token)],
    }
}

/// `--json` also implies JSON `Content-Type` and `Accept` headers.
fn push_value_arg(args: &mut Vec<Result<Curl, ParseError>>, identifier: &str, param: &str) {
    if identifier == "--json" {
        args.push(Ok(Curl::Header(Header::new("Content-Type", JSON_CONTENT_TYPE))));
        args.push(Ok(Curl::Header(Header::new("Accept", JSON_CONTENT_TYPE))));
    }
    args.push(Curl::new(identifier, param));
}

/// Walk the tokens of a command line. Every argument keeps its own result so
/// a malformed one can be skipped without losing the rest.
pub fn curl_args_parse(tokens: &[String]) -> Vec<Result<Curl, ParseError>> {
    let mut args = Vec::new();
    let mut iter = tokens.iter().map(String::as_str).peekable();
    if iter.peek().is_some_and(|first| is_curl(first)) {
        iter.next();
    }

    while let Some(token) = iter.next() {
        if token.len() > 1 && token.starts_with('-') {
            if let Some((identifier, param)) = split_attached(token) {
                push_value_arg(&mut args, identifier, param);
            } else if takes_value(token) {
                match iter.next() {
                    Some(param) => push_value_arg(&mut args, token, param),
                    None => args.push(Err(ParseError::MissingValue {
                        flag: token.to_string(),
                    })),
                }
            } else {
                args.extend(expand_flags(token).into_iter().map(Ok));
            }
        } else if looks_like_url(token) {
            args.push(Ok(Curl::new_as_url(token)));
        } else {
            warn!(token, "ignoring positional argument");
        }
    }

    args
}

/// Tokenize and parse a command line, dropping malformed arguments.
pub fn curl_cmd_parse(input: &str) -> Result<Vec<Curl>, ParseError> {
    let tokens = tokenize(input);
    if tokens.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let curls = curl_args_parse(&tokens)
        .into_iter()
        .filter_map(|arg| match arg {
            Ok(curl) => Some(curl),
            Err(e) => {
                debug!(error = %e, "skipping curl argument");
                None
            }
        })
        .collect();
    Ok(curls)
}

fn render_json(value: &Value, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    rendered.unwrap_or_default()
}

/// Pretty print `raw` when it is JSON, otherwise keep it as is.
pub fn format_body(raw: &str, pretty: bool) -> String {
    if !pretty {
        return raw.to_string();
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => render_json(&value, true),
        Err(_) => raw.to_string(),
    }
}

fn assemble_body(data: Option<String>, form: Map<String, Value>, pretty: bool) -> Option<String> {
    let data = data.filter(|d| !d.is_empty());
    if form.is_empty() {
        return data.map(|d| format_body(&d, pretty));
    }

    match data {
        None => Some(render_json(&Value::Object(form), pretty)),
        Some(d) => match serde_json::from_str::<Value>(&d) {
            Ok(Value::Object(mut object)) => {
                object.extend(form);
                Some(render_json(&Value::Object(object), pretty))
            }
            _ => {
                debug!(fields = form.len(), "data body is not a JSON object, dropping form fields");
                Some(format_body(&d, pretty))
            }
        },
    }
}

fn request_name(method: &str, url: &str) -> String {
    let segment = last_segment(url);
    if segment.is_empty() {
        DEFAULT_REQUEST_NAME.to_string()
    } else {
        format!("{} {}", method, segment)
    }
}

/// A request built from the url alone, carrying its query string as params.
fn url_request(url: &str, method: &str, config: &ParserConfig) -> ApiRequest {
    let normalized = normalize(url, config.default_scheme);
    let (url, params) = split_query(&normalized);

    let mut request = ApiRequest::new(method, url);
    request.params = params
        .into_iter()
        .map(|(key, value)| KeyValuePair::new(key, value))
        .collect();
    request.name = request_name(&request.method, &request.url);
    request
}

/// Assemble a request out of parsed arguments.
///
/// The first url wins, the last method and the last data body win. Without
/// an explicit method, a body or form field means POST.
pub fn build_request(args: Vec<Curl>, config: &ParserConfig) -> Result<ApiRequest, ParseError> {
    let mut method: Option<String> = None;
    let mut url: Option<String> = None;
    let mut headers = Vec::new();
    let mut data: Option<String> = None;
    let mut form = Map::new();
    let mut settings = RequestSettings::default();
    let mut head = false;

    for arg in args {
        match arg {
            Curl::Method(m) => method = Some(m),
            Curl::Url(u) => {
                if url.is_none() {
                    url = Some(u);
                } else {
                    debug!(url = %u, "ignoring additional url");
                }
            }
            Curl::Header(h) => headers.push(KeyValuePair::new(h.key, h.value)),
            Curl::Data(d) => data = Some(d),
            Curl::Form(f) => {
                form.insert(f.key, Value::String(f.value));
            }
            Curl::Flag(flag) => match flag.as_str() {
                "-L" | "--location" => settings.follow_redirects = true,
                "-k" | "--insecure" => settings.verify_ssl = false,
                "--compressed" => settings.compressed = true,
                "-I" | "--head" => head = true,
                _ => debug!(flag = %flag, "flag does not affect the request"),
            },
        }
    }

    let url = url.ok_or(ParseError::MissingUrl)?;
    let has_payload = data.is_some() || !form.is_empty();
    let method = method.unwrap_or_else(|| {
        if head {
            "HEAD".to_string()
        } else if has_payload {
            "POST".to_string()
        } else {
            "GET".to_string()
        }
    });

    let mut request = url_request(&url, &method, config);
    request.headers = headers;
    request.body = assemble_body(data, form, config.pretty_body);
    request.settings = settings;
    if config.add_default_tests {
        request.tests.push(ApiTest::status_is_2xx());
    }
    Ok(request)
}

/// Parse a bare url or a curl command line.
pub fn parse_command(input: &str, config: &ParserConfig) -> Result<ApiRequest, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    if is_simple_url(trimmed) {
        return Ok(url_request(trimmed, "GET", config));
    }

    let curls = curl_cmd_parse(trimmed)?;
    build_request(curls, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::generic_parse;
    use rstest::*;

    trait StrExtensions {
        fn exchange_quotes(&self) -> String;
    }

    impl StrExtensions for str {
        fn exchange_quotes(&self) -> String {
            self.chars()
                .map(|c| match c {
                    '"' => '\'',
                    '\'' => '"',
                    _ => c,
                })
                .collect()
        }
    }

    const CURL_CMD_FULL: &str = r#"
        curl 'http://query.sse.com.cn/commonQuery.do?jsonCallBack=jsonpCallback89469743&sqlId=COMMON_SSE_SJ_GPSJ_CJGK_MRGK_C&PRODUCT_CODE=01%2C02%2C03%2C11%2C17&type=inParams&SEARCH_DATE=2024-03-18&_=1710914422498'  \
          -H 'Accept: */*' \
          -H 'Accept-Language: en-US,en;q=0.9,zh-CN;q=0.8,zh;q=0.7' \
          -H 'Cache-Control: no-cache' \
          -H 'Connection: keep-alive' \
          -H 'Pragma: no-cache' \
          -H 'Referer: http://www.sse.com.cn/'  \
          -H 'User-Agent: Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36' \
          --insecure
    "#;

    fn args(input: &str) -> Vec<Result<Curl, ParseError>> {
        curl_args_parse(&tokenize(input))
    }

    #[test]
    fn test_is_curl() {
        let cmd = "\t \r  \n Curl asdjfnv\n";
        assert!(is_curl(&tokenize(cmd)[0]));
        assert!(is_curl("CURL"));
        assert!(!is_curl("curlew.example.com"));
        assert_eq!(args("CURL https://example.com").len(), 1);
    }

    #[rstest]
    #[case("--data={\"a\":1}", Some(("--data", "{\"a\":1}")))]
    #[case("--request=PUT", Some(("--request", "PUT")))]
    #[case("-XPATCH", Some(("-X", "PATCH")))]
    #[case("-d=raw", Some(("-d", "raw")))]
    #[case("--insecure", None)]
    #[case("--verbose=yes", None)]
    #[case("-sL", None)]
    fn test_split_attached(#[case] input: &str, #[case] expected: Option<(&str, &str)>) {
        generic_parse(split_attached, input, expected);
    }

    #[test]
    fn test_expand_flags() {
        assert_eq!(
            expand_flags("-sSL"),
            vec![
                Curl::Flag("-s".into()),
                Curl::Flag("-S".into()),
                Curl::Flag("-L".into())
            ]
        );
        assert_eq!(expand_flags("--compressed"), vec![Curl::Flag("--compressed".into())]);
    }

    #[test]
    fn test_commands_parse() {
        let curls = curl_cmd_parse(CURL_CMD_FULL).unwrap();
        assert_eq!(curls.len(), 9, "curls:\r\n({:#?})", curls);
        assert!(matches!(&curls[0], Curl::Url(u) if u.starts_with("http://query.sse.com.cn/")));
        assert_eq!(curls[1], Curl::Header(Header::new("Accept", "*/*")));
        assert_eq!(curls[8], Curl::Flag("--insecure".into()));
    }

    #[test]
    fn test_commands_parse_with_swapped_quotes() {
        let curls = curl_cmd_parse(&CURL_CMD_FULL.exchange_quotes()).unwrap();
        assert_eq!(curls.len(), 9);
        assert_eq!(
            curls[6],
            Curl::Header(Header::new("Referer", "http://www.sse.com.cn/"))
        );
    }

    #[test]
    fn test_malformed_header_is_skipped_not_fatal() {
        let parsed = args("curl https://example.com -H 'broken' -H 'Accept: */*'");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1], Err(ParseError::InvalidHeader("broken".into())));
        assert_eq!(parsed[2], Ok(Curl::Header(Header::new("Accept", "*/*"))));

        let request = parse_command(
            "curl https://example.com -H 'broken' -H 'Accept: */*'",
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(request.headers, vec![KeyValuePair::new("Accept", "*/*")]);
    }

    #[test]
    fn test_trailing_flag_without_value() {
        let parsed = args("curl https://example.com -H");
        assert_eq!(
            parsed.last(),
            Some(&Err(ParseError::MissingValue { flag: "-H".into() }))
        );
    }

    #[test]
    fn test_first_url_wins() {
        let request = parse_command(
            "curl https://first.example.com/a https://second.example.com/b",
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(request.url, "https://first.example.com/a");
    }

    #[test]
    fn test_data_infers_post_and_explicit_method_wins() {
        let config = ParserConfig::default();
        let request = parse_command("curl https://example.com -d 'a=1'", &config).unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.body.as_deref(), Some("a=1"));

        let request = parse_command("curl -d 'a=1' -X get https://example.com", &config).unwrap();
        assert_eq!(request.method, "GET");
    }

    #[test]
    fn test_form_fields_become_json_object() {
        let request = parse_command(
            "curl https://example.com/upload -F 'name=ferris' -F 'lang=rust' -F 'broken'",
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(
            request.body.as_deref(),
            Some("{\n  \"name\": \"ferris\",\n  \"lang\": \"rust\"\n}")
        );
    }

    #[test]
    fn test_form_fields_merge_into_json_data() {
        let request = parse_command(
            r#"curl https://example.com -d '{"a":1}' -F 'b=2'"#,
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(
            request.body.as_deref(),
            Some("{\n  \"a\": 1,\n  \"b\": \"2\"\n}")
        );
    }

    #[test]
    fn test_form_fields_dropped_for_plain_data() {
        let request = parse_command(
            "curl https://example.com -d 'a=1' -F 'b=2'",
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(request.body.as_deref(), Some("a=1"));
    }

    #[test]
    fn test_settings_and_extra_headers() {
        let request = parse_command(
            "curl -sSL -k --compressed -u user:pass -A 'agent/1.0' -b 'sid=1' https://example.com/me",
            &ParserConfig::default(),
        )
        .unwrap();
        assert!(request.settings.follow_redirects);
        assert!(!request.settings.verify_ssl);
        assert!(request.settings.compressed);
        assert_eq!(request.header("Authorization"), Some("Basic dXNlcjpwYXNz"));
        assert_eq!(request.header("User-Agent"), Some("agent/1.0"));
        assert_eq!(request.header("Cookie"), Some("sid=1"));
    }

    #[test]
    fn test_data_urlencode_flag() {
        let request = parse_command(
            "curl https://example.com/s --data-urlencode 'q=hello world'",
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.body.as_deref(), Some("q=hello+world"));

        let request = parse_command(
            "curl https://example.com/s --data-urlencode=plain&text",
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(request.body.as_deref(), Some("plain%26text"));
    }

    #[test]
    fn test_json_flag_sets_body_and_headers() {
        let request = parse_command(
            r#"curl --json '{"a":1}' https://example.com/items"#,
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(request.method, "POST");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert_eq!(request.header("Accept"), Some("application/json"));
        assert_eq!(request.body.as_deref(), Some("{\n  \"a\": 1\n}"));
    }

    #[test]
    fn test_head_flag() {
        let request = parse_command("curl -I https://example.com", &ParserConfig::default()).unwrap();
        assert_eq!(request.method, "HEAD");
    }

    #[test]
    fn test_value_flags_do_not_leak_into_url() {
        let request = parse_command(
            "curl -o out.json --max-time 10 api.example.com/v1/items",
            &ParserConfig::default(),
        )
        .unwrap();
        assert_eq!(request.url, "https://api.example.com/v1/items");
        assert_eq!(request.name, "GET items");
    }

    #[test]
    fn test_missing_url() {
        assert_eq!(
            parse_command("curl -X POST -d 'x'", &ParserConfig::default()),
            Err(ParseError::MissingUrl)
        );
        assert_eq!(
            parse_command("   ", &ParserConfig::default()),
            Err(ParseError::EmptyInput)
        );
    }

    #[test]
    fn test_config_controls_scheme_body_and_tests() {
        let mut config = ParserConfig::default();
        config
            .set_default_scheme(crate::url::protocol::Scheme::Http)
            .set_pretty_body(false)
            .set_add_default_tests(false);
        let request = parse_command(r#"curl example.com/x -d '{"a": 1}'"#, &config).unwrap();
        assert_eq!(request.url, "http://example.com/x");
        assert_eq!(request.body.as_deref(), Some(r#"{"a": 1}"#));
        assert!(request.tests.is_empty());
    }

    #[rstest]
    #[case("not json", "not json")]
    #[case("[1,2]", "[\n  1,\n  2\n]")]
    #[case("{\"b\":1,\"a\":2}", "{\n  \"b\": 1,\n  \"a\": 2\n}")]
    fn test_format_body(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(format_body(raw, true), expected);
    }
}
