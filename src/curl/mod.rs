pub mod cache;
pub mod curl_parsers;
pub mod serializer;
pub mod tokenizer;

use std::str::FromStr;

use ::url::form_urlencoded;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use tracing::{debug, warn};

use crate::config::ParserConfig;
use crate::error::ParseError;
use crate::request::ApiRequest;

use self::cache::ParseCache;
use self::curl_parsers::parse_command;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: &str, value: &str) -> Self {
        Self {
            key: key.trim().to_string(),
            value: value.trim().to_string(),
        }
    }

    /// `-u user:password` as an `Authorization: Basic ...` header.
    pub fn basic_auth(credentials: &str) -> Self {
        let credentials = if credentials.contains(':') {
            credentials.to_string()
        } else {
            format!("{}:", credentials)
        };
        Self {
            key: "Authorization".into(),
            value: format!("Basic {}", STANDARD.encode(credentials)),
        }
    }
}

impl FromStr for Header {
    type Err = ParseError;

    /// Split on the first colon; the key must not be empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => Ok(Header::new(key, value)),
            _ => Err(ParseError::InvalidHeader(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: String,
    pub value: String,
}

impl FromStr for FormField {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok(FormField {
                key: key.trim().to_string(),
                value: value.trim().to_string(),
            }),
            _ => Err(ParseError::InvalidFormField(s.to_string())),
        }
    }
}

/// `name=content` keeps the name and encodes the content; without a name the
/// whole value (after an optional leading `=`) is encoded.
fn url_encode_data(param: &str) -> String {
    let encode = |content: &str| form_urlencoded::byte_serialize(content.as_bytes()).collect::<String>();
    match param.split_once('=') {
        Some(("", content)) => encode(content),
        Some((name, content)) => format!("{}={}", name, encode(content)),
        None => encode(param),
    }
}

/// One meaningful argument of a curl command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Curl {
    Method(String),
    Url(String),
    Header(Header),
    Data(String),
    Form(FormField),
    Flag(String),
}

impl Curl {
    /// Build the argument for a value-taking flag. Flags that do not affect
    /// the request are kept as `Flag("<flag> <value>")`.
    pub fn new(identifier: &str, param: &str) -> Result<Self, ParseError> {
        match identifier {
            "-X" | "--request" => {
                if param.trim().is_empty() {
                    return Err(ParseError::MissingValue {
                        flag: identifier.to_string(),
                    });
                }
                Ok(Curl::Method(param.trim().to_uppercase()))
            }
            "-H" | "--header" => param.parse().map(Curl::Header),
            "-A" | "--user-agent" => Ok(Curl::Header(Header::new("User-Agent", param))),
            "-e" | "--referer" => Ok(Curl::Header(Header::new("Referer", param))),
            "-b" | "--cookie" => Ok(Curl::Header(Header::new("Cookie", param))),
            "-u" | "--user" => Ok(Curl::Header(Header::basic_auth(param))),
            "-d" | "--data" | "--data-raw" | "--data-binary" | "--data-ascii" | "--json" => {
                Ok(Curl::Data(param.into()))
            }
            "--data-urlencode" => Ok(Curl::Data(url_encode_data(param))),
            "-F" | "--form" => param.parse().map(Curl::Form),
            "--url" => Ok(Curl::new_as_url(param)),
            _ => Ok(Curl::Flag(format!("{} {}", identifier, param))),
        }
    }

    pub fn new_as_flag(identifier: &str) -> Self {
        Curl::Flag(identifier.into())
    }

    pub fn new_as_url(url: &str) -> Self {
        Curl::Url(url.trim().into())
    }
}

/// Parse `input` without caching. Failures are logged and yield `None`.
pub fn parse_curl_command(input: &str) -> Option<ApiRequest> {
    match parse_command(input, &ParserConfig::default()) {
        Ok(request) => Some(request),
        Err(e) => {
            warn!(error = %e, "failed to parse curl command");
            None
        }
    }
}

/// Curl parser with its own bounded cache of previous results.
#[derive(Debug, Clone, Default)]
pub struct CurlParser {
    config: ParserConfig,
    cache: ParseCache,
}

impl CurlParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        let cache = ParseCache::new(config.cache_capacity);
        Self { config, cache }
    }

    pub fn with_cache(config: ParserConfig, cache: ParseCache) -> Self {
        Self { config, cache }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn cache(&self) -> &ParseCache {
        &self.cache
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn try_parse(&mut self, input: &str) -> Result<ApiRequest, ParseError> {
        if let Some(hit) = self.cache.get(input) {
            debug!("curl parse cache hit");
            return Ok(hit);
        }

        let request = parse_command(input, &self.config)?;
        self.cache.insert(input, &request);
        Ok(request)
    }

    /// Like [`CurlParser::try_parse`], but never fails: the cause is logged
    /// and `None` returned.
    pub fn parse(&mut self, input: &str) -> Option<ApiRequest> {
        match self.try_parse(input) {
            Ok(request) => Some(request),
            Err(e) => {
                warn!(error = %e, "failed to parse curl command");
                None
            }
        }
    }
}
