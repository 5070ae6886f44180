//! Parse cURL commands into API requests, render requests back into cURL
//! commands, and import Swagger/OpenAPI documents as request collections.

pub mod config;
pub mod curl;
pub mod error;
pub mod request;
pub mod swagger;
pub mod url;

#[cfg(test)]
mod test_util;

pub use config::ParserConfig;
pub use curl::serializer::to_curl;
pub use curl::{CurlParser, parse_curl_command};
pub use error::{ImportError, ParseError};
pub use request::{ApiCollection, ApiRequest, ApiTest, Environment, KeyValuePair, RequestSettings};
pub use swagger::{import_swagger, try_import_swagger};
