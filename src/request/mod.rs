//! Request model shared by the curl parser, the serializer and the swagger
//! importer. Field names serialize in camelCase so the JSON matches what the
//! workbench front end stores.

pub mod environment;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use environment::Environment;

pub const DEFAULT_METHOD: &str = "GET";
pub const DEFAULT_REQUEST_NAME: &str = "Imported from cURL";

const STATUS_2XX_NAME: &str = "Status code is 2xx";
const STATUS_2XX_SCRIPT: &str =
    r#"pm.test("Status code is 2xx", function() { pm.response.to.be.success; });"#;

fn default_method() -> String {
    DEFAULT_METHOD.to_string()
}

fn enabled_by_default() -> bool {
    true
}

/// An absent body is written as `""`, and `""` reads back as absent.
mod body_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &Option<String>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(body.as_deref().unwrap_or_default())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let body = Option::<String>::deserialize(d)?;
        Ok(body.filter(|b| !b.is_empty()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValuePair {
    pub key: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            description: None,
            enabled: true,
        }
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.description = description;
        self
    }

    pub fn set_enabled(&mut self, enabled: bool) -> &mut Self {
        self.enabled = enabled;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTest {
    pub name: String,
    pub script: String,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

impl ApiTest {
    /// The canned assertion attached to imported requests.
    pub fn status_is_2xx() -> Self {
        Self {
            name: STATUS_2XX_NAME.to_string(),
            script: STATUS_2XX_SCRIPT.to_string(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequestSettings {
    pub follow_redirects: bool,
    pub verify_ssl: bool,
    pub compressed: bool,
}

impl Default for RequestSettings {
    fn default() -> Self {
        Self {
            follow_redirects: false,
            verify_ssl: true,
            compressed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequest {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub url: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub headers: Vec<KeyValuePair>,
    #[serde(default)]
    pub params: Vec<KeyValuePair>,
    #[serde(default, with = "body_string")]
    pub body: Option<String>,
    #[serde(default)]
    pub tests: Vec<ApiTest>,
    #[serde(default)]
    pub settings: RequestSettings,
}

impl ApiRequest {
    pub fn new(method: &str, url: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: DEFAULT_REQUEST_NAME.to_string(),
            description: None,
            url: url.into(),
            method: method.to_uppercase(),
            headers: Vec::new(),
            params: Vec::new(),
            body: None,
            tests: Vec::new(),
            settings: RequestSettings::default(),
        }
    }

    /// A copy that differs only by its id.
    pub fn with_fresh_id(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }

    /// First enabled header named `key`, compared case-insensitively.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.enabled && h.key.eq_ignore_ascii_case(key))
            .map(|h| h.value.as_str())
    }

    pub fn enabled_headers(&self) -> impl Iterator<Item = &KeyValuePair> {
        self.headers.iter().filter(|h| h.enabled)
    }

    pub fn enabled_params(&self) -> impl Iterator<Item = &KeyValuePair> {
        self.params.iter().filter(|p| p.enabled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCollection {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub requests: Vec<ApiRequest>,
}

impl ApiCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            requests: Vec::new(),
        }
    }
}
