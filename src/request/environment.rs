use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiRequest, KeyValuePair};

/// A named set of variables substituted into requests through `{{key}}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub variables: Vec<KeyValuePair>,
}

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            variables: Vec::new(),
        }
    }

    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.variables.iter_mut().find(|v| v.key == key) {
            Some(existing) => existing.value = value,
            None => self.variables.push(KeyValuePair::new(key, value)),
        }
        self
    }

    /// Replace every `{{key}}` of the enabled variables in `input`.
    pub fn substitute(&self, input: &str) -> String {
        self.variables
            .iter()
            .filter(|v| v.enabled && !v.key.is_empty())
            .fold(input.to_string(), |acc, v| {
                acc.replace(&format!("{{{{{}}}}}", v.key), &v.value)
            })
    }

    /// The request as it would be sent: url, header values, param values and
    /// body all substituted. Placeholders without a variable stay untouched.
    pub fn apply(&self, request: &ApiRequest) -> ApiRequest {
        let substitute_values = |pairs: &[KeyValuePair]| -> Vec<KeyValuePair> {
            pairs
                .iter()
                .map(|pair| KeyValuePair {
                    value: self.substitute(&pair.value),
                    ..pair.clone()
                })
                .collect()
        };

        ApiRequest {
            url: self.substitute(&request.url),
            headers: substitute_values(&request.headers),
            params: substitute_values(&request.params),
            body: request.body.as_deref().map(|b| self.substitute(b)),
            ..request.clone()
        }
    }
}
