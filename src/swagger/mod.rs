//! Swagger 2.0 / OpenAPI 3.0 documents imported as request collections.
//!
//! Only JSON input is accepted. Every `path x verb` pair becomes one
//! [`ApiRequest`] carrying declared query/header parameters and an example
//! body synthesized from the request schema.

pub mod schema;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::ImportError;
use crate::request::{ApiCollection, ApiRequest, ApiTest, KeyValuePair};

use self::schema::{SchemaNode, resolve_ref};

pub const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "options", "head"];

const DEFAULT_COLLECTION_NAME: &str = "Imported API";
const DEFAULT_CONTENT_TYPE: &str = "application/json";

#[derive(Debug, Deserialize)]
struct ServerVariable {
    default: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Server {
    url: String,
    #[serde(default)]
    variables: Map<String, Value>,
}

impl Server {
    /// The url with `{name}` variables replaced by their defaults.
    fn resolved_url(&self) -> String {
        self.variables
            .iter()
            .filter_map(|(name, variable)| {
                let variable = ServerVariable::deserialize(variable).ok()?;
                Some((name, variable.default?))
            })
            .fold(self.url.clone(), |url, (name, default)| {
                url.replace(&format!("{{{}}}", name), &default)
            })
    }
}

/// The top-level fields of a document. Each one is read on its own, so a
/// malformed field falls back to its default instead of failing the import.
#[derive(Debug)]
struct SwaggerSpec {
    swagger: Option<Value>,
    openapi: Option<Value>,
    title: Option<String>,
    description: Option<String>,
    host: Option<String>,
    base_path: Option<String>,
    schemes: Vec<String>,
    servers: Vec<Server>,
    paths: Map<String, Value>,
}

/// `root[key]` deserialized as `T`; missing, null and malformed values are `None`.
fn lenient<'a, T: Deserialize<'a>>(root: &'a Value, key: &str) -> Option<T> {
    let value = root.get(key).filter(|v| !v.is_null())?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!(field = key, error = %e, "ignoring malformed field");
            None
        }
    }
}

impl SwaggerSpec {
    fn from_value(root: &Value) -> Self {
        let info = root.get("info").unwrap_or(&Value::Null);
        let servers = lenient::<Vec<Value>>(root, "servers")
            .unwrap_or_default()
            .iter()
            .filter_map(|server| match Server::deserialize(server) {
                Ok(server) => Some(server),
                Err(e) => {
                    warn!(error = %e, "skipping malformed server");
                    None
                }
            })
            .collect();

        Self {
            swagger: root.get("swagger").filter(|v| !v.is_null()).cloned(),
            openapi: root.get("openapi").filter(|v| !v.is_null()).cloned(),
            title: lenient(info, "title"),
            description: lenient(info, "description"),
            host: lenient(root, "host"),
            base_path: lenient(root, "basePath"),
            schemes: lenient(root, "schemes").unwrap_or_default(),
            servers,
            paths: lenient(root, "paths").unwrap_or_default(),
        }
    }

    fn version_label(&self) -> String {
        let render = |v: &Value| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match (&self.swagger, &self.openapi) {
            (Some(v), _) => format!("Swagger {}", render(v)),
            (None, Some(v)) => format!("OpenAPI {}", render(v)),
            (None, None) => "API".to_string(),
        }
    }

    /// The first well-formed server for OpenAPI; `scheme://host + basePath`
    /// for Swagger.
    /// Without either the base is empty and request urls are bare paths.
    fn base_url(&self) -> String {
        if let Some(server) = self.servers.first() {
            return server.resolved_url().trim_end_matches('/').to_string();
        }

        let base_path = self.base_path.as_deref().unwrap_or_default();
        match self.host.as_deref().filter(|h| !h.is_empty()) {
            Some(host) => {
                let scheme = self.schemes.first().map(String::as_str).unwrap_or("https");
                format!("{}://{}{}", scheme, host, base_path)
                    .trim_end_matches('/')
                    .to_string()
            }
            None => base_path.trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Operation {
    summary: Option<String>,
    description: Option<String>,
    operation_id: Option<String>,
    #[serde(default)]
    parameters: Vec<Value>,
    request_body: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
struct Parameter {
    name: String,
    #[serde(rename = "in")]
    location: String,
    description: Option<String>,
    schema: Option<Value>,
}

fn follow_ref<'a>(root: &'a Value, value: &'a Value) -> &'a Value {
    match value.get("$ref").and_then(Value::as_str) {
        Some(pointer) => resolve_ref(root, pointer).unwrap_or(value),
        None => value,
    }
}

fn parse_parameters(root: &Value, raw: &[Value]) -> Vec<Parameter> {
    raw.iter()
        .filter_map(|value| match Parameter::deserialize(follow_ref(root, value)) {
            Ok(parameter) => Some(parameter),
            Err(e) => {
                debug!(error = %e, "skipping malformed parameter");
                None
            }
        })
        .collect()
}

/// Operation parameters override path-level ones with the same name and
/// location.
fn merge_parameters(path_level: &[Parameter], operation: Vec<Parameter>) -> Vec<Parameter> {
    let mut merged: Vec<Parameter> = path_level
        .iter()
        .filter(|p| {
            !operation
                .iter()
                .any(|o| o.name == p.name && o.location == p.location)
        })
        .cloned()
        .collect();
    merged.extend(operation);
    merged
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

fn sample_for(root: &Value, schema: &Value) -> Value {
    SchemaNode::from_value(schema).sample(root)
}

/// Content type and example body of an OpenAPI `requestBody`.
fn request_body_example(root: &Value, request_body: &Value) -> Option<(String, Option<String>)> {
    let content = follow_ref(root, request_body)
        .get("content")
        .and_then(Value::as_object)?;
    let (content_type, media) = content.iter().next()?;

    let example = media.get("example").filter(|e| !e.is_null()).cloned().or_else(|| {
        media
            .get("examples")
            .and_then(Value::as_object)
            .and_then(|examples| examples.values().next())
            .and_then(|example| follow_ref(root, example).get("value"))
            .cloned()
    });
    let body = match (example, media.get("schema")) {
        (Some(example), _) => Some(pretty(&example)),
        (None, Some(schema)) => Some(pretty(&sample_for(root, schema))),
        (None, None) => None,
    };
    Some((content_type.clone(), body))
}

fn build_request(
    root: &Value,
    base_url: &str,
    path: &str,
    method: &str,
    operation: Operation,
    path_parameters: &[Parameter],
) -> ApiRequest {
    let method_upper = method.to_uppercase();
    let mut request = ApiRequest::new(&method_upper, format!("{}{}", base_url, path));
    request.name = [&operation.summary, &operation.operation_id]
        .into_iter()
        .flatten()
        .find(|s| !s.is_empty())
        .cloned()
        .unwrap_or_else(|| format!("{} {}", method_upper, path));
    request.description = operation.description.filter(|d| !d.is_empty());

    let mut content_type = DEFAULT_CONTENT_TYPE.to_string();
    if let Some((declared, body)) = operation
        .request_body
        .as_ref()
        .and_then(|rb| request_body_example(root, rb))
    {
        content_type = declared;
        request.body = body;
    }
    request
        .headers
        .push(KeyValuePair::new("Content-Type", content_type));

    let parameters = merge_parameters(path_parameters, parse_parameters(root, &operation.parameters));
    for parameter in parameters {
        let mut pair = KeyValuePair::new(parameter.name.clone(), "");
        pair.set_description(parameter.description.clone());
        match parameter.location.as_str() {
            "query" => request.params.push(pair),
            "header" => request.headers.push(pair),
            "body" if request.body.is_none() => {
                if let Some(schema) = &parameter.schema {
                    request.body = Some(pretty(&sample_for(root, schema)));
                }
            }
            _ => {}
        }
    }

    request.tests.push(ApiTest::status_is_2xx());
    request
}

/// Import `spec` as a collection, reporting why it could not be read.
pub fn try_import_swagger(spec: &str) -> Result<ApiCollection, ImportError> {
    let root: Value = serde_json::from_str(spec)?;
    if !root.is_object() {
        return Err(ImportError::NotAnObject);
    }
    let document = SwaggerSpec::from_value(&root);

    let mut collection = ApiCollection::new(
        document
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| DEFAULT_COLLECTION_NAME.to_string()),
    );
    collection.description = Some(
        document
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| format!("Imported from {} specification", document.version_label())),
    );

    let base_url = document.base_url();
    for (path, item) in &document.paths {
        let Some(item) = item.as_object() else {
            debug!(path = %path, "skipping path item that is not an object");
            continue;
        };
        let path_parameters = item
            .get("parameters")
            .and_then(Value::as_array)
            .map(|raw| parse_parameters(&root, raw))
            .unwrap_or_default();

        for (method, operation) in item {
            let method = method.to_lowercase();
            if !HTTP_METHODS.contains(&method.as_str()) {
                continue;
            }
            match Operation::deserialize(operation) {
                Ok(operation) => collection.requests.push(build_request(
                    &root,
                    &base_url,
                    path,
                    &method,
                    operation,
                    &path_parameters,
                )),
                Err(e) => warn!(path = %path, method = %method, error = %e, "skipping malformed operation"),
            }
        }
    }

    Ok(collection)
}

/// Import `spec`, logging and returning `None` when it is not a usable JSON
/// document (YAML included).
pub fn import_swagger(spec: &str) -> Option<ApiCollection> {
    match try_import_swagger(spec) {
        Ok(collection) => Some(collection),
        Err(e) => {
            warn!(error = %e, "failed to import swagger specification");
            None
        }
    }
}
