//! API description documents for serde deserialization.
//!
//! Three input shapes are understood:
//! - Swagger 2 (`swagger: "2.x"`, `definitions`, `basePath`)
//! - OpenAPI 3 (`openapi: "3.x"`, `components.schemas`, `servers`)
//! - A third-party API-management export (`apiList` + `schemaList`)
//!
//! Only the keywords needed for type resolution are modelled; everything
//! else in the document is ignored. Maps are `IndexMap`s so that traversal
//! follows document order.

use indexmap::IndexMap;
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{GenerateError, Result};
use crate::ir::HttpMethod;

/// Schema dialect of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Swagger2,
    OpenApi3,
    ThirdParty,
}

impl Dialect {
    /// Decide the dialect from the raw JSON.
    pub fn detect(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        if let Some(version) = object.get("swagger").and_then(Value::as_str) {
            return version.starts_with('2').then_some(Dialect::Swagger2);
        }
        if let Some(version) = object.get("openapi").and_then(Value::as_str) {
            return version.starts_with('3').then_some(Dialect::OpenApi3);
        }
        if object.contains_key("apiList") && object.contains_key("schemaList") {
            return Some(Dialect::ThirdParty);
        }
        if object.contains_key("definitions") {
            return Some(Dialect::Swagger2);
        }
        if object.contains_key("components") {
            return Some(Dialect::OpenApi3);
        }
        None
    }
}

/// A parsed API description document.
#[derive(Debug, Clone)]
pub enum SchemaDocument {
    Swagger2(Swagger2Document),
    OpenApi3(OpenApi3Document),
    ThirdParty(ThirdPartyExport),
}

impl SchemaDocument {
    /// Parse a document from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Parse a document from an already decoded JSON value.
    pub fn from_value(value: Value) -> Result<Self> {
        match Dialect::detect(&value).ok_or(GenerateError::UnknownDialect)? {
            Dialect::Swagger2 => Ok(SchemaDocument::Swagger2(serde_json::from_value(value)?)),
            Dialect::OpenApi3 => Ok(SchemaDocument::OpenApi3(serde_json::from_value(value)?)),
            Dialect::ThirdParty => Ok(SchemaDocument::ThirdParty(serde_json::from_value(value)?)),
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            SchemaDocument::Swagger2(_) => Dialect::Swagger2,
            SchemaDocument::OpenApi3(_) => Dialect::OpenApi3,
            SchemaDocument::ThirdParty(_) => Dialect::ThirdParty,
        }
    }

    /// Prefix prepended to every path. `/` counts as empty.
    pub fn base_path(&self) -> &str {
        let base = match self {
            SchemaDocument::Swagger2(doc) => doc.base_path.as_deref(),
            SchemaDocument::OpenApi3(doc) => doc.servers.first().map(|s| s.url.as_str()),
            SchemaDocument::ThirdParty(_) => None,
        };
        match base {
            Some("/") | None => "",
            Some(base) => base.trim_end_matches('/'),
        }
    }
}

// =============================================================================
// Swagger 2 / OpenAPI 3
// =============================================================================

/// Root Swagger 2 document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Swagger2Document {
    pub swagger: Option<String>,
    pub base_path: Option<String>,
    #[serde(default)]
    pub definitions: IndexMap<String, Schema>,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
}

/// Root OpenAPI 3 document.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenApi3Document {
    pub openapi: Option<String>,
    #[serde(default)]
    pub servers: Vec<Server>,
    #[serde(default)]
    pub components: Components,
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
}

/// Server entry; only the URL is used as base path.
#[derive(Debug, Clone, Deserialize)]
pub struct Server {
    pub url: String,
}

/// Components section containing reusable schemas.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, Schema>,
}

#[derive(Debug, Deserialize)]
struct RawPathItem {
    #[serde(default)]
    parameters: Vec<Parameter>,
    #[serde(flatten)]
    rest: IndexMap<String, Value>,
}

/// A path item: shared parameters plus its operations in document order.
#[derive(Debug, Clone, Default)]
pub struct PathItem {
    /// Path-level parameters shared by all operations.
    pub parameters: Vec<Parameter>,
    pub operations: Vec<(HttpMethod, Operation)>,
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = RawPathItem::deserialize(deserializer)?;
        let mut operations = Vec::new();
        for (key, value) in raw.rest {
            let Some(method) = HttpMethod::from_key(&key) else {
                continue;
            };
            let operation: Operation = serde_json::from_value(value)
                .map_err(|e| de::Error::custom(format!("invalid `{key}` operation: {e}")))?;
            operations.push((method, operation));
        }
        Ok(Self {
            parameters: raw.parameters,
            operations,
        })
    }
}

/// An API operation (endpoint).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(default)]
    pub deprecated: bool,
}

/// A parameter (path, query, body, header, cookie or formData).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Parameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "in")]
    pub location: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    /// Swagger 2 inline type
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    /// Swagger 2 inline array items
    pub items: Option<Box<Schema>>,
    pub schema: Option<Schema>,
}

/// An OpenAPI 3 request body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// A response definition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Response {
    pub description: Option<String>,
    /// Swagger 2 response schema
    pub schema: Option<Schema>,
    /// Non-standard top-level type some generators emit
    #[serde(rename = "type")]
    pub response_type: Option<String>,
    /// OpenAPI 3 content map
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Media type content (e.g., application/json).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MediaType {
    pub schema: Option<Schema>,
}

/// Pick the schema of a content map: `*/*` and JSON first, then any.
pub fn preferred_media_schema(content: &IndexMap<String, MediaType>) -> Option<&Schema> {
    ["*/*", "application/json"]
        .iter()
        .find_map(|mime| content.get(*mime).and_then(|m| m.schema.as_ref()))
        .or_else(|| content.values().find_map(|m| m.schema.as_ref()))
}

// =============================================================================
// Schema
// =============================================================================

/// The subset of JSON Schema used for type resolution.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    #[serde(rename = "$ref")]
    pub ref_path: Option<String>,
    #[serde(default)]
    pub properties: IndexMap<String, Schema>,
    pub required: Option<RequiredSpec>,
    pub items: Option<Box<Schema>>,
    pub description: Option<String>,
    pub title: Option<String>,
}

impl Schema {
    /// The first non-null type name.
    pub fn primary_type(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(SchemaType::primary)
    }

    /// The `required` name list, `None` when unset.
    pub fn required_names(&self) -> Option<&[String]> {
        match &self.required {
            Some(RequiredSpec::Names(names)) => Some(names),
            Some(RequiredSpec::Flag(_)) | None => None,
        }
    }
}

/// Schema type can be a single type or an array of types (for nullable).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    pub fn primary(&self) -> Option<&str> {
        match self {
            SchemaType::Single(name) => Some(name),
            SchemaType::Multiple(names) => names
                .iter()
                .map(String::as_str)
                .find(|name| *name != "null"),
        }
    }
}

/// `required` is a name list on objects; some exporters write a boolean.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RequiredSpec {
    Names(Vec<String>),
    Flag(bool),
}

// =============================================================================
// Third-party export
// =============================================================================

/// API-management export: endpoint details plus the shared schema list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyExport {
    #[serde(default)]
    pub api_list: Vec<ApiDetail>,
    #[serde(default)]
    pub schema_list: Vec<DataSchema>,
}

/// One endpoint of the export.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDetail {
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    pub operation_id: Option<String>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parameters: ApiParameters,
    pub request_body: Option<ApiRequestBody>,
    #[serde(default)]
    pub responses: Vec<ApiResponse>,
    #[serde(default)]
    pub deprecated: bool,
}

/// Parameters grouped by location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiParameters {
    #[serde(default)]
    pub path: Vec<ApiParameter>,
    #[serde(default)]
    pub query: Vec<ApiParameter>,
    #[serde(default)]
    pub cookie: Vec<ApiParameter>,
    #[serde(default)]
    pub header: Vec<ApiParameter>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiParameter {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    #[serde(default)]
    pub required: bool,
    pub description: Option<String>,
}

/// Request body: form parameters or a JSON schema, by content type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiRequestBody {
    #[serde(rename = "type", default)]
    pub content_type: String,
    #[serde(default)]
    pub parameters: Vec<ApiParameter>,
    pub json_schema: Option<Schema>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    pub json_schema: Option<Schema>,
}

/// Shared schema of the export, addressed by `id` from `$ref`s.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSchema {
    pub id: SchemaId,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub json_schema: Schema,
}

/// Schema ids are numeric in practice but strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum SchemaId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for SchemaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaId::Number(id) => write!(f, "{id}"),
            SchemaId::Text(id) => f.write_str(id),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_detect_dialect() {
        assert_eq!(Dialect::detect(&json!({"swagger": "2.0"})), Some(Dialect::Swagger2));
        assert_eq!(Dialect::detect(&json!({"openapi": "3.0.1"})), Some(Dialect::OpenApi3));
        assert_eq!(
            Dialect::detect(&json!({"apiList": [], "schemaList": []})),
            Some(Dialect::ThirdParty)
        );
        assert_eq!(Dialect::detect(&json!({"definitions": {}})), Some(Dialect::Swagger2));
        assert_eq!(Dialect::detect(&json!({"components": {}})), Some(Dialect::OpenApi3));
        assert_eq!(Dialect::detect(&json!({"swagger": "1.2"})), None);
        assert_eq!(Dialect::detect(&json!({"info": {}})), None);
        assert_eq!(Dialect::detect(&json!([])), None);
    }

    #[test]
    fn test_unknown_dialect_is_an_error() {
        let err = SchemaDocument::from_json(r#"{"info": {}}"#).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownDialect));

        let err = SchemaDocument::from_json("{not json").unwrap_err();
        assert!(matches!(err, GenerateError::Parse(_)));
    }

    #[test]
    fn test_path_item_keeps_method_order() {
        let doc = SchemaDocument::from_json(
            r#"{
                "swagger": "2.0",
                "basePath": "/api",
                "paths": {
                    "/users": {
                        "post": {"operationId": "createUser"},
                        "parameters": [{"name": "tenant", "in": "header"}],
                        "get": {"operationId": "listUsers"},
                        "x-extension": true
                    }
                }
            }"#,
        )
        .unwrap();

        let SchemaDocument::Swagger2(swagger) = &doc else {
            panic!("expected swagger 2");
        };
        let item = &swagger.paths["/users"];
        let methods: Vec<_> = item.operations.iter().map(|(m, _)| *m).collect();
        assert_eq!(methods, vec![HttpMethod::Post, HttpMethod::Get]);
        assert_eq!(item.parameters.len(), 1);
        assert_eq!(doc.base_path(), "/api");
    }

    #[test]
    fn test_base_path_slash_is_empty() {
        let doc = SchemaDocument::from_json(r#"{"swagger": "2.0", "basePath": "/"}"#).unwrap();
        assert_eq!(doc.base_path(), "");

        let doc = SchemaDocument::from_json(
            r#"{"openapi": "3.0.0", "servers": [{"url": "/gateway/"}], "paths": {}}"#,
        )
        .unwrap();
        assert_eq!(doc.base_path(), "/gateway");
    }

    #[test]
    fn test_schema_type_and_required() {
        let schema: Schema = serde_json::from_value(json!({
            "type": ["null", "string"],
            "required": true
        }))
        .unwrap();
        assert_eq!(schema.primary_type(), Some("string"));
        assert!(schema.required_names().is_none());

        let schema: Schema = serde_json::from_value(json!({
            "type": "object",
            "required": ["id"],
            "properties": {"id": {"type": "integer"}, "name": {"type": "string"}}
        }))
        .unwrap();
        assert_eq!(schema.required_names().unwrap(), ["id".to_string()]);
        let keys: Vec<_> = schema.properties.keys().collect();
        assert_eq!(keys, vec!["id", "name"]);
    }

    #[test]
    fn test_third_party_export() {
        let doc = SchemaDocument::from_json(
            r##"{
                "apiList": [{
                    "name": "Get pet",
                    "method": "get",
                    "path": "/pets/{id}",
                    "operationId": "getPet",
                    "parameters": {"path": [{"name": "id", "type": "integer", "required": true}]},
                    "responses": [{"jsonSchema": {"$ref": "#/definitions/101"}}]
                }],
                "schemaList": [{"id": 101, "name": "Pet", "jsonSchema": {"type": "object"}}]
            }"##,
        )
        .unwrap();
        let SchemaDocument::ThirdParty(export) = &doc else {
            panic!("expected third-party export");
        };
        assert_eq!(export.api_list[0].parameters.path[0].name, "id");
        assert_eq!(export.schema_list[0].id.to_string(), "101");
        assert_eq!(doc.dialect(), Dialect::ThirdParty);
        assert_eq!(doc.base_path(), "");
    }
}
