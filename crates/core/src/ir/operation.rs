//! Operation walk: parameter grouping and per-operation type synthesis.
//!
//! Every dialect is reduced to the same pending shape (meta, grouped
//! parameters, response type) before the shared synthesis step mints the
//! `<Op><Location>` interfaces, the `<Op>FormData` types and the
//! `<Dto>InList` response aliases.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::api::{
    HttpMethod, OperationDescriptor, OperationMeta, ParamBinding, ParamIR, ParamLocation,
};
use super::dto::{DtoTable, list_alias};
use super::reference::ReferenceResolver;
use super::types::{DtoDecl, DtoEntry, TsField, TypeExpr};
use super::utils::{capitalize_first, is_ts_identifier, join_words, non_blank};
use crate::document::{
    ApiDetail, ApiParameter, Operation, Parameter, PathItem, RequestBody, Schema,
    preferred_media_schema,
};
use crate::options::GenerateOptions;

const FORM_CONTENT_TYPES: &[&str] = &["multipart/form-data", "application/x-www-form-urlencoded"];

/// Parameters grouped by location, in first-appearance order.
#[derive(Debug, Default)]
struct ParameterGroups {
    groups: IndexMap<ParamLocation, IndexMap<String, ParamIR>>,
}

impl ParameterGroups {
    /// A repeated name within one location replaces the earlier descriptor.
    fn push(&mut self, location: ParamLocation, param: ParamIR) {
        self.groups
            .entry(location)
            .or_default()
            .insert(param.name.clone(), param);
    }
}

/// An accepted operation waiting for type synthesis.
struct PendingOperation {
    operation_id: String,
    method: HttpMethod,
    url: String,
    description: String,
    groups: ParameterGroups,
    response: TypeExpr,
}

/// Output of the operation walk.
#[derive(Debug, Default)]
pub struct OperationBuild {
    pub operations: Vec<OperationDescriptor>,
    /// Entries minted for parameter groups and list responses
    pub dtos: DtoTable,
}

/// Walks operations of one document.
#[derive(Debug)]
pub struct OperationBuilder<'a> {
    resolver: ReferenceResolver<'a>,
    definitions: &'a DtoTable,
    options: &'a GenerateOptions,
    build: OperationBuild,
}

impl<'a> OperationBuilder<'a> {
    /// `definitions` is the table built from the document's shared schemas.
    pub fn new(
        resolver: ReferenceResolver<'a>,
        definitions: &'a DtoTable,
        options: &'a GenerateOptions,
    ) -> Self {
        Self {
            resolver,
            definitions,
            options,
            build: OperationBuild::default(),
        }
    }

    pub fn finish(self) -> OperationBuild {
        self.build
    }

    // =========================================================================
    // Swagger 2 / OpenAPI 3
    // =========================================================================

    /// Walk a `paths` map: path order, then method order within each path.
    pub fn walk_paths(&mut self, paths: &IndexMap<String, PathItem>, base_path: &str) {
        for (path, item) in paths {
            for (method, operation) in &item.operations {
                let meta = OperationMeta {
                    url: format!("{base_path}{path}"),
                    method: *method,
                    operation_id: operation.operation_id.as_deref(),
                    tags: &operation.tags,
                    summary: operation.summary.as_deref(),
                    description: operation.description.as_deref(),
                    deprecated: operation.deprecated,
                };
                if !self.options.accepts(&meta) {
                    debug!(url = %meta.url, method = method.as_str(), "Operation filtered out.");
                    continue;
                }
                let Some(operation_id) = meta.operation_id else {
                    warn!(url = %meta.url, method = method.as_str(), "Operation has no operationId; skipped.");
                    continue;
                };

                let mut groups = ParameterGroups::default();
                for parameter in item.parameters.iter().chain(&operation.parameters) {
                    self.collect_parameter(&mut groups, &meta, parameter);
                }
                if let Some(body) = &operation.request_body {
                    self.collect_request_body(&mut groups, &meta, body);
                }

                let description = join_words([
                    operation.tags.join(" ").as_str(),
                    operation.summary.as_deref().unwrap_or_default(),
                ]);
                let response = self.response_type(operation);
                self.push(PendingOperation {
                    operation_id: operation_id.to_string(),
                    method: *method,
                    url: meta.url.clone(),
                    description,
                    groups,
                    response,
                });
            }
        }
    }

    fn collect_parameter(
        &self,
        groups: &mut ParameterGroups,
        meta: &OperationMeta<'_>,
        parameter: &Parameter,
    ) {
        let Some(key) = parameter.location.as_deref() else {
            warn!(url = %meta.url, name = %parameter.name, "Parameter has no `in` location; skipped.");
            return;
        };
        let Some(location) = ParamLocation::parse(key) else {
            warn!(url = %meta.url, name = %parameter.name, location = key, "Unknown parameter location; skipped.");
            return;
        };
        if location == ParamLocation::Body && !body_allowed(meta) {
            return;
        }

        let reuse_type = location == ParamLocation::Body
            && parameter.schema.as_ref().is_some_and(is_group_schema);
        groups.push(
            location,
            ParamIR {
                name: parameter.name.clone(),
                required: parameter.required,
                ty: self.parameter_type(parameter),
                description: non_blank(parameter.description.as_deref()),
                reuse_type,
            },
        );
    }

    fn parameter_type(&self, parameter: &Parameter) -> TypeExpr {
        if let Some(schema) = &parameter.schema {
            return self.schema_parameter_type(schema);
        }
        match parameter.param_type.as_deref() {
            Some("array") => TypeExpr::array(self.resolver.resolve_items(parameter.items.as_deref())),
            Some(ty) => self.resolver.mapper().map(ty),
            None => TypeExpr::Any,
        }
    }

    fn schema_parameter_type(&self, schema: &Schema) -> TypeExpr {
        if let Some(reference) = &schema.ref_path {
            return self.resolver.resolve_ref(reference);
        }
        match schema.primary_type() {
            Some("array") => TypeExpr::array(self.resolver.resolve_items(schema.items.as_deref())),
            Some(ty) => self.resolver.resolve_name(ty),
            None => TypeExpr::Any,
        }
    }

    fn collect_request_body(
        &self,
        groups: &mut ParameterGroups,
        meta: &OperationMeta<'_>,
        body: &RequestBody,
    ) {
        if !body_allowed(meta) {
            return;
        }

        let form_schema = body
            .content
            .iter()
            .filter(|(mime, _)| is_form_content(mime))
            .find_map(|(_, media)| media.schema.as_ref())
            .filter(|schema| !schema.properties.is_empty());
        if let Some(schema) = form_schema {
            let required = schema.required_names().unwrap_or_default();
            for (name, property) in &schema.properties {
                groups.push(
                    ParamLocation::FormData,
                    ParamIR {
                        name: name.clone(),
                        required: required.contains(name),
                        ty: self.resolver.resolve_schema(property),
                        description: non_blank(property.description.as_deref()),
                        reuse_type: false,
                    },
                );
            }
            return;
        }

        let Some(schema) = preferred_media_schema(&body.content) else {
            debug!(url = %meta.url, "Request body without schema ignored.");
            return;
        };
        groups.push(
            ParamLocation::Body,
            ParamIR {
                name: "body".to_string(),
                required: body.required,
                ty: self.schema_parameter_type(schema),
                description: non_blank(body.description.as_deref()),
                reuse_type: is_group_schema(schema),
            },
        );
    }

    /// Success response: `200`, else `201`, else the first `2xx`.
    fn response_type(&self, operation: &Operation) -> TypeExpr {
        let response = ["200", "201"]
            .iter()
            .find_map(|code| operation.responses.get(*code))
            .or_else(|| {
                operation
                    .responses
                    .iter()
                    .find(|(code, _)| code.starts_with('2'))
                    .map(|(_, response)| response)
            });
        let Some(response) = response else {
            return TypeExpr::Any;
        };
        if let Some(ty) = &response.response_type {
            return self.resolver.mapper().map(ty);
        }
        response
            .schema
            .as_ref()
            .or_else(|| preferred_media_schema(&response.content))
            .map_or(TypeExpr::Any, |schema| self.resolver.resolve_schema(schema))
    }

    // =========================================================================
    // Third-party export
    // =========================================================================

    /// Walk the `apiList` of an export in list order.
    pub fn walk_third_party(&mut self, apis: &[ApiDetail]) {
        for api in apis {
            let Some(method) = HttpMethod::from_key(&api.method) else {
                warn!(path = %api.path, method = %api.method, "Unknown HTTP method; skipped.");
                continue;
            };
            let meta = OperationMeta {
                url: api.path.clone(),
                method,
                operation_id: api.operation_id.as_deref(),
                tags: &api.tags,
                summary: Some(api.name.as_str()),
                description: api.description.as_deref(),
                deprecated: api.deprecated,
            };
            if !self.options.accepts(&meta) {
                debug!(url = %meta.url, method = method.as_str(), "Operation filtered out.");
                continue;
            }
            let Some(operation_id) = meta.operation_id else {
                warn!(url = %meta.url, method = method.as_str(), "Operation has no operationId; skipped.");
                continue;
            };

            let mut groups = ParameterGroups::default();
            let located = [
                (ParamLocation::Path, &api.parameters.path),
                (ParamLocation::Query, &api.parameters.query),
                (ParamLocation::Cookie, &api.parameters.cookie),
                (ParamLocation::Header, &api.parameters.header),
            ];
            for (location, parameters) in located {
                for parameter in parameters {
                    groups.push(location, self.export_parameter(parameter));
                }
            }

            if let Some(body) = &api.request_body
                && body_allowed(&meta)
            {
                if is_form_content(&body.content_type) {
                    for parameter in &body.parameters {
                        groups.push(ParamLocation::FormData, self.export_parameter(parameter));
                    }
                } else if let Some(schema) = &body.json_schema {
                    groups.push(
                        ParamLocation::Body,
                        ParamIR {
                            name: "body".to_string(),
                            required: true,
                            ty: self.schema_parameter_type(schema),
                            description: None,
                            reuse_type: is_group_schema(schema),
                        },
                    );
                }
            }

            let response = api
                .responses
                .first()
                .and_then(|r| r.json_schema.as_ref())
                .map_or(TypeExpr::Any, |schema| self.resolver.resolve_schema(schema));

            let tags = api.tags.join("/");
            let description = join_words([
                tags.as_str(),
                api.name.as_str(),
                api.description.as_deref().unwrap_or_default(),
            ]);
            self.push(PendingOperation {
                operation_id: operation_id.to_string(),
                method,
                url: meta.url.clone(),
                description,
                groups,
                response,
            });
        }
    }

    fn export_parameter(&self, parameter: &ApiParameter) -> ParamIR {
        ParamIR {
            name: parameter.name.clone(),
            required: parameter.required,
            ty: parameter
                .param_type
                .as_deref()
                .map_or(TypeExpr::Any, |ty| self.resolver.mapper().map(ty)),
            description: non_blank(parameter.description.as_deref()),
            reuse_type: false,
        }
    }

    // =========================================================================
    // Synthesis
    // =========================================================================

    fn push(&mut self, pending: PendingOperation) {
        if !is_ts_identifier(&pending.operation_id) {
            warn!(operation_id = %pending.operation_id, url = %pending.url, "operationId is not a valid TypeScript identifier; emitted as is.");
        }
        let type_prefix = capitalize_first(&pending.operation_id);
        let mut params = Vec::new();

        // formData always comes first
        if let Some(form) = pending.groups.groups.get(&ParamLocation::FormData) {
            let name = format!("{type_prefix}FormData");
            self.build.dtos.insert(DtoEntry::new(DtoDecl::form_data(
                name.clone(),
                form.keys().cloned().collect(),
            )));
            params.push(ParamBinding {
                location: ParamLocation::FormData,
                ty: TypeExpr::named(name),
            });
        }

        for (location, group) in &pending.groups.groups {
            if *location == ParamLocation::FormData {
                continue;
            }
            if *location == ParamLocation::Body
                && let Some(first) = group.values().next()
                && first.reuse_type
            {
                params.push(ParamBinding {
                    location: *location,
                    ty: first.ty.clone(),
                });
                continue;
            }

            let name = format!("{type_prefix}{}", location.type_suffix());
            if !is_ts_identifier(&name) {
                warn!(operation_id = %pending.operation_id, name = %name, "Parameter type name is not a valid TypeScript identifier.");
            }
            let fields = group
                .values()
                .map(|param| TsField {
                    name: param.name.clone(),
                    ty: param.ty.clone(),
                    optional: !param.required,
                    description: param.description.clone(),
                })
                .collect();
            let description = join_words([
                pending.description.as_str(),
                location.as_str(),
                "parameters",
            ]);
            self.build
                .dtos
                .insert(DtoEntry::new(DtoDecl::interface(name.clone(), Some(description), fields)));
            params.push(ParamBinding {
                location: *location,
                ty: TypeExpr::named(name),
            });
        }

        let response = self.list_response(pending.response);
        self.build.operations.push(OperationDescriptor {
            operation_id: pending.operation_id,
            method: pending.method,
            url: pending.url,
            params,
            response,
            description: pending.description,
        });
    }

    /// `Dto[]` responses become `DtoInList` with a minted alias. Elements
    /// that are not declared DTOs stay plain arrays.
    fn list_response(&mut self, response: TypeExpr) -> TypeExpr {
        let TypeExpr::Array(element) = response else {
            return response;
        };
        match *element {
            TypeExpr::Named(name)
                if !self.resolver.mapper().is_primitive(&name)
                    && (self.definitions.contains(&name) || self.build.dtos.contains(&name)) =>
            {
                let alias = list_alias(&name);
                let alias_name = alias.name().to_string();
                self.build.dtos.insert(alias);
                TypeExpr::named(alias_name)
            }
            other => TypeExpr::array(other),
        }
    }
}

/// `GET` drops request bodies; `DELETE` keeps them with a warning.
fn body_allowed(meta: &OperationMeta<'_>) -> bool {
    match meta.method {
        HttpMethod::Get => {
            debug!(url = %meta.url, "Body parameter ignored for GET.");
            false
        }
        HttpMethod::Delete => {
            warn!(url = %meta.url, "DELETE operation carries a request body.");
            true
        }
        _ => true,
    }
}

fn is_form_content(content_type: &str) -> bool {
    FORM_CONTENT_TYPES
        .iter()
        .any(|form| content_type.starts_with(form))
}

/// A body schema that already names a complete type.
fn is_group_schema(schema: &Schema) -> bool {
    if schema.ref_path.is_some() {
        return true;
    }
    schema.primary_type().is_some_and(|ty| {
        let ty = ty.to_ascii_lowercase();
        ty.contains("array") || ty.contains("object") || ty.starts_with("#/definitions")
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::ir::mapper::TypeMapper;
    use crate::ir::types::DtoKind;
    use serde_json::json;

    fn walk(paths: serde_json::Value, options: &GenerateOptions) -> OperationBuild {
        walk_with(paths, &DtoTable::new(), options)
    }

    fn walk_with(
        paths: serde_json::Value,
        definitions: &DtoTable,
        options: &GenerateOptions,
    ) -> OperationBuild {
        let paths: IndexMap<String, PathItem> = serde_json::from_value(paths).unwrap();
        let mapper = TypeMapper::default();
        let mut builder =
            OperationBuilder::new(ReferenceResolver::new(&mapper), definitions, options);
        builder.walk_paths(&paths, "/api");
        builder.finish()
    }

    #[test]
    fn test_groups_and_synthesized_types() {
        let build = walk(
            json!({
                "/users/{id}": {
                    "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}],
                    "get": {
                        "operationId": "getUser",
                        "tags": ["user"],
                        "summary": "Get user",
                        "parameters": [
                            {"name": "verbose", "in": "query", "type": "boolean"},
                            {"name": "ids", "in": "query", "type": "array", "items": {"type": "string"}},
                            {"name": "payload", "in": "body", "schema": {"$ref": "#/definitions/User"}}
                        ],
                        "responses": {"200": {"schema": {"$ref": "#/definitions/User"}}}
                    }
                }
            }),
            &GenerateOptions::default(),
        );

        let op = &build.operations[0];
        assert_eq!(op.operation_id, "getUser");
        assert_eq!(op.url, "/api/users/{id}");
        assert_eq!(op.description, "user Get user");
        assert_eq!(op.response, TypeExpr::named("User"));
        let locations: Vec<_> = op.params.iter().map(|p| p.location).collect();
        assert_eq!(locations, vec![ParamLocation::Path, ParamLocation::Query]);

        let query = build.dtos.get("GetUserQuery").unwrap();
        let DtoKind::Interface { fields } = &query.declaration.kind else {
            panic!("expected interface");
        };
        assert_eq!(fields[1].ty.to_string(), "string[]");
        assert_eq!(
            query.declaration.description.as_deref(),
            Some("user Get user query parameters")
        );
        let path = build.dtos.get("GetUserPath").unwrap();
        let DtoKind::Interface { fields } = &path.declaration.kind else {
            panic!("expected interface");
        };
        assert!(!fields[0].optional);
        assert_eq!(fields[0].ty.to_string(), "number");
    }

    #[test]
    fn test_body_reuses_referenced_type() {
        let build = walk(
            json!({
                "/users": {
                    "post": {
                        "operationId": "createUser",
                        "parameters": [{
                            "name": "req", "in": "body",
                            "schema": {"type": "object", "$ref": "#/definitions/CreateUserRequest"}
                        }]
                    }
                }
            }),
            &GenerateOptions::default(),
        );
        let op = &build.operations[0];
        assert_eq!(op.params[0].ty, TypeExpr::named("CreateUserRequest"));
        assert!(build.dtos.is_empty());
        assert_eq!(op.response, TypeExpr::Any);
    }

    #[test]
    fn test_form_data_and_list_response() {
        let mut definitions = DtoTable::new();
        definitions.insert(DtoEntry::new(DtoDecl::interface("FileInfo", None, vec![])));
        let build = walk_with(
            json!({
                "/files": {
                    "post": {
                        "operationId": "upload",
                        "parameters": [
                            {"name": "dir", "in": "query", "type": "string"},
                            {"name": "file", "in": "formData", "type": "file"},
                            {"name": "name", "in": "formData", "type": "string"}
                        ],
                        "responses": {"201": {"schema": {"type": "array", "items": {"$ref": "#/definitions/FileInfo"}}}}
                    }
                }
            }),
            &definitions,
            &GenerateOptions::default(),
        );
        let op = &build.operations[0];
        assert_eq!(op.params[0].location, ParamLocation::FormData);
        assert_eq!(op.params[0].ty, TypeExpr::named("UploadFormData"));
        assert_eq!(op.params[1].ty, TypeExpr::named("UploadQuery"));
        assert_eq!(op.response, TypeExpr::named("FileInfoInList"));

        let form = build.dtos.get("UploadFormData").unwrap();
        assert_eq!(
            form.declaration.kind,
            DtoKind::FormData {
                keys: vec!["file".into(), "name".into()]
            }
        );
        assert!(build.dtos.contains("FileInfoInList"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_invalid_operation_id_warned_and_kept() {
        let build = walk(
            json!({
                "/users/{id}": {"get": {
                    "operationId": "get-user",
                    "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}]
                }}
            }),
            &GenerateOptions::default(),
        );
        assert_eq!(build.operations[0].operation_id, "get-user");
        assert!(logs_contain("operationId is not a valid TypeScript identifier"));
    }

    #[test]
    fn test_undeclared_list_element_gets_no_alias() {
        let build = walk(
            json!({
                "/tags": {"get": {
                    "operationId": "tags",
                    "responses": {"200": {"schema": {"type": "array", "items": {"$ref": "#/definitions/Tag"}}}}
                }}
            }),
            &GenerateOptions::default(),
        );
        assert_eq!(build.operations[0].response, TypeExpr::array(TypeExpr::named("Tag")));
        assert!(!build.dtos.contains("TagInList"));
    }

    #[test]
    fn test_primitive_list_response_stays_array() {
        let build = walk(
            json!({
                "/names": {"get": {
                    "operationId": "names",
                    "responses": {"200": {"schema": {"type": "array", "items": {"type": "string"}}}}
                }}
            }),
            &GenerateOptions::default(),
        );
        assert_eq!(build.operations[0].response.to_string(), "string[]");
        assert!(build.dtos.is_empty());
    }

    #[test]
    fn test_get_body_dropped_and_missing_operation_id_skipped() {
        let build = walk(
            json!({
                "/a": {
                    "get": {
                        "operationId": "a",
                        "parameters": [{"name": "b", "in": "body", "schema": {"type": "string"}}]
                    },
                    "put": {"summary": "no id"},
                    "delete": {
                        "operationId": "removeA",
                        "parameters": [{"name": "ids", "in": "body", "schema": {"type": "array", "items": {"type": "integer"}}}]
                    }
                }
            }),
            &GenerateOptions::default(),
        );
        let ids: Vec<_> = build.operations.iter().map(|o| o.operation_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "removeA"]);
        assert!(build.operations[0].params.is_empty());
        assert_eq!(build.operations[1].params[0].ty.to_string(), "number[]");
    }

    #[test]
    fn test_filter_is_consulted() {
        fn public_only(op: &OperationMeta<'_>) -> bool {
            !op.url.contains("/internal")
        }
        let options = GenerateOptions::default().with_filter(public_only);
        let build = walk(
            json!({
                "/internal/ping": {"get": {"operationId": "ping"}},
                "/pets": {"get": {"operationId": "listPets"}}
            }),
            &options,
        );
        assert_eq!(build.operations.len(), 1);
        assert_eq!(build.operations[0].operation_id, "listPets");
    }

    #[test]
    fn test_openapi3_request_bodies() {
        let build = walk(
            json!({
                "/pets": {
                    "post": {
                        "operationId": "addPet",
                        "requestBody": {
                            "required": true,
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/Pet"}}}
                        },
                        "responses": {"200": {"content": {"*/*": {"schema": {"$ref": "#/components/schemas/Pet"}}}}}
                    }
                },
                "/pets/photo": {
                    "post": {
                        "operationId": "uploadPhoto",
                        "requestBody": {
                            "content": {"multipart/form-data": {"schema": {
                                "type": "object",
                                "required": ["file"],
                                "properties": {"file": {"type": "string", "format": "binary"}}
                            }}}
                        }
                    }
                },
                "/pets/note": {
                    "put": {
                        "operationId": "setNote",
                        "requestBody": {"content": {"text/plain": {"schema": {"type": "string"}}}}
                    }
                }
            }),
            &GenerateOptions::default(),
        );
        let add = &build.operations[0];
        assert_eq!(add.params[0].location, ParamLocation::Body);
        assert_eq!(add.params[0].ty, TypeExpr::named("Pet"));
        assert_eq!(add.response, TypeExpr::named("Pet"));

        let upload = &build.operations[1];
        assert_eq!(upload.params[0].ty, TypeExpr::named("UploadPhotoFormData"));

        let note = &build.operations[2];
        assert_eq!(note.params[0].ty, TypeExpr::named("SetNoteBody"));
        assert!(build.dtos.contains("SetNoteBody"));
    }
}
