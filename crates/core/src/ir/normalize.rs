//! Normalization: API document -> API IR.
//!
//! Definitions and operations are walked independently, then merged into
//! one DTO table where definitions overwrite operation-minted entries of
//! the same name.

use tracing::debug;

use super::api::ApiIR;
use super::dto::build_dtos;
use super::operation::OperationBuilder;
use super::reference::{ReferenceResolver, SchemaIndex};
use crate::document::SchemaDocument;
use crate::options::GenerateOptions;

/// Normalize a parsed document into the API IR.
pub fn normalize_document(document: &SchemaDocument, options: &GenerateOptions) -> ApiIR {
    let mapper = &options.mapper;

    let (definitions, operations) = match document {
        SchemaDocument::Swagger2(doc) => {
            let resolver = ReferenceResolver::new(mapper);
            let definitions = build_dtos(doc.definitions.iter().map(|(k, v)| (k.as_str(), v)), &resolver);
            let mut builder = OperationBuilder::new(resolver, &definitions, options);
            builder.walk_paths(&doc.paths, document.base_path());
            let operations = builder.finish();
            (definitions, operations)
        }
        SchemaDocument::OpenApi3(doc) => {
            let resolver = ReferenceResolver::new(mapper);
            let schemas = doc.components.schemas.iter().map(|(k, v)| (k.as_str(), v));
            let definitions = build_dtos(schemas, &resolver);
            let mut builder = OperationBuilder::new(resolver, &definitions, options);
            builder.walk_paths(&doc.paths, document.base_path());
            let operations = builder.finish();
            (definitions, operations)
        }
        SchemaDocument::ThirdParty(export) => {
            let index = SchemaIndex::from_schemas(&export.schema_list);
            let resolver = ReferenceResolver::with_schema_index(mapper, &index);
            let schemas = export
                .schema_list
                .iter()
                .map(|s| (s.name.as_str(), &s.json_schema));
            let definitions = build_dtos(schemas, &resolver);
            let mut builder = OperationBuilder::new(resolver, &definitions, options);
            builder.walk_third_party(&export.api_list);
            let operations = builder.finish();
            (definitions, operations)
        }
    };

    let mut dtos = operations.dtos;
    dtos.extend(definitions);
    debug!(
        operations = operations.operations.len(),
        dtos = dtos.len(),
        "Normalized API document."
    );

    ApiIR {
        operations: operations.operations,
        dtos,
    }
}
