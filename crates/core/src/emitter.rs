//! TypeScript emitter for API description documents.
//!
//! This module is a thin wrapper around the IR-based code generation.
//! The pipeline is:
//! 1. Parse: JSON -> SchemaDocument (see `document`)
//! 2. Normalize: SchemaDocument -> ApiIR (all dialect logic resolved)
//! 3. Codegen: ApiIR -> module trees
//! 4. Emit: module trees -> String (via Emit trait)

use tracing::info;

use crate::document::SchemaDocument;
use crate::error::Result;
use crate::ir::{Emit, OperationDescriptor, codegen_modules, normalize_document};
use crate::options::GenerateOptions;

/// Rendered output of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifacts {
    /// `index.ts`: imports and request functions
    pub api_module: String,
    /// `dto.typed.ts`: DTO declarations
    pub dto_types: String,
    /// `dto.value.ts`: DTO default literals
    pub dto_values: String,
    /// Names imported by the function module, in first-use order
    pub imported_types: Vec<String>,
    /// Names declared in `dto_types`, in emission order
    pub declared_types: Vec<String>,
    /// Generated operations in traversal order
    pub operations: Vec<OperationDescriptor>,
}

/// Generate TypeScript artifacts from a parsed document.
pub fn generate(document: &SchemaDocument, options: &GenerateOptions) -> Result<GeneratedArtifacts> {
    let api_ir = normalize_document(document, options);
    let output = codegen_modules(&api_ir, options);
    let nl = options.line_ending;

    info!(
        dialect = ?document.dialect(),
        operations = api_ir.operations.len(),
        dtos = output.declared.len(),
        "Generated API module."
    );

    Ok(GeneratedArtifacts {
        api_module: output.api.emit(nl),
        dto_types: output.declarations.emit(nl),
        dto_values: output.defaults.emit(nl),
        imported_types: output.imported,
        declared_types: output.declared,
        operations: api_ir.operations,
    })
}

/// Parse JSON text and generate in one step.
pub fn generate_from_json(json: &str, options: &GenerateOptions) -> Result<GeneratedArtifacts> {
    let document = SchemaDocument::from_json(json)?;
    generate(&document, options)
}
