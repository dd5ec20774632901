//! Intermediate Representation for document-to-TypeScript generation.
//!
//! This module defines a three-layer architecture:
//! 1. API-level IR: normalized operations and the DTO table (dialect-agnostic)
//! 2. TypeScript IR: type expressions, declarations, functions, modules
//! 3. Emission: IR to TypeScript text via the `Emit` trait
//!
//! ## Module Structure
//!
//! - `mapper`: primitive / reserved-name / default-literal tables
//! - `reference`: `$ref` and generic-notation decoding
//! - `dto`: DTO table and the definition walk
//! - `operation`: operation walk and parameter type synthesis
//! - `normalize`: document -> API IR
//! - `closure`: imported names and their transitive dependencies
//! - `codegen`: API IR -> output module trees
//! - `emit`: module trees -> code strings (via Emit trait)
//! - `utils`: common utilities shared across modules

mod api;
mod closure;
mod codegen;
mod dto;
mod emit;
mod mapper;
mod normalize;
mod operation;
mod reference;
mod types;
pub mod utils;

pub use api::{
    ApiIR, HttpMethod, OperationDescriptor, OperationMeta, ParamBinding, ParamIR, ParamLocation,
};
pub use closure::{dependency_closure, imported_types};
pub use codegen::{CodegenOutput, DEFAULT_API_IMPORTS, codegen_api_module, codegen_modules};
pub use dto::{DtoTable, build_dtos, list_alias};
pub use emit::Emit;
pub use mapper::TypeMapper;
pub use normalize::normalize_document;
pub use operation::{OperationBuild, OperationBuilder};
pub use reference::{
    ENVELOPE_NAMES, GenericNode, NotationError, ReferenceResolver, SchemaIndex, parse_notation,
};
pub use types::{
    ApiFunction, ApiModule, DeclarationModule, DefaultDecl, DefaultField, DefaultsModule, DtoDecl,
    DtoEntry, DtoKind, ImportLine, TsField, TypeExpr,
};
