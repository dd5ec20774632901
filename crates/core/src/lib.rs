//! Schema-to-TypeScript generation engine.
//!
//! Turns a Swagger 2, OpenAPI 3 or API-management export document into three
//! TypeScript sources: typed request functions, the DTO declarations they
//! use, and a default-value literal for each DTO. The crate performs no I/O;
//! callers fetch the document and persist the rendered text.
//!
//! ```ignore
//! use apibuilder_core::{GenerateOptions, SchemaDocument, generate};
//!
//! let document = SchemaDocument::from_json(&json)?;
//! let artifacts = generate(&document, &GenerateOptions::default().with_namespace("mall"))?;
//! std::fs::write("src/api/mall/index.ts", artifacts.api_module)?;
//! ```

pub mod document;
mod emitter;
mod error;
pub mod ir;
mod options;

pub use document::{Dialect, SchemaDocument};
pub use emitter::{GeneratedArtifacts, generate, generate_from_json};
pub use error::{GenerateError, Result};
pub use ir::{HttpMethod, OperationMeta, TypeExpr, TypeMapper};
pub use options::{GenerateOptions, LineEnding, OperationFilter};
