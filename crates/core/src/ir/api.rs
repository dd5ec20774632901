//! API-level IR for normalized operations.
//!
//! This module defines the intermediate representation for API operations:
//! - HttpMethod / ParamLocation: the recognised methods and parameter groups
//! - OperationMeta: what an `OperationFilter` gets to see
//! - OperationDescriptor: one generated request function
//! - ApiIR: everything the emitter needs for one run

use super::dto::DtoTable;
use super::types::TypeExpr;

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Parse a path-item key (`get`, `post`, ...). Case-insensitive.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            "post" => Some(HttpMethod::Post),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "patch" => Some(HttpMethod::Patch),
            "trace" => Some(HttpMethod::Trace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Name of the request helper imported from the http module.
    ///
    /// `delete` is a reserved word, so the helper is called `del`.
    pub fn request_fn(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "del",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
            HttpMethod::Trace => "trace",
        }
    }
}

/// Parameter location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Path,
    Query,
    Body,
    Header,
    Cookie,
    FormData,
}

impl ParamLocation {
    /// Parse the `in` value of a parameter.
    pub fn parse(location: &str) -> Option<Self> {
        match location {
            "path" => Some(ParamLocation::Path),
            "query" => Some(ParamLocation::Query),
            "body" => Some(ParamLocation::Body),
            "header" => Some(ParamLocation::Header),
            "cookie" => Some(ParamLocation::Cookie),
            "formData" => Some(ParamLocation::FormData),
            _ => None,
        }
    }

    /// Key used inside the generated `params` object.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Body => "body",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
            ParamLocation::FormData => "formData",
        }
    }

    /// Suffix of the synthesized parameter type (`GetUser` + `Path`).
    pub fn type_suffix(&self) -> &'static str {
        match self {
            ParamLocation::Path => "Path",
            ParamLocation::Query => "Query",
            ParamLocation::Body => "Body",
            ParamLocation::Header => "Header",
            ParamLocation::Cookie => "Cookie",
            ParamLocation::FormData => "FormData",
        }
    }
}

/// Single parameter descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamIR {
    /// Name as written in the document
    pub name: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Resolved parameter type
    pub ty: TypeExpr,
    /// Description, rendered as a trailing comment
    pub description: Option<String>,
    /// Body parameter whose schema is itself a DTO / array / object
    pub reuse_type: bool,
}

/// Operation fields visible to an `OperationFilter`.
#[derive(Debug, Clone)]
pub struct OperationMeta<'a> {
    /// Base-path-prefixed URL
    pub url: String,
    /// HTTP method
    pub method: HttpMethod,
    /// `operationId`, when present
    pub operation_id: Option<&'a str>,
    /// Tags in document order
    pub tags: &'a [String],
    /// One-line summary
    pub summary: Option<&'a str>,
    /// Long description
    pub description: Option<&'a str>,
    /// Marked as deprecated
    pub deprecated: bool,
}

/// One typed argument of a request function: `params.<location>: <ty>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamBinding {
    pub location: ParamLocation,
    pub ty: TypeExpr,
}

/// Normalized API operation, one per generated request function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    /// Exported function name
    pub operation_id: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Base-path-prefixed URL
    pub url: String,
    /// Typed arguments, form data first then document order
    pub params: Vec<ParamBinding>,
    /// Response type
    pub response: TypeExpr,
    /// JSDoc `@description` text
    pub description: String,
}

/// Complete API IR for one run.
#[derive(Debug, Clone, Default)]
pub struct ApiIR {
    /// Operations in traversal order
    pub operations: Vec<OperationDescriptor>,
    /// Merged DTO table: operation-minted entries overlaid by definitions
    pub dtos: DtoTable,
}
