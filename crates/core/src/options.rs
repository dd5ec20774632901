//! Per-run generation options.

use std::fmt;

use crate::ir::{OperationMeta, TypeMapper};

/// Decides which operations are generated.
pub trait OperationFilter {
    /// Return `false` to skip the operation.
    fn accept(&self, operation: &OperationMeta<'_>) -> bool;
}

impl<F> OperationFilter for F
where
    F: Fn(&OperationMeta<'_>) -> bool,
{
    fn accept(&self, operation: &OperationMeta<'_>) -> bool {
        self(operation)
    }
}

/// Line terminator used for every joined line of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    Lf,
    CrLf,
}

impl LineEnding {
    /// CRLF on Windows, LF elsewhere.
    pub fn host() -> Self {
        if cfg!(windows) {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl Default for LineEnding {
    fn default() -> Self {
        Self::host()
    }
}

/// Options for one `generate` call.
pub struct GenerateOptions {
    /// Subdirectory used in the default type import path (`@/typed/<ns>/...`)
    pub namespace: Option<String>,
    /// Operation filter; everything is generated when absent
    pub filter: Option<Box<dyn OperationFilter>>,
    /// Import lines of the function module; defaults apply when empty
    pub api_imports: Vec<String>,
    /// Type import template; `{}` is replaced by the imported names
    pub api_type_import: Option<String>,
    pub line_ending: LineEnding,
    pub mapper: TypeMapper,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            namespace: None,
            filter: None,
            api_imports: Vec::new(),
            api_type_import: None,
            line_ending: LineEnding::host(),
            mapper: TypeMapper::default(),
        }
    }
}

impl fmt::Debug for GenerateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateOptions")
            .field("namespace", &self.namespace)
            .field("filter", &self.filter.as_ref().map(|_| "<filter>"))
            .field("api_imports", &self.api_imports)
            .field("api_type_import", &self.api_type_import)
            .field("line_ending", &self.line_ending)
            .finish_non_exhaustive()
    }
}

impl GenerateOptions {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn with_filter(mut self, filter: impl OperationFilter + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn with_api_imports(mut self, imports: Vec<String>) -> Self {
        self.api_imports = imports;
        self
    }

    pub fn with_api_type_import(mut self, template: impl Into<String>) -> Self {
        self.api_type_import = Some(template.into());
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    pub fn with_mapper(mut self, mapper: TypeMapper) -> Self {
        self.mapper = mapper;
        self
    }

    /// Ask the filter about an operation.
    pub fn accepts(&self, operation: &OperationMeta<'_>) -> bool {
        self.filter.as_ref().is_none_or(|f| f.accept(operation))
    }
}
