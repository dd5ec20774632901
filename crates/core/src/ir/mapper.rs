//! Lookup tables from schema type names to TypeScript.
//!
//! A `TypeMapper` is built once per run and passed by reference through the
//! resolver, the DTO builder and the operation builder.

use std::collections::HashMap;

use super::types::TypeExpr;

/// Schema type names with a fixed TypeScript rendering.
const PRIMITIVE_TYPES: &[(&str, &str)] = &[
    ("byte", "number"),
    ("short", "number"),
    ("int", "number"),
    ("long", "number"),
    ("float", "number"),
    ("double", "number"),
    ("integer", "number"),
    ("number", "number"),
    ("char", "string"),
    ("string", "string"),
    ("text", "string"),
    ("longText", "string"),
    ("boolean", "boolean"),
    ("any", "any"),
    ("object", "any"),
    ("file", "File"),
    ("formData", "FormData"),
    ("array", "any[]"),
    ("JSONArray", "any[]"),
];

/// Names that clash with TypeScript globals and get a `Type` suffix.
const RESERVED_NAMES: &[(&str, &str)] = &[
    ("File", "FileType"),
    ("URI", "URIType"),
    ("URL", "URLType"),
    ("Record", "RecordType"),
];

/// Literal used in `<Name>Value` objects, keyed by raw or rendered type.
const DEFAULT_VALUES: &[(&str, &str)] = &[
    ("integer", "0"),
    ("long", "0"),
    ("byte", "0"),
    ("short", "0"),
    ("float", "0"),
    ("double", "0"),
    ("number", "0"),
    ("char", "''"),
    ("string", "''"),
    ("boolean", "false"),
    ("any", "{}"),
    ("array", "[]"),
    ("number[]", "[]"),
    ("string[]", "[]"),
    ("boolean[]", "[]"),
    ("array[]", "[]"),
    ("any[]", "[]"),
];

fn to_table(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Immutable type tables.
#[derive(Debug, Clone)]
pub struct TypeMapper {
    primitives: HashMap<String, String>,
    reserved: HashMap<String, String>,
    defaults: HashMap<String, String>,
}

impl Default for TypeMapper {
    fn default() -> Self {
        Self {
            primitives: to_table(PRIMITIVE_TYPES),
            reserved: to_table(RESERVED_NAMES),
            defaults: to_table(DEFAULT_VALUES),
        }
    }
}

impl TypeMapper {
    /// Add or replace a primitive mapping (`"Date" -> "string"`).
    pub fn with_primitive(mut self, name: impl Into<String>, ts: impl Into<String>) -> Self {
        self.primitives.insert(name.into(), ts.into());
        self
    }

    /// Add or replace a reserved-name rename.
    pub fn with_reserved(mut self, name: impl Into<String>, renamed: impl Into<String>) -> Self {
        self.reserved.insert(name.into(), renamed.into());
        self
    }

    /// Add or replace a default literal.
    pub fn with_default_value(mut self, ty: impl Into<String>, literal: impl Into<String>) -> Self {
        self.defaults.insert(ty.into(), literal.into());
        self
    }

    /// Map a schema type name; unknown names pass through as `Named`.
    pub fn map(&self, name: &str) -> TypeExpr {
        match self.primitives.get(name) {
            Some(target) => TypeExpr::from_table(target),
            None => TypeExpr::named(name),
        }
    }

    /// Map a bare name: reserved table first, then primitives.
    pub fn map_name(&self, name: &str) -> TypeExpr {
        match self.reserved.get(name) {
            Some(renamed) => TypeExpr::named(renamed.as_str()),
            None => self.map(name),
        }
    }

    /// The reserved-table rename of `name`, or `name` itself.
    pub fn rename_reserved<'a>(&'a self, name: &'a str) -> &'a str {
        self.reserved.get(name).map_or(name, String::as_str)
    }

    /// True for every key and every target of the primitive table.
    pub fn is_primitive(&self, name: &str) -> bool {
        self.primitives.contains_key(name) || self.primitives.values().any(|t| t == name)
    }

    /// Default literal for a field.
    ///
    /// Looks up the raw schema type, then the rendered resolved type, then
    /// falls back to `[]` for arrays and `{}` for everything else.
    pub fn default_for(&self, raw_type: Option<&str>, resolved: &TypeExpr) -> String {
        if let Some(literal) = raw_type.and_then(|raw| self.defaults.get(raw)) {
            return literal.clone();
        }
        if let Some(literal) = self.defaults.get(&resolved.to_string()) {
            return literal.clone();
        }
        if resolved.is_array() {
            "[]".to_string()
        } else {
            "{}".to_string()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_map_primitives() {
        let mapper = TypeMapper::default();
        assert_eq!(mapper.map("long"), TypeExpr::named("number"));
        assert_eq!(mapper.map("longText"), TypeExpr::named("string"));
        assert_eq!(mapper.map("object"), TypeExpr::Any);
        assert_eq!(mapper.map("JSONArray"), TypeExpr::array(TypeExpr::Any));
        assert_eq!(mapper.map("file"), TypeExpr::named("File"));
        assert_eq!(mapper.map("User"), TypeExpr::named("User"));
    }

    #[test]
    fn test_map_name_checks_reserved_first() {
        let mapper = TypeMapper::default();
        assert_eq!(mapper.map_name("File"), TypeExpr::named("FileType"));
        assert_eq!(mapper.map_name("Record"), TypeExpr::named("RecordType"));
        assert_eq!(mapper.map_name("integer"), TypeExpr::named("number"));
        assert_eq!(mapper.rename_reserved("URL"), "URLType");
        assert_eq!(mapper.rename_reserved("Page"), "Page");
    }

    #[test]
    fn test_is_primitive() {
        let mapper = TypeMapper::default();
        assert!(mapper.is_primitive("string"));
        assert!(mapper.is_primitive("File"));
        assert!(mapper.is_primitive("any[]"));
        assert!(mapper.is_primitive("double"));
        assert!(!mapper.is_primitive("User"));
    }

    #[test]
    fn test_default_for() {
        let mapper = TypeMapper::default();
        let number = TypeExpr::named("number");
        assert_eq!(mapper.default_for(Some("integer"), &number), "0");
        assert_eq!(mapper.default_for(None, &number), "0");
        assert_eq!(mapper.default_for(Some("string"), &TypeExpr::named("string")), "''");
        assert_eq!(mapper.default_for(Some("boolean"), &TypeExpr::named("boolean")), "false");
        assert_eq!(
            mapper.default_for(Some("array"), &TypeExpr::array(TypeExpr::named("User"))),
            "[]"
        );
        assert_eq!(mapper.default_for(None, &TypeExpr::array(TypeExpr::named("User"))), "[]");
        assert_eq!(mapper.default_for(None, &TypeExpr::named("User")), "{}");
        assert_eq!(mapper.default_for(Some("object"), &TypeExpr::Any), "{}");
    }

    #[test]
    fn test_custom_tables() {
        let mapper = TypeMapper::default()
            .with_primitive("Date", "string")
            .with_reserved("Blob", "BlobType")
            .with_default_value("Date", "''");
        assert_eq!(mapper.map("Date"), TypeExpr::named("string"));
        assert_eq!(mapper.map_name("Blob"), TypeExpr::named("BlobType"));
        assert_eq!(mapper.default_for(Some("Date"), &TypeExpr::named("string")), "''");
    }
}
