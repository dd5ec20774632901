//! TypeScript IR types for code generation.
//!
//! This module defines the declaration-level representation of the output:
//! - TypeExpr: resolved type expressions (`any`, names, arrays, string maps)
//! - DtoDecl: one exported interface / alias / form-data declaration
//! - DefaultDecl: the `<Name>Value` default-value literal of a DTO

use std::fmt;

/// A resolved TypeScript type expression.
///
/// Rendering is a pure function of the structure, so two structurally equal
/// values always render to the same text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// `any`
    Any,
    /// A primitive or DTO name, rendered verbatim: "number", "User"
    Named(String),
    /// Array type: `T[]`
    Array(Box<TypeExpr>),
    /// String-keyed map: `{[key: string]: V}`
    Map(Box<TypeExpr>),
}

impl TypeExpr {
    /// Shorthand for `TypeExpr::Named`.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named(name.into())
    }

    /// Shorthand for `TypeExpr::Array`.
    pub fn array(inner: TypeExpr) -> Self {
        TypeExpr::Array(Box::new(inner))
    }

    /// Shorthand for `TypeExpr::Map`.
    pub fn map(value: TypeExpr) -> Self {
        TypeExpr::Map(Box::new(value))
    }

    /// Parse a type-table target such as `any[]`, `number` or `File`.
    pub fn from_table(target: &str) -> Self {
        if let Some(inner) = target.strip_suffix("[]") {
            TypeExpr::array(TypeExpr::from_table(inner))
        } else if target == "any" {
            TypeExpr::Any
        } else {
            TypeExpr::named(target)
        }
    }

    /// Check if this expression is an array type.
    pub fn is_array(&self) -> bool {
        matches!(self, TypeExpr::Array(_))
    }

    /// Push every `Named` reference reachable in this expression, in order.
    pub fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            TypeExpr::Any => {}
            TypeExpr::Named(name) => out.push(name),
            TypeExpr::Array(inner) | TypeExpr::Map(inner) => inner.collect_names(out),
        }
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Any => f.write_str("any"),
            TypeExpr::Named(name) => f.write_str(name),
            TypeExpr::Array(inner) => write!(f, "{inner}[]"),
            TypeExpr::Map(value) => write!(f, "{{[key: string]: {value}}}"),
        }
    }
}

/// A property of an exported interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TsField {
    /// Property name as it appears in the document
    pub name: String,
    /// Resolved property type
    pub ty: TypeExpr,
    /// Rendered with `?:` when true
    pub optional: bool,
    /// Trailing `//` comment
    pub description: Option<String>,
}

/// Kind of exported DTO declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DtoKind {
    /// `export interface Name { ... }`
    Interface { fields: Vec<TsField> },
    /// `export type Name = Target;`
    Alias { target: TypeExpr },
    /// `export interface Name extends FormData { append: ... }`
    FormData { keys: Vec<String> },
}

/// One exported DTO declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtoDecl {
    /// Exported identifier
    pub name: String,
    /// Leading `//` comment lines
    pub description: Option<String>,
    /// Declaration body
    pub kind: DtoKind,
}

impl DtoDecl {
    /// An interface declaration.
    pub fn interface(
        name: impl Into<String>,
        description: Option<String>,
        fields: Vec<TsField>,
    ) -> Self {
        Self {
            name: name.into(),
            description,
            kind: DtoKind::Interface { fields },
        }
    }

    /// A type alias declaration.
    pub fn alias(name: impl Into<String>, target: TypeExpr) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: DtoKind::Alias { target },
        }
    }

    /// A `FormData` extension restricting `append` to the given keys.
    pub fn form_data(name: impl Into<String>, keys: Vec<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            kind: DtoKind::FormData { keys },
        }
    }

    /// Names referenced by field types and alias targets, in declaration order.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        match &self.kind {
            DtoKind::Interface { fields } => {
                for field in fields {
                    field.ty.collect_names(&mut names);
                }
            }
            DtoKind::Alias { target } => target.collect_names(&mut names),
            DtoKind::FormData { .. } => {}
        }
        names
    }
}

/// One `name: literal` entry of a default-value object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultField {
    /// Property name
    pub name: String,
    /// Literal source text: `0`, `''`, `false`, `[]`, `{}`
    pub value: String,
}

/// `export const <Name>Value = { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultDecl {
    /// DTO name; the exported constant is `<name>Value`
    pub name: String,
    /// Leading `//` comment lines
    pub description: Option<String>,
    /// Literal entries in property order
    pub fields: Vec<DefaultField>,
}

/// A DTO table entry: declaration plus optional default literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DtoEntry {
    /// The exported declaration
    pub declaration: DtoDecl,
    /// Default literal, absent for aliases, form types and envelopes
    pub default: Option<DefaultDecl>,
}

impl DtoEntry {
    /// Entry without a default literal.
    pub fn new(declaration: DtoDecl) -> Self {
        Self {
            declaration,
            default: None,
        }
    }

    /// Entry with a default literal.
    pub fn with_default(declaration: DtoDecl, default: DefaultDecl) -> Self {
        Self {
            declaration,
            default: Some(default),
        }
    }

    /// The exported name of this entry.
    pub fn name(&self) -> &str {
        &self.declaration.name
    }
}

// =============================================================================
// Output modules
// =============================================================================

/// An import line of the function module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportLine {
    /// Emitted verbatim
    Raw(String),
    /// Template whose first `{}` is replaced by the imported type names
    Types { template: String, names: Vec<String> },
}

/// One exported request function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFunction {
    pub name: String,
    /// Request helper: `get`, `post`, `del`, ...
    pub verb: &'static str,
    pub url: String,
    pub description: String,
    /// `(location, type)` pairs of the `params` argument
    pub params: Vec<(&'static str, TypeExpr)>,
    pub response: TypeExpr,
}

/// `index.ts`: imports followed by the request functions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiModule {
    pub imports: Vec<ImportLine>,
    pub functions: Vec<ApiFunction>,
}

/// `dto.typed.ts`: one declaration per needed DTO.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationModule {
    pub declarations: Vec<DtoDecl>,
}

/// `dto.value.ts`: default literals of the same DTOs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultsModule {
    pub defaults: Vec<DefaultDecl>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_type_expr_display() {
        assert_eq!(TypeExpr::Any.to_string(), "any");
        assert_eq!(TypeExpr::named("User").to_string(), "User");
        assert_eq!(TypeExpr::array(TypeExpr::named("User")).to_string(), "User[]");
        assert_eq!(
            TypeExpr::map(TypeExpr::array(TypeExpr::named("number"))).to_string(),
            "{[key: string]: number[]}"
        );
    }

    #[test]
    fn test_from_table() {
        assert_eq!(TypeExpr::from_table("any"), TypeExpr::Any);
        assert_eq!(TypeExpr::from_table("any[]"), TypeExpr::array(TypeExpr::Any));
        assert_eq!(TypeExpr::from_table("File"), TypeExpr::named("File"));
    }

    #[test]
    fn test_referenced_names() {
        let decl = DtoDecl::interface(
            "Order",
            None,
            vec![
                TsField {
                    name: "items".into(),
                    ty: TypeExpr::array(TypeExpr::named("OrderItem")),
                    optional: true,
                    description: None,
                },
                TsField {
                    name: "meta".into(),
                    ty: TypeExpr::map(TypeExpr::named("Meta")),
                    optional: true,
                    description: None,
                },
                TsField {
                    name: "raw".into(),
                    ty: TypeExpr::Any,
                    optional: true,
                    description: None,
                },
            ],
        );
        assert_eq!(decl.referenced_names(), vec!["OrderItem", "Meta"]);

        let alias = DtoDecl::alias("UserInList", TypeExpr::array(TypeExpr::named("User")));
        assert_eq!(alias.referenced_names(), vec!["User"]);

        let form = DtoDecl::form_data("UploadFormData", vec!["file".into()]);
        assert!(form.referenced_names().is_empty());
    }
}
