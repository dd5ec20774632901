//! Type-reference decoding.
//!
//! Legacy Java backends encode generics into definition names with the
//! guillemet notation: `Map«string,List«User»»`, `R«Page«Order»»`. The
//! grammar is
//!
//! ```text
//! TYPE := NAME | NAME '«' TYPE (',' TYPE)* '»'
//! ```
//!
//! where whitespace around names is ignored and `/` acts like `,`. The
//! `ReferenceResolver` turns a `$ref` (or bare definition name) into a
//! `TypeExpr`. It never fails: anything it cannot decode becomes `any`.

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::mapper::TypeMapper;
use super::types::TypeExpr;
use crate::document::{DataSchema, Schema};

/// Response envelope names dropped when they wrap the whole reference.
pub const ENVELOPE_NAMES: &[&str] = &["R", "Rs", "ReturnT"];

const OPEN: char = '«';
const CLOSE: char = '»';

// =============================================================================
// Parser
// =============================================================================

/// Syntax tree of the generic notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericNode {
    pub name: String,
    pub args: Vec<GenericNode>,
}

impl GenericNode {
    /// Every name in pre-order.
    fn names(&self) -> Vec<&str> {
        let mut out = vec![self.name.as_str()];
        for arg in &self.args {
            out.extend(arg.names());
        }
        out
    }
}

/// Why a generic-notation string could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error("unexpected end of input")]
    UnexpectedEnd,
    #[error("expected a type name at offset {0}")]
    ExpectedName(usize),
    #[error("unexpected `{found}` at offset {offset}")]
    Unexpected { found: char, offset: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Name(String),
    Open,
    Close,
    Separator,
}

impl Token {
    fn as_char(&self) -> char {
        match self {
            Token::Name(name) => name.chars().next().unwrap_or(' '),
            Token::Open => OPEN,
            Token::Close => CLOSE,
            Token::Separator => ',',
        }
    }
}

fn tokenize(input: &str) -> Vec<(usize, Token)> {
    let mut tokens = Vec::new();
    let mut name = String::new();
    let mut name_start = 0;

    let flush = |tokens: &mut Vec<(usize, Token)>, name: &mut String, start: usize| {
        if !name.is_empty() {
            tokens.push((start, Token::Name(std::mem::take(name))));
        }
    };

    for (offset, c) in input.char_indices() {
        let token = match c {
            OPEN => Token::Open,
            CLOSE => Token::Close,
            ',' | '/' => Token::Separator,
            c if c.is_whitespace() => continue,
            c => {
                if name.is_empty() {
                    name_start = offset;
                }
                name.push(c);
                continue;
            }
        };
        flush(&mut tokens, &mut name, name_start);
        tokens.push((offset, token));
    }
    flush(&mut tokens, &mut name, name_start);
    tokens
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
}

impl Parser {
    fn next(&mut self) -> Option<(usize, Token)> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn parse_type(&mut self) -> Result<GenericNode, NotationError> {
        let name = match self.next() {
            Some((_, Token::Name(name))) => name,
            Some((offset, _)) => return Err(NotationError::ExpectedName(offset)),
            None => return Err(NotationError::UnexpectedEnd),
        };
        let mut args = Vec::new();
        if self.peek() == Some(&Token::Open) {
            self.pos += 1;
            loop {
                args.push(self.parse_type()?);
                match self.next() {
                    Some((_, Token::Separator)) => {}
                    Some((_, Token::Close)) => break,
                    Some((offset, token)) => {
                        return Err(NotationError::Unexpected {
                            found: token.as_char(),
                            offset,
                        });
                    }
                    None => return Err(NotationError::UnexpectedEnd),
                }
            }
        }
        Ok(GenericNode { name, args })
    }
}

/// Parse a generic-notation string into its syntax tree.
pub fn parse_notation(input: &str) -> Result<GenericNode, NotationError> {
    let mut parser = Parser {
        tokens: tokenize(input),
        pos: 0,
    };
    let node = parser.parse_type()?;
    match parser.next() {
        None => Ok(node),
        Some((offset, token)) => Err(NotationError::Unexpected {
            found: token.as_char(),
            offset,
        }),
    }
}

// =============================================================================
// Schema index (third-party exports)
// =============================================================================

/// Schema names of a third-party export keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SchemaIndex {
    names: HashMap<String, String>,
}

impl SchemaIndex {
    pub fn from_schemas(schemas: &[DataSchema]) -> Self {
        let names = schemas
            .iter()
            .map(|schema| (schema.id.to_string(), schema.name.clone()))
            .collect();
        Self { names }
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }
}

/// The trailing run of ASCII digits of a reference, if any.
fn trailing_id(reference: &str) -> Option<&str> {
    let digits = reference
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .count();
    (digits > 0).then(|| &reference[reference.len() - digits..])
}

// =============================================================================
// Resolver
// =============================================================================

/// Decodes references and inline schemas into `TypeExpr`s.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'a> {
    mapper: &'a TypeMapper,
    schema_index: Option<&'a SchemaIndex>,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(mapper: &'a TypeMapper) -> Self {
        Self {
            mapper,
            schema_index: None,
        }
    }

    /// Resolver for third-party exports, where `$ref`s end in a schema id.
    pub fn with_schema_index(mapper: &'a TypeMapper, index: &'a SchemaIndex) -> Self {
        Self {
            mapper,
            schema_index: Some(index),
        }
    }

    pub fn mapper(&self) -> &'a TypeMapper {
        self.mapper
    }

    /// Resolve a `$ref` string.
    pub fn resolve_ref(&self, reference: &str) -> TypeExpr {
        let reference = reference.trim();
        if reference.is_empty() {
            return TypeExpr::Any;
        }
        if let Some(index) = self.schema_index
            && let Some(id) = trailing_id(reference)
        {
            return match index.name_of(id) {
                Some(name) => self.resolve_name(name),
                None => {
                    debug!(reference, "Schema id not found in export; using any.");
                    TypeExpr::Any
                }
            };
        }
        let segment = reference.rsplit('/').next().unwrap_or(reference);
        self.resolve_name(segment)
    }

    /// Resolve a bare definition name, possibly carrying generic notation.
    pub fn resolve_name(&self, name: &str) -> TypeExpr {
        let name = name.trim();
        if name.is_empty() {
            return TypeExpr::Any;
        }
        if !name.contains(OPEN) && !name.contains(CLOSE) {
            return self.mapper.map_name(name);
        }
        match parse_notation(name) {
            Ok(node) => self.decode_root(&node),
            Err(err) => {
                debug!(name, error = %err, "Malformed generic notation; using any.");
                TypeExpr::Any
            }
        }
    }

    /// Resolve an inline schema: `$ref`, `type` with `items`, or nothing.
    pub fn resolve_schema(&self, schema: &Schema) -> TypeExpr {
        if let Some(reference) = &schema.ref_path {
            return self.resolve_ref(reference);
        }
        match schema.primary_type() {
            Some("array") => TypeExpr::array(self.resolve_items(schema.items.as_deref())),
            Some(ty) => self.mapper.map(ty),
            None => schema
                .items
                .as_deref()
                .map_or(TypeExpr::Any, |items| self.resolve_schema(items)),
        }
    }

    /// Element type of an array. Nested arrays and inline objects are `any`.
    pub fn resolve_items(&self, items: Option<&Schema>) -> TypeExpr {
        let Some(items) = items else {
            return TypeExpr::Any;
        };
        if let Some(reference) = &items.ref_path {
            return self.resolve_ref(reference);
        }
        match items.primary_type() {
            None | Some("array" | "object") => TypeExpr::Any,
            Some(ty) => self.mapper.map(ty),
        }
    }

    fn decode_root(&self, node: &GenericNode) -> TypeExpr {
        if !node.args.is_empty() && ENVELOPE_NAMES.contains(&node.name.as_str()) {
            return self.decode_sequence(&node.args);
        }
        self.decode(node)
    }

    fn decode(&self, node: &GenericNode) -> TypeExpr {
        if node.args.is_empty() {
            return self.mapper.map_name(&node.name);
        }
        match node.name.as_str() {
            "Map" => self.decode_map(&node.args),
            "List" => TypeExpr::array(self.decode_sequence(&node.args)),
            _ => self.concatenate(&[node]),
        }
    }

    fn decode_sequence(&self, nodes: &[GenericNode]) -> TypeExpr {
        match nodes {
            [single] => self.decode(single),
            many => self.concatenate(&many.iter().collect::<Vec<_>>()),
        }
    }

    fn decode_map(&self, args: &[GenericNode]) -> TypeExpr {
        match args {
            [key, value] if key.args.is_empty() && key.name == "string" => {
                TypeExpr::map(self.decode(value))
            }
            _ => TypeExpr::Any,
        }
    }

    /// `Page«User»` -> `PageUser`, renaming reserved names on the way.
    fn concatenate(&self, nodes: &[&GenericNode]) -> TypeExpr {
        let joined: String = nodes
            .iter()
            .flat_map(|node| node.names())
            .map(|name| self.mapper.rename_reserved(name))
            .collect();
        self.mapper.map_name(&joined)
    }
}
