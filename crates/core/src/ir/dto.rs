//! DTO table and the definition walk that fills it.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::reference::{ENVELOPE_NAMES, ReferenceResolver};
use super::types::{DefaultDecl, DefaultField, DtoDecl, DtoEntry, TsField, TypeExpr};
use super::utils::{is_ts_identifier, non_blank};
use crate::document::Schema;

/// Titles ending in this suffix default every field to required.
const RESPONSE_SUFFIX: &str = "Resp";

/// DTO declarations keyed by exported name.
///
/// Insertion order is kept; inserting an existing name replaces the entry in
/// place (last write wins).
#[derive(Debug, Clone, Default)]
pub struct DtoTable {
    entries: IndexMap<String, DtoEntry>,
}

impl DtoTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the one it replaced.
    pub fn insert(&mut self, entry: DtoEntry) -> Option<DtoEntry> {
        let name = entry.name().to_string();
        let previous = self.entries.insert(name, entry);
        if let Some(previous) = &previous {
            debug!(name = previous.name(), "DTO name collision; later declaration wins.");
        }
        previous
    }

    /// Overlay `other` on top of this table.
    pub fn extend(&mut self, other: DtoTable) {
        for (_, entry) in other.entries {
            self.insert(entry);
        }
    }

    pub fn get(&self, name: &str) -> Option<&DtoEntry> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// `<Name>InList` alias for an array of a DTO.
pub fn list_alias(element: &str) -> DtoEntry {
    DtoEntry::new(DtoDecl::alias(
        format!("{element}InList"),
        TypeExpr::array(TypeExpr::named(element)),
    ))
}

/// Walk definitions in document order and build one entry per DTO.
pub fn build_dtos<'s>(
    definitions: impl IntoIterator<Item = (&'s str, &'s Schema)>,
    resolver: &ReferenceResolver<'_>,
) -> DtoTable {
    let mapper = resolver.mapper();
    let mut table = DtoTable::new();

    for (name, schema) in definitions {
        if name.starts_with("R«") {
            debug!(name, "Skipping response envelope definition.");
            continue;
        }

        let title = match resolver.resolve_name(name) {
            TypeExpr::Named(title) if !mapper.is_primitive(&title) => title,
            TypeExpr::Array(element) => match *element {
                TypeExpr::Named(element) if !mapper.is_primitive(&element) => {
                    table.insert(list_alias(&element));
                    continue;
                }
                _ => continue,
            },
            other => {
                debug!(name, resolved = %other, "Definition does not name a DTO; skipped.");
                continue;
            }
        };

        if !is_ts_identifier(&title) {
            warn!(name, title = %title, "Definition title is not a valid TypeScript identifier.");
        }

        let required = schema.required_names();
        let all_required = required.is_none() && title.ends_with(RESPONSE_SUFFIX);

        let mut fields = Vec::with_capacity(schema.properties.len());
        let mut defaults = Vec::with_capacity(schema.properties.len());
        for (key, property) in &schema.properties {
            let ty = resolver.resolve_schema(property);
            let is_required = all_required || required.is_some_and(|r| r.contains(key));
            defaults.push(DefaultField {
                name: key.clone(),
                value: mapper.default_for(property.primary_type(), &ty),
            });
            fields.push(TsField {
                name: key.clone(),
                ty,
                optional: !is_required,
                description: non_blank(property.description.as_deref()),
            });
        }

        let description = non_blank(schema.description.as_deref());
        let declaration = DtoDecl::interface(title.clone(), description.clone(), fields);
        let entry = if ENVELOPE_NAMES.contains(&title.as_str()) {
            DtoEntry::new(declaration)
        } else {
            DtoEntry::with_default(
                declaration,
                DefaultDecl {
                    name: title,
                    description,
                    fields: defaults,
                },
            )
        };
        table.insert(entry);
    }

    table
}
