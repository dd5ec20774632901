//! Which DTOs end up in the output.
//!
//! Only DTOs reachable from an emitted request function are declared: the
//! names a function mentions directly are imported, and everything those
//! declarations reference is pulled in depth-first.

use std::collections::HashSet;

use super::api::OperationDescriptor;
use super::dto::DtoTable;
use super::mapper::TypeMapper;

/// Ordered set with membership checks.
#[derive(Debug, Default)]
struct NameSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl NameSet {
    fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.order.push(name.to_string());
        true
    }
}

fn is_declared(name: &str, dtos: &DtoTable, mapper: &TypeMapper) -> bool {
    !mapper.is_primitive(name) && dtos.contains(name)
}

/// Names imported by the function module.
///
/// For each operation in order: its response type, then its parameter
/// types. Names nested in array and map types count too; only declared
/// DTOs are kept.
pub fn imported_types(
    operations: &[OperationDescriptor],
    dtos: &DtoTable,
    mapper: &TypeMapper,
) -> Vec<String> {
    let mut imported = NameSet::default();
    for operation in operations {
        let mut names = Vec::new();
        operation.response.collect_names(&mut names);
        for param in &operation.params {
            param.ty.collect_names(&mut names);
        }
        for name in names {
            if is_declared(name, dtos, mapper) {
                imported.insert(name);
            }
        }
    }
    imported.order
}

/// Imported names followed by every DTO they reference, transitively.
pub fn dependency_closure(roots: &[String], dtos: &DtoTable, mapper: &TypeMapper) -> Vec<String> {
    let mut needed = NameSet::default();
    for root in roots {
        needed.insert(root);
    }
    for root in roots {
        visit(root, dtos, mapper, &mut needed);
    }
    needed.order
}

fn visit(name: &str, dtos: &DtoTable, mapper: &TypeMapper, needed: &mut NameSet) {
    let Some(entry) = dtos.get(name) else {
        return;
    };
    for referenced in entry.declaration.referenced_names() {
        if is_declared(referenced, dtos, mapper) && needed.insert(referenced) {
            visit(referenced, dtos, mapper, needed);
        }
    }
}
