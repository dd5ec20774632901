//! Code generation: API IR -> output module trees.
//!
//! Builds the three output modules for one run. The function module gets
//! its import lines here, including the rewrite of the request-helper import
//! to exactly the verbs the generated functions use.

use regex::Regex;
use tracing::warn;

use super::api::{ApiIR, OperationDescriptor};
use super::closure::{dependency_closure, imported_types};
use super::types::{ApiFunction, ApiModule, DeclarationModule, DefaultsModule, ImportLine};
use crate::options::GenerateOptions;

/// Import lines used when none are configured.
pub const DEFAULT_API_IMPORTS: &[&str] = &[
    "import type { RequestOptionProps } from '@/api/http.typed'",
    "import { post, get, del, put } from '@/api/http'",
];

/// A `{ get, post, ... }` import group.
const VERB_GROUP_PATTERN: &str = r"\{\s*(get|post|del|put|head|options|patch|trace)(\s*,\s*(get|post|del|put|head|options|patch|trace))*\s*\}";

/// Module trees of one run plus the name lists they were built from.
#[derive(Debug, Clone, Default)]
pub struct CodegenOutput {
    pub api: ApiModule,
    pub declarations: DeclarationModule,
    pub defaults: DefaultsModule,
    /// Names in the type import, in first-use order
    pub imported: Vec<String>,
    /// Names declared in `dto.typed.ts`, in emission order
    pub declared: Vec<String>,
}

/// Generate all three module trees.
pub fn codegen_modules(api: &ApiIR, options: &GenerateOptions) -> CodegenOutput {
    let imported = imported_types(&api.operations, &api.dtos, &options.mapper);
    let declared = dependency_closure(&imported, &api.dtos, &options.mapper);

    let entries: Vec<_> = declared.iter().filter_map(|name| api.dtos.get(name)).collect();
    let declarations = DeclarationModule {
        declarations: entries.iter().map(|e| e.declaration.clone()).collect(),
    };
    let defaults = DefaultsModule {
        defaults: entries.iter().filter_map(|e| e.default.clone()).collect(),
    };

    CodegenOutput {
        api: codegen_api_module(&api.operations, &imported, options),
        declarations,
        defaults,
        imported,
        declared,
    }
}

/// Generate the function module.
pub fn codegen_api_module(
    operations: &[OperationDescriptor],
    imported: &[String],
    options: &GenerateOptions,
) -> ApiModule {
    let mut verbs: Vec<&'static str> = operations.iter().map(|op| op.method.request_fn()).collect();
    verbs.sort_unstable();
    verbs.dedup();

    let configured: Vec<String> = if options.api_imports.is_empty() {
        DEFAULT_API_IMPORTS.iter().map(|s| (*s).to_string()).collect()
    } else {
        options.api_imports.clone()
    };
    let mut imports: Vec<ImportLine> = rewrite_verb_groups(configured, &verbs)
        .into_iter()
        .map(ImportLine::Raw)
        .collect();

    if !imported.is_empty() {
        let mut names = imported.to_vec();
        names.sort();
        imports.push(ImportLine::Types {
            template: type_import_template(options),
            names,
        });
    }

    ApiModule {
        imports,
        functions: operations.iter().map(codegen_function).collect(),
    }
}

fn type_import_template(options: &GenerateOptions) -> String {
    match &options.api_type_import {
        Some(template) if template.contains("{}") => template.clone(),
        Some(template) => {
            warn!(template = %template, "Type import template has no `{{}}` placeholder; using the default.");
            default_type_import(options.namespace.as_deref())
        }
        None => default_type_import(options.namespace.as_deref()),
    }
}

fn default_type_import(namespace: Option<&str>) -> String {
    let ns = namespace
        .filter(|ns| !ns.is_empty())
        .map(|ns| format!("/{ns}"))
        .unwrap_or_default();
    format!("import type {{}} from '@/typed{ns}/dto.typed'")
}

/// Replace every `{ verb, ... }` group with the verbs actually used.
fn rewrite_verb_groups(lines: Vec<String>, verbs: &[&str]) -> Vec<String> {
    if verbs.is_empty() {
        return lines;
    }
    let pattern = match Regex::new(VERB_GROUP_PATTERN) {
        Ok(pattern) => pattern,
        Err(err) => {
            warn!(error = %err, "Verb import pattern failed to compile; imports left as configured.");
            return lines;
        }
    };
    let replacement = format!("{{ {} }}", verbs.join(", "));
    lines
        .into_iter()
        .map(|line| pattern.replace(&line, replacement.as_str()).into_owned())
        .collect()
}

fn codegen_function(operation: &OperationDescriptor) -> ApiFunction {
    ApiFunction {
        name: operation.operation_id.clone(),
        verb: operation.method.request_fn(),
        url: operation.url.clone(),
        description: operation.description.clone(),
        params: operation
            .params
            .iter()
            .map(|p| (p.location.as_str(), p.ty.clone()))
            .collect(),
        response: operation.response.clone(),
    }
}
