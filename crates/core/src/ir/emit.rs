//! TypeScript code emission via the Emit trait.
//!
//! Every output node renders itself; the line terminator is chosen once per
//! run and threaded through so that all joined lines agree.

use super::types::{
    ApiFunction, ApiModule, DeclarationModule, DefaultDecl, DefaultsModule, DtoDecl, DtoKind,
    ImportLine, TsField,
};
use super::utils::{description_lines, escape_single_quoted, jsdoc_text, quote_if_needed};
use crate::options::LineEnding;

/// Trait for emitting TypeScript code from output nodes.
pub trait Emit {
    /// Convert the node to its TypeScript source text.
    fn emit(&self, nl: LineEnding) -> String;
}

/// `// line` for every non-empty line, each followed by a terminator.
fn leading_comment(description: Option<&str>, nl: &str) -> String {
    description
        .map(description_lines)
        .unwrap_or_default()
        .into_iter()
        .map(|line| format!("// {line}{nl}"))
        .collect()
}

// =============================================================================
// Declarations
// =============================================================================

impl Emit for TsField {
    fn emit(&self, nl: LineEnding) -> String {
        let key = quote_if_needed(&self.name);
        let opt = if self.optional { "?" } else { "" };
        let mut line = format!("{key}{opt}: {};", self.ty);
        if let Some(description) = &self.description {
            match description_lines(description).as_slice() {
                [] => {}
                [single] => line.push_str(&format!(" // {single}")),
                many => {
                    for comment in many {
                        line.push_str(&format!("{}\t// {comment}", nl.as_str()));
                    }
                }
            }
        }
        line
    }
}

impl Emit for DtoDecl {
    fn emit(&self, nl: LineEnding) -> String {
        let n = nl.as_str();
        let mut output = leading_comment(self.description.as_deref(), n);
        match &self.kind {
            DtoKind::Interface { fields } => {
                output.push_str(&format!("export interface {} {{", self.name));
                for field in fields {
                    output.push_str(&format!("{n}\t{}", field.emit(nl)));
                }
                output.push_str(n);
                output.push('}');
            }
            DtoKind::Alias { target } => {
                output.push_str(&format!("export type {} = {target};", self.name));
            }
            DtoKind::FormData { keys } => {
                let names = if keys.is_empty() {
                    "string".to_string()
                } else {
                    keys.iter()
                        .map(|k| format!("'{}'", escape_single_quoted(k)))
                        .collect::<Vec<_>>()
                        .join(" | ")
                };
                output.push_str(&format!(
                    "export interface {} extends FormData {{{n}\tappend: (name: {names}, value: string | Blob, fileName?: string) => void;{n}}}",
                    self.name
                ));
            }
        }
        output
    }
}

impl Emit for DefaultDecl {
    fn emit(&self, nl: LineEnding) -> String {
        let n = nl.as_str();
        let mut output = leading_comment(self.description.as_deref(), n);
        output.push_str(&format!("export const {}Value = {{", self.name));
        if !self.fields.is_empty() {
            let entries: Vec<_> = self
                .fields
                .iter()
                .map(|f| format!("{}: {}", quote_if_needed(&f.name), f.value))
                .collect();
            output.push_str(&format!("{n}\t{}{n}", entries.join(&format!(",{n}\t"))));
        }
        output.push('}');
        output
    }
}

// =============================================================================
// Function module
// =============================================================================

/// `{ A }` for one name, one name per indented line for several.
fn import_list(names: &[String], nl: &str) -> String {
    match names {
        [single] => format!(" {single} "),
        many => format!("{nl}\t{}{nl}", many.join(&format!(",{nl}\t"))),
    }
}

impl Emit for ImportLine {
    fn emit(&self, nl: LineEnding) -> String {
        match self {
            ImportLine::Raw(line) => line.clone(),
            ImportLine::Types { template, names } => {
                let list = format!("{{{}}}", import_list(names, nl.as_str()));
                template.replacen("{}", &list, 1)
            }
        }
    }
}

impl Emit for ApiFunction {
    fn emit(&self, nl: LineEnding) -> String {
        let n = nl.as_str();
        let response = &self.response;

        let param_docs: String = self
            .params
            .iter()
            .map(|(location, ty)| format!("{n} * @param {{{ty}}} params.{location}"))
            .collect();

        let entries: Vec<_> = self
            .params
            .iter()
            .map(|(location, ty)| format!("{location}: {ty}"))
            .collect();
        let signature = match entries.as_slice() {
            [] => "opt?: RequestOptionProps".to_string(),
            [single] => format!("params: {{ {single} }}, opt?: RequestOptionProps"),
            many => format!(
                "params: {{{n}\t{}{n}}}, opt?: RequestOptionProps",
                many.join(&format!(",{n}\t"))
            ),
        };
        let forwarded = if entries.is_empty() {
            format!("{n}\t\t...opt")
        } else {
            format!("{n}\t\tparams,{n}\t\t...opt")
        };

        format!(
            "{n}/**{n} * @description {description}{param_docs}{n} * @return Promise<{response}>{n} */{n}\
             export const {name} = async ({signature}) => {{{n}\
             \treturn {verb}<{response}>('{url}', {{{forwarded}{n}\t}}){n}\
             }}{n}",
            description = jsdoc_text(&self.description),
            name = self.name,
            verb = self.verb,
            url = escape_single_quoted(&self.url),
        )
    }
}

impl Emit for ApiModule {
    fn emit(&self, nl: LineEnding) -> String {
        let imports: Vec<_> = self.imports.iter().map(|i| i.emit(nl)).collect();
        let mut output = imports.join(nl.as_str());
        output.push_str(nl.as_str());
        for function in &self.functions {
            output.push_str(&function.emit(nl));
        }
        output
    }
}

// =============================================================================
// DTO modules
// =============================================================================

impl Emit for DeclarationModule {
    fn emit(&self, nl: LineEnding) -> String {
        let blank = format!("{0}{0}", nl.as_str());
        self.declarations
            .iter()
            .map(|d| d.emit(nl))
            .collect::<Vec<_>>()
            .join(&blank)
    }
}

impl Emit for DefaultsModule {
    fn emit(&self, nl: LineEnding) -> String {
        let blank = format!("{0}{0}", nl.as_str());
        self.defaults
            .iter()
            .map(|d| d.emit(nl))
            .collect::<Vec<_>>()
            .join(&blank)
    }
}
