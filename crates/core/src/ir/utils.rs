//! Common utilities for TypeScript code generation.
//!
//! This module provides shared helper functions used across normalization and printing.

/// Check if an identifier needs quoting when used as a property key.
///
/// Returns true if the name:
/// - Is empty
/// - Doesn't start with a letter, underscore, or dollar sign
/// - Contains characters other than alphanumeric, underscore, or dollar sign
pub fn needs_bracket_notation(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    !(first.is_ascii_alphabetic() || first == '_' || first == '$')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// True when `name` can be emitted as a TypeScript type or value identifier.
pub fn is_ts_identifier(name: &str) -> bool {
    !needs_bracket_notation(name)
}

/// Escape a string for use in a double-quoted literal.
pub fn escape_js_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Escape a string for use in a single-quoted literal.
pub fn escape_single_quoted(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Quote a string if needed for use as a property key.
pub fn quote_if_needed(name: &str) -> String {
    if needs_bracket_notation(name) {
        format!("\"{}\"", escape_js_string(name))
    } else {
        name.to_string()
    }
}

/// Capitalize the first letter of a string.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Non-empty trimmed lines of a (possibly multi-line) description.
pub fn description_lines(description: &str) -> Vec<&str> {
    description
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Description text safe inside a `/** */` block: one line, no `*/`.
pub fn jsdoc_text(description: &str) -> String {
    description_lines(description).join(" ").replace("*/", "*\\/")
}

/// Trimmed description, `None` when blank.
pub fn non_blank(description: Option<&str>) -> Option<String> {
    description
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
}

/// Join the non-blank parts with single spaces.
pub fn join_words<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
