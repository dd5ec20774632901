//! Operation filter built from the `[filter]` config table.

use apibuilder_common::FilterConfig;
use apibuilder_core::{OperationFilter, OperationMeta};
use regex::Regex;

/// Compiled form of [`FilterConfig`].
#[derive(Debug, Clone)]
pub struct ConfigFilter {
    include: Vec<Regex>,
    exclude: Vec<Regex>,
    methods: Vec<String>,
    tags: Vec<String>,
    include_deprecated: bool,
}

impl ConfigFilter {
    /// Compile the configured patterns.
    pub fn from_config(config: &FilterConfig) -> Result<Self, String> {
        Ok(Self {
            include: compile(&config.include_paths)?,
            exclude: compile(&config.exclude_paths)?,
            methods: config.methods.iter().map(|m| m.to_ascii_lowercase()).collect(),
            tags: config.tags.clone(),
            include_deprecated: config.include_deprecated,
        })
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>, String> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|err| format!("Invalid filter pattern `{pattern}`: {err}"))
        })
        .collect()
}

impl OperationFilter for ConfigFilter {
    fn accept(&self, operation: &OperationMeta<'_>) -> bool {
        if operation.deprecated && !self.include_deprecated {
            return false;
        }
        if !self.methods.is_empty() {
            let method = operation.method.as_str().to_ascii_lowercase();
            if !self.methods.contains(&method) {
                return false;
            }
        }
        if !self.tags.is_empty() && !operation.tags.iter().any(|tag| self.tags.contains(tag)) {
            return false;
        }
        if !self.include.is_empty() && !self.include.iter().any(|re| re.is_match(&operation.url)) {
            return false;
        }
        !self.exclude.iter().any(|re| re.is_match(&operation.url))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use apibuilder_core::HttpMethod;

    fn meta<'a>(url: &str, method: HttpMethod, tags: &'a [String], deprecated: bool) -> OperationMeta<'a> {
        OperationMeta {
            url: url.to_string(),
            method,
            operation_id: Some("op"),
            tags,
            summary: None,
            description: None,
            deprecated,
        }
    }

    #[test]
    fn test_default_accepts_everything() {
        let filter = ConfigFilter::from_config(&FilterConfig::default()).unwrap();
        assert!(filter.accept(&meta("/a", HttpMethod::Delete, &[], true)));
    }

    #[test]
    fn test_paths_methods_tags_and_deprecation() {
        let filter = ConfigFilter::from_config(&FilterConfig {
            include_paths: vec!["^/mall/".into()],
            exclude_paths: vec!["/internal/".into()],
            methods: vec!["GET".into(), "post".into()],
            tags: vec!["user".into()],
            include_deprecated: false,
        })
        .unwrap();
        let user = vec!["user".to_string()];
        let other = vec!["order".to_string()];

        assert!(filter.accept(&meta("/mall/users", HttpMethod::Get, &user, false)));
        assert!(!filter.accept(&meta("/admin/users", HttpMethod::Get, &user, false)));
        assert!(!filter.accept(&meta("/mall/internal/ping", HttpMethod::Get, &user, false)));
        assert!(!filter.accept(&meta("/mall/users", HttpMethod::Delete, &user, false)));
        assert!(!filter.accept(&meta("/mall/orders", HttpMethod::Post, &other, false)));
        assert!(!filter.accept(&meta("/mall/users", HttpMethod::Post, &user, true)));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = ConfigFilter::from_config(&FilterConfig {
            include_paths: vec!["(".into()],
            ..FilterConfig::default()
        })
        .unwrap_err();
        assert!(err.starts_with("Invalid filter pattern `(`"));
    }
}
