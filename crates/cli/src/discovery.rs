//! Source discovery.
//!
//! A configured source is one of:
//! - a local document file
//! - a direct document URL (`*.json`, `/v2/api-docs`, `/v3/api-docs`)
//! - a swagger UI page, whose groups are listed by `/swagger-resources`
//!   (springfox) or `/v3/api-docs/swagger-config` (springdoc)
//! - an API-management project page (`.../project/<id>`), fetched through
//!   its REST API with a bearer token

use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};
use url::Url;

use crate::fetch::{DocumentClient, FetchOptions};

/// Base URL of the API-management REST API.
pub const THIRD_PARTY_API_BASE: &str = "https://api.apifox.com";

const THIRD_PARTY_MARKER: &str = "apifox";
const THIRD_PARTY_REFERER: &str = "https://www.apifox.cn/";
const SWAGGER_RESOURCES_PATH: &str = "/swagger-resources";
const SWAGGER_CONFIG_PATH: &str = "/v3/api-docs/swagger-config";

/// Where the document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    LocalFile(PathBuf),
    Document(Url),
    SwaggerUi(Url),
    ThirdParty { project_id: String },
}

impl Source {
    /// Classify a configured source string.
    pub fn classify(source: &str) -> Result<Self, String> {
        let source = source.trim();
        if source.is_empty() {
            return Err("No source configured".to_string());
        }
        if !source.starts_with("http://") && !source.starts_with("https://") {
            return Ok(Source::LocalFile(PathBuf::from(source)));
        }

        let url = Url::parse(source).map_err(|err| format!("Invalid source URL {source}: {err}"))?;
        if source.contains(THIRD_PARTY_MARKER) {
            let project_id = third_party_project_id(&url)
                .ok_or_else(|| format!("No project id in {source}; expected .../project/<id>"))?;
            return Ok(Source::ThirdParty { project_id });
        }
        if is_document_url(&url) {
            Ok(Source::Document(url))
        } else {
            Ok(Source::SwaggerUi(url))
        }
    }

    /// Host and port to probe before fetching; `None` for local files.
    pub fn probe_target(&self) -> Option<(String, u16)> {
        let url = match self {
            Source::LocalFile(_) => return None,
            Source::ThirdParty { .. } => Url::parse(THIRD_PARTY_API_BASE).ok()?,
            Source::Document(url) | Source::SwaggerUi(url) => url.clone(),
        };
        let host = url.host_str()?.to_string();
        let port = url.port_or_known_default()?;
        Some((host, port))
    }
}

fn is_document_url(url: &Url) -> bool {
    let path = url.path().trim_end_matches('/');
    path.ends_with(".json")
        || path.ends_with("/v2/api-docs")
        || path.ends_with("/v3/api-docs")
        || path.contains("/v3/api-docs/")
}

/// The segment following `/project/` in the URL path.
pub fn third_party_project_id(url: &Url) -> Option<String> {
    let mut segments = url.path_segments()?;
    segments.by_ref().find(|segment| *segment == "project")?;
    segments
        .next()
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Scheme, host and port of a URL.
pub fn origin(url: &Url) -> Result<Url, String> {
    let origin = url.origin().ascii_serialization();
    Url::parse(&origin).map_err(|err| format!("Invalid origin of {url}: {err}"))
}

// =============================================================================
// Swagger groups
// =============================================================================

/// One entry of the swagger group list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SwaggerResource {
    pub name: String,
    /// Document location, usually relative to the origin
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SwaggerConfig {
    #[serde(default)]
    urls: Vec<SwaggerResource>,
}

/// List the swagger groups served at `origin`.
pub async fn discover_groups(
    client: &DocumentClient,
    origin: &Url,
) -> Result<Vec<SwaggerResource>, String> {
    let options = FetchOptions::default();
    let resources_url = join(origin, SWAGGER_RESOURCES_PATH)?;
    match client
        .get_json::<Vec<SwaggerResource>>(resources_url.as_str(), &options)
        .await
    {
        Ok(resources) if !resources.is_empty() => return Ok(resources),
        Ok(_) => debug!(url = %resources_url, "Empty swagger resource list."),
        Err(err) => debug!(url = %resources_url, error = %err, "Swagger resource list unavailable."),
    }

    let config_url = join(origin, SWAGGER_CONFIG_PATH)?;
    let config: SwaggerConfig = client
        .get_json(config_url.as_str(), &options)
        .await
        .map_err(|err| format!("Failed to list swagger groups at {origin}: {err}"))?;
    if config.urls.is_empty() {
        return Err(format!("No swagger groups listed at {config_url}"));
    }
    Ok(config.urls)
}

/// Find the group named `primary_name`.
pub fn pick_group<'a>(
    resources: &'a [SwaggerResource],
    primary_name: &str,
) -> Result<&'a SwaggerResource, String> {
    resources
        .iter()
        .find(|resource| resource.name == primary_name)
        .ok_or_else(|| {
            let available: Vec<_> = resources.iter().map(|r| r.name.as_str()).collect();
            format!(
                "Swagger group `{primary_name}` not found; available: {}",
                available.join(", ")
            )
        })
}

/// Absolute document URL of a group.
pub fn resource_url(origin: &Url, resource: &SwaggerResource) -> Result<Url, String> {
    join(origin, &resource.url)
}

fn join(base: &Url, path: &str) -> Result<Url, String> {
    base.join(path)
        .map_err(|err| format!("Invalid URL {path} relative to {base}: {err}"))
}

// =============================================================================
// API-management export
// =============================================================================

#[derive(Debug, Deserialize)]
struct DataEnvelope {
    #[serde(default)]
    data: Vec<Value>,
}

/// Fetch endpoint details and data schemas of a project and combine them
/// into one `{apiList, schemaList}` export document.
pub async fn fetch_third_party(
    client: &DocumentClient,
    api_base: &str,
    project_id: &str,
    token: Option<&str>,
) -> Result<Value, String> {
    let options = FetchOptions {
        bearer: token,
        referer: Some(THIRD_PARTY_REFERER),
        headers: vec![("x-project-id", project_id.to_string())],
    };
    let base = api_base.trim_end_matches('/');

    let details: DataEnvelope = client
        .get_json(&format!("{base}/api/v1/api-details?locale=zh-CN"), &options)
        .await?;
    let schemas: DataEnvelope = client
        .get_json(
            &format!("{base}/api/v1/projects/{project_id}/data-schemas?locale=zh-CN"),
            &options,
        )
        .await?;
    info!(
        project_id,
        apis = details.data.len(),
        schemas = schemas.data.len(),
        "Fetched project export."
    );

    Ok(json!({
        "apiList": details.data,
        "schemaList": schemas.data,
    }))
}
