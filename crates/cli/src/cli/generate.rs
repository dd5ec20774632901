use std::fs;
use std::path::Path;

use apibuilder_common::{BuilderConfig, PROBE_TIMEOUT, RunLock, is_host_reachable};
use apibuilder_core::{SchemaDocument, generate};
use clap::Args;
use tracing::{debug, info};

use crate::cli::common::{ConfigArgs, LoadedConfig, generate_options};
use crate::cli::run_command;
use crate::discovery::{
    Source, THIRD_PARTY_API_BASE, discover_groups, fetch_third_party, origin, pick_group,
    resource_url,
};
use crate::fetch::{DocumentClient, FetchOptions};
use crate::writer::OutputLayout;

#[derive(Args, Debug, Clone, Default)]
pub struct GenerateArgs {
    /// Document URL, swagger UI URL, export project URL or local file
    #[arg(long, value_name = "SOURCE")]
    pub source: Option<String>,
    /// Bearer token for API-management exports
    #[arg(long = "auth-token", value_name = "TOKEN")]
    pub auth_token: Option<String>,
    /// Generate even when `use_lock` is set and the lock exists
    #[arg(long = "no-lock")]
    pub no_lock: bool,
    #[command(flatten)]
    pub config: ConfigArgs,
}

pub async fn run(args: GenerateArgs) -> i32 {
    run_command(|| run_inner(args)).await
}

async fn run_inner(args: GenerateArgs) -> Result<(), String> {
    let LoadedConfig {
        mut config,
        base_dir,
    } = args.config.load()?;
    if let Some(source) = args.source {
        config.source = Some(source);
    }
    if let Some(token) = args.auth_token {
        config.auth_token = Some(token);
    }
    let written = generate_into(&config, &base_dir, !args.no_lock).await?;
    if written > 0 {
        println!("Generated {written} namespace(s)");
    }
    Ok(())
}

/// Resolve the source, generate every namespace and write the output.
///
/// Returns the number of namespaces written; zero when the run lock was
/// already held.
pub async fn generate_into(
    config: &BuilderConfig,
    base_dir: &Path,
    honor_lock: bool,
) -> Result<usize, String> {
    let source = config.source.as_deref().ok_or_else(|| {
        "No source configured; set `source` in apibuilder.toml or pass --source".to_string()
    })?;
    let source = Source::classify(source)?;

    if config.use_lock && honor_lock && !RunLock::acquire(base_dir)? {
        info!(
            path = %RunLock::path(base_dir).display(),
            "Lock file present; skipping generation."
        );
        return Ok(0);
    }

    if let Some((host, port)) = source.probe_target() {
        let probe_host = host.clone();
        let reachable =
            tokio::task::spawn_blocking(move || is_host_reachable(&probe_host, port, PROBE_TIMEOUT))
                .await
                .map_err(|err| format!("Reachability probe failed: {err}"))?;
        if !reachable {
            return Err(format!(
                "Cannot reach {host}:{port}; check the network connection"
            ));
        }
        debug!(%host, port, "Source host reachable.");
    }

    let documents = load_documents(&source, config, base_dir).await?;

    // Render everything before touching the filesystem
    let layout = OutputLayout::new(&config.output, base_dir);
    let mut files = Vec::new();
    for (namespace, document) in &documents {
        let options = generate_options(config, namespace)?;
        let artifacts = generate(document, &options)
            .map_err(|err| format!("Failed to generate namespace `{namespace}`: {err}"))?;
        info!(
            namespace = %namespace,
            operations = artifacts.operations.len(),
            types = artifacts.declared_types.len(),
            "Generated namespace."
        );
        files.extend(layout.files(namespace, &artifacts));
    }
    layout.write_all(&files)?;
    Ok(documents.len())
}

/// Fetch or read every document the source names, keyed by namespace.
async fn load_documents(
    source: &Source,
    config: &BuilderConfig,
    base_dir: &Path,
) -> Result<Vec<(String, SchemaDocument)>, String> {
    let default_namespace = config.namespace.clone().unwrap_or_default();

    match source {
        Source::LocalFile(path) => {
            let path = base_dir.join(path);
            let text = fs::read_to_string(&path)
                .map_err(|err| format!("Failed to read {}: {err}", path.display()))?;
            let document = parse(&text, &path.display().to_string())?;
            Ok(vec![(default_namespace, document)])
        }
        Source::Document(url) => {
            let client = DocumentClient::new()?;
            let document = fetch_document(&client, url.as_str()).await?;
            Ok(vec![(default_namespace, document)])
        }
        Source::ThirdParty { project_id } => {
            let client = DocumentClient::new()?;
            let export = fetch_third_party(
                &client,
                THIRD_PARTY_API_BASE,
                project_id,
                config.auth_token.as_deref(),
            )
            .await?;
            let document = SchemaDocument::from_value(export)
                .map_err(|err| format!("Failed to parse project {project_id} export: {err}"))?;
            Ok(vec![(default_namespace, document)])
        }
        Source::SwaggerUi(url) => {
            let client = DocumentClient::new()?;
            let origin = origin(url)?;
            let resources = discover_groups(&client, &origin).await?;
            let groups = config.groups();

            if groups.is_empty() {
                let from_query = url
                    .query_pairs()
                    .find(|(key, _)| key == "urls.primaryName")
                    .map(|(_, value)| value.into_owned());
                let resource = match from_query {
                    Some(name) => pick_group(&resources, &name)?,
                    None => resources
                        .first()
                        .ok_or_else(|| format!("No swagger groups listed at {origin}"))?,
                };
                info!(group = %resource.name, "No primary_name configured; using the URL's group.");
                let url = resource_url(&origin, resource)?;
                let document = fetch_document(&client, url.as_str()).await?;
                return Ok(vec![(default_namespace, document)]);
            }

            let mut documents = Vec::with_capacity(groups.len());
            for group in groups {
                let resource = pick_group(&resources, &group.primary_name)?;
                let url = resource_url(&origin, resource)?;
                let document = fetch_document(&client, url.as_str())
                    .await
                    .map_err(|err| format!("Swagger group `{}`: {err}", group.primary_name))?;
                documents.push((group.namespace, document));
            }
            Ok(documents)
        }
    }
}

async fn fetch_document(client: &DocumentClient, url: &str) -> Result<SchemaDocument, String> {
    let text = client.get_text(url, &FetchOptions::default()).await?;
    parse(&text, url)
}

fn parse(text: &str, origin: &str) -> Result<SchemaDocument, String> {
    SchemaDocument::from_json(text).map_err(|err| format!("Failed to parse document {origin}: {err}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use apibuilder_common::LineEndingConfig;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn swagger(operation_id: &str) -> serde_json::Value {
        serde_json::json!({
            "swagger": "2.0",
            "basePath": "/",
            "paths": {
                "/users/{id}": {"get": {
                    "operationId": operation_id,
                    "tags": ["user"],
                    "summary": "Get user",
                    "parameters": [{"name": "id", "in": "path", "required": true, "type": "integer"}],
                    "responses": {"200": {"schema": {"$ref": "#/definitions/User"}}}
                }}
            },
            "definitions": {"User": {"properties": {"id": {"type": "integer"}}}}
        })
    }

    fn config(source: String) -> BuilderConfig {
        BuilderConfig {
            source: Some(source),
            namespace: Some("mall".into()),
            line_ending: LineEndingConfig::Lf,
            ..BuilderConfig::default()
        }
    }

    #[tokio::test]
    async fn test_generate_from_document_url() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/api-docs"))
            .respond_with(ResponseTemplate::new(200).set_body_json(swagger("getUser")))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let config = config(format!("{}/v2/api-docs", mock_server.uri()));
        let written = generate_into(&config, temp.path(), true).await.unwrap();
        assert_eq!(written, 1);

        let api = fs::read_to_string(temp.path().join("src/api/mall/index.ts")).unwrap();
        assert!(api.contains("export const getUser = async (params: { path: GetUserPath }"));
        assert!(api.contains("} from '@/typed/mall/dto.typed'"));
        let types = fs::read_to_string(temp.path().join("src/typed/mall/dto.typed.ts")).unwrap();
        assert!(types.contains("export interface User {"));
    }

    #[tokio::test]
    async fn test_generate_swagger_groups_into_namespaces() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/swagger-resources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "mall-api", "url": "/v2/api-docs?group=mall-api"},
                {"name": "admin-api", "url": "/v2/api-docs?group=admin-api"}
            ])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/api-docs"))
            .and(query_param("group", "mall-api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(swagger("getMallUser")))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/api-docs"))
            .and(query_param("group", "admin-api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(swagger("getAdminUser")))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let mut config = config(format!("{}/doc.html", mock_server.uri()));
        config.primary_names = vec![
            apibuilder_common::PrimaryName {
                namespace: "mall".into(),
                primary_name: "mall-api".into(),
            },
            apibuilder_common::PrimaryName {
                namespace: "admin".into(),
                primary_name: "admin-api".into(),
            },
        ];
        let written = generate_into(&config, temp.path(), true).await.unwrap();
        assert_eq!(written, 2);

        let mall = fs::read_to_string(temp.path().join("src/api/mall/index.ts")).unwrap();
        assert!(mall.contains("export const getMallUser"));
        let admin = fs::read_to_string(temp.path().join("src/api/admin/index.ts")).unwrap();
        assert!(admin.contains("export const getAdminUser"));
        assert!(admin.contains("} from '@/typed/admin/dto.typed'"));
    }

    #[tokio::test]
    async fn test_group_from_ui_url_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/swagger-resources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "mall-api", "url": "/v2/api-docs?group=mall-api"},
                {"name": "admin-api", "url": "/v2/api-docs?group=admin-api"}
            ])))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/api-docs"))
            .and(query_param("group", "admin-api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(swagger("getAdminUser")))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let config = config(format!(
            "{}/swagger-ui/index.html?urls.primaryName=admin-api",
            mock_server.uri()
        ));
        assert_eq!(generate_into(&config, temp.path(), true).await.unwrap(), 1);
        let api = fs::read_to_string(temp.path().join("src/api/mall/index.ts")).unwrap();
        assert!(api.contains("export const getAdminUser"));
    }

    #[tokio::test]
    async fn test_unknown_group_writes_nothing() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/swagger-resources"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"name": "mall-api", "url": "/v2/api-docs?group=mall-api"}
            ])))
            .mount(&mock_server)
            .await;

        let temp = TempDir::new().unwrap();
        let mut config = config(format!("{}/doc.html", mock_server.uri()));
        config.primary_name = Some("missing".into());
        let err = generate_into(&config, temp.path(), true).await.unwrap_err();
        assert!(err.contains("`missing` not found"));
        assert!(!temp.path().join("src").exists());
    }

    #[tokio::test]
    async fn test_run_lock_skips_second_run() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("doc.json"), swagger("getUser").to_string()).unwrap();
        let mut config = config("doc.json".into());
        config.use_lock = true;

        assert_eq!(generate_into(&config, temp.path(), true).await.unwrap(), 1);
        assert!(RunLock::path(temp.path()).is_file());

        fs::remove_dir_all(temp.path().join("src")).unwrap();
        assert_eq!(generate_into(&config, temp.path(), true).await.unwrap(), 0);
        assert!(!temp.path().join("src").exists());

        assert_eq!(generate_into(&config, temp.path(), false).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_malformed_document_writes_nothing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("doc.json"), "{\"info\": {}}").unwrap();
        let config = config("doc.json".into());
        let err = generate_into(&config, temp.path(), true).await.unwrap_err();
        assert!(err.starts_with("Failed to parse document"));
        assert!(!temp.path().join("src").exists());
    }

    #[tokio::test]
    async fn test_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = generate_into(&BuilderConfig::default(), temp.path(), true)
            .await
            .unwrap_err();
        assert!(err.starts_with("No source configured"));
    }
}
