//! HTTP client for fetching API documents.

use std::time::Duration;

use reqwest::header::{ACCEPT_CHARSET, HeaderMap, HeaderName, HeaderValue, REFERER};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Thin wrapper over a `reqwest::Client` with the headers documentation
/// servers expect.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    client: reqwest::Client,
}

/// Extra request settings.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions<'a> {
    pub bearer: Option<&'a str>,
    pub referer: Option<&'a str>,
    pub headers: Vec<(&'static str, String)>,
}

impl DocumentClient {
    pub fn new() -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|err| {
                warn!(error = %err, "Failed to build HTTP client.");
                format!("Failed to build HTTP client: {err}")
            })?;
        Ok(Self { client })
    }

    /// GET `url` and return the body text. Non-2xx statuses are errors.
    pub async fn get_text(&self, url: &str, options: &FetchOptions<'_>) -> Result<String, String> {
        let headers = request_headers(url, options)?;
        let mut request = self.client.get(url).headers(headers);
        if let Some(token) = options.bearer {
            request = request.bearer_auth(token);
        }

        debug!(%url, "Fetching document.");
        let response = request.send().await.map_err(|err| {
            debug!(error = %err, %url, "Request failed.");
            format!("Request to {url} failed: {err}")
        })?;
        let status = response.status();
        if !status.is_success() {
            return Err(format!("Request to {url} returned {status}"));
        }
        let body = response
            .text()
            .await
            .map_err(|err| format!("Failed to read response from {url}: {err}"))?;
        debug!(%url, %status, bytes = body.len(), "Received document.");
        Ok(body)
    }

    /// GET `url` and deserialize the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &FetchOptions<'_>,
    ) -> Result<T, String> {
        let body = self.get_text(url, options).await?;
        serde_json::from_str(&body).map_err(|err| format!("Invalid JSON from {url}: {err}"))
    }
}

fn request_headers(url: &str, options: &FetchOptions<'_>) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
    let referer = options.referer.unwrap_or(url);
    headers.insert(
        REFERER,
        HeaderValue::from_str(referer).map_err(|err| format!("Invalid referer {referer}: {err}"))?,
    );
    for (name, value) in &options.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|err| format!("Invalid header name {name}: {err}"))?;
        let value = HeaderValue::from_str(value)
            .map_err(|err| format!("Invalid header {name}: {err}"))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_text_sends_headers() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/api-docs"))
            .and(header("authorization", "Bearer secret"))
            .and(header("x-project-id", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"swagger\":\"2.0\"}"))
            .mount(&mock_server)
            .await;

        let client = DocumentClient::new().unwrap();
        let options = FetchOptions {
            bearer: Some("secret"),
            referer: None,
            headers: vec![("x-project-id", "42".to_string())],
        };
        let body = client
            .get_text(&format!("{}/v2/api-docs", mock_server.uri()), &options)
            .await
            .unwrap();
        assert_eq!(body, "{\"swagger\":\"2.0\"}");
    }

    #[tokio::test]
    async fn test_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = DocumentClient::new().unwrap();
        let err = client
            .get_text(&format!("{}/missing", mock_server.uri()), &FetchOptions::default())
            .await
            .unwrap_err();
        assert!(err.contains("404"));
    }

    #[tokio::test]
    async fn test_get_json() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": [1, 2]})))
            .mount(&mock_server)
            .await;

        let client = DocumentClient::new().unwrap();
        let value: serde_json::Value = client
            .get_json(&format!("{}/data", mock_server.uri()), &FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(value["data"][1], 2);
    }
}
