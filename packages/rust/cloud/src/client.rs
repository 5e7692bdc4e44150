//! HTTP implementation of [`RemoteIndex`] over the webhooks API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use docsearch_shared::{CloudCredentials, DocSearchError, Result, SectionRecord};

use crate::{AccessGrant, RemoteIndex};

/// User-Agent string for remote requests.
const USER_AGENT: &str = concat!("docsearch/", env!("CARGO_PKG_VERSION"));

/// Timeout for a single remote call.
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct InfoResponse {
    api_key: String,
    endpoint: InfoEndpoint,
}

#[derive(Debug, Deserialize)]
struct InfoEndpoint {
    endpoint: String,
}

/// Remote index client authenticated with a private API key.
pub struct CloudClient {
    client: Client,
    base_url: Url,
    private_api_key: String,
}

impl CloudClient {
    /// Build a client. Fails if the private key is missing or the base URL is invalid.
    pub fn new(credentials: &CloudCredentials) -> Result<Self> {
        let private_api_key = credentials.require_private_key()?.to_string();

        let base_url = Url::parse(&credentials.base_url).map_err(|e| {
            DocSearchError::config(format!("invalid base URL '{}': {e}", credentials.base_url))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(DocSearchError::config(format!(
                "base URL '{}' cannot carry a path",
                credentials.base_url
            )));
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| DocSearchError::remote(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            private_api_key,
        })
    }

    /// `<base>/api/v1/webhooks/<index_id>/<action>`
    fn webhook_url(&self, index_id: &str, action: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "v1", "webhooks", index_id, action]);
        }
        url
    }

    async fn post(&self, index_id: &str, action: &str, body: Option<&[SectionRecord]>) -> Result<()> {
        let url = self.webhook_url(index_id, action);

        let mut request = self.client.post(url.clone()).bearer_auth(&self.private_api_key);
        request = match body {
            Some(documents) => request.json(documents),
            None => request,
        };

        let response = request
            .send()
            .await
            .map_err(|e| DocSearchError::remote(format!("{action} {index_id}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DocSearchError::remote(format!(
                "{action} {index_id}: HTTP {status} {}",
                detail.trim()
            )));
        }

        debug!(%url, %status, "remote call succeeded");
        Ok(())
    }
}

#[async_trait]
impl RemoteIndex for CloudClient {
    #[instrument(skip(self))]
    async fn check_access(&self, index_id: &str) -> Result<AccessGrant> {
        let url = self.webhook_url(index_id, "info");

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.private_api_key)
            .send()
            .await
            .map_err(|e| DocSearchError::remote(format!("access check {index_id}: {e}")))?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Err(DocSearchError::unauthorized(
                    index_id,
                    format!("access check returned HTTP {status}"),
                ));
            }
            s if !s.is_success() => {
                return Err(DocSearchError::remote(format!(
                    "access check {index_id}: HTTP {status}"
                )));
            }
            _ => {}
        }

        let info: InfoResponse = response.json().await.map_err(|e| {
            DocSearchError::remote(format!("access check {index_id}: invalid response: {e}"))
        })?;

        info!(endpoint = %info.endpoint.endpoint, "index access confirmed");

        Ok(AccessGrant {
            endpoint: info.endpoint.endpoint,
            api_key: info.api_key,
        })
    }

    #[instrument(skip(self, documents), fields(documents = documents.len()))]
    async fn snapshot(&self, index_id: &str, documents: &[SectionRecord]) -> Result<()> {
        self.post(index_id, "snapshot", Some(documents)).await?;
        info!("snapshot uploaded");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn deploy(&self, index_id: &str) -> Result<()> {
        self.post(index_id, "deploy", None).await?;
        info!("deploy triggered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn credentials(base_url: &str) -> CloudCredentials {
        CloudCredentials::new(Some(base_url.to_string()), Some("private-key".into()))
    }

    fn section(title: &str) -> SectionRecord {
        SectionRecord {
            title: title.into(),
            content: "text\n".into(),
            section: "Doc".into(),
            path: "/docs/doc".into(),
            category: String::new(),
        }
    }

    #[test]
    fn new_requires_private_key() {
        let creds = CloudCredentials::new(None, None);
        let err = CloudClient::new(&creds).err().expect("missing key must fail");
        assert!(matches!(err, DocSearchError::Config { .. }));
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let err = CloudClient::new(&credentials("not a url")).err().expect("invalid url");
        assert!(matches!(err, DocSearchError::Config { .. }));

        let err = CloudClient::new(&credentials("mailto:ops@example.com")).err().expect("no path");
        assert!(matches!(err, DocSearchError::Config { .. }));
    }

    #[test]
    fn webhook_url_encodes_segments() {
        let client = CloudClient::new(&credentials("https://cloud.example.com/")).unwrap();
        assert_eq!(
            client.webhook_url("idx-1", "info").as_str(),
            "https://cloud.example.com/api/v1/webhooks/idx-1/info"
        );
        assert_eq!(
            client.webhook_url("a/b", "deploy").as_str(),
            "https://cloud.example.com/api/v1/webhooks/a%2Fb/deploy"
        );
    }

    #[tokio::test]
    async fn check_access_returns_query_credentials() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/webhooks/idx-1/info"))
            .and(header("authorization", "Bearer private-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "api_key": "public-key",
                "endpoint": { "endpoint": "https://cloud.example.com/v1/indexes/idx-1" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudClient::new(&credentials(&server.uri())).unwrap();
        let grant = client.check_access("idx-1").await.unwrap();

        assert_eq!(grant.api_key, "public-key");
        assert_eq!(grant.endpoint, "https://cloud.example.com/v1/indexes/idx-1");
    }

    #[tokio::test]
    async fn check_access_rejected_is_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1/webhooks/idx-1/info"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = CloudClient::new(&credentials(&server.uri())).unwrap();
        let err = client.check_access("idx-1").await.unwrap_err();

        match err {
            DocSearchError::Unauthorized { index_id, .. } => assert_eq!(index_id, "idx-1"),
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn check_access_server_error_is_remote() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = CloudClient::new(&credentials(&server.uri())).unwrap();
        let err = client.check_access("idx-1").await.unwrap_err();
        assert!(matches!(err, DocSearchError::Remote { .. }));
    }

    #[tokio::test]
    async fn snapshot_posts_documents() {
        let server = MockServer::start().await;
        let docs = vec![section("Install"), section("Configure")];

        Mock::given(method("POST"))
            .and(path("/api/v1/webhooks/idx-1/snapshot"))
            .and(header("authorization", "Bearer private-key"))
            .and(body_json(serde_json::to_value(&docs).unwrap()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudClient::new(&credentials(&server.uri())).unwrap();
        client.snapshot("idx-1", &docs).await.unwrap();
    }

    #[tokio::test]
    async fn deploy_failure_is_remote_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/webhooks/idx-1/deploy"))
            .respond_with(ResponseTemplate::new(500).set_body_string("deploy queue full"))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudClient::new(&credentials(&server.uri())).unwrap();
        let err = client.deploy("idx-1").await.unwrap_err();
        assert!(err.to_string().contains("deploy queue full"));
    }
}
