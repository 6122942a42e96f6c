//! HTTP implementation of the backend trait

use async_trait::async_trait;
use phishsim_common::config::BackendConfig;
use phishsim_common::types::{
    Acknowledged, Analysis, AnalyzeRequest, Campaign, CampaignId, CampaignStats, Created,
    ErrorBody, GenerateRequest, GeneratedTemplate, LaunchRequest, NewCampaign, NewTarget,
    NewTemplate, ResultId, Target, TargetId, Template, TemplateId, TemplateUpdate,
};
use phishsim_common::{Error, Result};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::Backend;

/// API client configuration
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL, e.g. `http://localhost:8000/api`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Optional bearer token
    pub api_key: Option<String>,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        BackendConfig::default().into()
    }
}

impl From<BackendConfig> for ApiClientConfig {
    fn from(config: BackendConfig) -> Self {
        Self {
            base_url: config.url,
            timeout_secs: config.timeout_secs,
            api_key: config.api_key,
        }
    }
}

/// REST client for the PhishSim backend
#[derive(Clone)]
pub struct ApiClient {
    config: ApiClientConfig,
    client: Client,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Build a request with optional auth header
    fn build_request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path));

        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        request
    }

    /// Send a request and turn non-2xx responses into `Error::Api`
    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("{} request failed: {}", what, e)))?;

        let status = response.status();
        if status.is_success() {
            debug!("{} succeeded: {}", what, status);
            return Ok(response);
        }

        let body = response.bytes().await.unwrap_or_else(|e| {
            warn!("Failed to read error body for {}: {}", what, e);
            Default::default()
        });
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .map(|b| b.error);

        warn!(
            "{} failed: status={} message={}",
            what,
            status,
            message.as_deref().unwrap_or("-")
        );

        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Decode a JSON body into a typed record
    async fn decode<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Http(format!("Failed to read {} response: {}", what, e)))?;

        serde_json::from_slice(&body)
            .map_err(|e| Error::Decode(format!("Unexpected {} response: {}", what, e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, what: &str) -> Result<T> {
        let response = self
            .send(self.build_request(Method::GET, path), what)
            .await?;
        Self::decode(response, what).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B, what: &str) -> Result<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.build_request(method, path).json(body), what)
            .await?;
        Self::decode(response, what).await
    }

    async fn delete(&self, path: &str, what: &str) -> Result<()> {
        self.send(self.build_request(Method::DELETE, path), what)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        self.get("/campaigns/", "list campaigns").await
    }

    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<Created> {
        self.send_json(Method::POST, "/campaigns/", campaign, "create campaign")
            .await
    }

    async fn delete_campaign(&self, id: CampaignId) -> Result<()> {
        self.delete(&format!("/campaigns/{}", id), "delete campaign")
            .await
    }

    async fn launch_campaign(&self, id: CampaignId, target_ids: &[TargetId]) -> Result<String> {
        let body = LaunchRequest {
            target_ids: target_ids.to_vec(),
        };
        let ack: Acknowledged = self
            .send_json(
                Method::POST,
                &format!("/campaigns/{}/launch", id),
                &body,
                "launch campaign",
            )
            .await?;
        Ok(ack.message.unwrap_or_default())
    }

    async fn campaign_stats(&self, id: CampaignId) -> Result<CampaignStats> {
        self.get(&format!("/campaigns/{}/stats", id), "campaign stats")
            .await
    }

    async fn track_open(&self, result_id: ResultId) -> Result<()> {
        let path = format!("/campaigns/{}/track/open", result_id);
        self.send(self.build_request(Method::POST, &path), "track open")
            .await?;
        Ok(())
    }

    async fn list_templates(&self) -> Result<Vec<Template>> {
        self.get("/templates/", "list templates").await
    }

    async fn create_template(&self, template: &NewTemplate) -> Result<Created> {
        self.send_json(Method::POST, "/templates/", template, "save template")
            .await
    }

    async fn update_template(&self, id: TemplateId, update: &TemplateUpdate) -> Result<()> {
        // Only a `{"message": ...}` acknowledgement comes back
        let path = format!("/templates/{}", id);
        self.send(self.build_request(Method::PUT, &path).json(update), "update template")
            .await?;
        Ok(())
    }

    async fn delete_template(&self, id: TemplateId) -> Result<()> {
        self.delete(&format!("/templates/{}", id), "delete template")
            .await
    }

    async fn generate_template(&self, request: &GenerateRequest) -> Result<GeneratedTemplate> {
        self.send_json(
            Method::POST,
            "/templates/generate",
            request,
            "generate template",
        )
        .await
    }

    async fn analyze_template(&self, request: &AnalyzeRequest) -> Result<Vec<String>> {
        let analysis: Analysis = self
            .send_json(
                Method::POST,
                "/templates/analyze",
                request,
                "analyze template",
            )
            .await?;
        Ok(analysis.analysis)
    }

    async fn list_targets(&self) -> Result<Vec<Target>> {
        self.get("/targets/", "list targets").await
    }

    async fn create_target(&self, target: &NewTarget) -> Result<Created> {
        self.send_json(Method::POST, "/targets/", target, "add target")
            .await
    }

    async fn delete_target(&self, id: TargetId) -> Result<()> {
        self.delete(&format!("/targets/{}", id), "delete target")
            .await
    }
}
