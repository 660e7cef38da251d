use crate::errors::CoreError;
use crate::models::Pillar;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TipRequest {
    pub perma_scores: BTreeMap<Pillar, f64>,
    pub summary: String,
    pub user_message: String,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct TipReply {
    pub response: String,
}

/// Opaque advice generator. The transport owns retry/backoff policy;
/// this layer surfaces a single attempt's outcome.
#[async_trait]
pub trait TipService: Send + Sync {
    async fn generate(&self, request: &TipRequest) -> Result<String, CoreError>;
}

pub struct HttpTipService {
    client: reqwest::Client,
    url: String,
}

impl HttpTipService {
    pub fn new(url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl TipService for HttpTipService {
    async fn generate(&self, request: &TipRequest) -> Result<String, CoreError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|err| CoreError::RemoteUnavailable(err.to_string()))?;
        if !response.status().is_success() {
            return Err(CoreError::RemoteUnavailable(format!(
                "tip service returned {}",
                response.status()
            )));
        }
        let reply: TipReply = response
            .json()
            .await
            .map_err(|err| CoreError::RemoteUnavailable(err.to_string()))?;
        Ok(reply.response)
    }
}

/// Stand-in used when no tip service is configured; every request
/// reports the collaborator as unavailable.
pub struct DisabledTipService;

#[async_trait]
impl TipService for DisabledTipService {
    async fn generate(&self, _request: &TipRequest) -> Result<String, CoreError> {
        Err(CoreError::RemoteUnavailable(
            "TIP_SERVICE_URL is not configured".to_string(),
        ))
    }
}

pub fn from_env() -> Arc<dyn TipService> {
    match env::var("TIP_SERVICE_URL") {
        Ok(url) if !url.trim().is_empty() => {
            info!("tip service configured at {url}");
            Arc::new(HttpTipService::new(url))
        }
        _ => Arc::new(DisabledTipService),
    }
}
