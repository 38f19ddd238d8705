use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::categories;
use crate::config::ApiConfig;
use crate::error::{ConsoleError, ConsoleResult};
use crate::models::*;
use crate::repository::ConsoleRepository;

/// Backend REST API client
pub struct HttpRepository {
    client: Client,
    base_url: String,
}

impl HttpRepository {
    pub fn new(config: &ApiConfig) -> ConsoleResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("leadconsole-ui/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn check(res: Response) -> ConsoleResult<Response> {
        let status = res.status();
        if status.is_success() {
            return Ok(res);
        }
        Err(ConsoleError::Backend {
            status: status.as_u16(),
            body: res.text().await.unwrap_or_default(),
        })
    }

    /// Malformed payloads surface as `Decode`.
    async fn decode<T: DeserializeOwned>(res: Response) -> ConsoleResult<T> {
        let body = Self::check(res).await?.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ConsoleResult<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let res = self.client.get(&url).send().await?;
        Self::decode(res).await
    }

    async fn send_json<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &B,
    ) -> ConsoleResult<T> {
        let url = self.url(path);
        debug!(%url, %method, "send");
        let res = self.client.request(method, &url).json(body).send().await?;
        Self::decode(res).await
    }
}

#[async_trait]
impl ConsoleRepository for HttpRepository {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn leads(&self) -> ConsoleResult<Vec<Lead>> {
        self.get_json("leads").await
    }

    async fn lead_stats_summary(&self) -> ConsoleResult<LeadStatsSummary> {
        self.get_json("leads/stats/summary").await
    }

    async fn campaigns(&self) -> ConsoleResult<Vec<Campaign>> {
        self.get_json("campaigns").await
    }

    async fn model_performance(&self) -> ConsoleResult<Vec<ModelPerformance>> {
        self.get_json("ai/performance").await
    }

    async fn model_configs(&self) -> ConsoleResult<Vec<ModelConfig>> {
        self.get_json("ai/models").await
    }

    async fn ab_tests(&self) -> ConsoleResult<Vec<AbTest>> {
        self.get_json("ai/ab-tests").await
    }

    async fn workflows(&self) -> ConsoleResult<Vec<Workflow>> {
        self.get_json("workflows").await
    }

    async fn workflow_executions(&self) -> ConsoleResult<Vec<WorkflowExecution>> {
        self.get_json("workflows/executions").await
    }

    async fn webhooks(&self) -> ConsoleResult<Vec<Webhook>> {
        self.get_json("webhooks").await
    }

    async fn approvals(&self) -> ConsoleResult<Vec<Approval>> {
        self.get_json("approvals").await
    }

    async fn locations(&self, active_only: bool) -> ConsoleResult<Vec<Location>> {
        self.get_json(&format!("locations?active_only={active_only}")).await
    }

    async fn location_groups(&self) -> ConsoleResult<Vec<LocationGroup>> {
        self.get_json("location-groups").await
    }

    async fn create_location_group(&self, draft: &LocationGroupDraft) -> ConsoleResult<LocationGroup> {
        self.send_json(reqwest::Method::POST, "location-groups", draft).await
    }

    async fn update_location_group(&self, id: i64, draft: &LocationGroupDraft) -> ConsoleResult<LocationGroup> {
        match self
            .send_json(reqwest::Method::PUT, &format!("location-groups/{id}"), draft)
            .await
        {
            Err(ConsoleError::Backend { status: 404, .. }) => {
                Err(ConsoleError::not_found("location group", id.to_string()))
            }
            other => other,
        }
    }

    async fn delete_location_group(&self, id: i64) -> ConsoleResult<()> {
        let url = self.url(&format!("location-groups/{id}"));
        debug!(%url, "DELETE");
        let res = self.client.delete(&url).send().await?;
        match Self::check(res).await {
            Ok(_) => Ok(()),
            Err(ConsoleError::Backend { status: 404, .. }) => {
                Err(ConsoleError::not_found("location group", id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Structured endpoint first, then the plain list.
    async fn categories(&self) -> ConsoleResult<CategoryGroups> {
        let structured = self.get_json::<CategoryGroups>("scraper/categories/structured").await;
        let err = match structured {
            Ok(groups) => return Ok(groups),
            Err(e) => e,
        };
        debug!(error = %err, "Structured categories unavailable, trying plain list");

        let plain = self.get_json::<BTreeMap<String, Vec<String>>>("scraper/categories").await?;
        Ok(categories::normalize(plain))
    }

    async fn create_scrape_job(&self, request: &ScrapeJobRequest) -> ConsoleResult<ScrapeJobCreated> {
        self.send_json(reqwest::Method::POST, "scraper/jobs", request).await
    }
}
