//! Data source seam: fixtures for development, the backend API in production.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::categories;
use crate::client::HttpRepository;
use crate::config::{ApiConfig, DataSource};
use crate::error::{ConsoleError, ConsoleResult};
use crate::fixtures;
use crate::models::*;
use crate::stats::summarize_leads;

#[async_trait]
pub trait ConsoleRepository: Send + Sync {
    fn name(&self) -> &'static str;

    async fn leads(&self) -> ConsoleResult<Vec<Lead>>;
    async fn lead_stats_summary(&self) -> ConsoleResult<LeadStatsSummary>;
    async fn campaigns(&self) -> ConsoleResult<Vec<Campaign>>;

    async fn model_performance(&self) -> ConsoleResult<Vec<ModelPerformance>>;
    async fn model_configs(&self) -> ConsoleResult<Vec<ModelConfig>>;
    async fn ab_tests(&self) -> ConsoleResult<Vec<AbTest>>;

    async fn workflows(&self) -> ConsoleResult<Vec<Workflow>>;
    async fn workflow_executions(&self) -> ConsoleResult<Vec<WorkflowExecution>>;
    async fn webhooks(&self) -> ConsoleResult<Vec<Webhook>>;
    async fn approvals(&self) -> ConsoleResult<Vec<Approval>>;

    async fn locations(&self, active_only: bool) -> ConsoleResult<Vec<Location>>;
    async fn location_groups(&self) -> ConsoleResult<Vec<LocationGroup>>;
    async fn create_location_group(&self, draft: &LocationGroupDraft) -> ConsoleResult<LocationGroup>;
    async fn update_location_group(&self, id: i64, draft: &LocationGroupDraft) -> ConsoleResult<LocationGroup>;
    async fn delete_location_group(&self, id: i64) -> ConsoleResult<()>;

    async fn categories(&self) -> ConsoleResult<CategoryGroups>;
    async fn create_scrape_job(&self, request: &ScrapeJobRequest) -> ConsoleResult<ScrapeJobCreated>;
}

/// Pick the repository named by the config.
pub fn from_config(source: DataSource, api: &ApiConfig) -> ConsoleResult<Arc<dyn ConsoleRepository>> {
    Ok(match source {
        DataSource::Static => Arc::new(StaticRepository::new()),
        DataSource::Http => Arc::new(HttpRepository::new(api)?),
    })
}

/// In-memory fixtures. Location groups and job ids are kept for the
/// lifetime of the process.
pub struct StaticRepository {
    groups: Mutex<Vec<LocationGroup>>,
    next_job: AtomicU64,
}

impl StaticRepository {
    pub fn new() -> Self {
        Self {
            groups: Mutex::new(fixtures::location_groups()),
            next_job: AtomicU64::new(1),
        }
    }

    fn with_groups<T>(&self, f: impl FnOnce(&mut Vec<LocationGroup>) -> T) -> T {
        let mut groups = self.groups.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut groups)
    }
}

impl Default for StaticRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConsoleRepository for StaticRepository {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn leads(&self) -> ConsoleResult<Vec<Lead>> {
        Ok(fixtures::leads())
    }

    async fn lead_stats_summary(&self) -> ConsoleResult<LeadStatsSummary> {
        let leads = fixtures::leads();
        let refs: Vec<&Lead> = leads.iter().collect();
        Ok(summarize_leads(&refs))
    }

    async fn campaigns(&self) -> ConsoleResult<Vec<Campaign>> {
        Ok(fixtures::campaigns())
    }

    async fn model_performance(&self) -> ConsoleResult<Vec<ModelPerformance>> {
        Ok(fixtures::model_performance())
    }

    async fn model_configs(&self) -> ConsoleResult<Vec<ModelConfig>> {
        Ok(fixtures::model_configs())
    }

    async fn ab_tests(&self) -> ConsoleResult<Vec<AbTest>> {
        Ok(fixtures::ab_tests())
    }

    async fn workflows(&self) -> ConsoleResult<Vec<Workflow>> {
        Ok(fixtures::workflows())
    }

    async fn workflow_executions(&self) -> ConsoleResult<Vec<WorkflowExecution>> {
        Ok(fixtures::workflow_executions())
    }

    async fn webhooks(&self) -> ConsoleResult<Vec<Webhook>> {
        Ok(fixtures::webhooks())
    }

    async fn approvals(&self) -> ConsoleResult<Vec<Approval>> {
        Ok(fixtures::approvals())
    }

    async fn locations(&self, active_only: bool) -> ConsoleResult<Vec<Location>> {
        Ok(fixtures::locations()
            .into_iter()
            .filter(|l| !active_only || l.active)
            .collect())
    }

    async fn location_groups(&self) -> ConsoleResult<Vec<LocationGroup>> {
        Ok(self.with_groups(|groups| groups.clone()))
    }

    async fn create_location_group(&self, draft: &LocationGroupDraft) -> ConsoleResult<LocationGroup> {
        Ok(self.with_groups(|groups| {
            let id = groups.iter().map(|g| g.id).max().unwrap_or(0) + 1;
            let group = LocationGroup {
                id,
                name: draft.name.trim().to_string(),
                locations: draft.locations.clone(),
            };
            groups.push(group.clone());
            group
        }))
    }

    async fn update_location_group(&self, id: i64, draft: &LocationGroupDraft) -> ConsoleResult<LocationGroup> {
        self.with_groups(|groups| {
            let group = groups
                .iter_mut()
                .find(|g| g.id == id)
                .ok_or_else(|| ConsoleError::not_found("location group", id.to_string()))?;
            group.name = draft.name.trim().to_string();
            group.locations = draft.locations.clone();
            Ok(group.clone())
        })
    }

    async fn delete_location_group(&self, id: i64) -> ConsoleResult<()> {
        self.with_groups(|groups| {
            let before = groups.len();
            groups.retain(|g| g.id != id);
            if groups.len() == before {
                return Err(ConsoleError::not_found("location group", id.to_string()));
            }
            Ok(())
        })
    }

    async fn categories(&self) -> ConsoleResult<CategoryGroups> {
        Ok(categories::default_categories())
    }

    async fn create_scrape_job(&self, request: &ScrapeJobRequest) -> ConsoleResult<ScrapeJobCreated> {
        let n = self.next_job.fetch_add(1, Ordering::Relaxed);
        debug!(locations = request.location_ids.len(), priority = %request.priority, "Queued fixture scrape job");
        Ok(ScrapeJobCreated { job_id: format!("job-{n:05}") })
    }
}
