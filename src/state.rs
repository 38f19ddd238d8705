use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{ConsoleConfig, PollingConfig};
use crate::error::ConsoleResult;
use crate::models::*;
use crate::poller::Poller;
use crate::repository::{self, ConsoleRepository};

/// Background pollers for the near-real-time views
pub struct LiveFeeds {
    pub lead_stats: Poller<(), LeadStatsSummary>,
    pub webhooks: Poller<(), Vec<Webhook>>,
    pub approvals: Poller<(), Vec<Approval>>,
    pub executions: Poller<(), Vec<WorkflowExecution>>,
    pub model_performance: Poller<(), Vec<ModelPerformance>>,
}

macro_rules! feed {
    ($repo:expr, $name:literal, $secs:expr, $method:ident) => {{
        let repo = Arc::clone(&$repo);
        Poller::new($name, Duration::from_secs($secs), (), move |()| {
            let repo = Arc::clone(&repo);
            async move { repo.$method().await }
        })
    }};
}

impl LiveFeeds {
    pub fn new(repo: &Arc<dyn ConsoleRepository>, polling: &PollingConfig) -> Self {
        Self {
            lead_stats: feed!(repo, "lead_stats", polling.lead_stats_secs, lead_stats_summary),
            webhooks: feed!(repo, "webhooks", polling.webhooks_secs, webhooks),
            approvals: feed!(repo, "approvals", polling.approvals_secs, approvals),
            executions: feed!(repo, "executions", polling.executions_secs, workflow_executions),
            model_performance: feed!(repo, "model_performance", polling.ai_gym_secs, model_performance),
        }
    }

    pub fn start_all(&self) {
        self.lead_stats.start();
        self.webhooks.start();
        self.approvals.start();
        self.executions.start();
        self.model_performance.start();
    }

    pub async fn stop_all(&self) {
        tokio::join!(
            self.lead_stats.stop(),
            self.webhooks.stop(),
            self.approvals.stop(),
            self.executions.stop(),
            self.model_performance.stop(),
        );
        info!("Live feeds stopped");
    }

    /// Force an immediate poll of one feed by name. `None` for an unknown
    /// feed, `Some(false)` when a poll was already in flight.
    pub fn refresh(&self, feed: &str) -> Option<bool> {
        Some(match feed {
            "lead_stats" => self.lead_stats.refresh(),
            "webhooks" => self.webhooks.refresh(),
            "approvals" => self.approvals.refresh(),
            "executions" => self.executions.refresh(),
            "model_performance" => self.model_performance.refresh(),
            _ => return None,
        })
    }
}

/// Rocket-managed state
pub struct ConsoleState {
    pub repo: Arc<dyn ConsoleRepository>,
    pub feeds: LiveFeeds,
    pub fallback_defaults: bool,
    /// How long a read waits for a feed's first poll
    pub feed_wait: Duration,
}

impl ConsoleState {
    pub fn new(repo: Arc<dyn ConsoleRepository>, config: &ConsoleConfig) -> Self {
        let feeds = LiveFeeds::new(&repo, &config.polling);
        Self {
            repo,
            feeds,
            fallback_defaults: config.api.fallback_defaults,
            feed_wait: config.api.timeout() + Duration::from_secs(1),
        }
    }

    pub fn from_config(config: &ConsoleConfig) -> ConsoleResult<Self> {
        let repo = repository::from_config(config.data.source, &config.api)?;
        info!(source = repo.name(), base_url = %config.api.base_url, "Data source selected");
        Ok(Self::new(repo, config))
    }

    /// Latest polled value. Before the first poll this waits on the feed's
    /// own fetch rather than calling the repository again.
    pub async fn webhooks(&self) -> ConsoleResult<Vec<Webhook>> {
        Ok(self.feeds.webhooks.current(self.feed_wait).await?.value)
    }

    pub async fn approvals(&self) -> ConsoleResult<Vec<Approval>> {
        Ok(self.feeds.approvals.current(self.feed_wait).await?.value)
    }

    pub async fn executions(&self) -> ConsoleResult<Vec<WorkflowExecution>> {
        Ok(self.feeds.executions.current(self.feed_wait).await?.value)
    }

    pub async fn lead_stats(&self) -> ConsoleResult<LeadStatsSummary> {
        Ok(self.feeds.lead_stats.current(self.feed_wait).await?.value)
    }

    pub async fn model_performance(&self) -> ConsoleResult<Vec<ModelPerformance>> {
        Ok(self.feeds.model_performance.current(self.feed_wait).await?.value)
    }
}
