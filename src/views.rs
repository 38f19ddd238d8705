//! Page view-models: fetch, filter, aggregate, rank.
//!
//! Each builder is recomputed from the source collections on every request.
//! A failed fetch degrades to an empty collection plus a notice.

use rocket::FromForm;
use serde::Serialize;
use tracing::warn;

use crate::categories::default_categories;
use crate::error::{ConsoleError, ConsoleResult};
use crate::filter::{filter_by, search, Selection};
use crate::fixtures::default_locations;
use crate::models::*;
use crate::rank::{sort_approvals, top_n_by};
use crate::state::ConsoleState;
use crate::stats::*;

/// Unwrap a fetch result, logging and noting a failure instead of propagating it.
fn degrade<T: Default>(what: &str, result: ConsoleResult<T>, notices: &mut Vec<String>) -> T {
    result.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load {what}");
        notices.push(format!("Could not load {what}. Showing what is available."));
        T::default()
    })
}

fn options<T: std::fmt::Display>(all: &[T]) -> Vec<String> {
    all.iter().map(|v| v.to_string()).collect()
}

fn owned<R: Clone>(refs: &[&R]) -> Vec<R> {
    refs.iter().map(|r| (*r).clone()).collect()
}

// =====================
// Dashboard
// =====================

pub const DASHBOARD_PENDING: usize = 5;

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub lead_stats: LeadStatsSummary,
    pub campaigns: CampaignStats,
    pub webhooks: WebhookStats,
    pub approvals: ApprovalStats,
    pub workflows: WorkflowStats,
    pub top_models: Vec<RankedModel>,
    pub urgent_approvals: Vec<Approval>,
    pub notices: Vec<String>,
}

pub async fn dashboard(state: &ConsoleState) -> DashboardView {
    let repo = &state.repo;
    let (lead_stats, campaigns, webhooks, approvals, workflows, executions, performance, configs) = tokio::join!(
        state.lead_stats(),
        repo.campaigns(),
        state.webhooks(),
        state.approvals(),
        repo.workflows(),
        state.executions(),
        state.model_performance(),
        repo.model_configs(),
    );

    let mut notices = Vec::new();
    let lead_stats = degrade("lead stats", lead_stats, &mut notices);
    let campaigns = degrade("campaigns", campaigns, &mut notices);
    let webhooks = degrade("webhooks", webhooks, &mut notices);
    let approvals = degrade("approvals", approvals, &mut notices);
    let workflows = degrade("workflows", workflows, &mut notices);
    let executions = degrade("workflow executions", executions, &mut notices);
    let performance = degrade("model performance", performance, &mut notices);
    let configs = degrade("model configs", configs, &mut notices);

    let pending: Vec<Approval> = approvals
        .iter()
        .filter(|a| a.status == ApprovalStatus::Pending)
        .cloned()
        .collect();
    let mut urgent_approvals = sort_approvals(&pending);
    urgent_approvals.truncate(DASHBOARD_PENDING);

    let perf_refs: Vec<&ModelPerformance> = performance.iter().collect();
    let joined = join_model_configs(&perf_refs, &configs);

    DashboardView {
        lead_stats,
        campaigns: campaign_stats(&campaigns.iter().collect::<Vec<_>>()),
        webhooks: webhook_stats(&webhooks.iter().collect::<Vec<_>>()),
        approvals: approval_stats(&approvals.iter().collect::<Vec<_>>()),
        workflows: workflow_stats(&workflows, &executions.iter().collect::<Vec<_>>()),
        top_models: top_n_by(&joined, TOP_MODELS, |m| m.avg_quality_score),
        urgent_approvals,
        notices,
    }
}

// =====================
// Leads
// =====================

#[derive(Debug, Default, FromForm)]
pub struct LeadFilters {
    pub source: Option<String>,
    pub status: Option<String>,
    pub enrichment: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeadsView {
    pub source: Selection<LeadSource>,
    pub status: Selection<LeadStatus>,
    pub enrichment: Selection<EnrichmentStatus>,
    pub q: String,
    pub source_options: Vec<String>,
    pub status_options: Vec<String>,
    pub enrichment_options: Vec<String>,
    pub total_unfiltered: usize,
    pub leads: Vec<Lead>,
    pub summary: LeadStatsSummary,
    pub breakdown: LeadBreakdown,
    pub notices: Vec<String>,
}

pub async fn leads(state: &ConsoleState, filters: &LeadFilters) -> LeadsView {
    let mut notices = Vec::new();
    let all = degrade("leads", state.repo.leads().await, &mut notices);

    let source = Selection::parse(filters.source.as_deref());
    let status = Selection::parse(filters.status.as_deref());
    let enrichment = Selection::parse(filters.enrichment.as_deref());

    let by_source = filter_by(&all, &source, |l| l.source);
    let by_status: Vec<&Lead> = by_source.into_iter().filter(|l| status.matches(&l.status)).collect();
    let by_enrichment: Vec<&Lead> = by_status
        .into_iter()
        .filter(|l| enrichment.matches(&l.enrichment_status))
        .collect();
    let shown = search(by_enrichment, filters.q.as_deref(), |l| {
        let mut fields = vec![l.name.as_str()];
        fields.extend(l.email.as_deref());
        fields.extend(l.company.as_deref());
        fields.extend(l.city.as_deref());
        fields
    });

    LeadsView {
        source,
        status,
        enrichment,
        q: filters.q.clone().unwrap_or_default(),
        source_options: options(LeadSource::ALL),
        status_options: options(LeadStatus::ALL),
        enrichment_options: options(EnrichmentStatus::ALL),
        total_unfiltered: all.len(),
        summary: summarize_leads(&shown),
        breakdown: lead_breakdown(&shown),
        leads: owned(&shown),
        notices,
    }
}

// =====================
// Campaigns
// =====================

#[derive(Debug, Serialize)]
pub struct CampaignRow {
    pub campaign: Campaign,
    pub rates: CampaignRates,
}

impl From<&Campaign> for CampaignRow {
    fn from(campaign: &Campaign) -> Self {
        Self { rates: CampaignRates::of(campaign), campaign: campaign.clone() }
    }
}

#[derive(Debug, Serialize)]
pub struct CampaignsView {
    pub status: Selection<CampaignStatus>,
    pub status_options: Vec<String>,
    pub rows: Vec<CampaignRow>,
    pub stats: CampaignStats,
    pub notices: Vec<String>,
}

pub async fn campaigns(state: &ConsoleState, status: Option<&str>) -> CampaignsView {
    let mut notices = Vec::new();
    let all = degrade("campaigns", state.repo.campaigns().await, &mut notices);
    let status = Selection::parse(status);
    let shown = filter_by(&all, &status, |c| c.status);

    CampaignsView {
        status,
        status_options: options(CampaignStatus::ALL),
        rows: shown.iter().map(|c| CampaignRow::from(*c)).collect(),
        stats: campaign_stats(&shown),
        notices,
    }
}

pub async fn campaign_detail(state: &ConsoleState, id: i64) -> ConsoleResult<CampaignRow> {
    state
        .repo
        .campaigns()
        .await?
        .iter()
        .find(|c| c.id == id)
        .map(CampaignRow::from)
        .ok_or_else(|| ConsoleError::not_found("campaign", id.to_string()))
}

// =====================
// AI-GYM
// =====================

#[derive(Debug, Serialize)]
pub struct AiGymView {
    pub task: Selection<TaskType>,
    pub task_options: Vec<String>,
    pub stats: AiGymStats,
    /// Every filtered model, best quality first
    pub models: Vec<RankedModel>,
    pub notices: Vec<String>,
}

pub async fn ai_gym(state: &ConsoleState, task: Option<&str>) -> AiGymView {
    let (performance, configs, ab_tests) = tokio::join!(
        state.model_performance(),
        state.repo.model_configs(),
        state.repo.ab_tests(),
    );
    let mut notices = Vec::new();
    let performance = degrade("model performance", performance, &mut notices);
    let configs = degrade("model configs", configs, &mut notices);
    let ab_tests = degrade("A/B tests", ab_tests, &mut notices);

    let task = Selection::parse(task);
    let shown = filter_by(&performance, &task, |p| p.task_type);
    let tests: Vec<AbTest> = ab_tests.into_iter().filter(|t| task.matches(&t.task_type)).collect();
    let joined = join_model_configs(&shown, &configs);

    AiGymView {
        task_options: options(TaskType::ALL),
        stats: ai_gym_stats(&shown, &configs, &tests),
        models: top_n_by(&joined, joined.len(), |m| m.avg_quality_score),
        task,
        notices,
    }
}

// =====================
// Workflows
// =====================

#[derive(Debug, Default, FromForm)]
pub struct WorkflowFilters {
    pub status: Option<String>,
    pub trigger: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecutionRow {
    pub execution: WorkflowExecution,
    pub workflow_name: String,
    pub badge: &'static str,
}

#[derive(Debug, Serialize)]
pub struct WorkflowsView {
    pub status: Selection<ExecutionStatus>,
    pub trigger: Selection<TriggerType>,
    pub status_options: Vec<String>,
    pub trigger_options: Vec<String>,
    pub workflows: Vec<Workflow>,
    pub executions: Vec<ExecutionRow>,
    pub stats: WorkflowStats,
    pub notices: Vec<String>,
}

fn execution_rows(executions: &[&WorkflowExecution], workflows: &[Workflow]) -> Vec<ExecutionRow> {
    let mut rows: Vec<ExecutionRow> = executions
        .iter()
        .map(|e| ExecutionRow {
            workflow_name: workflows
                .iter()
                .find(|w| w.id == e.workflow_id)
                .map(|w| w.name.clone())
                .unwrap_or_else(|| e.workflow_id.clone()),
            badge: e.status.badge(),
            execution: (*e).clone(),
        })
        .collect();
    rows.sort_by(|a, b| b.execution.started_at.cmp(&a.execution.started_at));
    rows
}

pub async fn workflows(state: &ConsoleState, filters: &WorkflowFilters) -> WorkflowsView {
    let (workflows, executions) = tokio::join!(state.repo.workflows(), state.executions());
    let mut notices = Vec::new();
    let workflows = degrade("workflows", workflows, &mut notices);
    let executions = degrade("workflow executions", executions, &mut notices);

    let status = Selection::parse(filters.status.as_deref());
    let trigger = Selection::parse(filters.trigger.as_deref());

    let shown_workflows: Vec<Workflow> = filter_by(&workflows, &trigger, |w| w.trigger_type)
        .into_iter()
        .cloned()
        .collect();
    let shown_executions: Vec<&WorkflowExecution> = filter_by(&executions, &status, |e| e.status)
        .into_iter()
        .filter(|e| shown_workflows.iter().any(|w| w.id == e.workflow_id))
        .collect();

    WorkflowsView {
        status,
        trigger,
        status_options: options(ExecutionStatus::ALL),
        trigger_options: options(TriggerType::ALL),
        stats: workflow_stats(&shown_workflows, &shown_executions),
        executions: execution_rows(&shown_executions, &shown_workflows),
        workflows: shown_workflows,
        notices,
    }
}

#[derive(Debug, Serialize)]
pub struct WorkflowDetail {
    pub workflow: Workflow,
    pub executions: Vec<ExecutionRow>,
    pub stats: WorkflowStats,
}

pub async fn workflow_detail(state: &ConsoleState, id: &str) -> ConsoleResult<WorkflowDetail> {
    let workflows = state.repo.workflows().await?;
    let workflow = workflows
        .iter()
        .find(|w| w.id == id)
        .cloned()
        .ok_or_else(|| ConsoleError::not_found("workflow", id))?;

    let executions = state.executions().await?;
    let mine: Vec<&WorkflowExecution> = executions.iter().filter(|e| e.workflow_id == id).collect();
    let single = std::slice::from_ref(&workflow);

    Ok(WorkflowDetail {
        stats: workflow_stats(single, &mine),
        executions: execution_rows(&mine, single),
        workflow,
    })
}

// =====================
// Webhooks
// =====================

#[derive(Debug, Default, FromForm)]
pub struct WebhookFilters {
    pub status: Option<String>,
    pub event: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WebhooksView {
    pub status: Selection<WebhookStatus>,
    pub event: Selection<String>,
    pub status_options: Vec<String>,
    pub event_options: Vec<String>,
    pub webhooks: Vec<Webhook>,
    pub stats: WebhookStats,
    pub notices: Vec<String>,
}

pub async fn webhooks(state: &ConsoleState, filters: &WebhookFilters) -> WebhooksView {
    let mut notices = Vec::new();
    let all = degrade("webhooks", state.webhooks().await, &mut notices);

    let status = Selection::parse(filters.status.as_deref());
    let event = Selection::parse(filters.event.as_deref());

    // Event options come from the unfiltered set so the dropdown stays stable.
    let all_refs: Vec<&Webhook> = all.iter().collect();
    let event_options = webhook_stats(&all_refs).by_event_type.keys().cloned().collect();

    let shown: Vec<&Webhook> = filter_by(&all, &status, |w| w.status)
        .into_iter()
        .filter(|w| event.matches(&w.event_type))
        .collect();

    WebhooksView {
        status,
        event,
        status_options: options(WebhookStatus::ALL),
        event_options,
        stats: webhook_stats(&shown),
        webhooks: owned(&shown),
        notices,
    }
}

// =====================
// Approvals
// =====================

#[derive(Debug, Default, FromForm)]
pub struct ApprovalFilters {
    pub risk: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApprovalsView {
    pub risk: Selection<RiskLevel>,
    pub status: Selection<ApprovalStatus>,
    pub risk_options: Vec<String>,
    pub status_options: Vec<String>,
    pub approvals: Vec<Approval>,
    pub stats: ApprovalStats,
    pub notices: Vec<String>,
}

pub async fn approvals(state: &ConsoleState, filters: &ApprovalFilters) -> ApprovalsView {
    let mut notices = Vec::new();
    let all = degrade("approvals", state.approvals().await, &mut notices);

    let risk = Selection::parse(filters.risk.as_deref());
    let status = Selection::parse(filters.status.as_deref());
    let shown: Vec<&Approval> = filter_by(&all, &risk, |a| a.risk_level)
        .into_iter()
        .filter(|a| status.matches(&a.status))
        .collect();

    ApprovalsView {
        risk,
        status,
        risk_options: options(RiskLevel::ALL),
        status_options: options(ApprovalStatus::ALL),
        stats: approval_stats(&shown),
        approvals: sort_approvals(&owned(&shown)),
        notices,
    }
}

pub async fn approval_detail(state: &ConsoleState, id: &str) -> ConsoleResult<Approval> {
    state
        .approvals()
        .await?
        .into_iter()
        .find(|a| a.approval_id == id)
        .ok_or_else(|| ConsoleError::not_found("approval", id))
}

// =====================
// Locations
// =====================

#[derive(Debug, Serialize)]
pub struct LocationsView {
    pub groups: Vec<LocationGroup>,
    pub locations: Vec<Location>,
    pub stats: LocationStats,
    pub notices: Vec<String>,
}

pub async fn locations(state: &ConsoleState) -> LocationsView {
    let (groups, locations, leads) = tokio::join!(
        state.repo.location_groups(),
        state.repo.locations(false),
        state.repo.leads(),
    );
    let mut notices = Vec::new();
    let groups = degrade("location groups", groups, &mut notices);
    let locations = or_defaults(state, "locations", locations, default_locations, &mut notices);
    let leads = degrade("leads", leads, &mut notices);

    let lead_refs: Vec<&Lead> = leads.iter().collect();
    LocationsView {
        stats: location_stats(&lead_refs, &groups),
        groups,
        locations,
        notices,
    }
}

// =====================
// Scraper
// =====================

#[derive(Debug, Serialize)]
pub struct ScraperView {
    pub categories: CategoryGroups,
    pub locations: Vec<Location>,
    pub priorities: Vec<String>,
    pub notices: Vec<String>,
}

/// Like `degrade`, but serves built-in defaults when fallbacks are enabled.
fn or_defaults<T: Default>(
    state: &ConsoleState,
    what: &str,
    result: ConsoleResult<T>,
    defaults: fn() -> T,
    notices: &mut Vec<String>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) if state.fallback_defaults => {
            warn!(error = %e, "Failed to load {what}, using defaults");
            notices.push(format!("Using default {what}."));
            defaults()
        }
        Err(e) => degrade(what, Err(e), notices),
    }
}

pub async fn categories(state: &ConsoleState, notices: &mut Vec<String>) -> CategoryGroups {
    let result = state.repo.categories().await;
    or_defaults(state, "categories", result, default_categories, notices)
}

pub async fn scraper(state: &ConsoleState) -> ScraperView {
    let (categories, locations) = tokio::join!(state.repo.categories(), state.repo.locations(true));
    let mut notices = Vec::new();
    let categories = or_defaults(state, "categories", categories, default_categories, &mut notices);
    let locations = or_defaults(state, "locations", locations, default_locations, &mut notices);

    ScraperView {
        categories,
        locations,
        priorities: options(JobPriority::ALL),
        notices,
    }
}
