//! Summary records for the dashboard cards.
//!
//! Rates are percentages kept at full precision; templates round them for
//! display. Every rate is 0 when its denominator is 0.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::aggregate::{count_by, mean, percentage, sum_by, Tally};
use crate::models::*;
use crate::rank::top_n_by;

// =====================
// Leads
// =====================

/// Compose the `/leads/stats/summary` payload from raw leads.
pub fn summarize_leads(leads: &[&Lead]) -> LeadStatsSummary {
    let total = leads.len() as u64;
    let processed = leads.iter().filter(|l| l.is_processed()).count() as u64;
    let contacted = leads.iter().filter(|l| l.is_contacted()).count() as u64;

    let mut status_breakdown = Tally::default();
    for (status, n) in count_by(leads, |l| Some(l.status)).into_entries() {
        status_breakdown.insert(status.to_string(), n);
    }

    let mut by_source = Tally::default();
    for (source, count) in count_by(leads, |l| Some(l.source)).into_entries() {
        let of_source: Vec<&&Lead> = leads.iter().filter(|l| l.source == source).collect();
        let responded = of_source.iter().filter(|l| l.is_contacted()).count();
        let converted = of_source
            .iter()
            .filter(|l| l.status == LeadStatus::Converted)
            .count();
        by_source.insert(
            source,
            SourceBreakdown {
                count,
                response_rate: Some(percentage(responded as f64, count as f64)),
                conversion_rate: Some(percentage(converted as f64, count as f64)),
            },
        );
    }

    LeadStatsSummary {
        total_leads: total,
        processed_leads: processed,
        contacted_leads: contacted,
        status_breakdown,
        processing_rate: percentage(processed as f64, total as f64),
        contact_rate: percentage(contacted as f64, total as f64),
        by_source: Some(by_source),
    }
}

/// Lead page breakdowns beyond the backend summary
#[derive(Debug, Clone, Serialize)]
pub struct LeadBreakdown {
    pub by_source: Tally<LeadSource, u64>,
    pub by_enrichment: Tally<EnrichmentStatus, u64>,
    pub enrichment_rate: f64,
    pub with_email: u64,
    pub email_rate: f64,
}

pub fn lead_breakdown(leads: &[&Lead]) -> LeadBreakdown {
    let total = leads.len() as f64;
    let by_enrichment = count_by(leads, |l| Some(l.enrichment_status));
    let enriched = by_enrichment.get(&EnrichmentStatus::Enriched).copied().unwrap_or(0);
    let with_email = leads.iter().filter(|l| l.email.is_some()).count() as u64;

    LeadBreakdown {
        by_source: count_by(leads, |l| Some(l.source)),
        by_enrichment,
        enrichment_rate: percentage(enriched as f64, total),
        with_email,
        email_rate: percentage(with_email as f64, total),
    }
}

// =====================
// Campaigns
// =====================

/// Delivery rates of a single campaign
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct CampaignRates {
    pub open_rate: f64,
    pub click_rate: f64,
    pub reply_rate: f64,
    pub bounce_rate: f64,
}

impl CampaignRates {
    fn from_counts(sent: u64, opened: u64, clicked: u64, replied: u64, bounced: u64) -> Self {
        let sent = sent as f64;
        Self {
            open_rate: percentage(opened as f64, sent),
            click_rate: percentage(clicked as f64, sent),
            reply_rate: percentage(replied as f64, sent),
            bounce_rate: percentage(bounced as f64, sent),
        }
    }

    pub fn of(campaign: &Campaign) -> Self {
        Self::from_counts(
            campaign.sent,
            campaign.opened,
            campaign.clicked,
            campaign.replied,
            campaign.bounced,
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignStats {
    pub total_campaigns: u64,
    pub by_status: Tally<CampaignStatus, u64>,
    pub total_sent: u64,
    pub total_opened: u64,
    pub total_clicked: u64,
    pub total_replied: u64,
    pub rates: CampaignRates,
}

pub fn campaign_stats(campaigns: &[&Campaign]) -> CampaignStats {
    let sent: u64 = campaigns.iter().map(|c| c.sent).sum();
    let opened: u64 = campaigns.iter().map(|c| c.opened).sum();
    let clicked: u64 = campaigns.iter().map(|c| c.clicked).sum();
    let replied: u64 = campaigns.iter().map(|c| c.replied).sum();
    let bounced: u64 = campaigns.iter().map(|c| c.bounced).sum();

    CampaignStats {
        total_campaigns: campaigns.len() as u64,
        by_status: count_by(campaigns, |c| Some(c.status)),
        total_sent: sent,
        total_opened: opened,
        total_clicked: clicked,
        total_replied: replied,
        rates: CampaignRates::from_counts(sent, opened, clicked, replied, bounced),
    }
}

// =====================
// Webhooks
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct WebhookStats {
    pub total: u64,
    pub delivered: u64,
    pub failed: u64,
    pub retrying: u64,
    pub in_flight: u64,
    pub success_rate: f64,
    pub avg_attempts: f64,
    pub by_status: Tally<WebhookStatus, u64>,
    pub by_event_type: Tally<String, u64>,
}

pub fn webhook_stats(webhooks: &[&Webhook]) -> WebhookStats {
    let by_status = count_by(webhooks, |w| Some(w.status));
    let of = |status: WebhookStatus| by_status.get(&status).copied().unwrap_or(0);
    let delivered = of(WebhookStatus::Delivered);
    let failed = of(WebhookStatus::Failed);
    let retrying = of(WebhookStatus::Retrying);
    let in_flight = of(WebhookStatus::Queued) + of(WebhookStatus::Sending);
    let total = webhooks.len() as u64;

    WebhookStats {
        total,
        delivered,
        failed,
        retrying,
        in_flight,
        success_rate: percentage(delivered as f64, total as f64),
        avg_attempts: mean(webhooks.iter().map(|w| w.attempts as f64)),
        by_event_type: count_by(webhooks, |w| Some(w.event_type.clone())),
        by_status,
    }
}

// =====================
// Approvals
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct ApprovalStats {
    pub total: u64,
    pub pending: u64,
    pub critical_pending: u64,
    pub by_risk: Tally<RiskLevel, u64>,
    pub by_type: Tally<ApprovalType, u64>,
    pub avg_risk_score: f64,
    /// Approved share of decided (approved + rejected) requests
    pub approval_rate: f64,
}

pub fn approval_stats(approvals: &[&Approval]) -> ApprovalStats {
    let by_status = count_by(approvals, |a| Some(a.status));
    let of = |status: ApprovalStatus| by_status.get(&status).copied().unwrap_or(0);
    let approved = of(ApprovalStatus::Approved);
    let decided = approved + of(ApprovalStatus::Rejected);

    ApprovalStats {
        total: approvals.len() as u64,
        pending: of(ApprovalStatus::Pending),
        critical_pending: approvals
            .iter()
            .filter(|a| a.status == ApprovalStatus::Pending && a.risk_level == RiskLevel::Critical)
            .count() as u64,
        by_risk: count_by(approvals, |a| Some(a.risk_level)),
        by_type: count_by(approvals, |a| Some(a.approval_type)),
        avg_risk_score: mean(approvals.iter().map(|a| a.risk_score as f64)),
        approval_rate: percentage(approved as f64, decided as f64),
    }
}

// =====================
// AI-GYM
// =====================

/// Performance row joined with its model config
#[derive(Debug, Clone, Serialize)]
pub struct RankedModel {
    pub model_id: String,
    pub display_name: String,
    pub provider: Option<String>,
    pub task_type: TaskType,
    pub avg_quality_score: f64,
    pub avg_cost_per_request: f64,
    pub avg_response_time_ms: f64,
    pub error_rate: f64,
    pub total_requests: u64,
}

/// Join performance rows onto configs by `model_id`. A row without a config
/// is shown under its raw id.
pub fn join_model_configs(performance: &[&ModelPerformance], configs: &[ModelConfig]) -> Vec<RankedModel> {
    let by_id: HashMap<&str, &ModelConfig> =
        configs.iter().map(|c| (c.model_id.as_str(), c)).collect();

    performance
        .iter()
        .map(|p| {
            let config = by_id.get(p.model_id.as_str());
            RankedModel {
                model_id: p.model_id.clone(),
                display_name: config
                    .map(|c| c.display_name.clone())
                    .unwrap_or_else(|| p.model_id.clone()),
                provider: config.map(|c| c.provider.clone()),
                task_type: p.task_type,
                avg_quality_score: p.avg_quality_score,
                avg_cost_per_request: p.avg_cost_per_request,
                avg_response_time_ms: p.avg_response_time_ms,
                error_rate: p.error_rate,
                total_requests: p.total_requests,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct AbTestSummary {
    pub id: i64,
    pub name: String,
    pub task_type: TaskType,
    pub status: AbTestStatus,
    pub total_requests: u64,
    pub leader: Option<String>,
}

impl From<&AbTest> for AbTestSummary {
    fn from(test: &AbTest) -> Self {
        Self {
            id: test.id,
            name: test.name.clone(),
            task_type: test.task_type,
            status: test.status,
            total_requests: test.total_requests(),
            leader: test.leader().map(|r| r.model_id.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AiGymStats {
    pub total_requests: u64,
    pub avg_quality_score: f64,
    pub avg_cost_per_request: f64,
    pub avg_response_time_ms: f64,
    pub total_cost: f64,
    pub requests_by_task: Tally<TaskType, u64>,
    pub top_models: Vec<RankedModel>,
    pub ab_tests: Vec<AbTestSummary>,
}

pub const TOP_MODELS: usize = 5;

pub fn ai_gym_stats(
    performance: &[&ModelPerformance],
    configs: &[ModelConfig],
    ab_tests: &[AbTest],
) -> AiGymStats {
    let joined = join_model_configs(performance, configs);

    AiGymStats {
        total_requests: performance.iter().map(|p| p.total_requests).sum(),
        avg_quality_score: mean(performance.iter().map(|p| p.avg_quality_score)),
        avg_cost_per_request: mean(performance.iter().map(|p| p.avg_cost_per_request)),
        avg_response_time_ms: mean(performance.iter().map(|p| p.avg_response_time_ms)),
        total_cost: performance
            .iter()
            .map(|p| p.avg_cost_per_request * p.total_requests as f64)
            .sum(),
        requests_by_task: sum_by(performance, |p| Some(p.task_type), |p| p.total_requests),
        top_models: top_n_by(&joined, TOP_MODELS, |m| m.avg_quality_score),
        ab_tests: ab_tests.iter().map(AbTestSummary::from).collect(),
    }
}

// =====================
// Workflows
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowStats {
    pub total_workflows: u64,
    pub active_workflows: u64,
    pub by_trigger: Tally<TriggerType, u64>,
    pub total_executions: u64,
    pub executions_by_status: Tally<ExecutionStatus, u64>,
    /// Successful share of finished (success + error) executions
    pub success_rate: f64,
    pub avg_duration_ms: f64,
}

pub fn workflow_stats(workflows: &[Workflow], executions: &[&WorkflowExecution]) -> WorkflowStats {
    let by_status = count_by(executions, |e| Some(e.status));
    let success = by_status.get(&ExecutionStatus::Success).copied().unwrap_or(0);
    let errors = by_status.get(&ExecutionStatus::Error).copied().unwrap_or(0);

    WorkflowStats {
        total_workflows: workflows.len() as u64,
        active_workflows: workflows
            .iter()
            .filter(|w| w.status == WorkflowStatus::Active)
            .count() as u64,
        by_trigger: count_by(workflows, |w| Some(w.trigger_type)),
        total_executions: executions.len() as u64,
        executions_by_status: by_status,
        success_rate: percentage(success as f64, (success + errors) as f64),
        avg_duration_ms: mean(executions.iter().filter_map(|e| e.duration_ms).map(|d| d as f64)),
    }
}

// =====================
// Locations
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct GroupCoverage {
    pub id: i64,
    pub name: String,
    pub location_count: usize,
    pub lead_count: u64,
    pub lead_share: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationStats {
    pub total_leads: u64,
    pub leads_by_state: Tally<String, u64>,
    pub groups: Vec<GroupCoverage>,
}

pub fn location_stats(leads: &[&Lead], groups: &[LocationGroup]) -> LocationStats {
    let total = leads.len() as u64;
    let leads_by_state = count_by(leads, |l| l.state.clone());

    let groups = groups
        .iter()
        .map(|g| {
            let mut seen = HashSet::new();
            let codes: Vec<&String> = g.locations.iter().filter(|code| seen.insert(*code)).collect();
            let lead_count = codes
                .iter()
                .filter_map(|code| leads_by_state.get(*code))
                .sum::<u64>();
            GroupCoverage {
                id: g.id,
                name: g.name.clone(),
                location_count: codes.len(),
                lead_count,
                lead_share: percentage(lead_count as f64, total as f64),
            }
        })
        .collect();

    LocationStats { total_leads: total, leads_by_state, groups }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn lead(id: i64, source: LeadSource, status: LeadStatus, state: &str) -> Lead {
        Lead {
            id,
            source,
            status,
            enrichment_status: EnrichmentStatus::Pending,
            name: format!("lead {id}"),
            email: None,
            phone: None,
            company: None,
            city: None,
            state: Some(state.to_string()),
            scraped_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn webhook(id: &str, status: WebhookStatus) -> Webhook {
        Webhook {
            webhook_id: id.to_string(),
            url: "https://hooks.example.com/in".to_string(),
            event_type: "lead.created".to_string(),
            status,
            attempts: 1,
            max_attempts: 5,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
            logs: vec![],
        }
    }

    fn perf(model: &str, quality: f64, requests: u64) -> ModelPerformance {
        ModelPerformance {
            model_id: model.to_string(),
            task_type: TaskType::LeadScoring,
            avg_quality_score: quality,
            avg_cost_per_request: 0.01,
            avg_response_time_ms: 800.0,
            error_rate: 0.5,
            total_requests: requests,
        }
    }

    fn by_source_order(summary: &LeadStatsSummary) -> Vec<LeadSource> {
        summary.by_source.as_ref().map(|t| t.keys().copied().collect()).unwrap_or_default()
    }

    #[test]
    fn lead_summary_rates_and_breakdowns() {
        let leads = vec![
            lead(1, LeadSource::Craigslist, LeadStatus::New, "TX"),
            lead(2, LeadSource::Craigslist, LeadStatus::Contacted, "TX"),
            lead(3, LeadSource::GoogleMaps, LeadStatus::Converted, "CA"),
            lead(4, LeadSource::GoogleMaps, LeadStatus::Processed, "CA"),
        ];
        let refs: Vec<&Lead> = leads.iter().collect();
        let summary = summarize_leads(&refs);

        assert_eq!(summary.total_leads, 4);
        assert_eq!(summary.processed_leads, 3);
        assert_eq!(summary.contacted_leads, 2);
        assert_eq!(summary.processing_rate, 75.0);
        assert_eq!(summary.contact_rate, 50.0);
        assert_eq!(summary.status_breakdown.values().sum::<u64>(), 4);
        assert_eq!(
            summary.status_breakdown.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["new", "contacted", "converted", "processed"]
        );
        assert_eq!(
            by_source_order(&summary),
            vec![LeadSource::Craigslist, LeadSource::GoogleMaps]
        );

        let by_source = summary.by_source.unwrap();
        let maps = by_source.get(&LeadSource::GoogleMaps).unwrap();
        assert_eq!(maps.count, 2);
        assert_eq!(maps.conversion_rate, Some(50.0));
    }

    #[test]
    fn empty_leads_have_zero_rates() {
        let summary = summarize_leads(&[]);
        assert_eq!(summary.total_leads, 0);
        assert_eq!(summary.processing_rate, 0.0);
        assert_eq!(summary.contact_rate, 0.0);
        assert!(summary.status_breakdown.is_empty());
    }

    #[test]
    fn webhook_stats_with_no_webhooks() {
        let stats = webhook_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.success_rate, 0.0);
        assert!(!stats.success_rate.is_nan());
        assert_eq!(stats.avg_attempts, 0.0);
    }

    #[test]
    fn webhook_stats_count_statuses() {
        let hooks = vec![
            webhook("a", WebhookStatus::Delivered),
            webhook("b", WebhookStatus::Failed),
            webhook("c", WebhookStatus::Delivered),
            webhook("d", WebhookStatus::Queued),
        ];
        let refs: Vec<&Webhook> = hooks.iter().collect();
        let stats = webhook_stats(&refs);
        assert_eq!(stats.delivered, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.in_flight, 1);
        assert_eq!(stats.success_rate, 50.0);
        assert_eq!(stats.by_event_type.get(&"lead.created".to_string()), Some(&4));
    }

    #[test]
    fn rates_stay_within_bounds() {
        let campaign = Campaign {
            id: 1,
            name: "odd".into(),
            status: CampaignStatus::Completed,
            sent: 10,
            opened: 25,
            clicked: 3,
            replied: 0,
            bounced: 0,
            created_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let rates = CampaignRates::of(&campaign);
        for rate in [rates.open_rate, rates.click_rate, rates.reply_rate, rates.bounce_rate] {
            assert!((0.0..=100.0).contains(&rate));
        }
        assert_eq!(rates.open_rate, 100.0);
        assert_eq!(rates.click_rate, 30.0);
    }

    #[test]
    fn top_models_join_configs_and_rank_by_quality() {
        let rows = vec![
            perf("m-a", 9.2, 10),
            perf("m-b", 8.1, 10),
            perf("m-c", 9.5, 10),
            perf("m-d", 7.0, 10),
            perf("m-e", 8.8, 10),
        ];
        let refs: Vec<&ModelPerformance> = rows.iter().collect();
        let configs = vec![ModelConfig {
            model_id: "m-c".into(),
            display_name: "Model C".into(),
            provider: "acme".into(),
            enabled: true,
        }];
        let stats = ai_gym_stats(&refs, &configs, &[]);

        let scores: Vec<f64> = stats.top_models.iter().map(|m| m.avg_quality_score).collect();
        assert_eq!(scores, vec![9.5, 9.2, 8.8, 8.1, 7.0]);
        assert_eq!(stats.top_models[0].display_name, "Model C");
        assert_eq!(stats.top_models[1].display_name, "m-a");
        assert_eq!(stats.total_requests, 50);
        assert_eq!(stats.requests_by_task.get(&TaskType::LeadScoring), Some(&50));
    }

    #[test]
    fn approval_rate_ignores_undecided() {
        let base = Approval {
            approval_id: "a".into(),
            approval_type: ApprovalType::DataExport,
            title: "export".into(),
            requested_by: "ops".into(),
            risk_level: RiskLevel::Critical,
            risk_score: 90,
            status: ApprovalStatus::Pending,
            requested_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        };
        let approved = Approval { status: ApprovalStatus::Approved, ..base.clone() };
        let approvals = [&base, &approved];
        let stats = approval_stats(&approvals);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.critical_pending, 1);
        assert_eq!(stats.approval_rate, 100.0);
        assert_eq!(stats.avg_risk_score, 90.0);
    }

    #[test]
    fn location_groups_cover_leads_by_state() {
        let leads = vec![
            lead(1, LeadSource::Craigslist, LeadStatus::New, "TX"),
            lead(2, LeadSource::Craigslist, LeadStatus::New, "CA"),
            lead(3, LeadSource::Craigslist, LeadStatus::New, "TX"),
            lead(4, LeadSource::Craigslist, LeadStatus::New, "NY"),
        ];
        let refs: Vec<&Lead> = leads.iter().collect();
        let groups = vec![LocationGroup {
            id: 1,
            name: "South".into(),
            locations: vec!["TX".into(), "FL".into()],
        }];
        let stats = location_stats(&refs, &groups);
        assert_eq!(stats.groups[0].lead_count, 2);
        assert_eq!(stats.groups[0].lead_share, 50.0);
        assert_eq!(stats.leads_by_state.keys().cloned().collect::<Vec<_>>(), vec!["TX", "CA", "NY"]);
    }

    #[test]
    fn repeated_group_codes_count_once() {
        let leads = vec![
            lead(1, LeadSource::Manual, LeadStatus::New, "TX"),
            lead(2, LeadSource::Manual, LeadStatus::New, "TX"),
            lead(3, LeadSource::Manual, LeadStatus::New, "CA"),
        ];
        let refs: Vec<&Lead> = leads.iter().collect();
        let groups = vec![LocationGroup {
            id: 7,
            name: "Texas twice".into(),
            locations: vec!["TX".into(), "TX".into()],
        }];
        let stats = location_stats(&refs, &groups);
        assert_eq!(stats.groups[0].location_count, 1);
        assert_eq!(stats.groups[0].lead_count, 2);
        assert!((stats.groups[0].lead_share - 200.0 / 3.0).abs() < 1e-9);
    }
}
