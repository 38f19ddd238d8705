//! Built-in dataset for the static repository and offline fallbacks.

use chrono::{DateTime, Utc};

use crate::models::*;

/// 2026-02-25T06:13:20Z; fixture timestamps count back from here.
const BASE_TS: i64 = 1_772_000_000;

fn hours_ago(hours: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(BASE_TS - hours * 3600, 0).unwrap_or_default()
}

fn opt(s: &str) -> Option<String> {
    Some(s.to_string())
}

pub fn leads() -> Vec<Lead> {
    use EnrichmentStatus as E;
    use LeadSource as S;
    use LeadStatus as L;

    let rows: [(S, L, E, &str, Option<&str>, &str, &str); 14] = [
        (S::Craigslist, L::New, E::Pending, "Acme Plumbing", Some("info@acmeplumbing.com"), "Austin", "TX"),
        (S::Craigslist, L::Contacted, E::Enriched, "Bayside Roofing", Some("hello@baysideroof.com"), "Houston", "TX"),
        (S::GoogleMaps, L::Converted, E::Enriched, "Cedar Movers", Some("office@cedarmovers.io"), "San Diego", "CA"),
        (S::GoogleMaps, L::Processed, E::Enriched, "Delta Landscaping", None, "Fresno", "CA"),
        (S::CustomUrl, L::Qualified, E::Enriched, "Elm Street Dental", Some("front@elmdental.com"), "Denver", "CO"),
        (S::Craigslist, L::Rejected, E::Failed, "Fastlane Auto Detail", None, "Dallas", "TX"),
        (S::GoogleMaps, L::New, E::Pending, "Greenway Cleaning", Some("book@greenwayclean.com"), "Orlando", "FL"),
        (S::Manual, L::Contacted, E::Skipped, "Harbor Insurance", Some("agent@harborins.com"), "Miami", "FL"),
        (S::CustomUrl, L::Processed, E::Enriched, "Ironclad Fitness", Some("team@ironcladfit.com"), "Brooklyn", "NY"),
        (S::GoogleMaps, L::Contacted, E::Enriched, "Juniper Bakery", None, "Albany", "NY"),
        (S::Craigslist, L::New, E::Pending, "Keystone Electric", Some("jobs@keystoneelectric.net"), "Phoenix", "AZ"),
        (S::GoogleMaps, L::Converted, E::Enriched, "Lumen Photography", Some("studio@lumenphoto.co"), "Seattle", "WA"),
        (S::Craigslist, L::Processed, E::Failed, "Maple Handyman", None, "Portland", "OR"),
        (S::CustomUrl, L::New, E::Pending, "Northstar Realty", Some("listings@northstar.com"), "Austin", "TX"),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (source, status, enrichment, name, email, city, state))| Lead {
            id: i as i64 + 1,
            source: *source,
            status: *status,
            enrichment_status: *enrichment,
            name: name.to_string(),
            email: email.map(str::to_string),
            phone: Some(format!("555-01{:02}", i + 10)),
            company: Some(name.to_string()),
            city: opt(city),
            state: opt(state),
            scraped_at: hours_ago(i as i64 * 7),
        })
        .collect()
}

pub fn campaigns() -> Vec<Campaign> {
    use CampaignStatus as C;

    let rows: [(&str, C, [u64; 5]); 6] = [
        ("Spring HVAC Outreach", C::Completed, [1200, 540, 132, 41, 18]),
        ("Roofers Q2 Follow-up", C::Sending, [640, 210, 44, 9, 12]),
        ("Dental Practices Intro", C::Scheduled, [0, 0, 0, 0, 0]),
        ("Realtor Re-engagement", C::Paused, [300, 96, 20, 6, 4]),
        ("Movers Cold Email", C::Draft, [0, 0, 0, 0, 0]),
        ("Fitness Studios Promo", C::Cancelled, [85, 20, 3, 0, 2]),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (name, status, [sent, opened, clicked, replied, bounced]))| Campaign {
            id: i as i64 + 1,
            name: name.to_string(),
            status: *status,
            sent: *sent,
            opened: *opened,
            clicked: *clicked,
            replied: *replied,
            bounced: *bounced,
            created_at: hours_ago(24 * (i as i64 + 1)),
        })
        .collect()
}

pub fn model_performance() -> Vec<ModelPerformance> {
    use TaskType as T;

    let rows: [(&str, T, f64, f64, f64, f64, u64); 7] = [
        ("gpt-4o", T::EmailGeneration, 9.2, 0.0125, 1840.0, 0.8, 4210),
        ("gpt-4o-mini", T::EmailGeneration, 8.1, 0.0009, 920.0, 1.4, 12890),
        ("claude-sonnet", T::LeadScoring, 9.5, 0.0090, 1610.0, 0.5, 3120),
        ("llama-3-70b", T::Classification, 7.0, 0.0007, 1210.0, 3.2, 8700),
        ("mistral-large", T::DataEnrichment, 8.8, 0.0040, 1390.0, 1.1, 2560),
        ("gpt-4o", T::Summarization, 8.6, 0.0110, 2050.0, 0.9, 1980),
        ("local-scorer-v2", T::LeadScoring, 6.4, 0.0001, 180.0, 4.5, 20410),
    ];

    rows.iter()
        .map(|(model, task, quality, cost, latency, errors, requests)| ModelPerformance {
            model_id: model.to_string(),
            task_type: *task,
            avg_quality_score: *quality,
            avg_cost_per_request: *cost,
            avg_response_time_ms: *latency,
            error_rate: *errors,
            total_requests: *requests,
        })
        .collect()
}

pub fn model_configs() -> Vec<ModelConfig> {
    [
        ("gpt-4o", "GPT-4o", "openai", true),
        ("gpt-4o-mini", "GPT-4o Mini", "openai", true),
        ("claude-sonnet", "Claude Sonnet", "anthropic", true),
        ("mistral-large", "Mistral Large", "mistral", false),
    ]
    .iter()
    .map(|(id, name, provider, enabled)| ModelConfig {
        model_id: id.to_string(),
        display_name: name.to_string(),
        provider: provider.to_string(),
        enabled: *enabled,
    })
    .collect()
}

pub fn ab_tests() -> Vec<AbTest> {
    vec![
        AbTest {
            id: 1,
            name: "Cold email tone".to_string(),
            models: vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()],
            task_type: TaskType::EmailGeneration,
            status: AbTestStatus::Running,
            results: vec![
                AbTestResult { model_id: "gpt-4o".to_string(), requests: 812, avg_quality_score: 9.1 },
                AbTestResult { model_id: "gpt-4o-mini".to_string(), requests: 798, avg_quality_score: 8.3 },
            ],
        },
        AbTest {
            id: 2,
            name: "Lead score calibration".to_string(),
            models: vec!["claude-sonnet".to_string(), "local-scorer-v2".to_string()],
            task_type: TaskType::LeadScoring,
            status: AbTestStatus::Completed,
            results: vec![
                AbTestResult { model_id: "claude-sonnet".to_string(), requests: 1500, avg_quality_score: 9.4 },
                AbTestResult { model_id: "local-scorer-v2".to_string(), requests: 1500, avg_quality_score: 6.9 },
            ],
        },
    ]
}

pub fn workflows() -> Vec<Workflow> {
    use TriggerType as T;
    use WorkflowStatus as W;

    [
        ("wf-lead-intake", "Lead intake", W::Active, T::Webhook, Some(1)),
        ("wf-nightly-enrich", "Nightly enrichment", W::Active, T::Schedule, Some(6)),
        ("wf-reply-router", "Reply router", W::Error, T::Event, Some(3)),
        ("wf-manual-export", "CRM export", W::Inactive, T::Manual, None),
    ]
    .iter()
    .map(|(id, name, status, trigger, last)| Workflow {
        id: id.to_string(),
        name: name.to_string(),
        status: *status,
        trigger_type: *trigger,
        last_run_at: last.map(hours_ago),
    })
    .collect()
}

pub fn workflow_executions() -> Vec<WorkflowExecution> {
    use ExecutionStatus as X;

    let rows: [(&str, X, i64, Option<u64>); 9] = [
        ("wf-lead-intake", X::Success, 1, Some(1_420)),
        ("wf-lead-intake", X::Success, 2, Some(1_180)),
        ("wf-lead-intake", X::Error, 3, Some(310)),
        ("wf-nightly-enrich", X::Success, 6, Some(96_400)),
        ("wf-nightly-enrich", X::Running, 0, None),
        ("wf-reply-router", X::Error, 3, Some(2_050)),
        ("wf-reply-router", X::Waiting, 1, None),
        ("wf-reply-router", X::Cancelled, 8, Some(40)),
        ("wf-lead-intake", X::Success, 9, Some(1_310)),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (workflow, status, hours, duration))| {
            let started_at = hours_ago(*hours);
            WorkflowExecution {
                id: format!("exec-{}", 1000 + i),
                workflow_id: workflow.to_string(),
                status: *status,
                started_at,
                finished_at: duration.map(|ms| started_at + chrono::Duration::milliseconds(ms as i64)),
                duration_ms: *duration,
            }
        })
        .collect()
}

pub fn webhooks() -> Vec<Webhook> {
    use WebhookStatus as H;

    let rows: [(&str, H, u32); 7] = [
        ("lead.created", H::Delivered, 1),
        ("lead.created", H::Delivered, 2),
        ("campaign.completed", H::Failed, 5),
        ("lead.enriched", H::Retrying, 3),
        ("approval.requested", H::Queued, 0),
        ("lead.created", H::Sending, 1),
        ("campaign.completed", H::Delivered, 1),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (event, status, attempts))| {
            let created_at = hours_ago(i as i64 * 2);
            let logs = (1..=*attempts)
                .map(|attempt| {
                    let last = attempt == *attempts;
                    let ok = last && *status == H::Delivered;
                    WebhookLog {
                        attempt,
                        status_code: if ok { Some(200) } else if *status == H::Sending && last { None } else { Some(502) },
                        message: if ok { "delivered".to_string() } else { "upstream error".to_string() },
                        logged_at: created_at + chrono::Duration::seconds(30 * attempt as i64),
                    }
                })
                .collect();
            Webhook {
                webhook_id: format!("wh-{:04}", i + 1),
                url: format!("https://hooks.n8n.example.com/webhook/{event}"),
                event_type: event.to_string(),
                status: *status,
                attempts: *attempts,
                max_attempts: 5,
                created_at,
                logs,
            }
        })
        .collect()
}

pub fn approvals() -> Vec<Approval> {
    use ApprovalStatus as A;
    use ApprovalType as K;
    use RiskLevel as R;

    let rows: [(K, &str, R, u8, A, i64); 7] = [
        (K::BulkEmail, "Send 5,000 cold emails to TX roofers", R::High, 74, A::Pending, 2),
        (K::DataExport, "Export full lead list to CSV", R::Critical, 91, A::Pending, 5),
        (K::CampaignSend, "Launch Dental Practices Intro", R::Medium, 48, A::Pending, 1),
        (K::BudgetIncrease, "Raise enrichment budget to $400/mo", R::Low, 22, A::Approved, 30),
        (K::WorkflowActivation, "Activate reply router v2", R::Critical, 88, A::Pending, 3),
        (K::BulkEmail, "Re-send bounced batch", R::High, 66, A::Rejected, 48),
        (K::CampaignSend, "Realtor re-engagement wave 2", R::Low, 15, A::Expired, 120),
    ];

    rows.iter()
        .enumerate()
        .map(|(i, (kind, title, risk, score, status, hours))| Approval {
            approval_id: format!("apr-{}", 100 + i),
            approval_type: *kind,
            title: title.to_string(),
            requested_by: if i % 2 == 0 { "ops@leadconsole.io" } else { "growth@leadconsole.io" }.to_string(),
            risk_level: *risk,
            risk_score: *score,
            status: *status,
            requested_at: hours_ago(*hours),
        })
        .collect()
}

/// Craigslist locations offered when the backend cannot be reached.
pub fn default_locations() -> Vec<Location> {
    [
        ("Austin", "austin", "TX"),
        ("Houston", "houston", "TX"),
        ("Dallas", "dallas", "TX"),
        ("San Diego", "sandiego", "CA"),
        ("Los Angeles", "losangeles", "CA"),
        ("Miami", "miami", "FL"),
        ("New York", "newyork", "NY"),
        ("Seattle", "seattle", "WA"),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, code, state))| Location {
        id: i as i64 + 1,
        name: name.to_string(),
        code: code.to_string(),
        state: state.to_string(),
        active: true,
    })
    .collect()
}

pub fn locations() -> Vec<Location> {
    let mut locations = default_locations();
    locations.push(Location {
        id: locations.len() as i64 + 1,
        name: "Fresno".to_string(),
        code: "fresno".to_string(),
        state: "CA".to_string(),
        active: false,
    });
    locations
}

pub fn location_groups() -> Vec<LocationGroup> {
    [
        ("Sun Belt", &["TX", "FL", "AZ"][..]),
        ("West Coast", &["CA", "OR", "WA"][..]),
        ("Northeast", &["NY", "MA"][..]),
    ]
    .iter()
    .enumerate()
    .map(|(i, (name, states))| LocationGroup {
        id: i as i64 + 1,
        name: name.to_string(),
        locations: states.iter().map(|s| s.to_string()).collect(),
    })
    .collect()
}
