use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aggregate::Tally;

/// Declares a closed, snake_case wire enum with `as_str`, `ALL`,
/// `Display` and `FromStr`.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(format!("unknown {}: {}", stringify!($name), other)),
                }
            }
        }
    };
}

// =====================
// Leads
// =====================

wire_enum!(
    /// Where a lead was scraped from
    LeadSource {
        Craigslist => "craigslist",
        GoogleMaps => "google_maps",
        CustomUrl => "custom_url",
        Manual => "manual",
    }
);

wire_enum!(
    /// Lead pipeline status
    LeadStatus {
        New => "new",
        Processed => "processed",
        Contacted => "contacted",
        Qualified => "qualified",
        Converted => "converted",
        Rejected => "rejected",
    }
);

wire_enum!(
    EnrichmentStatus {
        Pending => "pending",
        Enriched => "enriched",
        Failed => "failed",
        Skipped => "skipped",
    }
);

/// Scraped lead record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub id: i64,
    pub source: LeadSource,
    pub status: LeadStatus,
    pub enrichment_status: EnrichmentStatus,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub scraped_at: DateTime<Utc>,
}

impl Lead {
    /// Leads past the `new` stage have been processed.
    pub fn is_processed(&self) -> bool {
        self.status != LeadStatus::New
    }

    pub fn is_contacted(&self) -> bool {
        matches!(
            self.status,
            LeadStatus::Contacted | LeadStatus::Qualified | LeadStatus::Converted
        )
    }
}

/// Per-source breakdown returned by the backend summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceBreakdown {
    pub count: u64,
    pub response_rate: Option<f64>,
    pub conversion_rate: Option<f64>,
}

/// `GET /leads/stats/summary`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LeadStatsSummary {
    pub total_leads: u64,
    pub processed_leads: u64,
    pub contacted_leads: u64,
    pub status_breakdown: Tally<String, u64>,
    pub processing_rate: f64,
    pub contact_rate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by_source: Option<Tally<LeadSource, SourceBreakdown>>,
}

// =====================
// Campaigns
// =====================

wire_enum!(
    CampaignStatus {
        Draft => "draft",
        Scheduled => "scheduled",
        Sending => "sending",
        Completed => "completed",
        Paused => "paused",
        Cancelled => "cancelled",
    }
);

/// Email campaign with delivery metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    pub status: CampaignStatus,
    pub sent: u64,
    pub opened: u64,
    pub clicked: u64,
    pub replied: u64,
    pub bounced: u64,
    pub created_at: DateTime<Utc>,
}

// =====================
// AI-GYM
// =====================

wire_enum!(
    TaskType {
        LeadScoring => "lead_scoring",
        EmailGeneration => "email_generation",
        DataEnrichment => "data_enrichment",
        Classification => "classification",
        Summarization => "summarization",
    }
);

/// Aggregated performance of one model on one task type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub model_id: String,
    pub task_type: TaskType,
    pub avg_quality_score: f64,
    pub avg_cost_per_request: f64,
    pub avg_response_time_ms: f64,
    pub error_rate: f64,
    pub total_requests: u64,
}

/// Model configuration, joined onto performance rows by `model_id`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub model_id: String,
    pub display_name: String,
    pub provider: String,
    pub enabled: bool,
}

wire_enum!(
    AbTestStatus {
        Running => "running",
        Completed => "completed",
        Stopped => "stopped",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbTestResult {
    pub model_id: String,
    pub requests: u64,
    pub avg_quality_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbTest {
    pub id: i64,
    pub name: String,
    pub models: Vec<String>,
    pub task_type: TaskType,
    pub status: AbTestStatus,
    pub results: Vec<AbTestResult>,
}

impl AbTest {
    pub fn total_requests(&self) -> u64 {
        self.results.iter().map(|r| r.requests).sum()
    }

    /// Result with the best quality score; earliest wins ties.
    pub fn leader(&self) -> Option<&AbTestResult> {
        self.results.iter().fold(None, |best: Option<&AbTestResult>, r| match best {
            Some(b) if b.avg_quality_score >= r.avg_quality_score => Some(b),
            _ => Some(r),
        })
    }
}

// =====================
// Workflows
// =====================

wire_enum!(
    WorkflowStatus {
        Active => "active",
        Inactive => "inactive",
        Error => "error",
    }
);

wire_enum!(
    TriggerType {
        Webhook => "webhook",
        Schedule => "schedule",
        Manual => "manual",
        Event => "event",
    }
);

wire_enum!(
    ExecutionStatus {
        Running => "running",
        Success => "success",
        Error => "error",
        Waiting => "waiting",
        Cancelled => "cancelled",
    }
);

impl ExecutionStatus {
    /// Badge color used by the templates
    pub fn badge(&self) -> &'static str {
        match self {
            ExecutionStatus::Running => "blue",
            ExecutionStatus::Success => "green",
            ExecutionStatus::Error => "red",
            ExecutionStatus::Waiting => "yellow",
            ExecutionStatus::Cancelled => "gray",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub status: WorkflowStatus,
    pub trigger_type: TriggerType,
    pub last_run_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    pub id: String,
    pub workflow_id: String,
    pub status: ExecutionStatus,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: Option<u64>,
}

// =====================
// Webhooks
// =====================

wire_enum!(
    WebhookStatus {
        Queued => "queued",
        Sending => "sending",
        Delivered => "delivered",
        Failed => "failed",
        Retrying => "retrying",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookLog {
    pub attempt: u32,
    pub status_code: Option<u16>,
    pub message: String,
    pub logged_at: DateTime<Utc>,
}

/// Outbound webhook delivery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Webhook {
    pub webhook_id: String,
    pub url: String,
    pub event_type: String,
    pub status: WebhookStatus,
    pub attempts: u32,
    pub max_attempts: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub logs: Vec<WebhookLog>,
}

// =====================
// Approvals
// =====================

wire_enum!(
    ApprovalType {
        CampaignSend => "campaign_send",
        BulkEmail => "bulk_email",
        DataExport => "data_export",
        BudgetIncrease => "budget_increase",
        WorkflowActivation => "workflow_activation",
    }
);

wire_enum!(
    /// Declared in severity order: `Critical` sorts first.
    RiskLevel {
        Critical => "critical",
        High => "high",
        Medium => "medium",
        Low => "low",
    }
);

wire_enum!(
    ApprovalStatus {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Expired => "expired",
    }
);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Approval {
    pub approval_id: String,
    #[serde(rename = "type")]
    pub approval_type: ApprovalType,
    pub title: String,
    pub requested_by: String,
    pub risk_level: RiskLevel,
    pub risk_score: u8,
    pub status: ApprovalStatus,
    pub requested_at: DateTime<Utc>,
}

// =====================
// Locations
// =====================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub state: String,
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationGroup {
    pub id: i64,
    pub name: String,
    pub locations: Vec<String>,
}

/// Create/update payload for a location group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationGroupDraft {
    pub name: String,
    pub locations: Vec<String>,
}

// =====================
// Scraper
// =====================

wire_enum!(
    JobPriority {
        Low => "low",
        Normal => "normal",
        High => "high",
        Urgent => "urgent",
    }
);

/// `POST /scraper/jobs`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeJobRequest {
    pub location_ids: Vec<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    pub max_pages: u32,
    pub priority: JobPriority,
    pub enable_email_extraction: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captcha_api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapeJobCreated {
    pub job_id: String,
}

/// Scraper category as shown in the job form
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryOption {
    pub name: String,
    pub slug: String,
}

/// Category group name -> options, ordered by group name
pub type CategoryGroups = BTreeMap<String, Vec<CategoryOption>>;
