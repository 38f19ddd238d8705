use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, routes, Route, State};
use rocket_dyn_templates::{context, Template};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{ConsoleError, ConsoleResult};
use crate::forms;
use crate::models::*;
use crate::state::ConsoleState;
use crate::views::{self, ApprovalFilters, LeadFilters, WebhookFilters, WorkflowFilters};

/// Render a detail page, or the not-found page with a link back to the list.
fn detail_page<T: Serialize>(
    template: &'static str,
    title: &str,
    back: &str,
    result: ConsoleResult<T>,
) -> (Status, Template) {
    match result {
        Ok(record) => (
            Status::Ok,
            Template::render(template, context! { title: title, record: record, back: back }),
        ),
        Err(e) => {
            if !matches!(e, ConsoleError::NotFound { .. }) {
                warn!(error = %e, "Failed to load {template}");
            }
            (
                e.status(),
                Template::render("not_found", context! { title: "Not found", message: e.to_string(), back: back }),
            )
        }
    }
}

// =====================
// HTML Page Routes
// =====================

#[get("/")]
pub async fn index(state: &State<ConsoleState>) -> Template {
    let view = views::dashboard(state).await;
    Template::render("index", context! {
        title: "Dashboard",
        view: view,
    })
}

#[get("/leads?<filters..>")]
pub async fn leads_page(state: &State<ConsoleState>, filters: LeadFilters) -> Template {
    let view = views::leads(state, &filters).await;
    Template::render("leads", context! {
        title: "Leads",
        view: view,
    })
}

#[get("/campaigns?<status>")]
pub async fn campaigns_page(state: &State<ConsoleState>, status: Option<&str>) -> Template {
    let view = views::campaigns(state, status).await;
    Template::render("campaigns", context! {
        title: "Campaigns",
        view: view,
    })
}

#[get("/campaigns/<id>")]
pub async fn campaign_page(state: &State<ConsoleState>, id: i64) -> (Status, Template) {
    let result = views::campaign_detail(state, id).await;
    detail_page("campaign_detail", "Campaign", "/campaigns", result)
}

#[get("/ai-gym?<task>")]
pub async fn ai_gym_page(state: &State<ConsoleState>, task: Option<&str>) -> Template {
    let view = views::ai_gym(state, task).await;
    Template::render("ai_gym", context! {
        title: "AI-GYM",
        view: view,
    })
}

#[get("/workflows?<filters..>")]
pub async fn workflows_page(state: &State<ConsoleState>, filters: WorkflowFilters) -> Template {
    let view = views::workflows(state, &filters).await;
    Template::render("workflows", context! {
        title: "Workflows",
        view: view,
    })
}

#[get("/workflows/<id>")]
pub async fn workflow_page(state: &State<ConsoleState>, id: &str) -> (Status, Template) {
    let result = views::workflow_detail(state, id).await;
    detail_page("workflow_detail", "Workflow", "/workflows", result)
}

#[get("/webhooks?<filters..>")]
pub async fn webhooks_page(state: &State<ConsoleState>, filters: WebhookFilters) -> Template {
    let view = views::webhooks(state, &filters).await;
    Template::render("webhooks", context! {
        title: "Webhooks",
        view: view,
    })
}

#[get("/approvals?<filters..>")]
pub async fn approvals_page(state: &State<ConsoleState>, filters: ApprovalFilters) -> Template {
    let view = views::approvals(state, &filters).await;
    Template::render("approvals", context! {
        title: "Approvals",
        view: view,
    })
}

#[get("/approvals/<id>")]
pub async fn approval_page(state: &State<ConsoleState>, id: &str) -> (Status, Template) {
    let result = views::approval_detail(state, id).await;
    detail_page("approval_detail", "Approval", "/approvals", result)
}

#[get("/locations")]
pub async fn locations_page(state: &State<ConsoleState>) -> Template {
    let view = views::locations(state).await;
    Template::render("locations", context! {
        title: "Locations",
        view: view,
    })
}

#[get("/scraper")]
pub async fn scraper_page(state: &State<ConsoleState>) -> Template {
    let view = views::scraper(state).await;
    Template::render("scraper", context! {
        title: "Scraper",
        view: view,
        max_pages: forms::MAX_PAGES_LIMIT,
    })
}

// =====================
// JSON API Routes
// =====================

#[get("/stats")]
pub async fn api_stats(state: &State<ConsoleState>) -> Json<views::DashboardView> {
    Json(views::dashboard(state).await)
}

#[get("/leads?<filters..>")]
pub async fn api_leads(state: &State<ConsoleState>, filters: LeadFilters) -> Json<views::LeadsView> {
    Json(views::leads(state, &filters).await)
}

#[get("/campaigns?<status>")]
pub async fn api_campaigns(state: &State<ConsoleState>, status: Option<&str>) -> Json<views::CampaignsView> {
    Json(views::campaigns(state, status).await)
}

#[get("/campaigns/<id>")]
pub async fn api_campaign(state: &State<ConsoleState>, id: i64) -> ConsoleResult<Json<views::CampaignRow>> {
    views::campaign_detail(state, id).await.map(Json)
}

#[get("/ai-gym?<task>")]
pub async fn api_ai_gym(state: &State<ConsoleState>, task: Option<&str>) -> Json<views::AiGymView> {
    Json(views::ai_gym(state, task).await)
}

#[get("/workflows?<filters..>")]
pub async fn api_workflows(state: &State<ConsoleState>, filters: WorkflowFilters) -> Json<views::WorkflowsView> {
    Json(views::workflows(state, &filters).await)
}

#[get("/workflows/<id>")]
pub async fn api_workflow(state: &State<ConsoleState>, id: &str) -> ConsoleResult<Json<views::WorkflowDetail>> {
    views::workflow_detail(state, id).await.map(Json)
}

#[get("/webhooks?<filters..>")]
pub async fn api_webhooks(state: &State<ConsoleState>, filters: WebhookFilters) -> Json<views::WebhooksView> {
    Json(views::webhooks(state, &filters).await)
}

#[get("/approvals?<filters..>")]
pub async fn api_approvals(state: &State<ConsoleState>, filters: ApprovalFilters) -> Json<views::ApprovalsView> {
    Json(views::approvals(state, &filters).await)
}

#[get("/approvals/<id>")]
pub async fn api_approval(state: &State<ConsoleState>, id: &str) -> ConsoleResult<Json<Approval>> {
    views::approval_detail(state, id).await.map(Json)
}

#[get("/locations")]
pub async fn api_locations(state: &State<ConsoleState>) -> Json<views::LocationsView> {
    Json(views::locations(state).await)
}

#[get("/location-groups")]
pub async fn api_location_groups(state: &State<ConsoleState>) -> ConsoleResult<Json<Vec<LocationGroup>>> {
    state.repo.location_groups().await.map(Json)
}

#[post("/location-groups", data = "<draft>")]
pub async fn api_create_location_group(
    state: &State<ConsoleState>,
    draft: Json<LocationGroupDraft>,
) -> ConsoleResult<(Status, Json<LocationGroup>)> {
    forms::validate_location_group(&draft)?;
    let group = state.repo.create_location_group(&draft).await?;
    info!(id = group.id, name = %group.name, "Location group created");
    Ok((Status::Created, Json(group)))
}

#[put("/location-groups/<id>", data = "<draft>")]
pub async fn api_update_location_group(
    state: &State<ConsoleState>,
    id: i64,
    draft: Json<LocationGroupDraft>,
) -> ConsoleResult<Json<LocationGroup>> {
    forms::validate_location_group(&draft)?;
    let group = state.repo.update_location_group(id, &draft).await?;
    info!(id, "Location group updated");
    Ok(Json(group))
}

#[delete("/location-groups/<id>")]
pub async fn api_delete_location_group(state: &State<ConsoleState>, id: i64) -> ConsoleResult<Status> {
    state.repo.delete_location_group(id).await?;
    info!(id, "Location group deleted");
    Ok(Status::NoContent)
}

#[get("/scraper/categories")]
pub async fn api_categories(state: &State<ConsoleState>) -> Json<CategoryGroups> {
    Json(views::categories(state, &mut Vec::new()).await)
}

#[post("/scraper/jobs", data = "<request>")]
pub async fn api_create_scrape_job(
    state: &State<ConsoleState>,
    request: Json<ScrapeJobRequest>,
) -> ConsoleResult<(Status, Json<ScrapeJobCreated>)> {
    forms::validate_scrape_job(&request)?;
    let created = state.repo.create_scrape_job(&request).await?;
    info!(job_id = %created.job_id, locations = request.location_ids.len(), "Scrape job submitted");
    Ok((Status::Created, Json(created)))
}

#[post("/refresh/<feed>")]
pub fn api_refresh(state: &State<ConsoleState>, feed: &str) -> ConsoleResult<Json<serde_json::Value>> {
    match state.feeds.refresh(feed) {
        Some(started) => Ok(Json(serde_json::json!({ "feed": feed, "started": started }))),
        None => Err(ConsoleError::not_found("feed", feed)),
    }
}

// =====================
// Route Collections
// =====================

pub fn index_routes() -> Vec<Route> {
    routes![
        index,
        leads_page,
        campaigns_page,
        campaign_page,
        ai_gym_page,
        workflows_page,
        workflow_page,
        webhooks_page,
        approvals_page,
        approval_page,
        locations_page,
        scraper_page,
    ]
}

pub fn api_routes() -> Vec<Route> {
    routes![
        api_stats,
        api_leads,
        api_campaigns,
        api_campaign,
        api_ai_gym,
        api_workflows,
        api_workflow,
        api_webhooks,
        api_approvals,
        api_approval,
        api_locations,
        api_location_groups,
        api_create_location_group,
        api_update_location_group,
        api_delete_location_group,
        api_categories,
        api_create_scrape_job,
        api_refresh,
    ]
}
