mod common;

use rocket::http::{ContentType, Status};
use serde_json::{json, Value};

async fn get_json(client: &rocket::local::asynchronous::Client, uri: &str) -> (Status, Value) {
    let response = client.get(uri).dispatch().await;
    let status = response.status();
    let body = response.into_json::<Value>().await.expect("json body");
    (status, body)
}

fn ids<'a>(rows: &'a Value, key: &str) -> Vec<&'a str> {
    rows.as_array()
        .expect("array")
        .iter()
        .map(|row| row[key].as_str().expect("string id"))
        .collect()
}

#[rocket::async_test]
async fn stats_summarize_the_fixtures() {
    let client = common::api_client().await;
    let (status, body) = get_json(&client, "/api/stats").await;

    assert_eq!(status, Status::Ok);
    assert_eq!(body["lead_stats"]["total_leads"], 14);
    assert_eq!(body["approvals"]["pending"], 4);
    assert_eq!(body["approvals"]["critical_pending"], 2);
    assert_eq!(body["notices"], json!([]));
    assert!(body["top_models"].as_array().unwrap().len() <= 5);
}

#[rocket::async_test]
async fn lead_filters_all_selected_and_unknown() {
    let client = common::api_client().await;

    let (_, all) = get_json(&client, "/api/leads?source=all").await;
    assert_eq!(all["leads"].as_array().unwrap().len(), 14);
    assert_eq!(all["source"], "all");

    let (_, craigslist) = get_json(&client, "/api/leads?source=craigslist").await;
    let rows = craigslist["leads"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert!(rows.iter().all(|l| l["source"] == "craigslist"));
    assert_eq!(craigslist["summary"]["total_leads"], 5);

    let (status, unknown) = get_json(&client, "/api/leads?source=carrier-pigeon").await;
    assert_eq!(status, Status::Ok);
    assert!(unknown["leads"].as_array().unwrap().is_empty());
    assert_eq!(unknown["summary"]["processing_rate"], 0.0);
    assert_eq!(unknown["source"], "carrier-pigeon");
}

#[rocket::async_test]
async fn approvals_are_ordered_by_risk_then_recency() {
    let client = common::api_client().await;
    let (_, body) = get_json(&client, "/api/approvals").await;

    assert_eq!(
        ids(&body["approvals"], "approval_id"),
        ["apr-104", "apr-101", "apr-100", "apr-105", "apr-102", "apr-103", "apr-106"]
    );

    let (_, pending) = get_json(&client, "/api/approvals?status=pending&risk=critical").await;
    assert_eq!(ids(&pending["approvals"], "approval_id"), ["apr-104", "apr-101"]);
}

#[rocket::async_test]
async fn missing_approval_is_404() {
    let client = common::api_client().await;

    let (status, body) = get_json(&client, "/api/approvals/apr-101").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["type"], "data_export");

    let (status, body) = get_json(&client, "/api/approvals/apr-999").await;
    assert_eq!(status, Status::NotFound);
    assert_eq!(body["status"], 404);
}

#[rocket::async_test]
async fn scrape_job_is_validated_before_submission() {
    let client = common::api_client().await;

    let invalid = client
        .post("/api/scraper/jobs")
        .header(ContentType::JSON)
        .body(
            json!({
                "location_ids": [1],
                "categories": ["computer-gigs"],
                "max_pages": 51,
                "priority": "normal",
                "enable_email_extraction": false
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(invalid.status(), Status::UnprocessableEntity);
    let body = invalid.into_json::<Value>().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("Max pages"));

    let created = client
        .post("/api/scraper/jobs")
        .header(ContentType::JSON)
        .body(
            json!({
                "location_ids": [1, 2],
                "keywords": ["plumber"],
                "max_pages": 10,
                "priority": "high",
                "enable_email_extraction": true
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(created.status(), Status::Created);
    let body = created.into_json::<Value>().await.unwrap();
    assert_eq!(body["job_id"], "job-00001");
}

#[rocket::async_test]
async fn location_group_lifecycle() {
    let client = common::api_client().await;

    let created = client
        .post("/api/location-groups")
        .header(ContentType::JSON)
        .body(json!({ "name": "Mountain", "locations": ["CO", "UT"] }).to_string())
        .dispatch()
        .await;
    assert_eq!(created.status(), Status::Created);
    let group = created.into_json::<Value>().await.unwrap();
    assert_eq!(group["id"], 4);

    let rejected = client
        .put("/api/location-groups/4")
        .header(ContentType::JSON)
        .body(json!({ "name": "Mountain", "locations": ["colorado"] }).to_string())
        .dispatch()
        .await;
    assert_eq!(rejected.status(), Status::UnprocessableEntity);

    let updated = client
        .put("/api/location-groups/4")
        .header(ContentType::JSON)
        .body(json!({ "name": "Mountain West", "locations": ["CO", "UT", "NV"] }).to_string())
        .dispatch()
        .await;
    assert_eq!(updated.status(), Status::Ok);

    let (_, groups) = get_json(&client, "/api/location-groups").await;
    let names: Vec<&str> = groups.as_array().unwrap().iter().map(|g| g["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["Sun Belt", "West Coast", "Northeast", "Mountain West"]);

    let deleted = client.delete("/api/location-groups/4").dispatch().await;
    assert_eq!(deleted.status(), Status::NoContent);
    let again = client.delete("/api/location-groups/4").dispatch().await;
    assert_eq!(again.status(), Status::NotFound);
}

#[rocket::async_test]
async fn categories_are_grouped_with_slugs() {
    let client = common::api_client().await;
    let (status, body) = get_json(&client, "/api/scraper/categories").await;

    assert_eq!(status, Status::Ok);
    let gigs = body["gigs"].as_array().expect("gigs group");
    assert!(gigs
        .iter()
        .any(|c| c["name"] == "Computer gigs" && c["slug"] == "computer-gigs"));
}

#[rocket::async_test]
async fn refresh_unknown_feed_is_404() {
    let client = common::api_client().await;
    let response = client.post("/api/refresh/nonsense").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);
}
