//! Submission checks run before anything is sent to the backend.

use std::collections::HashSet;

use crate::error::{ConsoleError, ConsoleResult};
use crate::models::{LocationGroupDraft, ScrapeJobRequest};

pub const MAX_PAGES_LIMIT: u32 = 50;

fn invalid(message: impl Into<String>) -> ConsoleError {
    ConsoleError::Validation(message.into())
}

fn non_blank(values: &Option<Vec<String>>) -> usize {
    values
        .as_ref()
        .map(|v| v.iter().filter(|s| !s.trim().is_empty()).count())
        .unwrap_or(0)
}

pub fn validate_scrape_job(request: &ScrapeJobRequest) -> ConsoleResult<()> {
    if request.location_ids.is_empty() {
        return Err(invalid("Select at least one location"));
    }
    let unique: HashSet<_> = request.location_ids.iter().collect();
    if unique.len() != request.location_ids.len() {
        return Err(invalid("Locations must not repeat"));
    }
    if non_blank(&request.categories) + non_blank(&request.keywords) == 0 {
        return Err(invalid("Pick a category or enter a keyword"));
    }
    if request.max_pages == 0 || request.max_pages > MAX_PAGES_LIMIT {
        return Err(invalid(format!("Max pages must be between 1 and {MAX_PAGES_LIMIT}")));
    }
    if let Some(key) = &request.captcha_api_key {
        if key.trim().is_empty() {
            return Err(invalid("Captcha API key is blank"));
        }
    }
    Ok(())
}

/// US state code: two ASCII capitals.
fn is_state_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())
}

pub fn validate_location_group(draft: &LocationGroupDraft) -> ConsoleResult<()> {
    if draft.name.trim().is_empty() {
        return Err(invalid("Group name is required"));
    }
    if draft.locations.is_empty() {
        return Err(invalid("Add at least one state to the group"));
    }
    if let Some(bad) = draft.locations.iter().find(|c| !is_state_code(c)) {
        return Err(invalid(format!("'{bad}' is not a state code")));
    }
    let unique: HashSet<_> = draft.locations.iter().collect();
    if unique.len() != draft.locations.len() {
        return Err(invalid("States must not repeat"));
    }
    Ok(())
}
