//! Top-N ranking over derived lists.

use std::cmp::Ordering;

use crate::models::Approval;

/// First `n` records under `cmp`. Stable: equal records keep input order.
/// The input slice is never reordered.
pub fn rank_by<R, F>(records: &[R], n: usize, cmp: F) -> Vec<R>
where
    R: Clone,
    F: Fn(&R, &R) -> Ordering,
{
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| cmp(a, b));
    ranked.truncate(n);
    ranked
}

/// First `n` records by descending `score`. NaN scores sort last.
pub fn top_n_by<R, F>(records: &[R], n: usize, score: F) -> Vec<R>
where
    R: Clone,
    F: Fn(&R) -> f64,
{
    rank_by(records, n, |a, b| descending(score(a), score(b)))
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

/// Approval queue order: risk tier (critical first), then newest request first.
pub fn approval_order(a: &Approval, b: &Approval) -> Ordering {
    a.risk_level
        .cmp(&b.risk_level)
        .then_with(|| b.requested_at.cmp(&a.requested_at))
}

pub fn sort_approvals(approvals: &[Approval]) -> Vec<Approval> {
    rank_by(approvals, approvals.len(), approval_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ApprovalStatus, ApprovalType, RiskLevel};
    use chrono::{TimeZone, Utc};

    fn approval(id: &str, risk: RiskLevel, hour: u32) -> Approval {
        Approval {
            approval_id: id.to_string(),
            approval_type: ApprovalType::CampaignSend,
            title: format!("request {id}"),
            requested_by: "ops".to_string(),
            risk_level: risk,
            risk_score: 50,
            status: ApprovalStatus::Pending,
            requested_at: Utc.with_ymd_and_hms(2026, 5, 4, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn top_models_by_quality() {
        let scores = [9.2, 8.1, 9.5, 7.0, 8.8];
        let ranked = top_n_by(&scores, 5, |s| *s);
        assert_eq!(ranked, vec![9.5, 9.2, 8.8, 8.1, 7.0]);
    }

    #[test]
    fn truncates_and_leaves_input_untouched() {
        let scores = vec![1.0, 3.0, 2.0];
        let ranked = top_n_by(&scores, 2, |s| *s);
        assert_eq!(ranked, vec![3.0, 2.0]);
        assert_eq!(scores, vec![1.0, 3.0, 2.0]);
    }

    #[test]
    fn ties_keep_input_order() {
        let rows = [("a", 5.0), ("b", 7.0), ("c", 5.0), ("d", 7.0)];
        let ranked = top_n_by(&rows, 4, |r| r.1);
        let ids: Vec<_> = ranked.iter().map(|r| r.0).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn ranking_is_idempotent() {
        let rows = [("a", 2.0), ("b", 9.0), ("c", 4.0), ("d", 9.0), ("e", 1.0)];
        let once = top_n_by(&rows, 10, |r| r.1);
        let twice = top_n_by(&once, 10, |r| r.1);
        assert_eq!(once, twice);
    }

    #[test]
    fn nan_scores_sort_last() {
        let ranked = top_n_by(&[f64::NAN, 1.0, 2.0], 3, |s| *s);
        assert_eq!(&ranked[..2], &[2.0, 1.0]);
        assert!(ranked[2].is_nan());
    }

    #[test]
    fn approvals_group_by_risk_then_recency() {
        let approvals = vec![
            approval("low", RiskLevel::Low, 9),
            approval("crit-old", RiskLevel::Critical, 8),
            approval("medium", RiskLevel::Medium, 10),
            approval("crit-new", RiskLevel::Critical, 11),
        ];
        let sorted = sort_approvals(&approvals);
        let ids: Vec<_> = sorted.iter().map(|a| a.approval_id.as_str()).collect();
        assert_eq!(ids, vec!["crit-new", "crit-old", "medium", "low"]);
    }
}
