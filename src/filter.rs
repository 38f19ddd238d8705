//! Discriminator filters driven by page query strings.

use serde::Serialize;
use std::str::FromStr;

/// Filter selection for one discriminator field.
///
/// `All` is the identity filter. A value that does not parse into the
/// discriminator type is kept as `Unrecognized` and matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
    Unrecognized(String),
}

impl<T: FromStr> Selection<T> {
    /// Parse a raw query value. Missing, empty and `"all"` select everything.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Selection::All,
            Some(value) => match value.parse::<T>() {
                Ok(parsed) => Selection::Only(parsed),
                Err(_) => Selection::Unrecognized(value.to_string()),
            },
        }
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => selected == value,
            Selection::Unrecognized(_) => false,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T: std::fmt::Display> Selection<T> {
    /// Value echoed back into the page's filter control
    pub fn label(&self) -> String {
        match self {
            Selection::All => "all".to_string(),
            Selection::Only(value) => value.to_string(),
            Selection::Unrecognized(raw) => raw.clone(),
        }
    }
}

impl<T: std::fmt::Display> Serialize for Selection<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

/// Records whose discriminator matches `selection`, in input order.
pub fn filter_by<'a, R, D, F>(records: &'a [R], selection: &Selection<D>, key: F) -> Vec<&'a R>
where
    D: PartialEq,
    F: Fn(&R) -> D,
{
    if selection.is_all() {
        return records.iter().collect();
    }
    records.iter().filter(|r| selection.matches(&key(r))).collect()
}

/// Case-insensitive substring search over the fields `text` yields.
pub fn search<'a, R, F>(records: Vec<&'a R>, query: Option<&str>, text: F) -> Vec<&'a R>
where
    F: Fn(&R) -> Vec<&str>,
{
    let needle = match query.map(str::trim) {
        Some(q) if !q.is_empty() => q.to_lowercase(),
        _ => return records,
    };
    records
        .into_iter()
        .filter(|r| text(r).iter().any(|field| field.to_lowercase().contains(&needle)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LeadSource, RiskLevel};

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: u32,
        source: LeadSource,
        name: &'static str,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { id: 1, source: LeadSource::Craigslist, name: "Acme Plumbing" },
            Row { id: 2, source: LeadSource::GoogleMaps, name: "Bay Roofing" },
            Row { id: 3, source: LeadSource::Craigslist, name: "Cedar Movers" },
            Row { id: 4, source: LeadSource::Manual, name: "Delta Plumbing" },
        ]
    }

    #[test]
    fn all_is_identity() {
        let rows = rows();
        let out = filter_by(&rows, &Selection::All, |r| r.source);
        assert_eq!(out, rows.iter().collect::<Vec<_>>());
    }

    #[test]
    fn selected_value_is_sound_and_complete() {
        let rows = rows();
        let selection = Selection::Only(LeadSource::Craigslist);
        let out = filter_by(&rows, &selection, |r| r.source);

        assert!(out.iter().all(|r| r.source == LeadSource::Craigslist));
        let expected: Vec<_> = rows.iter().filter(|r| r.source == LeadSource::Craigslist).collect();
        assert_eq!(out, expected);
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn unknown_value_yields_empty_result() {
        let rows = rows();
        let selection = Selection::<LeadSource>::parse(Some("carrier_pigeon"));
        assert_eq!(selection, Selection::Unrecognized("carrier_pigeon".into()));
        assert!(filter_by(&rows, &selection, |r| r.source).is_empty());
    }

    #[test]
    fn parse_treats_missing_and_all_as_identity() {
        assert_eq!(Selection::<RiskLevel>::parse(None), Selection::All);
        assert_eq!(Selection::<RiskLevel>::parse(Some("all")), Selection::All);
        assert_eq!(Selection::<RiskLevel>::parse(Some(" ")), Selection::All);
        assert_eq!(
            Selection::<RiskLevel>::parse(Some("critical")),
            Selection::Only(RiskLevel::Critical)
        );
    }

    #[test]
    fn search_narrows_case_insensitively() {
        let rows = rows();
        let all = filter_by(&rows, &Selection::All, |r| r.source);
        let out = search(all, Some("PLUMB"), |r| vec![r.name]);
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 4]);
    }

    #[test]
    fn selection_serializes_as_its_label() {
        let json = serde_json::to_string(&Selection::Only(RiskLevel::High)).unwrap();
        assert_eq!(json, "\"high\"");
    }
}
