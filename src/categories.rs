//! Scraper category normalization and built-in defaults.

use std::collections::BTreeMap;

use crate::models::{CategoryGroups, CategoryOption};

/// Upper-case the first character and lower-case the rest.
pub fn display_name(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Lower-case, spaces to hyphens, drop everything outside `[a-z0-9-]`.
pub fn slugify(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .replace(' ', "-")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

pub fn option(raw: &str) -> CategoryOption {
    CategoryOption {
        name: display_name(raw),
        slug: slugify(raw),
    }
}

/// Convert the plain `GET /scraper/categories` payload into structured groups.
pub fn normalize(plain: BTreeMap<String, Vec<String>>) -> CategoryGroups {
    plain
        .into_iter()
        .map(|(group, names)| {
            let options = names
                .iter()
                .filter(|n| !n.trim().is_empty())
                .map(|n| option(n))
                .collect();
            (group, options)
        })
        .collect()
}

/// Groups shown when neither category endpoint answers.
pub fn default_categories() -> CategoryGroups {
    let groups: [(&str, &[&str]); 4] = [
        ("gigs", &["Computer Gigs", "Creative Gigs", "Labor Gigs", "Writing Gigs"]),
        ("housing", &["Apartments", "Office Commercial", "Real Estate"]),
        ("services", &["Automotive Services", "Household Services", "Skilled Trade Services", "Small Biz Ads"]),
        ("jobs", &["Marketing", "Sales", "Software", "Web Design"]),
    ];
    groups
        .iter()
        .map(|(group, names)| (group.to_string(), names.iter().map(|n| option(n)).collect()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_plain_category_lists() {
        let mut plain = BTreeMap::new();
        plain.insert("gigs".to_string(), vec!["Computer Gigs".to_string()]);

        let groups = normalize(plain);
        assert_eq!(
            groups["gigs"],
            vec![CategoryOption {
                name: "Computer gigs".to_string(),
                slug: "computer-gigs".to_string(),
            }]
        );
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(slugify("Skilled Trade / Services!"), "skilled-trade--services");
        assert_eq!(slugify("  Web & Design 2 "), "web--design-2");
    }

    #[test]
    fn display_name_handles_empty_and_lowercase() {
        assert_eq!(display_name(""), "");
        assert_eq!(display_name("apartments"), "Apartments");
        assert_eq!(display_name("SALES"), "Sales");
    }

    #[test]
    fn blank_names_are_dropped() {
        let mut plain = BTreeMap::new();
        plain.insert("jobs".to_string(), vec!["".to_string(), "Sales".to_string()]);
        let groups = normalize(plain);
        assert_eq!(groups["jobs"].len(), 1);
    }

    #[test]
    fn defaults_are_normalized() {
        let defaults = default_categories();
        assert_eq!(defaults.len(), 4);
        assert!(defaults.values().flatten().any(|o| o.slug == "computer-gigs"));
        assert!(defaults["gigs"].iter().any(|o| o.name == "Computer gigs"));
    }
}
