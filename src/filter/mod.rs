//! Capability filters
//!
//! Every filter consumes a collection and returns the survivors in their
//! original relative order. Filters never reorder or duplicate items, so any
//! sequence of them is an intersection and the order of application does not
//! change the result.
//!
//! # Module Structure
//!
//! - [`capability`] - single-method accessor traits resources implement
//! - [`pipeline`] - boxed filter steps and their sequential application

pub mod capability;
pub mod pipeline;

pub use capability::{HasContent, HasCreatedAt, HasLength, HasMetadata, HasName};
pub use pipeline::{
    apply_filters, ContainsContent, ContainsName, DaysGt, DaysLte, Filter, LengthGt, LengthLte,
    MetadataEquals, NotContainsContent, NotContainsName, Pipeline,
};

use crate::error::{OaitError, Result};
use std::collections::HashMap;

pub const DAY_IN_SECONDS: f64 = 86_400.0;

/// Current Unix time in seconds
pub fn now_unix() -> i64 {
    chrono::Utc::now().timestamp()
}

fn check_days(days: f64) -> Result<()> {
    // NaN fails this comparison too
    if !(days >= 0.0) {
        return Err(OaitError::InvalidArgument(format!(
            "invalid number of days '{}': negative numbers not supported",
            days
        )));
    }
    Ok(())
}

fn check_length(length: i64) -> Result<()> {
    if length < 0 {
        return Err(OaitError::InvalidArgument(format!(
            "invalid length '{}': negative numbers not supported",
            length
        )));
    }
    Ok(())
}

fn cutoff(now: i64, days: f64) -> i64 {
    now.saturating_sub((days * DAY_IN_SECONDS) as i64)
}

fn length_of<T: HasLength>(item: &T) -> i64 {
    i64::try_from(item.length()).unwrap_or(i64::MAX)
}

/// Keep items created within the last `days` days.
pub fn days_lte<T: HasCreatedAt>(items: Vec<T>, days: f64) -> Result<Vec<T>> {
    days_lte_at(items, days, now_unix())
}

/// [`days_lte`] against a fixed `now` snapshot
pub fn days_lte_at<T: HasCreatedAt>(items: Vec<T>, days: f64, now: i64) -> Result<Vec<T>> {
    check_days(days)?;
    let threshold = cutoff(now, days);
    Ok(items
        .into_iter()
        .filter(|item| threshold <= item.created_at())
        .collect())
}

/// Keep items created more than `days` days ago.
pub fn days_gt<T: HasCreatedAt>(items: Vec<T>, days: f64) -> Result<Vec<T>> {
    days_gt_at(items, days, now_unix())
}

/// [`days_gt`] against a fixed `now` snapshot
pub fn days_gt_at<T: HasCreatedAt>(items: Vec<T>, days: f64, now: i64) -> Result<Vec<T>> {
    check_days(days)?;
    let threshold = cutoff(now, days);
    Ok(items
        .into_iter()
        .filter(|item| threshold > item.created_at())
        .collect())
}

pub fn length_lte<T: HasLength>(items: Vec<T>, length: i64) -> Result<Vec<T>> {
    check_length(length)?;
    Ok(items
        .into_iter()
        .filter(|item| length_of(item) <= length)
        .collect())
}

pub fn length_gt<T: HasLength>(items: Vec<T>, length: i64) -> Result<Vec<T>> {
    check_length(length)?;
    Ok(items
        .into_iter()
        .filter(|item| length_of(item) > length)
        .collect())
}

/// Keep items whose name contains every string in `names`.
pub fn contains_name<T: HasName, S: AsRef<str>>(items: Vec<T>, names: &[S]) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            let name = item.name();
            names.iter().all(|n| name.contains(n.as_ref()))
        })
        .collect()
}

/// Keep items whose name contains none of `names`.
pub fn not_contains_name<T: HasName, S: AsRef<str>>(items: Vec<T>, names: &[S]) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            let name = item.name();
            !names.iter().any(|n| name.contains(n.as_ref()))
        })
        .collect()
}

fn fragment_found(content: &[&str], fragment: &str) -> bool {
    content.iter().any(|element| element.contains(fragment))
}

/// Keep items where every fragment occurs in at least one content element.
pub fn contains_content<T: HasContent, S: AsRef<str>>(items: Vec<T>, fragments: &[S]) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            let content = item.content();
            fragments
                .iter()
                .all(|f| fragment_found(&content, f.as_ref()))
        })
        .collect()
}

/// Keep items where no fragment occurs in any content element.
pub fn not_contains_content<T: HasContent, S: AsRef<str>>(
    items: Vec<T>,
    fragments: &[S],
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            let content = item.content();
            !fragments
                .iter()
                .any(|f| fragment_found(&content, f.as_ref()))
        })
        .collect()
}

/// Keep items whose metadata holds every pair of `expected` exactly.
pub fn metadata_equals<T: HasMetadata>(
    items: Vec<T>,
    expected: &HashMap<String, String>,
) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| {
            let metadata = item.metadata();
            expected
                .iter()
                .all(|(k, v)| metadata.and_then(|m| m.get(k)) == Some(v))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Item {
        created_at: i64,
        length: usize,
        name: String,
        content: Vec<String>,
        metadata: Option<HashMap<String, String>>,
    }

    impl HasCreatedAt for Item {
        fn created_at(&self) -> i64 {
            self.created_at
        }
    }

    impl HasLength for Item {
        fn length(&self) -> usize {
            self.length
        }
    }

    impl HasName for Item {
        fn name(&self) -> &str {
            &self.name
        }
    }

    impl HasContent for Item {
        fn content(&self) -> Vec<&str> {
            self.content.iter().map(String::as_str).collect()
        }
    }

    impl HasMetadata for Item {
        fn metadata(&self) -> Option<&HashMap<String, String>> {
            self.metadata.as_ref()
        }
    }

    const NOW: i64 = 1_700_000_000;

    fn aged(days: f64) -> Item {
        Item {
            created_at: NOW - (days * DAY_IN_SECONDS) as i64,
            ..Default::default()
        }
    }

    fn named(name: &str) -> Item {
        Item {
            name: name.to_string(),
            ..Default::default()
        }
    }

    fn with_content(content: &[&str]) -> Item {
        Item {
            content: content.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn with_meta(pairs: &[(&str, &str)]) -> Item {
        Item {
            metadata: Some(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            ..Default::default()
        }
    }

    #[test]
    fn days_split_recent_and_old() {
        let items = vec![aged(10.0), aged(3.0), aged(0.5)];

        let recent = days_lte_at(items.clone(), 5.0, NOW).unwrap();
        assert_eq!(recent, vec![aged(3.0), aged(0.5)]);

        let old = days_gt_at(items, 5.0, NOW).unwrap();
        assert_eq!(old, vec![aged(10.0)]);
    }

    #[test]
    fn days_boundary_is_inclusive_for_lte() {
        let items = vec![aged(5.0)];
        assert_eq!(days_lte_at(items.clone(), 5.0, NOW).unwrap().len(), 1);
        assert!(days_gt_at(items, 5.0, NOW).unwrap().is_empty());
    }

    #[test]
    fn fractional_days_are_honoured() {
        let items = vec![aged(0.25), aged(0.75)];
        assert_eq!(days_lte_at(items, 0.5, NOW).unwrap(), vec![aged(0.25)]);
    }

    #[test]
    fn zero_days_keeps_only_future_or_now() {
        let items = vec![aged(0.0), aged(1.0)];
        assert_eq!(days_lte_at(items, 0.0, NOW).unwrap(), vec![aged(0.0)]);
    }

    #[test]
    fn negative_days_rejected() {
        assert!(matches!(
            days_lte(vec![aged(1.0)], -1.0),
            Err(OaitError::InvalidArgument(_))
        ));
        assert!(matches!(
            days_gt(vec![aged(1.0)], -1.0),
            Err(OaitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn nan_days_rejected() {
        assert!(days_lte::<Item>(vec![], f64::NAN).is_err());
    }

    #[test]
    fn length_thresholds() {
        let items: Vec<Item> = [0, 2, 5, 10]
            .iter()
            .map(|&length| Item {
                length,
                ..Default::default()
            })
            .collect();

        let short: Vec<usize> = length_lte(items.clone(), 5)
            .unwrap()
            .iter()
            .map(|i| i.length)
            .collect();
        assert_eq!(short, vec![0, 2, 5]);

        let long: Vec<usize> = length_gt(items, 5)
            .unwrap()
            .iter()
            .map(|i| i.length)
            .collect();
        assert_eq!(long, vec![10]);
    }

    #[test]
    fn negative_length_rejected() {
        assert!(matches!(
            length_lte(vec![Item::default()], -1),
            Err(OaitError::InvalidArgument(_))
        ));
        assert!(matches!(
            length_gt(vec![Item::default()], -3),
            Err(OaitError::InvalidArgument(_))
        ));
    }

    #[test]
    fn name_filters() {
        let items = vec![named("foo-bar"), named("foo-baz"), named("qux")];

        assert_eq!(
            contains_name(items.clone(), &["foo"]),
            vec![named("foo-bar"), named("foo-baz")]
        );
        assert_eq!(not_contains_name(items.clone(), &["foo"]), vec![named("qux")]);
        assert_eq!(
            contains_name(items.clone(), &["foo", "baz"]),
            vec![named("foo-baz")]
        );
        assert_eq!(
            not_contains_name(items, &["bar", "qux"]),
            vec![named("foo-baz")]
        );
    }

    #[test]
    fn empty_name_lists_keep_everything() {
        let items = vec![named("a"), named("")];
        let none: [&str; 0] = [];
        assert_eq!(contains_name(items.clone(), &none), items);
        assert_eq!(not_contains_name(items.clone(), &none), items);
    }

    #[test]
    fn content_fragments_may_match_different_elements() {
        // "alpha" only in the first message, "beta" only in the second
        let items = vec![with_content(&["alpha here", "then beta"])];
        assert_eq!(contains_content(items.clone(), &["alpha", "beta"]).len(), 1);
        assert!(not_contains_content(items, &["beta"]).is_empty());
    }

    #[test]
    fn later_elements_do_not_erase_earlier_matches() {
        let items = vec![with_content(&["needle", "hay", "hay"])];
        assert_eq!(contains_content(items.clone(), &["needle"]).len(), 1);
        assert!(not_contains_content(items, &["needle"]).is_empty());
    }

    #[test]
    fn every_fragment_must_be_found() {
        let items = vec![
            with_content(&["alpha", "beta"]),
            with_content(&["alpha"]),
            with_content(&[]),
        ];
        let kept = contains_content(items, &["alpha", "beta"]);
        assert_eq!(kept, vec![with_content(&["alpha", "beta"])]);
    }

    #[test]
    fn empty_content_survives_not_contains() {
        let items = vec![with_content(&[]), with_content(&["secret"])];
        assert_eq!(
            not_contains_content(items, &["secret"]),
            vec![with_content(&[])]
        );
    }

    #[test]
    fn metadata_requires_every_pair() {
        let items = vec![
            with_meta(&[("env", "prod"), ("team", "a")]),
            with_meta(&[("env", "prod")]),
            with_meta(&[("env", "dev"), ("team", "a")]),
            Item::default(),
        ];

        let expected: HashMap<String, String> = [("env", "prod"), ("team", "a")]
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        assert_eq!(
            metadata_equals(items.clone(), &expected),
            vec![with_meta(&[("env", "prod"), ("team", "a")])]
        );
        assert_eq!(metadata_equals(items.clone(), &HashMap::new()), items);
    }
}
