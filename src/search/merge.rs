//! Deduplication of search candidates by email.

use crate::models::{CanonicalContact, ContactSource};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Merge candidates sharing an email into one record per email.
///
/// The winner of each group is the candidate with the highest
/// [`ContactSource::priority`]; ties within one source go to the smallest id.
/// When a local record took part, its id is copied onto the winner.
/// Candidates without an email pass through untouched. The result does not
/// depend on input order except for the relative order of passthrough records.
pub fn merge_candidates(candidates: Vec<CanonicalContact>) -> Vec<CanonicalContact> {
    let mut groups: BTreeMap<String, Vec<CanonicalContact>> = BTreeMap::new();
    let mut passthrough = Vec::new();

    for candidate in candidates {
        match candidate.merge_key() {
            Some(key) => groups.entry(key).or_default().push(candidate),
            None => passthrough.push(candidate),
        }
    }

    let mut merged: Vec<CanonicalContact> = groups.into_values().filter_map(merge_group).collect();
    merged.extend(passthrough);
    merged
}

fn merge_group(group: Vec<CanonicalContact>) -> Option<CanonicalContact> {
    let local_id = group
        .iter()
        .filter(|c| c.source == ContactSource::Local)
        .filter_map(|c| c.contact_id)
        .min();

    let mut winner = group.into_iter().min_by(rank)?;
    if winner.contact_id.is_none() {
        winner.contact_id = local_id;
    }
    Some(winner)
}

/// Best candidate first.
fn rank(a: &CanonicalContact, b: &CanonicalContact) -> Ordering {
    b.source
        .priority()
        .cmp(&a.source.priority())
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort by case-insensitive display name; ids break ties.
pub fn sort_by_name(contacts: &mut [CanonicalContact]) {
    contacts.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn candidate(source: ContactSource, id: &str, name: &str, email: Option<&str>) -> CanonicalContact {
        CanonicalContact {
            id: CanonicalContact::composite_id(source, id),
            contact_id: (source == ContactSource::Local).then(|| id.parse().unwrap_or(0)),
            source,
            name: name.to_string(),
            email: email.map(String::from),
            fields: Map::new(),
        }
    }

    #[test]
    fn test_salesforce_wins_and_keeps_local_id() {
        let merged = merge_candidates(vec![
            candidate(ContactSource::Local, "7", "Alice", Some("alice@acme.com")),
            candidate(ContactSource::Hubspot, "h1", "Alice H", Some("ALICE@acme.com")),
            candidate(ContactSource::Salesforce, "s1", "Alice S", Some("alice@acme.com")),
        ]);

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, ContactSource::Salesforce);
        assert_eq!(merged[0].contact_id, Some(7));
    }

    #[test]
    fn test_hubspot_beats_local() {
        let merged = merge_candidates(vec![
            candidate(ContactSource::Hubspot, "h1", "Bob", Some("bob@x.com")),
            candidate(ContactSource::Local, "3", "Bob", Some("bob@x.com")),
        ]);
        assert_eq!(merged[0].source, ContactSource::Hubspot);
        assert_eq!(merged[0].contact_id, Some(3));
    }

    #[test]
    fn test_merge_is_order_independent() {
        let base = vec![
            candidate(ContactSource::Local, "7", "Alice", Some("alice@acme.com")),
            candidate(ContactSource::Hubspot, "h1", "Alice", Some("alice@acme.com")),
            candidate(ContactSource::Salesforce, "s1", "Alice", Some("alice@acme.com")),
            candidate(ContactSource::Salesforce, "s0", "Alice", Some("alice@acme.com")),
        ];

        let mut expected = merge_candidates(base.clone());
        sort_by_name(&mut expected);

        // Every rotation and its reverse
        for shift in 0..base.len() {
            let mut rotated = base.clone();
            rotated.rotate_left(shift);
            for input in [rotated.clone(), rotated.into_iter().rev().collect()] {
                let mut merged = merge_candidates(input);
                sort_by_name(&mut merged);
                assert_eq!(merged, expected);
            }
        }
        assert_eq!(expected[0].id, "salesforce:s0");
    }

    #[test]
    fn test_no_email_passes_through() {
        let merged = merge_candidates(vec![
            candidate(ContactSource::Local, "1", "No Mail", None),
            candidate(ContactSource::Local, "2", "Blank Mail", Some("  ")),
            candidate(ContactSource::Hubspot, "h", "Has Mail", Some("a@b.c")),
        ]);
        assert_eq!(merged.len(), 3);
    }

    #[test]
    fn test_sort_by_name_is_case_insensitive() {
        let mut contacts = vec![
            candidate(ContactSource::Local, "1", "bob", None),
            candidate(ContactSource::Local, "2", "Alice", None),
            candidate(ContactSource::Local, "3", "", None),
        ];
        sort_by_name(&mut contacts);
        let names: Vec<&str> = contacts.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["", "Alice", "bob"]);
    }
}
