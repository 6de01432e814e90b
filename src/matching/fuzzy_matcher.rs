//! Fuzzy matching of a free-text query against local contacts.
//!
//! Scoring:
//! - Exact email match scores 100
//! - Email substring and name matches use substring + Levenshtein scoring (0-95)
//! - Company matches are capped below name matches

use crate::models::LocalContact;

/// Score cap for company-only matches.
const COMPANY_SCORE_CAP: u8 = 60;

/// A match result containing a contact and its confidence score.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// The matched contact
    pub contact: LocalContact,

    /// Confidence score (0-100, where 100 is an exact match)
    pub confidence: u8,

    /// Which attribute produced the score
    pub match_type: MatchType,
}

/// The type of match that was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchType {
    ExactEmail,
    Email,
    FuzzyName,
    Company,
}

/// Scores local contacts against a search query.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactMatcher;

impl ContactMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Best score for one contact, or `None` when nothing matches.
    pub fn score(&self, query: &str, contact: &LocalContact) -> Option<(u8, MatchType)> {
        let query_name = Self::normalize_name(query);
        if query_name.is_empty() {
            return None;
        }

        let mut best: Option<(u8, MatchType)> = None;

        if let Some(email) = contact.email.as_deref() {
            let email = Self::normalize_email(email);
            let query_email = Self::normalize_email(query);
            if email == query_email {
                return Some((100, MatchType::ExactEmail));
            }
            if email.contains(&query_email) {
                let score = Self::calculate_fuzzy_score(&query_email, &email);
                best = Some((score.max(50), MatchType::Email));
            }
        }

        let name_score = self.fuzzy_match_name(&query_name, &contact.name);
        if name_score > 0 && best.map(|(s, _)| name_score > s).unwrap_or(true) {
            best = Some((name_score, MatchType::FuzzyName));
        }

        if let Some(company) = contact.company.as_deref() {
            let score = Self::calculate_fuzzy_score(&query_name, &Self::normalize_name(company));
            if score > 50 {
                let score = score.min(COMPANY_SCORE_CAP);
                if best.map(|(s, _)| score > s).unwrap_or(true) {
                    best = Some((score, MatchType::Company));
                }
            }
        }

        best
    }

    /// Find contacts scoring at least `min_confidence`, best first, then by name.
    pub fn find_matches(
        &self,
        query: &str,
        contacts: &[LocalContact],
        max_results: usize,
        min_confidence: u8,
    ) -> Vec<MatchResult> {
        let mut results: Vec<MatchResult> = contacts
            .iter()
            .filter_map(|contact| {
                self.score(query, contact)
                    .filter(|(confidence, _)| *confidence >= min_confidence)
                    .map(|(confidence, match_type)| MatchResult {
                        contact: contact.clone(),
                        confidence,
                        match_type,
                    })
            })
            .collect();

        results.sort_by(|a, b| {
            b.confidence
                .cmp(&a.confidence)
                .then_with(|| a.contact.name.cmp(&b.contact.name))
        });
        results.truncate(max_results);
        results
    }

    /// Whole-name score, or the best single-word score ("smith" vs "Alice Smith").
    fn fuzzy_match_name(&self, query: &str, contact_name: &str) -> u8 {
        let name = Self::normalize_name(contact_name);
        let whole = Self::calculate_fuzzy_score(query, &name);
        let best_word = name
            .split(' ')
            .map(|word| Self::calculate_fuzzy_score(query, word))
            .max()
            .unwrap_or(0)
            // A single word never outranks the full name
            .min(90);
        whole.max(best_word)
    }

    /// Substring + Levenshtein score in 0-95; 100 is reserved for exact email.
    fn calculate_fuzzy_score(query: &str, target: &str) -> u8 {
        if query.is_empty() || target.is_empty() {
            return 0;
        }

        if query == target {
            return 95;
        }

        if target.contains(query) {
            let ratio = query.chars().count() as f64 / target.chars().count() as f64;
            return (85.0 * ratio + 10.0) as u8;
        }

        if query.contains(target) {
            return 85;
        }

        let distance = Self::levenshtein_distance(query, target);
        let max_len = query.chars().count().max(target.chars().count());

        if distance as f64 / max_len as f64 > 0.5 {
            return 0;
        }

        let similarity = 1.0 - (distance as f64 / max_len as f64);
        (similarity * 85.0) as u8
    }

    fn levenshtein_distance(s1: &str, s2: &str) -> usize {
        let a: Vec<char> = s1.chars().collect();
        let b: Vec<char> = s2.chars().collect();

        if a.is_empty() {
            return b.len();
        }
        if b.is_empty() {
            return a.len();
        }

        // Two-row dynamic programming table
        let mut prev: Vec<usize> = (0..=b.len()).collect();
        let mut curr = vec![0; b.len() + 1];

        for (i, ca) in a.iter().enumerate() {
            curr[0] = i + 1;
            for (j, cb) in b.iter().enumerate() {
                let cost = if ca == cb { 0 } else { 1 };
                curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
            }
            std::mem::swap(&mut prev, &mut curr);
        }

        prev[b.len()]
    }

    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    /// Lowercase and collapse whitespace.
    pub fn normalize_name(name: &str) -> String {
        name.split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(id: i64, name: &str, email: Option<&str>, company: Option<&str>) -> LocalContact {
        LocalContact {
            id,
            user_id: "u1".to_string(),
            name: name.to_string(),
            email: email.map(String::from),
            company: company.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(ContactMatcher::normalize_name("  John   Doe  "), "john doe");
        assert_eq!(ContactMatcher::normalize_name("JANE SMITH"), "jane smith");
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(ContactMatcher::levenshtein_distance("kitten", "sitting"), 3);
        assert_eq!(ContactMatcher::levenshtein_distance("", "abc"), 3);
        assert_eq!(ContactMatcher::levenshtein_distance("same", "same"), 0);
    }

    #[test]
    fn test_exact_email_scores_100() {
        let matcher = ContactMatcher::new();
        let c = contact(1, "Alice Smith", Some("alice@acme.com"), None);
        assert_eq!(
            matcher.score("ALICE@acme.com", &c),
            Some((100, MatchType::ExactEmail))
        );
    }

    #[test]
    fn test_partial_query_matches_email_and_name() {
        let matcher = ContactMatcher::new();
        let c = contact(1, "A. Smith", Some("alice@acme.com"), None);
        let (score, kind) = matcher.score("alice", &c).unwrap();
        assert_eq!(kind, MatchType::Email);
        assert_eq!(score, 50);

        // The name outranks a weak email substring
        let c = contact(1, "Alice Smith", Some("alice@acme.com"), None);
        assert_eq!(matcher.score("alice", &c), Some((90, MatchType::FuzzyName)));

        let no_email = contact(2, "Alice Smith", None, None);
        let (score, kind) = matcher.score("smith", &no_email).unwrap();
        assert_eq!(kind, MatchType::FuzzyName);
        assert_eq!(score, 90);
    }

    #[test]
    fn test_typo_tolerance() {
        let matcher = ContactMatcher::new();
        let c = contact(1, "Jonathan", None, None);
        assert!(matcher.score("jonathon", &c).is_some());
        assert!(matcher.score("zzz", &c).is_none());
    }

    #[test]
    fn test_company_match_is_capped() {
        let matcher = ContactMatcher::new();
        let c = contact(1, "Bob Jones", None, Some("Initech"));
        assert_eq!(
            matcher.score("initech", &c),
            Some((COMPANY_SCORE_CAP, MatchType::Company))
        );
    }

    #[test]
    fn test_find_matches_sorted_and_limited() {
        let matcher = ContactMatcher::new();
        let contacts = vec![
            contact(1, "John Smith", None, None),
            contact(2, "John Doe", Some("john@example.com"), None),
            contact(3, "Johnny Walker", None, None),
            contact(4, "Alice Brown", None, None),
        ];

        let results = matcher.find_matches("john@example.com", &contacts, 5, 30);
        assert_eq!(results[0].contact.id, 2);
        assert_eq!(results[0].confidence, 100);

        let results = matcher.find_matches("john", &contacts, 2, 30);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.contact.name.starts_with("John")));
    }
}
