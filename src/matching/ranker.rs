// src/matching/ranker.rs
// Scores raw register search hits against a query name. Pure function: no
// side effects, never fails, ties keep input order.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::matching::classifier::classify_from_sic;
use crate::matching::normalize::{normalize_loose, normalize_strict, tokenize};
use crate::models::core::{EmployerCandidate, RegisterSearchItem};

const EXACT_MATCH_WEIGHT: f64 = 0.65;
const TOKEN_OVERLAP_WEIGHT: f64 = 0.25;
const LOCATION_HINT_WEIGHT: f64 = 0.10;
const MIN_HINT_TOKEN_LENGTH: usize = 2;

fn token_overlap(query_tokens: &[String], candidate_tokens: &[String]) -> f64 {
    if query_tokens.is_empty() || candidate_tokens.is_empty() {
        return 0.0;
    }
    let candidate_set: HashSet<&str> = candidate_tokens.iter().map(|t| t.as_str()).collect();
    let shared = query_tokens
        .iter()
        .filter(|token| candidate_set.contains(token.as_str()))
        .count();
    shared as f64 / query_tokens.len().max(candidate_tokens.len()) as f64
}

fn matches_location_hint(address_snippet: &str, hint_location: &str) -> bool {
    if address_snippet.is_empty() || hint_location.is_empty() {
        return false;
    }
    let address = normalize_strict(address_snippet);
    tokenize(&normalize_strict(hint_location))
        .iter()
        .filter(|token| token.len() > MIN_HINT_TOKEN_LENGTH)
        .any(|token| address.contains(token.as_str()))
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Rank register search hits against a query name. Hits without a company
/// number are dropped; the rest are scored, annotated with match reasons and
/// sorted descending by score (stable, so ties keep upstream order).
pub fn rank_register_candidates(
    query: &str,
    items: &[RegisterSearchItem],
    hint_location: Option<&str>,
) -> Vec<EmployerCandidate> {
    let normalized_query = normalize_loose(query);
    let query_tokens = tokenize(&normalized_query);

    let mut candidates: Vec<EmployerCandidate> = items
        .iter()
        .filter_map(|item| {
            let company_number = item.company_number.clone().unwrap_or_default();
            if company_number.is_empty() {
                return None;
            }

            let title = item.title.clone().unwrap_or_default();
            let normalized_title = normalize_loose(&title);
            let candidate_tokens = tokenize(&normalized_title);

            let mut score = 0.0;
            let mut reasons = Vec::new();

            if !normalized_query.is_empty() && normalized_query == normalized_title {
                score += EXACT_MATCH_WEIGHT;
                reasons.push("exact_normalized_match".to_string());
            }

            let overlap = token_overlap(&query_tokens, &candidate_tokens);
            if overlap > 0.0 {
                score += TOKEN_OVERLAP_WEIGHT * overlap;
                reasons.push(format!("token_overlap_{}", (overlap * 100.0).round() as i64));
            }

            let address_snippet = item.address_text();
            if let Some(hint) = hint_location {
                if matches_location_hint(&address_snippet, hint) {
                    score += LOCATION_HINT_WEIGHT;
                    reasons.push("location_hint_match".to_string());
                }
            }

            let score = round3(score).min(1.0);

            let sic_codes: Vec<String> = item
                .sic_codes
                .iter()
                .filter(|code| !code.is_empty())
                .cloned()
                .collect();
            let classification = classify_from_sic(&sic_codes);

            Some(EmployerCandidate {
                company_number,
                title,
                status: item
                    .company_status
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                address_snippet,
                sic_codes,
                score,
                reasons,
                org_classification: classification.classification,
                classification_reasons: classification.reasons,
            })
        })
        .collect();

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::OrgClassification;

    fn item(number: &str, title: &str) -> RegisterSearchItem {
        RegisterSearchItem {
            company_number: Some(number.to_string()),
            title: Some(title.to_string()),
            company_status: Some("active".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_exact_normalized_match_scores_065() {
        let candidates = rank_register_candidates("Acme Ltd", &[item("1", "ACME LIMITED")], None);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].score >= 0.65);
        assert!(candidates[0]
            .reasons
            .contains(&"exact_normalized_match".to_string()));
    }

    #[test]
    fn test_token_overlap_is_partial_credit() {
        let candidates =
            rank_register_candidates("Acme Widgets", &[item("1", "Acme Trading Ltd")], None);
        // one shared token out of two -> 0.25 * 0.5
        assert_eq!(candidates[0].score, 0.125);
        assert!(candidates[0]
            .reasons
            .contains(&"token_overlap_50".to_string()));
    }

    #[test]
    fn test_location_hint_adds_bonus() {
        let mut hit = item("1", "Acme Ltd");
        hit.address_snippet = Some("5 Deansgate, Manchester, M1 1AA".to_string());
        let candidates = rank_register_candidates("Acme Ltd", &[hit], Some("Manchester"));
        assert!(candidates[0]
            .reasons
            .contains(&"location_hint_match".to_string()));
        assert_eq!(candidates[0].score, 1.0);
    }

    #[test]
    fn test_short_hint_tokens_are_ignored() {
        let mut hit = item("1", "Acme Ltd");
        hit.address_snippet = Some("5 Deansgate, Manchester".to_string());
        let candidates = rank_register_candidates("Acme Ltd", &[hit], Some("M1"));
        assert!(!candidates[0]
            .reasons
            .contains(&"location_hint_match".to_string()));
    }

    #[test]
    fn test_hits_without_identifier_are_dropped() {
        let mut hit = item("", "Acme Ltd");
        hit.company_number = None;
        let candidates = rank_register_candidates("Acme", &[hit, item("2", "Acme Ltd")], None);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].company_number, "2");
    }

    #[test]
    fn test_sort_is_descending_and_stable_on_ties() {
        let candidates = rank_register_candidates(
            "Acme",
            &[
                item("1", "Bravo Ltd"),
                item("2", "Acme Ltd"),
                item("3", "Bravo Ltd"),
            ],
            None,
        );
        assert_eq!(candidates[0].company_number, "2");
        // tied zero-score hits keep input order
        assert_eq!(candidates[1].company_number, "1");
        assert_eq!(candidates[2].company_number, "3");
    }

    #[test]
    fn test_candidates_carry_sic_classification() {
        let mut hit = item("1", "Temp Staff Ltd");
        hit.sic_codes = vec!["78200".to_string()];
        let candidates = rank_register_candidates("Temp Staff", &[hit], None);
        assert_eq!(
            candidates[0].org_classification,
            OrgClassification::Agency
        );
        assert_eq!(candidates[0].classification_reasons, vec!["sic_78200"]);
    }
}
