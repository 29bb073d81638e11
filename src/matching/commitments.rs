// src/matching/commitments.rs
// Approximate matching of employer names against the climate-commitments
// snapshot. Exact loose-name hits win outright; otherwise candidates come from
// the rare-token inverted index and are scored with a token-set edit-distance
// ratio. All scoring is deterministic: candidate pools are ordered by hit
// count with id tie-breaks, and best-pick ties prefer UK records then strict
// name equality.

use std::collections::{HashMap, HashSet};

use strsim::levenshtein;

use crate::matching::normalize::{normalize_loose, normalize_strict, tokenize};
use crate::models::signals::{CommitmentMatch, CommitmentMatchStatus};
use crate::snapshot::{CommitmentRecord, CommitmentSnapshot};

pub const DEFAULT_FUZZY_SCORE_THRESHOLD: u32 = 95;
const STRONG_TOKEN_LENGTH: usize = 4;
const MIN_TOKEN_MATCHES: usize = 2;
const MAX_CANDIDATES: usize = 200;

const COMMITMENT_SOURCE: &str = "SBTi Companies Taking Action (snapshot)";

const UK_LOCATION_MARKERS: [&str; 7] = [
    "united kingdom",
    "uk",
    "great britain",
    "england",
    "scotland",
    "wales",
    "northern ireland",
];

fn is_uk_location(location: Option<&str>) -> bool {
    let Some(location) = location else {
        return false;
    };
    let normalized = location.to_lowercase();
    UK_LOCATION_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
}

fn empty_result() -> CommitmentMatch {
    CommitmentMatch {
        match_status: CommitmentMatchStatus::NoMatch,
        match_confidence: 0.0,
        matched_company_name: None,
        sbti_id: None,
        near_term_status: None,
        near_term_target_classification: None,
        near_term_target_year: None,
        net_zero_status: None,
        net_zero_year: None,
        ba15_status: None,
        date_updated: None,
        reason_for_extension_or_removal: None,
        sources: vec![COMMITMENT_SOURCE.to_string()],
    }
}

fn build_result(
    record: &CommitmentRecord,
    status: CommitmentMatchStatus,
    confidence: f64,
) -> CommitmentMatch {
    CommitmentMatch {
        match_status: status,
        match_confidence: confidence,
        matched_company_name: record.company_name.clone(),
        sbti_id: record.sbti_id.clone(),
        near_term_status: record.near_term_status.clone(),
        near_term_target_classification: record.near_term_target_classification.clone(),
        near_term_target_year: record.near_term_target_year.clone(),
        net_zero_status: record.net_zero_status.clone(),
        net_zero_year: record.net_zero_year.clone(),
        ba15_status: record.ba15_status.clone(),
        date_updated: record.date_updated.clone(),
        reason_for_extension_or_removal: record.reason_for_extension_or_removal.clone(),
        sources: vec![COMMITMENT_SOURCE.to_string()],
    }
}

/// Percentage similarity of two strings from their Levenshtein distance.
fn ratio_score(a: &str, b: &str) -> u32 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100;
    }
    let distance = levenshtein(a, b);
    ((1.0 - distance as f64 / max_len as f64) * 100.0).round() as u32
}

/// Token-set similarity: both names are reduced to sorted unique-token
/// strings, with the sorted intersection used as a pivot. The max of the three
/// pairwise ratios tolerates word reordering and one-sided extra tokens.
fn token_set_ratio(a: &str, b: &str) -> u32 {
    let tokens_a: std::collections::BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: std::collections::BTreeSet<&str> = b.split_whitespace().collect();

    let intersection: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let sorted_intersection = intersection.join(" ");
    let combined_a = tokens_a.iter().copied().collect::<Vec<_>>().join(" ");
    let combined_b = tokens_b.iter().copied().collect::<Vec<_>>().join(" ");

    ratio_score(&sorted_intersection, &combined_a)
        .max(ratio_score(&sorted_intersection, &combined_b))
        .max(ratio_score(&combined_a, &combined_b))
}

fn has_strong_token_overlap(
    query_tokens: &[String],
    candidate_tokens: &[String],
    stopwords: &HashSet<&str>,
) -> bool {
    let candidate_set: HashSet<&str> = candidate_tokens.iter().map(|t| t.as_str()).collect();
    query_tokens
        .iter()
        .filter(|token| token.chars().count() >= STRONG_TOKEN_LENGTH)
        .filter(|token| !stopwords.contains(token.as_str()))
        .any(|token| candidate_set.contains(token.as_str()))
}

/// Candidate ids from the rare-token inverted index, ordered by distinct-token
/// hit count (descending, id tie-break) and capped. Queries with fewer than
/// two discriminative tokens produce no candidates at all.
fn build_candidate_ids(
    query_tokens: &[String],
    snapshot: &CommitmentSnapshot,
    stopwords: &HashSet<&str>,
) -> Vec<String> {
    let mut seen_tokens = HashSet::new();
    let filtered: Vec<&String> = query_tokens
        .iter()
        .filter(|token| !stopwords.contains(token.as_str()))
        .filter(|token| snapshot.index.tokens.contains_key(token.as_str()))
        .filter(|token| seen_tokens.insert(token.as_str()))
        .collect();

    if filtered.len() < MIN_TOKEN_MATCHES {
        return Vec::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for token in &filtered {
        if let Some(ids) = snapshot.index.tokens.get(token.as_str()) {
            for id in ids {
                *counts.entry(id.as_str()).or_insert(0) += 1;
            }
        }
    }

    let mut ranked: Vec<(&str, usize)> = counts
        .into_iter()
        .filter(|(_, count)| *count >= MIN_TOKEN_MATCHES)
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(MAX_CANDIDATES);

    ranked.into_iter().map(|(id, _)| id.to_string()).collect()
}

fn pick_exact_match<'a>(
    ids: &[String],
    normalized_strict: &str,
    snapshot: &'a CommitmentSnapshot,
) -> Option<&'a CommitmentRecord> {
    let candidates: Vec<_> = ids.iter().filter_map(|id| snapshot.entry(id)).collect();
    if candidates.is_empty() {
        return None;
    }

    let uk_candidates: Vec<_> = candidates
        .iter()
        .filter(|(record, _)| is_uk_location(record.location.as_deref()))
        .copied()
        .collect();
    let pool = if uk_candidates.is_empty() {
        &candidates
    } else {
        &uk_candidates
    };

    let strict_match = pool
        .iter()
        .find(|(_, indexed)| indexed.name_strict == normalized_strict);
    Some(strict_match.unwrap_or(&pool[0]).0)
}

struct FuzzyBest<'a> {
    record: &'a CommitmentRecord,
    score: u32,
    strict_match: bool,
    is_uk: bool,
}

/// Match an employer name against the commitments snapshot. Missing snapshot
/// or empty name resolve to no_match, never to an error.
pub fn match_commitment(
    name: &str,
    snapshot: Option<&CommitmentSnapshot>,
    fuzzy_threshold: u32,
) -> CommitmentMatch {
    let Some(snapshot) = snapshot else {
        return empty_result();
    };
    if name.is_empty() {
        return empty_result();
    }

    let normalized_strict = normalize_strict(name);
    let normalized_loose = normalize_loose(name);
    if normalized_loose.is_empty() {
        return empty_result();
    }

    // Exact path: a loose-name index hit is a full-confidence match.
    if let Some(ids) = snapshot.index.names.get(&normalized_loose) {
        if let Some(record) = pick_exact_match(ids, &normalized_strict, snapshot) {
            return build_result(record, CommitmentMatchStatus::Matched, 1.0);
        }
    }

    // Fuzzy path: only worth attempting for names with enough tokens to be
    // discriminative.
    let query_tokens = tokenize(&normalized_loose);
    if query_tokens.len() <= 2 {
        return empty_result();
    }

    let stopwords = snapshot.stopwords();
    let candidate_ids = build_candidate_ids(&query_tokens, snapshot, &stopwords);
    if candidate_ids.is_empty() {
        return empty_result();
    }

    let mut best: Option<FuzzyBest> = None;
    for id in &candidate_ids {
        let Some((record, indexed)) = snapshot.entry(id) else {
            continue;
        };

        let score = token_set_ratio(&normalized_loose, &indexed.name_loose);
        if score < fuzzy_threshold {
            continue;
        }
        if !has_strong_token_overlap(&query_tokens, &indexed.tokens, &stopwords) {
            continue;
        }

        let candidate = FuzzyBest {
            record,
            score,
            strict_match: indexed.name_strict == normalized_strict,
            is_uk: is_uk_location(record.location.as_deref()),
        };

        best = match best {
            None => Some(candidate),
            Some(current) => {
                if candidate.score > current.score
                    || (candidate.score == current.score
                        && ((candidate.is_uk && !current.is_uk)
                            || (candidate.is_uk == current.is_uk
                                && candidate.strict_match
                                && !current.strict_match)))
                {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        };
    }

    match best {
        Some(best) => build_result(
            best.record,
            CommitmentMatchStatus::LowConfidence,
            best.score as f64 / 100.0,
        ),
        None => empty_result(),
    }
}
