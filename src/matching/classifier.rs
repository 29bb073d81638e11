// src/matching/classifier.rs
// SIC-code based agency/employer classification.

use std::collections::HashSet;

use crate::models::core::OrgClassification;

/// Division 78 is "employment activities" in the UK SIC 2007 scheme; these
/// five-digit codes are the placement/supply classes within and around it.
const AGENCY_SIC_PREFIX: &str = "78";
const AGENCY_SIC_CODES: [&str; 4] = ["78101", "78109", "78200", "78300"];

#[derive(Debug, Clone, PartialEq)]
pub struct SicClassification {
    pub classification: OrgClassification,
    pub reasons: Vec<String>,
}

/// Strip a free-form classification code down to its digits.
pub fn normalize_sic_code(code: &str) -> String {
    code.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Classify an organisation from its SIC codes. Any agency-signal code makes
/// the whole organisation an agency, with one `sic_<code>` reason per matching
/// code (first-seen order, deduplicated). No codes at all means unknown.
pub fn classify_from_sic(sic_codes: &[String]) -> SicClassification {
    let normalized: Vec<String> = sic_codes
        .iter()
        .map(|code| normalize_sic_code(code))
        .filter(|code| !code.is_empty())
        .collect();

    if normalized.is_empty() {
        return SicClassification {
            classification: OrgClassification::Unknown,
            reasons: Vec::new(),
        };
    }

    let mut seen = HashSet::new();
    let mut reasons = Vec::new();
    for code in &normalized {
        let is_agency = code.starts_with(AGENCY_SIC_PREFIX)
            || AGENCY_SIC_CODES.contains(&code.as_str());
        if is_agency && seen.insert(code.clone()) {
            reasons.push(format!("sic_{}", code));
        }
    }

    if reasons.is_empty() {
        SicClassification {
            classification: OrgClassification::Employer,
            reasons,
        }
    } else {
        SicClassification {
            classification: OrgClassification::Agency,
            reasons,
        }
    }
}
