// src/models/signals.rs
// Composed enrichment result types handed back to callers. Everything here is
// serializable so collaborators (CLI, proxy handlers) can emit it verbatim.

use serde::{Deserialize, Serialize};

use crate::models::core::EmployerCandidate;

/// Overall enrichment status. No-match conditions are statuses, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStatus {
    Available,
    LowConfidence,
    NoData,
    Error,
}

/// Coarse sector emissions-intensity band relative to the map's quantile
/// thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensityBand {
    Low,
    Medium,
    High,
    Unknown,
}

/// Outcome of a sector intensity lookup for a set of classification codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorIntensityResult {
    pub value: Option<f64>,
    pub band: IntensityBand,
    pub matched_code: Option<String>,
    pub description: Option<String>,
}

impl SectorIntensityResult {
    pub fn unknown() -> Self {
        Self {
            value: None,
            band: IntensityBand::Unknown,
            matched_code: None,
            description: None,
        }
    }
}

/// Register-profile-derived signals for the selected candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorSignals {
    pub company_number: String,
    pub sic_codes: Vec<String>,
    pub sector_intensity_band: IntensityBand,
    pub sector_intensity_value: Option<f64>,
    pub sector_intensity_sic_code: Option<String>,
    pub sector_description: Option<String>,
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitmentMatchStatus {
    Matched,
    LowConfidence,
    NoMatch,
}

/// Climate-commitment match result. Record fields are copied verbatim from the
/// snapshot; the matcher asserts nothing about their contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitmentMatch {
    pub match_status: CommitmentMatchStatus,
    pub match_confidence: f64,
    pub matched_company_name: Option<String>,
    pub sbti_id: Option<String>,
    pub near_term_status: Option<String>,
    pub near_term_target_classification: Option<String>,
    pub near_term_target_year: Option<String>,
    pub net_zero_status: Option<String>,
    pub net_zero_year: Option<String>,
    pub ba15_status: Option<String>,
    pub date_updated: Option<String>,
    pub reason_for_extension_or_removal: Option<String>,
    pub sources: Vec<String>,
}

/// Caller-supplied pin that overrides automatic candidate selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualOverride {
    pub company_number: String,
    pub company_name: Option<String>,
}

/// One enrichment request: a free-text employer name plus optional hints.
#[derive(Debug, Clone, Default)]
pub struct EnrichmentRequest {
    pub employer_name: String,
    pub hint_location: Option<String>,
    pub manual_override: Option<ManualOverride>,
    /// Key the rate limiter buckets on; defaults to a shared local key.
    pub caller_key: Option<String>,
}

/// The composed enrichment result.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichmentResult {
    pub status: SignalStatus,
    pub candidates: Vec<EmployerCandidate>,
    pub selected_candidate: Option<EmployerCandidate>,
    pub signals: Option<SectorSignals>,
    pub commitment: Option<CommitmentMatch>,
    pub override_applied: bool,
    pub reason: Option<String>,
}

impl EnrichmentResult {
    pub fn no_data(reason: &str) -> Self {
        Self {
            status: SignalStatus::NoData,
            candidates: Vec::new(),
            selected_candidate: None,
            signals: None,
            commitment: None,
            override_applied: false,
            reason: Some(reason.to_string()),
        }
    }

    pub fn error(reason: &str) -> Self {
        Self {
            status: SignalStatus::Error,
            candidates: Vec::new(),
            selected_candidate: None,
            signals: None,
            commitment: None,
            override_applied: false,
            reason: Some(reason.to_string()),
        }
    }
}
