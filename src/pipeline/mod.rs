// src/pipeline/mod.rs
// Enrichment orchestration: register lookup -> candidate ranking -> selection
// (manual override wins) -> profile/sector signals -> commitment match. Cache
// and rate limiter wrap the externally-facing calls; every failure mode is
// reported in-band on the result, never as an escaped error.

use std::sync::Arc;

use log::{debug, warn};
use serde_json::json;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::matching::commitments::match_commitment;
use crate::matching::normalize::normalize_loose;
use crate::matching::ranker::rank_register_candidates;
use crate::models::core::{EmployerCandidate, OrgClassification, RegisterProfile};
use crate::models::signals::{
    EnrichmentRequest, EnrichmentResult, ManualOverride, SectorSignals, SignalStatus,
};
use crate::register::RegisterClient;
use crate::sector::{resolve_sector_intensity, SectorIntensityMap};
use crate::snapshot::CommitmentSnapshot;
use crate::utils::cache::TtlCache;
use crate::utils::config::EnrichmentConfig;
use crate::utils::rate_limit::FixedWindowRateLimiter;
use crate::utils::request_fingerprint;

/// Top-candidate scores at or above this report as fully available.
const HIGH_CONFIDENCE_SCORE: f64 = 0.7;
const DEFAULT_CALLER_KEY: &str = "local";

const REGISTER_SOURCE: &str = "companies_house";
const SECTOR_SOURCE: &str = "ons";

fn classify_status(score: f64) -> SignalStatus {
    if !score.is_finite() {
        return SignalStatus::NoData;
    }
    if score >= HIGH_CONFIDENCE_SCORE {
        SignalStatus::Available
    } else {
        SignalStatus::LowConfidence
    }
}

/// Apply a manual pin over the ranked candidates. A pin matching a ranked
/// candidate selects it; an unmatched pin synthesizes a candidate so the
/// caller's choice is always honoured.
fn pick_selected(
    candidates: &[EmployerCandidate],
    manual_override: Option<&ManualOverride>,
) -> (Option<EmployerCandidate>, bool) {
    if let Some(pin) = manual_override {
        if !pin.company_number.is_empty() {
            if let Some(matched) = candidates
                .iter()
                .find(|candidate| candidate.company_number == pin.company_number)
            {
                return (Some(matched.clone()), true);
            }
            return (
                Some(EmployerCandidate {
                    company_number: pin.company_number.clone(),
                    title: pin
                        .company_name
                        .clone()
                        .unwrap_or_else(|| pin.company_number.clone()),
                    status: "override".to_string(),
                    address_snippet: String::new(),
                    sic_codes: Vec::new(),
                    score: 1.0,
                    reasons: vec!["user_override".to_string()],
                    org_classification: OrgClassification::Unknown,
                    classification_reasons: Vec::new(),
                }),
                true,
            );
        }
    }

    (candidates.first().cloned(), false)
}

/// The enrichment pipeline. Reference data is injected once at construction
/// and treated as immutable; missing data degrades lookups instead of
/// failing them.
pub struct EnrichmentService {
    config: EnrichmentConfig,
    register: Arc<dyn RegisterClient>,
    sector_map: Option<SectorIntensityMap>,
    commitments: Option<CommitmentSnapshot>,
    resolve_cache: Mutex<TtlCache<Vec<EmployerCandidate>>>,
    profile_cache: Mutex<TtlCache<RegisterProfile>>,
    rate_limiter: Mutex<FixedWindowRateLimiter>,
}

impl EnrichmentService {
    pub fn new(
        config: EnrichmentConfig,
        register: Arc<dyn RegisterClient>,
        sector_map: Option<SectorIntensityMap>,
        commitments: Option<CommitmentSnapshot>,
    ) -> Self {
        let resolve_cache = TtlCache::new(config.resolve_ttl, config.cache_max);
        let profile_cache = TtlCache::new(config.profile_ttl, config.cache_max);
        let rate_limiter =
            FixedWindowRateLimiter::new(config.rate_limit_window, config.rate_limit_max);
        Self {
            config,
            register,
            sector_map,
            commitments,
            resolve_cache: Mutex::new(resolve_cache),
            profile_cache: Mutex::new(profile_cache),
            rate_limiter: Mutex::new(rate_limiter),
        }
    }

    /// Run one enrichment. Never returns an error: upstream failures and
    /// no-match conditions are encoded in the result status.
    pub async fn enrich(&self, request: &EnrichmentRequest) -> EnrichmentResult {
        let name = request.employer_name.trim();
        if name.is_empty() {
            return EnrichmentResult::no_data("Missing employer name");
        }

        let caller_key = request.caller_key.as_deref().unwrap_or(DEFAULT_CALLER_KEY);
        let decision = self.rate_limiter.lock().await.check(caller_key);
        if !decision.allowed {
            let retry_secs = decision
                .retry_after
                .map(|wait| wait.as_secs().max(1))
                .unwrap_or(1);
            return EnrichmentResult::error(&format!(
                "Rate limit exceeded; retry in {}s",
                retry_secs
            ));
        }

        let request_id = Uuid::new_v4();
        debug!("[{}] enriching employer '{}'", request_id, name);

        let candidates = match self
            .resolve_candidates(name, request.hint_location.as_deref())
            .await
        {
            Ok(candidates) => candidates,
            Err(error) => {
                warn!("[{}] register resolve failed: {:#}", request_id, error);
                return EnrichmentResult::error(&format!("Failed to resolve employer: {}", error));
            }
        };

        let (selected, override_applied) =
            pick_selected(&candidates, request.manual_override.as_ref());

        // The commitments snapshot is keyed by name alone, so it is matched
        // even when the register has no candidate for the employer.
        let commitment = match_commitment(
            name,
            self.commitments.as_ref(),
            self.config.fuzzy_threshold,
        );

        let Some(selected) = selected else {
            return EnrichmentResult {
                status: SignalStatus::NoData,
                candidates,
                selected_candidate: None,
                signals: None,
                commitment: Some(commitment),
                override_applied: false,
                reason: Some("No match".to_string()),
            };
        };

        let status = if override_applied {
            SignalStatus::Available
        } else {
            classify_status(selected.score)
        };

        let signals = match self.fetch_signals(&selected.company_number).await {
            Ok(signals) => Some(signals),
            Err(error) => {
                warn!("[{}] profile lookup failed: {:#}", request_id, error);
                None
            }
        };

        EnrichmentResult {
            status,
            candidates,
            selected_candidate: Some(selected),
            signals,
            commitment: Some(commitment),
            override_applied,
            reason: override_applied.then(|| "user-selected".to_string()),
        }
    }

    /// Ranked candidates for a query, through the resolve cache. Two
    /// concurrent misses for the same key both call upstream and both write;
    /// last write wins, which is fine because responses are idempotent.
    async fn resolve_candidates(
        &self,
        name: &str,
        hint_location: Option<&str>,
    ) -> anyhow::Result<Vec<EmployerCandidate>> {
        let cache_key = request_fingerprint(&json!({
            "name": normalize_loose(name),
            "hint_location": hint_location.unwrap_or("").trim().to_lowercase(),
        }));

        if let Some(cached) = self.resolve_cache.lock().await.get(&cache_key) {
            debug!("resolve cache hit for '{}'", name);
            return Ok(cached);
        }

        let items = self.register.search_companies(name).await?;
        let candidates = rank_register_candidates(name, &items, hint_location);
        self.resolve_cache
            .lock()
            .await
            .set(cache_key, candidates.clone());
        Ok(candidates)
    }

    /// Profile-derived sector signals for the selected candidate, through the
    /// profile cache.
    async fn fetch_signals(&self, company_number: &str) -> anyhow::Result<SectorSignals> {
        let cached = self.profile_cache.lock().await.get(company_number);
        let profile = match cached {
            Some(profile) => profile,
            None => {
                let profile = self.register.company_profile(company_number).await?;
                self.profile_cache
                    .lock()
                    .await
                    .set(company_number.to_string(), profile.clone());
                profile
            }
        };

        let sic_codes: Vec<String> = profile
            .sic_codes
            .iter()
            .filter(|code| !code.is_empty())
            .cloned()
            .collect();
        let intensity = resolve_sector_intensity(&sic_codes, self.sector_map.as_ref());

        let mut sources = vec![REGISTER_SOURCE.to_string()];
        if intensity.value.is_some() {
            sources.push(SECTOR_SOURCE.to_string());
        }

        Ok(SectorSignals {
            company_number: profile
                .company_number
                .unwrap_or_else(|| company_number.to_string()),
            sic_codes,
            sector_intensity_band: intensity.band,
            sector_intensity_value: intensity.value,
            sector_intensity_sic_code: intensity.matched_code,
            sector_description: intensity.description,
            sources,
        })
    }
}
