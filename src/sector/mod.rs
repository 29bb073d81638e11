// src/sector/mod.rs
// Sector emissions-intensity lookup. The map is a build-time JSON artifact
// keyed by SIC-code prefixes; lookups walk from the most specific prefix down
// to the 2-digit group and never mutate the map.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::matching::classifier::normalize_sic_code;
use crate::models::signals::{IntensityBand, SectorIntensityResult};

#[derive(Debug, Clone, Deserialize)]
pub struct BandThresholds {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntensityMapMeta {
    pub source: String,
    pub generated_at: String,
    pub band_thresholds: BandThresholds,
}

/// Two code-keyed intensity tables plus band thresholds. Loaded once at
/// startup and read-only for the process lifetime.
#[derive(Debug, Clone, Deserialize)]
pub struct SectorIntensityMap {
    pub meta: IntensityMapMeta,
    pub exact: HashMap<String, f64>,
    pub groups: HashMap<String, f64>,
    #[serde(default)]
    pub descriptions: HashMap<String, String>,
}

/// Exact-table hits outrank group-table hits regardless of value.
const EXACT_WEIGHT: u8 = 2;
const GROUP_WEIGHT: u8 = 1;

struct IntensityHit {
    value: f64,
    matched: String,
    weight: u8,
}

pub fn load_intensity_map(path: &Path) -> Result<SectorIntensityMap> {
    let payload = fs::read_to_string(path)
        .with_context(|| format!("Failed to read sector intensity map at {}", path.display()))?;
    let map: SectorIntensityMap = serde_json::from_str(&payload)
        .with_context(|| format!("Malformed sector intensity map at {}", path.display()))?;
    Ok(map)
}

fn find_match(code: &str, map: &SectorIntensityMap) -> Option<IntensityHit> {
    let normalized = normalize_sic_code(code);
    if normalized.is_empty() {
        return None;
    }

    for prefix_len in [5usize, 4, 3] {
        if normalized.len() >= prefix_len {
            let prefix = &normalized[..prefix_len];
            if let Some(value) = map.exact.get(prefix) {
                return Some(IntensityHit {
                    value: *value,
                    matched: prefix.to_string(),
                    weight: EXACT_WEIGHT,
                });
            }
        }
    }

    if normalized.len() >= 2 {
        let group = &normalized[..2];
        if let Some(value) = map.groups.get(group) {
            return Some(IntensityHit {
                value: *value,
                matched: group.to_string(),
                weight: GROUP_WEIGHT,
            });
        }
    }

    None
}

fn pick_band(value: f64, thresholds: &BandThresholds) -> IntensityBand {
    if !value.is_finite() {
        return IntensityBand::Unknown;
    }
    if value <= thresholds.low {
        return IntensityBand::Low;
    }
    if value <= thresholds.high {
        return IntensityBand::Medium;
    }
    IntensityBand::High
}

/// Resolve the intensity for a set of classification codes. Among all code
/// hits the highest weight wins; value ties break toward the higher intensity
/// (the conservative choice). Missing map or empty codes resolve to unknown,
/// never to an error.
pub fn resolve_sector_intensity(
    sic_codes: &[String],
    map: Option<&SectorIntensityMap>,
) -> SectorIntensityResult {
    let Some(map) = map else {
        return SectorIntensityResult::unknown();
    };
    if sic_codes.is_empty() {
        return SectorIntensityResult::unknown();
    }

    let mut best: Option<IntensityHit> = None;
    for code in sic_codes {
        let Some(hit) = find_match(code, map) else {
            continue;
        };
        best = match best {
            None => Some(hit),
            Some(current) => {
                if hit.weight > current.weight
                    || (hit.weight == current.weight && hit.value > current.value)
                {
                    Some(hit)
                } else {
                    Some(current)
                }
            }
        };
    }

    let Some(best) = best else {
        return SectorIntensityResult::unknown();
    };

    let description = map
        .descriptions
        .get(&best.matched)
        .or_else(|| {
            if best.matched.len() > 2 {
                map.descriptions.get(&best.matched[..2])
            } else {
                None
            }
        })
        .cloned();

    SectorIntensityResult {
        value: Some(best.value),
        band: pick_band(best.value, &map.meta.band_thresholds),
        matched_code: Some(best.matched),
        description,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_map(exact: &[(&str, f64)], groups: &[(&str, f64)]) -> SectorIntensityMap {
        SectorIntensityMap {
            meta: IntensityMapMeta {
                source: "test".to_string(),
                generated_at: "2026-01-27".to_string(),
                band_thresholds: BandThresholds { low: 1.0, high: 3.0 },
            },
            exact: exact.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            groups: groups.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            descriptions: HashMap::new(),
        }
    }

    fn codes(list: &[&str]) -> Vec<String> {
        list.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_exact_prefix_wins_over_group() {
        let map = test_map(&[("62020", 0.5)], &[("62", 0.8)]);
        let result = resolve_sector_intensity(&codes(&["62020"]), Some(&map));
        assert_eq!(result.value, Some(0.5));
        assert_eq!(result.matched_code.as_deref(), Some("62020"));
        assert_eq!(result.band, IntensityBand::Low);
    }

    #[test]
    fn test_exact_beats_group_across_codes() {
        let map = test_map(&[("2011", 4.0)], &[("62", 0.8)]);
        let result = resolve_sector_intensity(&codes(&["2011", "62"]), Some(&map));
        assert_eq!(result.value, Some(4.0));
        assert_eq!(result.band, IntensityBand::High);
    }

    #[test]
    fn test_prefix_fallback_walks_to_shorter_keys() {
        let map = test_map(&[("620", 0.5)], &[]);
        let result = resolve_sector_intensity(&codes(&["62020"]), Some(&map));
        assert_eq!(result.value, Some(0.5));
        assert_eq!(result.matched_code.as_deref(), Some("620"));
    }

    #[test]
    fn test_equal_weight_ties_break_to_higher_value() {
        let map = test_map(&[("111", 2.0), ("222", 3.5)], &[]);
        let result = resolve_sector_intensity(&codes(&["11100", "22200"]), Some(&map));
        assert_eq!(result.value, Some(3.5));
        assert_eq!(result.band, IntensityBand::High);
    }

    #[test]
    fn test_band_boundaries_are_inclusive() {
        let map = test_map(&[("100", 1.0), ("200", 3.0), ("300", 3.01)], &[]);
        assert_eq!(
            resolve_sector_intensity(&codes(&["10000"]), Some(&map)).band,
            IntensityBand::Low
        );
        assert_eq!(
            resolve_sector_intensity(&codes(&["20000"]), Some(&map)).band,
            IntensityBand::Medium
        );
        assert_eq!(
            resolve_sector_intensity(&codes(&["30000"]), Some(&map)).band,
            IntensityBand::High
        );
    }

    #[test]
    fn test_description_falls_back_to_group_prefix() {
        let mut map = test_map(&[("62020", 0.5)], &[]);
        map.descriptions
            .insert("62".to_string(), "Information technology".to_string());
        let result = resolve_sector_intensity(&codes(&["62020"]), Some(&map));
        assert_eq!(result.description.as_deref(), Some("Information technology"));
    }

    #[test]
    fn test_unmatched_codes_resolve_to_unknown() {
        let map = test_map(&[("62020", 0.5)], &[]);
        let result = resolve_sector_intensity(&codes(&["99999"]), Some(&map));
        assert_eq!(result.value, None);
        assert_eq!(result.band, IntensityBand::Unknown);
    }

    #[test]
    fn test_missing_map_and_empty_codes_resolve_to_unknown() {
        let map = test_map(&[("62020", 0.5)], &[]);
        assert_eq!(
            resolve_sector_intensity(&codes(&["62020"]), None).band,
            IntensityBand::Unknown
        );
        assert_eq!(
            resolve_sector_intensity(&[], Some(&map)).band,
            IntensityBand::Unknown
        );
    }
}
