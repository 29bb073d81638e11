// src/snapshot/mod.rs
// Loading and validation of the climate-commitments snapshot: a record store
// plus a pre-built name index (exact loose-name map and rare-token inverted
// map). Both are versioned JSON artifacts loaded once at startup.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

/// One climate-commitment record. Fields are copied verbatim into match
/// results; nothing here is interpreted by the matcher.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CommitmentRecord {
    pub sbti_id: Option<String>,
    pub company_name: Option<String>,
    pub location: Option<String>,
    pub region: Option<String>,
    pub sector: Option<String>,
    pub near_term_status: Option<String>,
    pub near_term_target_classification: Option<String>,
    pub near_term_target_year: Option<String>,
    pub net_zero_status: Option<String>,
    pub net_zero_year: Option<String>,
    pub ba15_status: Option<String>,
    pub date_updated: Option<String>,
    pub reason_for_extension_or_removal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecordsPayload {
    records: HashMap<String, CommitmentRecord>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameIndexMeta {
    pub snapshot_file: Option<String>,
    pub generated_at: Option<String>,
    pub record_count: Option<usize>,
    pub min_token_length: Option<usize>,
    pub rare_token_max: Option<usize>,
    #[serde(default)]
    pub stopwords: Vec<String>,
    #[serde(default)]
    pub token_frequencies: HashMap<String, u32>,
}

/// Pre-normalized name forms for one record, built offline alongside the
/// snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexedName {
    pub name_strict: String,
    pub name_loose: String,
    pub tokens: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NameIndex {
    #[serde(default)]
    pub meta: NameIndexMeta,
    /// Exact loose-normalized name -> record ids.
    #[serde(default)]
    pub names: HashMap<String, Vec<String>>,
    /// Rare token -> record ids (tokens appearing in few enough records to be
    /// discriminative).
    #[serde(default)]
    pub tokens: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub records: HashMap<String, IndexedName>,
}

/// The immutable record-store + name-index pair the matcher runs against.
#[derive(Debug, Clone)]
pub struct CommitmentSnapshot {
    pub records: HashMap<String, CommitmentRecord>,
    pub index: NameIndex,
}

impl CommitmentSnapshot {
    /// Load both artifacts and quarantine index entries without a backing
    /// record. Any read or parse failure surfaces as an error so the caller
    /// can degrade to a snapshot-less pipeline.
    pub fn load(records_path: &Path, index_path: &Path) -> Result<Self> {
        let records_raw = fs::read_to_string(records_path).with_context(|| {
            format!(
                "Failed to read commitment records at {}",
                records_path.display()
            )
        })?;
        let records: RecordsPayload = serde_json::from_str(&records_raw).with_context(|| {
            format!(
                "Malformed commitment records at {}",
                records_path.display()
            )
        })?;

        let index_raw = fs::read_to_string(index_path).with_context(|| {
            format!("Failed to read name index at {}", index_path.display())
        })?;
        let index: NameIndex = serde_json::from_str(&index_raw)
            .with_context(|| format!("Malformed name index at {}", index_path.display()))?;

        let mut snapshot = Self {
            records: records.records,
            index,
        };
        snapshot.quarantine_orphans();
        Ok(snapshot)
    }

    /// Drop index entries that reference ids missing from the record store.
    /// Orphans are a build defect in the artifacts; they are logged, not fatal.
    fn quarantine_orphans(&mut self) {
        let known: HashSet<&String> = self.records.keys().collect();
        let before = self.index.records.len();

        self.index.records.retain(|id, _| known.contains(id));
        for ids in self.index.names.values_mut() {
            ids.retain(|id| known.contains(id));
        }
        self.index.names.retain(|_, ids| !ids.is_empty());
        for ids in self.index.tokens.values_mut() {
            ids.retain(|id| known.contains(id));
        }
        self.index.tokens.retain(|_, ids| !ids.is_empty());

        let dropped = before - self.index.records.len();
        if dropped > 0 {
            warn!(
                "Commitment snapshot: quarantined {} index entries without backing records",
                dropped
            );
        }
    }

    /// A record together with its pre-normalized index entry, when both exist.
    pub fn entry(&self, id: &str) -> Option<(&CommitmentRecord, &IndexedName)> {
        let record = self.records.get(id)?;
        let indexed = self.index.records.get(id)?;
        Some((record, indexed))
    }

    pub fn stopwords(&self) -> HashSet<&str> {
        self.index
            .meta
            .stopwords
            .iter()
            .map(|s| s.as_str())
            .collect()
    }
}
