// src/lib.rs
// Employer enrichment core: reconciles free-text employer names against a
// company register and a static climate-commitments snapshot, with
// deterministic, explainable scoring.

pub mod matching;
pub mod models;
pub mod pipeline;
pub mod register;
pub mod sector;
pub mod snapshot;
pub mod utils;

pub use models::core::{EmployerCandidate, OrgClassification, RegisterProfile, RegisterSearchItem};
pub use models::signals::{
    CommitmentMatch, CommitmentMatchStatus, EnrichmentRequest, EnrichmentResult, IntensityBand,
    ManualOverride, SectorIntensityResult, SectorSignals, SignalStatus,
};
pub use pipeline::EnrichmentService;
pub use register::{HttpRegisterClient, RegisterClient};
pub use sector::SectorIntensityMap;
pub use snapshot::CommitmentSnapshot;
pub use utils::config::EnrichmentConfig;
