//! Domain model for STRIDE threat modeling.
//!
//! Inputs are the declared system elements ([`DataFlow`], [`TrustBoundary`])
//! gathered into an [`AnalysisInput`]; outputs are numbered [`Threat`]s
//! collected into a [`ThreatModel`].

mod features;
mod stride;
mod system;
mod threat;
mod threat_model;

pub use features::{Feature, FeatureSet};
pub use stride::StrideCategory;
pub use system::{AnalysisInput, DataFlow, DiagramRef, TrustBoundary, EDGE_ARROW};
pub use threat::{Threat, ThreatDraft, ThreatId, ThreatOrigin};
pub use threat_model::{fingerprint_input, ThreatModel, ThreatSummary};
