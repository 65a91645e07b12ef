//! Threat inference.
//!
//! The pipeline runs once per [`AnalysisInput`](crate::model::AnalysisInput):
//!
//! 1. the [`Detector`] turns the description into a feature vector;
//! 2. system rules are gated by that vector;
//! 3. [`analyze_flows`] and [`analyze_boundaries`] walk the declared entities
//!    in input order;
//! 4. [`analyze_diagram`] adds per-component threats when a diagram exists;
//! 5. [`aggregate`] concatenates and numbers everything.
//!
//! Ordering across and within stages is deterministic.

mod aggregate;
mod boundaries;
mod detector;
mod diagram;
mod engine;
mod flows;

pub use aggregate::aggregate;
pub use boundaries::analyze_boundaries;
pub use detector::{detect, Detector, FeatureEvidence};
pub use diagram::{analyze_diagram, inferred_components};
pub use engine::{analyze, EngineOptions, ThreatEngine};
pub use flows::analyze_flows;
