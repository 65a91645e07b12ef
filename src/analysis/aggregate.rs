//! Threat aggregation and numbering.

use crate::model::{Threat, ThreatDraft, ThreatId};

/// Concatenate stage outputs and number them `T1..Tn`.
///
/// Order is system, flows, boundaries, diagram. No deduplication is done and
/// numbering restarts at 1 on every call.
#[must_use]
pub fn aggregate(
    system: Vec<ThreatDraft>,
    flows: Vec<ThreatDraft>,
    boundaries: Vec<ThreatDraft>,
    diagram: Vec<ThreatDraft>,
) -> Vec<Threat> {
    system
        .into_iter()
        .chain(flows)
        .chain(boundaries)
        .chain(diagram)
        .zip(1u32..)
        .map(|(draft, n)| draft.into_threat(ThreatId::new(n)))
        .collect()
}
