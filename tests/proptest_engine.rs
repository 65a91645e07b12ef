//! Property-based tests for the inference engine.
//!
//! Ensures analysis never panics on arbitrary input and that numbering,
//! per-flow bounds and determinism hold across random models.

use proptest::prelude::*;
use stride_tools::model::ThreatOrigin;
use stride_tools::{analyze, AnalysisInput, DataFlow, DiagramRef, TrustBoundary};

const WORDS: &[&str] = &[
    "web application", "website", "public facing", "api", "endpoint", "database", "db",
    "cloud", "aws", "azure", "login", "password", "credential", "third party", "external",
    "external facing", "user", "client", "server", "pii", "queue", "report", "calculator",
];

fn description() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(WORDS), 0..8).prop_map(|words| words.join(" "))
}

fn flow() -> impl Strategy<Value = DataFlow> {
    (
        "[A-Za-z][A-Za-z ]{0,15}",
        "[A-Za-z][A-Za-z ]{0,15}",
        "[A-Za-z][A-Za-z ]{0,15}",
    )
        .prop_map(|(s, d, t)| DataFlow::new(s, d, t))
}

fn boundary() -> impl Strategy<Value = TrustBoundary> {
    ("[A-Za-z][A-Za-z ]{0,15}", "[a-z ]{0,20}").prop_map(|(n, d)| TrustBoundary::new(n, d))
}

fn input() -> impl Strategy<Value = AnalysisInput> {
    (
        description(),
        prop::collection::vec(flow(), 0..6),
        prop::collection::vec(boundary(), 0..4),
        any::<bool>(),
    )
        .prop_map(|(description, flows, boundaries, diagram)| AnalysisInput {
            description,
            flows,
            boundaries,
            diagram: diagram.then(|| DiagramRef::new("dfd.png")),
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn arbitrary_description_doesnt_panic(s in "\\PC{0,200}") {
        let _ = analyze(&AnalysisInput::new(s));
    }

    #[test]
    fn ids_are_contiguous_from_one(input in input()) {
        let model = analyze(&input);
        for (i, threat) in model.threats.iter().enumerate() {
            prop_assert_eq!(threat.id.sequence() as usize, i + 1);
        }
        prop_assert_eq!(model.summary.total, model.threats.len());
    }

    #[test]
    fn flow_threats_between_n_and_4n(input in input()) {
        let model = analyze(&input);
        let n = input.flows.len();
        let flow_threats = model.threats.iter().filter(|t| t.origin == ThreatOrigin::Flow).count();
        prop_assert!(flow_threats >= n && flow_threats <= 4 * n);
    }

    #[test]
    fn boundary_threats_between_n_and_3n(input in input()) {
        let model = analyze(&input);
        let n = input.boundaries.len();
        let count = model.threats.iter().filter(|t| t.origin == ThreatOrigin::Boundary).count();
        prop_assert!(count >= n && count <= 3 * n);
    }

    #[test]
    fn analysis_is_deterministic(input in input()) {
        let first = serde_json::to_string(&analyze(&input).threats).unwrap();
        let second = serde_json::to_string(&analyze(&input).threats).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn diagram_threats_only_with_diagram(input in input()) {
        let model = analyze(&input);
        let count = model.threats.iter().filter(|t| t.origin == ThreatOrigin::Diagram).count();
        if input.diagram.is_none() {
            prop_assert_eq!(count, 0);
        } else {
            prop_assert_eq!(count % 3, 0);
            prop_assert!(count <= 12);
        }
    }
}
