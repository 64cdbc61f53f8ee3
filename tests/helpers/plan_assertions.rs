//! Assertion helpers for plan documents.

use xplan::{NodeKind, Plan};

/// Kinds of the plan's direct children, in order.
pub fn top_level_kinds(plan: &Plan) -> Vec<NodeKind> {
    plan.sequence.iter().map(|n| n.node_kind()).collect()
}

/// Ids of the plan's direct children, in order.
pub fn top_level_ids(plan: &Plan) -> Vec<String> {
    plan.sequence
        .iter()
        .map(|n| n.id().unwrap_or_default().to_string())
        .collect()
}

/// Assert every node in the plan carries an identifier.
pub fn assert_fully_identified(plan: &Plan) {
    for node in plan.iter_nodes() {
        assert!(
            node.id().is_some(),
            "Expected every node to have an id, found {} without one",
            node.kind_name()
        );
    }
}

/// Assert stations and segments alternate, starting and ending with a station.
pub fn assert_alternating(plan: &Plan) {
    let kinds = top_level_kinds(plan);
    for (i, kind) in kinds.iter().enumerate() {
        let expected = if i % 2 == 0 {
            NodeKind::Station
        } else {
            NodeKind::Segment
        };
        assert_eq!(
            *kind, expected,
            "Expected {:?} at position {}, got {:?}",
            expected, i, kind
        );
    }
    assert_eq!(
        kinds.last(),
        Some(&NodeKind::Station),
        "Expected the path to end with a station"
    );
}

/// Number of non-overlapping occurrences of `needle` in `haystack`.
pub fn count_occurrences(haystack: &str, needle: &str) -> usize {
    haystack.matches(needle).count()
}
