//! Dependency graph tests: cycle rejection, rollback, and topological
//! execution ordering.

use conductor::core::{
    execution_order, validate_edges, DependencyGraph, DependencyKind, TaskDependency,
};
use conductor::Error;

fn blocking(dependent: &str, prerequisite: &str) -> TaskDependency {
    TaskDependency::blocking(dependent, prerequisite).unwrap()
}

#[test]
fn cycle_is_rejected_and_graph_rolled_back() {
    let mut graph = DependencyGraph::new();
    graph.add_dependency(&blocking("a", "b")).unwrap();

    let err = graph
        .add_dependency(&blocking("b", "a"))
        .expect_err("cycle must be rejected");
    assert!(matches!(err, Error::CircularDependency { .. }));

    // Original edge survives, the rejected one does not
    assert!(graph.has_dependency("a", "b"));
    assert!(!graph.has_dependency("b", "a"));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn three_node_cycle_detected_in_edge_set() {
    let edges = vec![
        blocking("b", "a"),
        blocking("c", "b"),
        blocking("a", "c"),
    ];
    let err = validate_edges(&edges).expect_err("cycle must be detected");
    match err {
        Error::CircularDependency { node } => {
            assert!(["a", "b", "c"].contains(&node.as_str()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn acyclic_set_validates() {
    let edges = vec![
        blocking("b", "a"),
        blocking("c", "a"),
        blocking("d", "b"),
        blocking("d", "c"),
    ];
    validate_edges(&edges).expect("diamond is acyclic");
}

#[test]
fn execution_order_places_prerequisites_first() {
    let edges = vec![
        blocking("deploy", "test"),
        blocking("test", "build"),
        blocking("build", "compile"),
        blocking("docs", "build"),
    ];

    let order = execution_order(&edges).unwrap();
    let pos = |id: &str| order.iter().position(|n| n == id).unwrap();

    assert!(pos("compile") < pos("build"));
    assert!(pos("build") < pos("test"));
    assert!(pos("test") < pos("deploy"));
    assert!(pos("build") < pos("docs"));
    assert_eq!(order.len(), 5);
}

#[test]
fn execution_order_is_stable_across_calls() {
    let edges = vec![
        blocking("x", "root"),
        blocking("y", "root"),
        blocking("z", "root"),
    ];

    let first = execution_order(&edges).unwrap();
    for _ in 0..10 {
        assert_eq!(execution_order(&edges).unwrap(), first);
    }
}

#[test]
fn isolated_prerequisite_appears_in_order() {
    let mut graph = DependencyGraph::new();
    graph.add_blueprint("standalone");
    graph.add_dependency(&blocking("b", "a")).unwrap();

    let order = graph.execution_order().unwrap();
    assert!(order.contains(&"standalone".to_string()));
    assert_eq!(order.len(), 3);
}

#[test]
fn empty_edge_set_yields_empty_order() {
    let order = execution_order(&[]).unwrap();
    assert!(order.is_empty());
}

#[test]
fn duplicate_edges_are_deduplicated() {
    let mut graph = DependencyGraph::new();
    graph.add_dependency(&blocking("b", "a")).unwrap();
    graph
        .add_dependency(&TaskDependency::new("b", "a", DependencyKind::Soft, true).unwrap())
        .unwrap();
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn self_loop_rejected_at_construction() {
    let err = TaskDependency::blocking("a", "a").expect_err("self loop");
    assert!(matches!(err, Error::Validation { .. }));
}
