#![allow(non_snake_case)]

use crate::stp::{PortRole, PortState, StpConfig};
use crate::topology::{Topology, TopologyError};

fn fast_config() -> StpConfig {
    StpConfig::new(2, 4, 6, 19, 0x8000)
}

#[test]
pub fn AddLink_SelfLoop_Rejected() {
    // Arrange
    let mut topo = Topology::new(fast_config());

    // Act
    let result = topo.add_link("a", 0, "a", 1);

    // Assert
    assert!(matches!(result, Err(TopologyError::SelfLoop(_))));
}

#[test]
pub fn AddLink_Duplicate_Rejected() {
    // Arrange
    let mut topo = Topology::new(fast_config());
    topo.add_link("a", 0, "b", 0).unwrap();

    // Act
    let result = topo.add_link("a", 1, "b", 1);

    // Assert
    assert!(matches!(result, Err(TopologyError::DuplicateLink(_, _))));
}

#[test]
pub fn BreakLink_UnknownBridge_Rejected() {
    // Arrange
    let mut topo = Topology::new(fast_config());
    topo.add_link("a", 0, "b", 0).unwrap();

    // Act
    let result = topo.break_link("nope", 0);

    // Assert
    assert!(matches!(result, Err(TopologyError::BridgeNotFound(_))));
}

#[test]
pub fn TwoBridgeChain_Converges_WithOneRootPort() {
    // Arrange: "a" sorts before "b" lexicographically, so it becomes root.
    let mut topo = Topology::new(fast_config());
    topo.add_link("a", 0, "b", 0).unwrap();

    // Act
    topo.run();

    // Assert
    let a = topo.bridge("a").unwrap();
    let b = topo.bridge("b").unwrap();
    assert!(a.is_root());
    assert!(!b.is_root());
    assert_eq!(b.root_port(), Some(0));
    assert_eq!(b.port(0).unwrap().role(), PortRole::Root);
    assert_eq!(a.port(0).unwrap().role(), PortRole::Designated);
    assert_eq!(a.port(0).unwrap().state(), PortState::Forwarding);
    assert_eq!(b.port(0).unwrap().state(), PortState::Forwarding);
}

#[test]
pub fn Triangle_Converges_WithOneBlockedPort() {
    // Arrange: a triangle of three bridges has one redundant link, which
    // must end up with at least one end Blocking once converged.
    let mut topo = Topology::new(fast_config());
    topo.add_link("a", 0, "b", 0).unwrap();
    topo.add_link("b", 1, "c", 0).unwrap();
    topo.add_link("c", 1, "a", 1).unwrap();

    // Act
    topo.run();

    // Assert
    let forwarding_count: usize = topo
        .bridges()
        .iter()
        .flat_map(|b| b.ports())
        .filter(|p| p.state() == PortState::Forwarding)
        .count();
    // 3 bridges, spanning tree has 2 edges => 4 forwarding port endpoints.
    assert_eq!(forwarding_count, 4);

    let blocked_count: usize = topo
        .bridges()
        .iter()
        .flat_map(|b| b.ports())
        .filter(|p| p.state() == PortState::Blocking)
        .count();
    assert!(blocked_count >= 1);

    assert!(topo.bridge("a").unwrap().is_root());
}

#[test]
pub fn LinearFourBridge_SingleRootAcrossAll() {
    // Arrange
    let mut topo = Topology::new(fast_config());
    topo.add_link("a", 0, "b", 0).unwrap();
    topo.add_link("b", 1, "c", 0).unwrap();
    topo.add_link("c", 1, "d", 0).unwrap();

    // Act
    topo.run();

    // Assert: single root, identical across all bridges, and it is the
    // minimum Bridge ID present.
    let root_ids: Vec<_> = topo.bridges().iter().map(|b| b.root_id().clone()).collect();
    assert!(root_ids.iter().all(|r| *r == root_ids[0]));
    let min_id = topo.bridges().iter().map(|b| b.id().clone()).min().unwrap();
    assert_eq!(root_ids[0], min_id);
}

#[test]
pub fn SquareWithDiagonal_NoForwardingLoop() {
    // Arrange: a square a-b-c-d-a plus a diagonal a-c.
    let mut topo = Topology::new(fast_config());
    topo.add_link("a", 0, "b", 0).unwrap();
    topo.add_link("b", 1, "c", 0).unwrap();
    topo.add_link("c", 1, "d", 0).unwrap();
    topo.add_link("d", 1, "a", 1).unwrap();
    topo.add_link("a", 2, "c", 2).unwrap();

    // Act
    topo.run();

    // Assert: the forwarding subgraph must be a spanning tree over 4
    // bridges, i.e. exactly 3 edges / 6 forwarding port endpoints.
    let forwarding_count: usize = topo
        .bridges()
        .iter()
        .flat_map(|b| b.ports())
        .filter(|p| p.state() == PortState::Forwarding)
        .count();
    assert_eq!(forwarding_count, 6);
}

#[test]
pub fn BreakRootLink_AfterConvergence_Reconverges() {
    // Arrange
    let mut topo = Topology::new(fast_config());
    topo.add_link("a", 0, "b", 0).unwrap();
    topo.add_link("b", 1, "c", 0).unwrap();
    topo.add_link("c", 1, "a", 1).unwrap();
    topo.run();
    assert!(topo.bridge("a").unwrap().is_root());

    // Act: sever the link between the root and "b" from b's side.
    topo.break_link("b", 0).unwrap();
    topo.run();

    // Assert: topology is still connected via c, and reconverges with a
    // single root port on b (now reached via c).
    let b = topo.bridge("b").unwrap();
    assert!(b.root_port().is_some());
    assert!(topo.bridge("a").unwrap().is_root());
}

#[test]
pub fn RootFailure_NewRootElected() {
    // Arrange: a is the lowest Bridge ID and becomes root; disable it and
    // confirm b (the next-lowest) takes over.
    let mut topo = Topology::new(fast_config());
    topo.add_link("a", 0, "b", 0).unwrap();
    topo.add_link("b", 1, "c", 0).unwrap();
    topo.run();
    assert!(topo.bridge("a").unwrap().is_root());

    // Act
    topo.delete_bridge("a").unwrap();
    // The peer side (b's port 0) discovers the loss itself via aging.
    topo.run();

    // Assert
    assert!(topo.bridge("b").unwrap().is_root());
}
