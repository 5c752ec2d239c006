/// A structural record of which bridge/port pair is wired to which other.
///
/// Ownership of the actual connection lives on the ports (via
/// [`crate::stp::PortHandle`]); this record exists only to detect duplicate
/// links and to describe the topology back to a caller. Equality is
/// unordered over the two bridge endpoints and, per spec, ignores which
/// ports are used: two edges between the same pair of bridges are
/// considered the same edge regardless of port index.
#[derive(Debug, Clone)]
pub struct Edge {
    pub origin_bridge: usize,
    pub target_bridge: usize,
    pub origin_port: usize,
    pub target_port: usize,
}

impl PartialEq for Edge {
    fn eq(&self, other: &Self) -> bool {
        let mine = (self.origin_bridge, self.target_bridge);
        let theirs = (other.origin_bridge, other.target_bridge);
        mine == theirs || mine == (theirs.1, theirs.0)
    }
}

impl Eq for Edge {}
