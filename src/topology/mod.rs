mod edge;

pub use edge::Edge;

use std::collections::HashMap;

use rand::Rng;

use crate::stp::{Bridge, Mac, PortHandle, PortRole, PortState, StpConfig};

/// A bound on how many ticks `run()` will drive before giving up and logging
/// a diagnostic, so a malformed or disconnected topology can't hang a caller
/// forever. Real scenarios in this crate converge in well under a hundred
/// ticks even with `MAX_AGE`/`FORWARD_DELAY` at their default values.
const RUN_SAFETY_CAP: u32 = 100_000;

#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("cannot link bridge {0} to itself")]
    SelfLoop(String),
    #[error("duplicate link between {0} and {1}")]
    DuplicateLink(String, String),
    #[error("bridge {0} not found")]
    BridgeNotFound(String),
    #[error("bridge {0} has no port {1}")]
    PortNotFound(String, usize),
}

/// A read-only, frozen view of every port's role and state taken before any
/// bridge in the current tick has mutated anything. Designated-port
/// election and aging both need to ask "what is my peer up to", and this is
/// how they do it without a bridge ever holding a live reference into
/// another bridge's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortSnapshot {
    pub role: PortRole,
    pub state: PortState,
}

pub struct Snapshot {
    data: Vec<Vec<PortSnapshot>>,
}

impl Snapshot {
    pub fn get(&self, handle: PortHandle) -> Option<PortSnapshot> {
        self.data.get(handle.bridge)?.get(handle.port).copied()
    }
}

/// The set of bridges and links, plus edit operations and global stepping.
pub struct Topology {
    bridges: Vec<Bridge>,
    index_by_mac: HashMap<Mac, usize>,
    edges: Vec<Edge>,
    config: StpConfig,
    clock: u32,
}

impl Topology {
    pub fn new(config: StpConfig) -> Self {
        Topology {
            bridges: Vec::new(),
            index_by_mac: HashMap::new(),
            edges: Vec::new(),
            config,
            clock: 0,
        }
    }

    pub fn config(&self) -> &StpConfig {
        &self.config
    }

    pub fn clock(&self) -> u32 {
        self.clock
    }

    pub fn bridges(&self) -> &[Bridge] {
        &self.bridges
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn bridge(&self, mac: &str) -> Option<&Bridge> {
        self.index_by_mac.get(mac).map(|&i| &self.bridges[i])
    }

    fn bridge_index(&self, mac: &str) -> Result<usize, TopologyError> {
        self.index_by_mac
            .get(mac)
            .copied()
            .ok_or_else(|| TopologyError::BridgeNotFound(mac.to_string()))
    }

    fn bridge_index_or_create(&mut self, mac: &str) -> usize {
        if let Some(&idx) = self.index_by_mac.get(mac) {
            return idx;
        }
        let idx = self.bridges.len();
        self.bridges.push(Bridge::new(mac.to_string(), self.config.default_priority));
        self.index_by_mac.insert(mac.to_string(), idx);
        idx
    }

    /// Adds a bridge with no links, creating it if it doesn't already exist.
    /// Returns its index.
    pub fn add_bridge(&mut self, mac: &str) -> usize {
        self.bridge_index_or_create(mac)
    }

    /// Rejects self-loops and duplicate edges (edge equality is unordered
    /// over endpoints); creates bridges and ports as needed and connects
    /// them symmetrically.
    pub fn add_link(&mut self, a: &str, port_a: usize, b: &str, port_b: usize) -> Result<(), TopologyError> {
        if a == b {
            return Err(TopologyError::SelfLoop(a.to_string()));
        }

        let idx_a = self.bridge_index_or_create(a);
        let idx_b = self.bridge_index_or_create(b);

        let candidate = Edge {
            origin_bridge: idx_a,
            target_bridge: idx_b,
            origin_port: port_a,
            target_port: port_b,
        };
        if self.edges.iter().any(|e| *e == candidate) {
            return Err(TopologyError::DuplicateLink(a.to_string(), b.to_string()));
        }

        let path_cost = self.config.path_cost;
        self.bridges[idx_a].ensure_port(port_a, path_cost);
        self.bridges[idx_b].ensure_port(port_b, path_cost);

        let handle_a = PortHandle { bridge: idx_a, port: port_a };
        let handle_b = PortHandle { bridge: idx_b, port: port_b };
        self.bridges[idx_a].port_mut(port_a).unwrap().set_peer(Some(handle_b));
        self.bridges[idx_b].port_mut(port_b).unwrap().set_peer(Some(handle_a));

        // A new link can change either bridge's best path to the root, so
        // both ends must be driven through a reconvergence cycle rather than
        // left sitting at a freshly-constructed port's defaults -- otherwise
        // a port added after the bridge's clock is already running either
        // ages out before it ever gets a chance to hear a BPDU (if the
        // bridge's clock already exceeds MAX_AGE) or sits stuck in Blocking
        // forever (nothing but a re-election reset ever promotes it out of
        // there). This is the "edit drives a TCN reconvergence cycle"
        // behavior the add-link contract requires.
        self.bridges[idx_a].note_topology_change();
        self.bridges[idx_b].note_topology_change();

        log::info!("linked {} port {} <-> {} port {}", a, port_a, b, port_b);
        self.edges.push(candidate);
        Ok(())
    }

    /// Disables port `port_a` on bridge `a` and its peer, symmetrically.
    /// Unlike `Bridge::break_link` (which models one-sided link sensing),
    /// this is an administrative edit and tears the link down on both ends
    /// at once.
    pub fn delete_link(&mut self, a: &str, port_a: usize) -> Result<(), TopologyError> {
        let idx_a = self.bridge_index(a)?;
        let peer = self
            .bridges[idx_a]
            .port(port_a)
            .ok_or_else(|| TopologyError::PortNotFound(a.to_string(), port_a))?
            .peer();

        self.bridges[idx_a].break_link(port_a);

        if let Some(handle) = peer {
            if let Some(peer_bridge) = self.bridges.get_mut(handle.bridge) {
                peer_bridge.break_link(handle.port);
            }
        }

        log::info!("deleted link {} port {}", a, port_a);
        Ok(())
    }

    /// Disables every port on the named bridge. Deliberately does not touch
    /// the peer side: the rest of the network discovers the loss the same
    /// way it discovers any one-sided link failure, via the aging path's
    /// peer-disabled check.
    pub fn delete_bridge(&mut self, mac: &str) -> Result<(), TopologyError> {
        let idx = self.bridge_index(mac)?;
        let port_count = self.bridges[idx].ports().len();
        for i in 0..port_count {
            self.bridges[idx].break_link(i);
        }
        log::info!("deleted bridge {}", mac);
        Ok(())
    }

    /// Asymmetrically breaks the link at `bridge`'s `port`: only this side
    /// notices. See `Bridge::break_link`.
    pub fn break_link(&mut self, mac: &str, port: usize) -> Result<(), TopologyError> {
        let idx = self.bridge_index(mac)?;
        self.bridges[idx].break_link(port);
        log::warn!("broke link {} port {}", mac, port);
        Ok(())
    }

    /// Breaks one randomly-chosen, currently-up link from one side, the way
    /// a topology-fuzzing driver would.
    pub fn break_random_link(&mut self, rng: &mut impl rand::Rng) -> Option<(Mac, usize)> {
        let mut candidates = Vec::new();
        for (bi, bridge) in self.bridges.iter().enumerate() {
            for port in bridge.ports() {
                if port.is_connected() && port.state() != PortState::Disabled {
                    candidates.push((bi, port.index()));
                }
            }
        }
        if candidates.is_empty() {
            return None;
        }
        let (bi, pi) = candidates[rng.gen_range(0..candidates.len())];
        let mac = self.bridges[bi].mac().to_string();
        self.bridges[bi].break_link(pi);
        log::warn!("randomly broke link {} port {}", mac, pi);
        Some((mac, pi))
    }

    fn snapshot(&self) -> Snapshot {
        let data = self
            .bridges
            .iter()
            .map(|b| {
                b.ports()
                    .iter()
                    .map(|p| PortSnapshot { role: p.role(), state: p.state() })
                    .collect()
            })
            .collect();
        Snapshot { data }
    }

    /// Advances every bridge one tick, in deterministic insertion order.
    /// Cross-bridge reads during the tick see a snapshot frozen at the
    /// start of the round; cross-bridge writes (BPDU deposits) are applied
    /// only after every bridge has run, so convergence timing does not
    /// depend on which order bridges happen to sit in.
    pub fn tick_all(&mut self) {
        let snapshot = self.snapshot();

        let mut deposits = Vec::new();
        for bridge in self.bridges.iter_mut() {
            deposits.extend(bridge.process_tick(&self.config, &snapshot));
        }

        for (handle, bpdu) in deposits {
            if let Some(bridge) = self.bridges.get_mut(handle.bridge) {
                if let Some(port) = bridge.port_mut(handle.port) {
                    port.deposit(bpdu);
                }
            }
        }

        self.clock += 1;
    }

    pub fn all_converged(&self) -> bool {
        !self.bridges.is_empty() && self.bridges.iter().all(|b| b.is_converged())
    }

    /// Repeats `tick_all` until every bridge reports converged.
    pub fn run(&mut self) {
        while !self.all_converged() {
            self.tick_all();
            if self.clock > RUN_SAFETY_CAP {
                log::error!("topology did not converge within {} ticks, giving up", RUN_SAFETY_CAP);
                break;
            }
        }
    }
}
