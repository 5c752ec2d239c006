use std::collections::HashMap;

use crate::topology::Snapshot;

use super::bpdu::{Bpdu, ConfigBpdu};
use super::config::StpConfig;
use super::port::{BridgeId, LastConfig, Mac, Port, PortHandle, PortRole, PortState};

/// One running instance of 802.1D Spanning Tree.
///
/// A `Bridge` never reaches across to another bridge directly; cross-bridge
/// facts it needs during a tick (a peer's current role or state) are handed
/// to it as a frozen [`Snapshot`] taken by the `Topology` before any bridge
/// in the round has mutated anything. This keeps convergence timing
/// independent of the order bridges happen to sit in the topology's bridge
/// list, per the two-phase tick the design notes recommend.
pub struct Bridge {
    mac: Mac,
    id: BridgeId,
    root_id: BridgeId,
    root_cost: u32,
    root_port: Option<usize>,
    ports: Vec<Port>,
    mac_table: HashMap<usize, Mac>,
    tc: bool,
    clock: u32,
    hello_time: u32,
    converged: bool,
}

impl Bridge {
    pub fn new(mac: Mac, priority: u16) -> Self {
        let id = BridgeId::new(priority, mac.clone());
        Bridge {
            mac,
            root_id: id.clone(),
            id,
            root_cost: 0,
            root_port: None,
            ports: Vec::new(),
            mac_table: HashMap::new(),
            tc: false,
            clock: 0,
            hello_time: 0,
            converged: false,
        }
    }

    pub fn mac(&self) -> &str {
        &self.mac
    }

    pub fn id(&self) -> &BridgeId {
        &self.id
    }

    pub fn root_id(&self) -> &BridgeId {
        &self.root_id
    }

    pub fn root_cost(&self) -> u32 {
        self.root_cost
    }

    pub fn root_port(&self) -> Option<usize> {
        self.root_port
    }

    pub fn is_root(&self) -> bool {
        self.root_id == self.id
    }

    pub fn clock(&self) -> u32 {
        self.clock
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn mac_table(&self) -> &HashMap<usize, Mac> {
        &self.mac_table
    }

    pub fn port(&self, index: usize) -> Option<&Port> {
        self.ports.get(index)
    }

    /// Grows the port list as needed and returns the port at `index`,
    /// creating it with the given per-link path cost if it didn't already
    /// exist. Ports and bridges are created during topology construction and
    /// destroyed only on explicit delete; this is the construction path.
    pub fn ensure_port(&mut self, index: usize, path_cost: u32) -> &mut Port {
        if index >= self.ports.len() {
            for i in self.ports.len()..=index {
                self.ports.push(Port::new(i, path_cost));
            }
        }
        &mut self.ports[index]
    }

    pub fn port_mut(&mut self, index: usize) -> Option<&mut Port> {
        self.ports.get_mut(index)
    }

    /// Disables port `index` asymmetrically: this side forgets its peer and
    /// stops forwarding, but the peer's own reference to this port is left
    /// untouched. The peer discovers the break on its own, via the
    /// peer-disabled check in the aging path. This is what lets a single
    /// bridge simulate "my link died" without the topology reaching into
    /// the other bridge to disable it too (that symmetric version is
    /// `Topology::delete_link`).
    pub fn break_link(&mut self, index: usize) {
        let clock = self.clock;
        let was_root_port = self.root_port == Some(index);
        if let Some(port) = self.ports.get_mut(index) {
            port.set_peer(None);
            port.set_state(PortState::Disabled, clock);
        }
        if was_root_port {
            log::info!("{}: lost root port {}, reverting to boot", self.mac, index);
            self.boot_transition();
        }
        self.converged = false;
        self.tc = true;
    }

    /// Drives every non-disabled, non-root-eligible port that just lost its
    /// standing role back through the Listening state, the same way
    /// `boot_transition`/`reenter_election` already do, and resets this
    /// bridge's root-port handle. Called whenever something invalidates the
    /// current election outcome for the whole bridge: a freshly-adopted
    /// better root, a TCN, a boot, or an externally-driven topology edit.
    /// Giving every affected port a fresh `state_since` stamp (via
    /// `Port::reset_for_election`) is what keeps the forced Listening/Learning
    /// timers from firing against however much of the old window had already
    /// elapsed.
    fn reset_ports_for_election(&mut self) {
        let clock = self.clock;
        for port in self.ports.iter_mut() {
            if port.state() != PortState::Disabled {
                port.reset_for_election(clock);
            }
        }
    }

    /// Runs the boot transition: every non-disabled port goes to
    /// Listening/Nondesignated, the bridge reverts to believing itself root,
    /// and both topology-change flags are cleared. Used both for the very
    /// first tick and for "re-enter boot" after a TCack is heard.
    fn boot_transition(&mut self) {
        self.root_id = self.id.clone();
        self.root_cost = 0;
        self.root_port = None;
        self.tc = false;
        self.reset_ports_for_election();
    }

    /// Resets ports for re-election without discarding the bridge's current
    /// belief about who the root is. Used when a TCN arrives directly: a
    /// change elsewhere in the network means this bridge's roles may be
    /// stale, but it has no reason to think it suddenly became the root.
    fn reenter_election(&mut self) {
        self.root_port = None;
        self.reset_ports_for_election();
    }

    /// Public hook for the `Topology` layer: an administrative edit (a link
    /// added to an already-running bridge, in particular) may invalidate
    /// this bridge's current election outcome the same way a TCN would, so
    /// drive it through the same re-election reset and mark it as having a
    /// topology change to report. Safe to call on a bridge that hasn't
    /// ticked yet (clock 0): `boot_transition` runs again on the first tick
    /// regardless and simply repeats the same reset.
    pub fn note_topology_change(&mut self) {
        self.reenter_election();
        self.tc = true;
        self.converged = false;
    }

    fn eligible_to_emit(&self, index: usize) -> bool {
        let port = &self.ports[index];
        port.is_connected()
            && port.state() != PortState::Blocking
            && port.state() != PortState::Disabled
            && port.role() != PortRole::Root
    }

    fn build_config(&self, index: usize, config: &StpConfig, tc_ack: bool) -> ConfigBpdu {
        ConfigBpdu::new(
            self.root_id.clone(),
            self.root_cost,
            self.id.clone(),
            index,
            self.clock,
            config.max_age,
            config.hello,
            config.forward_delay,
            self.tc,
            tc_ack,
        )
    }

    /// Runs this bridge's share of one simulated tick: boot/re-election
    /// bookkeeping, draining and reacting to whatever is sitting in each
    /// connected port's inbox, and emitting fresh Configuration BPDUs when
    /// the hello interval has elapsed. Returns the BPDUs this bridge wants
    /// deposited on peer ports; the `Topology` applies them only after every
    /// bridge in the round has run, so no bridge ever observes another
    /// bridge's same-tick emission.
    pub fn process_tick(&mut self, config: &StpConfig, snapshot: &Snapshot) -> Vec<(PortHandle, Bpdu)> {
        if self.clock == 0 {
            self.boot_transition();
        }

        let mut deposits = Vec::new();

        for idx in 0..self.ports.len() {
            self.process_port(idx, config, snapshot, &mut deposits);
        }

        self.recompute_converged();

        if self.clock.saturating_sub(self.hello_time) >= config.hello {
            self.hello_time = self.clock;
            for idx in 0..self.ports.len() {
                if self.eligible_to_emit(idx) {
                    let bpdu = self.build_config(idx, config, false);
                    if let Some(peer) = self.ports[idx].peer() {
                        deposits.push((peer, Bpdu::Config(bpdu)));
                    }
                }
            }
        }

        self.clock += 1;
        deposits
    }

    fn process_port(
        &mut self,
        idx: usize,
        config: &StpConfig,
        snapshot: &Snapshot,
        deposits: &mut Vec<(PortHandle, Bpdu)>,
    ) {
        if self.ports[idx].state() == PortState::Disabled || !self.ports[idx].is_connected() {
            return;
        }

        let drained = self.ports[idx].drain();

        match &drained {
            Some(Bpdu::Tcn) => {
                self.handle_tcn(idx, config, deposits);
                return;
            }
            Some(Bpdu::Config(cfg)) => {
                if cfg.tc_ack() && !self.is_root() {
                    log::debug!("{}: heard TCack, flushing and re-entering boot", self.mac);
                    self.mac_table.clear();
                    self.boot_transition();
                    return;
                }
                self.apply_config(idx, cfg, config, snapshot);
            }
            None => {}
        }

        self.advance_timers(idx, config);

        if drained.is_none() {
            self.handle_silence(idx, config, snapshot, deposits);
        }
    }

    fn apply_config(&mut self, idx: usize, cfg: &ConfigBpdu, config: &StpConfig, snapshot: &Snapshot) {
        match self.ports[idx].state() {
            PortState::Listening => {
                let no_confirmed_root = self.root_port.is_none() && !self.is_root();
                // A strictly smaller root is always an improvement. When we
                // have no confirmed path to *any* root (root_port is None,
                // e.g. just after a boot/re-election reset), we also accept
                // a "worse" root id: our old belief has no live port behind
                // it to compare against, so there is nothing to defend.
                if cfg.root_id() < &self.root_id || (no_confirmed_root && cfg.root_id() != &self.root_id) {
                    log::debug!(
                        "{}: adopting root {} via port {}",
                        self.mac,
                        cfg.root_id(),
                        idx
                    );
                    self.root_id = cfg.root_id().clone();
                    self.root_cost = cfg.cost() + config.path_cost;
                    self.root_port = None;
                    // Every port's election outcome is stale now that the
                    // root belief changed: drop each one back to
                    // Listening/Nondesignated rather than only resetting
                    // role, so a port that was Forwarding/Designated under
                    // the old root can't keep forwarding under the new one
                    // without re-earning that role. `reset_ports_for_election`
                    // also stamps a fresh `state_since` on every port it
                    // touches, so the forced Listening->Learning timer gives
                    // the root-port election a full window on later ticks
                    // instead of racing whatever was left of the old one.
                    self.reset_ports_for_election();
                } else if no_confirmed_root {
                    self.elect_root_port(config);
                } else {
                    self.elect_designated(idx, cfg, snapshot);
                }
            }
            PortState::Learning => {
                self.mac_table.insert(idx, cfg.sender_id().mac().to_string());
            }
            _ => {}
        }

        let last = LastConfig {
            root_id: cfg.root_id().clone(),
            cost: cfg.cost(),
            sender_id: cfg.sender_id().clone(),
        };
        self.ports[idx].observe_config(&last, self.clock);
    }

    /// Advances `idx`'s forced Listening/Learning timer, measured against
    /// *that port's own* `state_since` rather than a single bridge-wide
    /// clock: a port that was just reset back to Listening (root adoption,
    /// TCN, boot) starts this window over, so it can't be forced into
    /// Learning before an election that only completes on a later tick has
    /// had a chance to run.
    fn advance_timers(&mut self, idx: usize, config: &StpConfig) {
        let clock = self.clock;
        let elapsed = clock.saturating_sub(self.ports[idx].state_since()) >= config.forward_delay;
        match self.ports[idx].state() {
            PortState::Listening if elapsed => {
                self.ports[idx].set_state(PortState::Learning, clock);
            }
            PortState::Learning if elapsed => {
                let role = self.ports[idx].role();
                if role == PortRole::Root || role == PortRole::Designated {
                    log::debug!("{}: port {} -> Forwarding", self.mac, idx);
                    self.ports[idx].set_state(PortState::Forwarding, clock);
                } else {
                    self.ports[idx].set_state(PortState::Blocking, clock);
                }
            }
            _ => {}
        }
    }

    /// Root-port election (§ tie-break ordering): minimum advertised root
    /// path cost, ties broken by smallest sender Bridge ID, further ties by
    /// ascending port index (falls out of iterating in index order and only
    /// replacing the incumbent on a strict improvement).
    fn elect_root_port(&mut self, config: &StpConfig) {
        let mut best: Option<(usize, u32, BridgeId)> = None;
        for port in self.ports.iter() {
            if port.state() == PortState::Disabled || !port.is_connected() {
                continue;
            }
            if let Some(lc) = port.last_config() {
                let better = match &best {
                    None => true,
                    Some((_, best_cost, best_sender)) => {
                        lc.cost < *best_cost || (lc.cost == *best_cost && lc.sender_id < *best_sender)
                    }
                };
                if better {
                    best = Some((port.index(), lc.cost, lc.sender_id.clone()));
                }
            }
        }

        if let Some((idx, cost, _)) = best {
            self.root_port = Some(idx);
            self.root_cost = cost + config.path_cost;
            self.ports[idx].set_role(PortRole::Root);
            self.ports[idx].set_state(PortState::Learning, self.clock);
            log::debug!("{}: elected root port {}", self.mac, idx);
        }
    }

    /// Designated-port election for port `idx` against the Configuration
    /// BPDU `f` it just received.
    fn elect_designated(&mut self, idx: usize, f: &ConfigBpdu, snapshot: &Snapshot) {
        let peer = self.ports[idx].peer();
        let is_designated = if self.is_root() {
            true
        } else if peer
            .and_then(|h| snapshot.get(h))
            .map(|s| s.role == PortRole::Root)
            .unwrap_or(false)
        {
            true
        } else if self.root_cost < f.cost() {
            true
        } else {
            self.root_cost == f.cost() && self.id < *f.sender_id()
        };

        if is_designated {
            self.ports[idx].set_role(PortRole::Designated);
            if self.ports[idx].state() == PortState::Listening {
                self.ports[idx].set_state(PortState::Learning, self.clock);
            }
        } else {
            self.ports[idx].set_role(PortRole::Nondesignated);
            let peer_forwarding = peer
                .and_then(|h| snapshot.get(h))
                .map(|s| s.state == PortState::Forwarding)
                .unwrap_or(false);
            if peer_forwarding {
                self.ports[idx].set_state(PortState::Blocking, self.clock);
            }
        }
    }

    /// Reacts to a port that drained nothing this tick: promotes it to
    /// Designated/Forwarding if its peer already looks disabled from this
    /// side's point of view, and ages it out to Disabled (flooding a TCN)
    /// once `MAX_AGE` ticks have passed without a fresh BPDU.
    fn handle_silence(
        &mut self,
        idx: usize,
        config: &StpConfig,
        snapshot: &Snapshot,
        deposits: &mut Vec<(PortHandle, Bpdu)>,
    ) {
        if self.ports[idx].role() == PortRole::Designated {
            return;
        }

        let peer = self.ports[idx].peer();
        let peer_disabled = peer
            .and_then(|h| snapshot.get(h))
            .map(|s| s.state == PortState::Disabled)
            .unwrap_or(false);
        if peer_disabled {
            if self.root_port == Some(idx) {
                log::info!("{}: peer of root port {} disabled, reverting to boot", self.mac, idx);
                self.ports[idx].set_state(PortState::Disabled, self.clock);
                self.ports[idx].set_peer(None);
                self.boot_transition();
                self.tc = true;
                self.flood_tcn(idx, deposits);
                return;
            }
            log::info!("{}: peer of port {} looks disabled, taking over the link", self.mac, idx);
            self.ports[idx].set_role(PortRole::Designated);
            self.ports[idx].set_state(PortState::Forwarding, self.clock);
            return;
        }

        if self.clock.saturating_sub(self.ports[idx].last_seen()) >= config.max_age {
            log::warn!("{}: port {} aged out after {} ticks of silence", self.mac, idx, config.max_age);
            let was_root_port = self.root_port == Some(idx);
            self.ports[idx].set_state(PortState::Disabled, self.clock);
            self.ports[idx].set_peer(None);
            if was_root_port {
                log::info!("{}: root port {} aged out, reverting to boot", self.mac, idx);
                self.boot_transition();
            }
            self.tc = true;
            self.flood_tcn(idx, deposits);
        }
    }

    fn flood_tcn(&self, except: usize, deposits: &mut Vec<(PortHandle, Bpdu)>) {
        for (j, port) in self.ports.iter().enumerate() {
            if j == except || port.state() == PortState::Disabled || !port.is_connected() {
                continue;
            }
            if let Some(peer) = port.peer() {
                deposits.push((peer, Bpdu::Tcn));
            }
        }
    }

    fn handle_tcn(&mut self, idx: usize, config: &StpConfig, deposits: &mut Vec<(PortHandle, Bpdu)>) {
        if self.is_root() {
            log::info!("{}: root acking topology change", self.mac);
            for j in 0..self.ports.len() {
                if self.eligible_to_emit(j) {
                    let bpdu = self.build_config(j, config, true);
                    if let Some(peer) = self.ports[j].peer() {
                        deposits.push((peer, Bpdu::Config(bpdu)));
                    }
                }
            }
        } else {
            log::info!("{}: topology change notified via port {}", self.mac, idx);
            self.tc = true;
            self.reenter_election();
            self.flood_tcn(idx, deposits);
        }
    }

    fn recompute_converged(&mut self) {
        self.converged = !self
            .ports
            .iter()
            .any(|p| matches!(p.state(), PortState::Listening | PortState::Learning));
    }
}
