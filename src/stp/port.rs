use super::bpdu::Bpdu;

/// An opaque MAC address token, e.g. `"0001.0001.0001"`. This simulator never
/// byte-encodes a MAC; it is just a unique, comparable name for a bridge.
pub type Mac = String;

/// A bridge's total-ordered identifier: priority concatenated with MAC.
///
/// Deriving `Ord` on the `(priority, mac)` pair gives exactly the
/// concatenation ordering the spec calls for, since `priority` occupies the
/// higher-order bits and is compared first.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BridgeId {
    priority: u16,
    mac: Mac,
}

impl BridgeId {
    pub fn new(priority: u16, mac: Mac) -> Self {
        BridgeId { priority, mac }
    }

    pub fn priority(&self) -> u16 {
        self.priority
    }

    pub fn mac(&self) -> &str {
        &self.mac
    }
}

impl std::fmt::Display for BridgeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mac)
    }
}

/// A port's function on its link, as decided by the election algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRole {
    Root,
    Designated,
    Nondesignated,
}

/// A port's forwarding/learning lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortState {
    Disabled,
    Blocking,
    Listening,
    Learning,
    Forwarding,
}

/// An indexed handle to a port on some bridge, owned and resolved by the
/// `Topology`. Ports never hold a direct reference to their peer: the peer
/// object may live in a different element of the topology's bridge vector,
/// and Rust can't let two `&mut` borrows into that vector coexist. A handle
/// sidesteps the problem entirely and is `Copy`, so it's cheap to pass
/// around during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortHandle {
    pub bridge: usize,
    pub port: usize,
}

/// The election-derived facts a port remembers about the best Configuration
/// BPDU it has seen on its link, kept around between ticks so that a port
/// which temporarily receives nothing still has a basis for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastConfig {
    pub root_id: BridgeId,
    pub cost: u32,
    pub sender_id: BridgeId,
}

/// One bridge interface.
///
/// `inbox` is the single-slot receive buffer the spec describes: `send`
/// overwrites it, `drain` empties it, and nothing ever queues behind it.
/// `last_config` is a separate, sticky cache refreshed only when a fresh
/// Configuration BPDU is drained; elections and aging consult it instead of
/// `inbox`, since by the time an election runs for a given tick the inbox for
/// that tick has usually already been drained into it.
///
/// `state_since` is the clock value at which this port last entered its
/// current `state`. The forced Listening->Learning and Learning->Forwarding/
/// Blocking timers are measured against it rather than against a single
/// bridge-wide timestamp, so that a port which is reset back to Listening
/// (on a root adoption, a re-election, or a boot transition) gets a fresh
/// `FORWARD_DELAY` window instead of inheriting however much of the window
/// already elapsed for some unrelated port.
#[derive(Debug, Clone)]
pub struct Port {
    index: usize,
    peer: Option<PortHandle>,
    state: PortState,
    state_since: u32,
    role: PortRole,
    inbox: Option<Bpdu>,
    last_config: Option<LastConfig>,
    last_seen: u32,
    path_cost: u32,
}

impl Port {
    pub fn new(index: usize, path_cost: u32) -> Self {
        Port {
            index,
            peer: None,
            state: PortState::Blocking,
            state_since: 0,
            role: PortRole::Nondesignated,
            inbox: None,
            last_config: None,
            last_seen: 0,
            path_cost,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path_cost(&self) -> u32 {
        self.path_cost
    }

    pub fn peer(&self) -> Option<PortHandle> {
        self.peer
    }

    /// Sets the peer handle directly. Symmetric bookkeeping (clearing or
    /// setting the far side too) is the caller's responsibility, since a
    /// `Port` cannot reach across to its peer's owning bridge.
    pub fn set_peer(&mut self, peer: Option<PortHandle>) {
        self.peer = peer;
    }

    pub fn is_connected(&self) -> bool {
        self.peer.is_some()
    }

    pub fn state(&self) -> PortState {
        self.state
    }

    pub fn state_since(&self) -> u32 {
        self.state_since
    }

    /// Transitions to `state`, stamping `state_since` with `clock` whenever
    /// the state actually changes so the forward-delay timers restart from
    /// this tick rather than from whenever the port last changed state.
    pub fn set_state(&mut self, state: PortState, clock: u32) {
        if self.state != state {
            self.state_since = clock;
        }
        self.state = state;
    }

    pub fn role(&self) -> PortRole {
        self.role
    }

    pub fn set_role(&mut self, role: PortRole) {
        self.role = role;
    }

    /// Drives the port back into Listening for a re-election: clears its
    /// role to Nondesignated and unconditionally restamps `state_since` to
    /// `clock`, even if the port was already Listening, so the forced
    /// forward-delay timer always restarts rather than keeping whatever was
    /// left of a window that started before this reset. Also refreshes the
    /// aging baseline (`last_seen`) to `clock`, so a port that is reset
    /// (rather than freshly drained) isn't immediately judged silent for
    /// `MAX_AGE` ticks that elapsed before the reset.
    pub fn reset_for_election(&mut self, clock: u32) {
        self.role = PortRole::Nondesignated;
        self.state = PortState::Listening;
        self.state_since = clock;
        self.last_seen = clock;
    }

    pub fn last_config(&self) -> Option<&LastConfig> {
        self.last_config.as_ref()
    }

    pub fn last_seen(&self) -> u32 {
        self.last_seen
    }

    /// Deposits a BPDU into this port's receive slot, overwriting whatever
    /// was pending. No-op if the port is disabled: a disabled port has no
    /// link to receive on.
    pub fn deposit(&mut self, bpdu: Bpdu) {
        if self.state == PortState::Disabled {
            return;
        }
        self.inbox = Some(bpdu);
    }

    /// Atomically takes the pending BPDU, leaving the slot empty. The only
    /// read path a bridge uses; enforces single-consumption.
    pub fn drain(&mut self) -> Option<Bpdu> {
        self.inbox.take()
    }

    /// Refreshes the sticky election cache from a freshly drained
    /// Configuration BPDU and resets the aging clock.
    pub fn observe_config(&mut self, cfg: &LastConfig, clock: u32) {
        self.last_config = Some(cfg.clone());
        self.last_seen = clock;
    }
}
