use super::port::BridgeId;

/// A Configuration BPDU: the periodic advertisement a bridge floods out every
/// non-blocking, non-root port, carrying its current belief about the root
/// bridge and the cost of reaching it.
///
/// Fields mirror IEEE 802.1D's configuration BPDU, minus anything that would
/// require byte-accurate wire encoding (this simulator never serializes a
/// Bpdu to bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBpdu {
    root_id: BridgeId,
    cost: u32,
    sender_id: BridgeId,
    port_index: usize,
    message_age: u32,
    max_age: u32,
    hello_time: u32,
    forward_delay: u32,
    tc: bool,
    tc_ack: bool,
}

impl ConfigBpdu {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        root_id: BridgeId,
        cost: u32,
        sender_id: BridgeId,
        port_index: usize,
        message_age: u32,
        max_age: u32,
        hello_time: u32,
        forward_delay: u32,
        tc: bool,
        tc_ack: bool,
    ) -> Self {
        ConfigBpdu {
            root_id,
            cost,
            sender_id,
            port_index,
            message_age,
            max_age,
            hello_time,
            forward_delay,
            tc,
            tc_ack,
        }
    }

    pub fn root_id(&self) -> &BridgeId {
        &self.root_id
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn sender_id(&self) -> &BridgeId {
        &self.sender_id
    }

    pub fn port_index(&self) -> usize {
        self.port_index
    }

    pub fn message_age(&self) -> u32 {
        self.message_age
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    pub fn hello_time(&self) -> u32 {
        self.hello_time
    }

    pub fn forward_delay(&self) -> u32 {
        self.forward_delay
    }

    pub fn tc(&self) -> bool {
        self.tc
    }

    pub fn tc_ack(&self) -> bool {
        self.tc_ack
    }
}

/// A message exchanged between two directly-connected ports.
///
/// `Rstp` proposal/agreement BPDUs exist in 802.1w but are unreachable in
/// this simulator; only the plain 802.1D Configuration and TCN kinds are
/// modeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bpdu {
    Config(ConfigBpdu),
    Tcn,
}

impl Bpdu {
    pub fn is_tcn(&self) -> bool {
        matches!(self, Bpdu::Tcn)
    }

    pub fn as_config(&self) -> Option<&ConfigBpdu> {
        match self {
            Bpdu::Config(c) => Some(c),
            Bpdu::Tcn => None,
        }
    }
}
