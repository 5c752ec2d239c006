pub mod bpdu;
pub mod bridge;
pub mod config;
pub mod port;

pub use bpdu::{Bpdu, ConfigBpdu};
pub use bridge::Bridge;
pub use config::StpConfig;
pub use port::{BridgeId, LastConfig, Mac, Port, PortHandle, PortRole, PortState};
