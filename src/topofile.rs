//! A thin adapter that turns a topology file into `Topology::add_link` calls.
//!
//! This contains no STP semantics: it just tokenizes the `BRIDGE_A PORT_A
//! BRIDGE_B PORT_B` line format, one link per line, and hands each line to
//! the topology. Parse and I/O failures are propagated with `anyhow` up to
//! `main`, matching the exit-code-1-on-unreadable-topology contract.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context};

use crate::stp::StpConfig;
use crate::topology::Topology;

pub fn load(path: &Path, config: StpConfig) -> anyhow::Result<Topology> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading topology file {}", path.display()))?;

    let mut topo = Topology::new(config);

    for (lineno, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            bail!(
                "{}:{}: expected `BRIDGE_A PORT_A BRIDGE_B PORT_B`, got `{}`",
                path.display(),
                lineno + 1,
                line
            );
        }

        let bridge_a = fields[0];
        let port_a: usize = fields[1]
            .parse()
            .with_context(|| format!("{}:{}: invalid port number", path.display(), lineno + 1))?;
        let bridge_b = fields[2];
        let port_b: usize = fields[3]
            .parse()
            .with_context(|| format!("{}:{}: invalid port number", path.display(), lineno + 1))?;

        topo.add_link(bridge_a, port_a, bridge_b, port_b)
            .with_context(|| format!("{}:{}: rejected link", path.display(), lineno + 1))?;
    }

    Ok(topo)
}
