#![allow(dead_code)]

mod stp;
mod topology;
mod topofile;


use std::path::PathBuf;

use clap::{Parser, Subcommand};

use stp::{PortRole, PortState, StpConfig};
use topology::Topology;

#[derive(Parser)]
#[command(name = "stp-sim", about = "Spanning Tree Protocol discrete-event simulator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load a topology file, run it to convergence, and print every bridge's state.
    Run {
        topology_file: PathBuf,
    },
    /// Load a topology file, converge, break one link, then converge again.
    BreakLink {
        topology_file: PathBuf,
        bridge: String,
        port: usize,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Run { topology_file } => {
            let mut topo = topofile::load(&topology_file, StpConfig::default())?;
            topo.run();
            print_topology(&topo);
        }
        Command::BreakLink { topology_file, bridge, port } => {
            let mut topo = topofile::load(&topology_file, StpConfig::default())?;
            topo.run();
            println!("-- before break --");
            print_topology(&topo);

            topo.break_link(&bridge, port)?;
            topo.run();
            println!("-- after break --");
            print_topology(&topo);
        }
    }

    Ok(())
}

/// Renders the observable-output format: bridge ID and root flag, clock,
/// per-interface role/state (with a cost line for the root port), and the
/// learned MAC table.
fn print_topology(topo: &Topology) {
    for bridge in topo.bridges() {
        println!("Bridge ID: {}", bridge.id());
        if bridge.is_root() {
            println!("I am the Root Bridge");
        }
        println!("Time: {}", topo.clock());

        for port in bridge.ports() {
            let role = match port.role() {
                PortRole::Root => "Root",
                PortRole::Designated => "Designated",
                PortRole::Nondesignated => "Nondesignated",
            };
            let state = match port.state() {
                PortState::Disabled => "Disabled",
                PortState::Blocking => "Blocking",
                PortState::Listening => "Listening",
                PortState::Learning => "Learning",
                PortState::Forwarding => "Forwarding",
            };
            println!("  Interface {}: role={} state={}", port.index(), role, state);
            if port.role() == PortRole::Root {
                println!("    Cost: {}", bridge.root_cost());
            }
        }

        if !bridge.mac_table().is_empty() {
            println!("  MAC table:");
            let mut entries: Vec<_> = bridge.mac_table().iter().collect();
            entries.sort_by_key(|(port, _)| **port);
            for (port, mac) in entries {
                println!("    {} -> {}", port, mac);
            }
        }
        println!();
    }
}
