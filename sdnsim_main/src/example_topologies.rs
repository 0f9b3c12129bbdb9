// SdnSim: Simulating a Software-Defined Network Control Plane
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

use sdnsim::example_networks::{self, ExampleNetwork, OneSwitchNet, RandomMesh, TwoSwitchNet};
use sdnsim::netsim::{EntityId, Network, TopologyConfig};
use sdnsim::Error;

use clap::Subcommand;
use log::*;
use rand::prelude::*;
use std::net::Ipv4Addr;

/// Topology on which the workload is run
#[derive(Subcommand, Debug, Clone)]
pub enum NetworkSelection {
    /// Use an example network, provided by sdnsim
    #[clap(name = "example")]
    Example {
        #[clap(subcommand)]
        topology: Topology,
    },
    /// Read the topology from a JSON file
    #[clap(name = "file")]
    File {
        /// Path to the JSON topology
        path: String,
    },
}

/// Example networks
#[derive(Subcommand, Debug, Clone)]
pub enum Topology {
    /// h1 -- s1 -- h2
    #[clap(name = "one-switch")]
    OneSwitch,
    /// h1 -- s1 -- s2 -- {h2, h3}
    #[clap(name = "two-switch")]
    TwoSwitch,
    /// Random connected mesh of switches with attached hosts
    #[clap(name = "random-mesh")]
    RandomMesh {
        /// Number of switches
        #[clap(long, default_value = "8")]
        switches: usize,
        /// Number of hosts
        #[clap(long, default_value = "6")]
        hosts: usize,
        /// Number of links added on top of the spanning tree
        #[clap(long, default_value = "6")]
        extra_links: usize,
        /// Random seed, to get reproducable networks. Chosen randomly if not given.
        #[clap(short = 's', long)]
        seed: Option<u64>,
    },
}

/// Build the selected network, with the topology built and all switches registered. Returns the
/// network and the traffic workload (sending host and destination address).
pub fn get_network(
    selection: &NetworkSelection,
) -> Result<(Network, Vec<(EntityId, Ipv4Addr)>), Error> {
    Ok(match selection {
        NetworkSelection::Example { topology: Topology::OneSwitch } => {
            let net = OneSwitchNet::ready(0)?;
            let traffic = OneSwitchNet::traffic(&net);
            (net, traffic)
        }
        NetworkSelection::Example { topology: Topology::TwoSwitch } => {
            let net = TwoSwitchNet::ready(0)?;
            let traffic = TwoSwitchNet::traffic(&net);
            (net, traffic)
        }
        NetworkSelection::Example {
            topology: Topology::RandomMesh { switches, hosts, extra_links, seed },
        } => {
            let seed = seed.unwrap_or_else(|| thread_rng().gen());
            info!("Generating random mesh with seed {}", seed);
            let mesh = RandomMesh {
                num_switches: *switches,
                num_hosts: *hosts,
                extra_links: *extra_links,
                seed,
            };
            let mut net = mesh.generate()?;
            net.build_topology();
            net.register_all_switches()?;
            let traffic = example_networks::all_pairs(&net);
            (net, traffic)
        }
        NetworkSelection::File { path } => {
            let config = TopologyConfig::from_file(path)?;
            let net = Network::from_config(&config)?;
            let traffic = example_networks::all_pairs(&net);
            (net, traffic)
        }
    })
}
