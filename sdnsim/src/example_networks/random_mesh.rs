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

//! # Random mesh network

use super::ExampleNetwork;
use crate::netsim::{EntityId, Network, NetworkError};

use log::*;
use rand::prelude::*;
use std::net::Ipv4Addr;

/// # Random mesh network
///
/// Connected mesh of switches, generated from a seed. The switches are first connected as a random
/// tree (switch `i` is connected to some switch `j < i`), then additional links are added between
/// random pairs of switches which are not yet adjacent. Every host is attached to a random switch.
/// Host `h{i}` has address `10.0.{i / 256}.{i % 256}`, starting at `i = 1`.
///
/// The [`ExampleNetwork`] implementation uses the variant as seed, with 8 switches, 6 hosts and 6
/// additional links.
#[derive(Debug, Clone, Copy)]
pub struct RandomMesh {
    /// Number of switches
    pub num_switches: usize,
    /// Number of hosts
    pub num_hosts: usize,
    /// Number of links added on top of the spanning tree
    pub extra_links: usize,
    /// Seed of the random number generator
    pub seed: u64,
}

impl RandomMesh {
    /// Generate the network. The same parameters always yield the same network.
    pub fn generate(&self) -> Result<Network, NetworkError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut net = Network::new();

        let switches: Vec<EntityId> =
            (0..self.num_switches).map(|i| net.add_switch(format!("s{}", i))).collect();

        for i in 1..switches.len() {
            let j = rng.gen_range(0, i);
            net.add_link(switches[i], switches[j])?;
        }

        // every pair of switches can be linked at most once
        let max_extra = switches.len() * switches.len().saturating_sub(1) / 2
            - switches.len().saturating_sub(1);
        let mut added = 0;
        while added < self.extra_links.min(max_extra) {
            let a = switches[rng.gen_range(0, switches.len())];
            let b = switches[rng.gen_range(0, switches.len())];
            if a == b || net.fabric().interface_towards(a, b).is_some() {
                continue;
            }
            net.add_link(a, b)?;
            added += 1;
        }

        if !switches.is_empty() {
            for i in 1..=self.num_hosts {
                let ip = Ipv4Addr::new(10, 0, (i / 256) as u8, (i % 256) as u8);
                let h = net.add_host(format!("h{}", i), ip);
                let s = switches[rng.gen_range(0, switches.len())];
                net.add_link(h, s)?;
            }
        }

        debug!(
            "Generated random mesh with {} switches, {} hosts and {} additional links",
            self.num_switches, self.num_hosts, added
        );
        Ok(net)
    }
}

impl ExampleNetwork for RandomMesh {
    fn net(variant: usize) -> Result<Network, NetworkError> {
        RandomMesh { num_switches: 8, num_hosts: 6, extra_links: 6, seed: variant as u64 }
            .generate()
    }
}
