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

//! Networks for testing and for the command-line driver

use crate::netsim::{EntityId, Network, NetworkError};

use itertools::Itertools;
use std::net::Ipv4Addr;

mod one_switch;
pub use one_switch::OneSwitchNet;

mod two_switch;
pub use two_switch::TwoSwitchNet;

mod random_mesh;
pub use random_mesh::RandomMesh;

/// Trait for easier access to example networks.
pub trait ExampleNetwork {
    /// Get the network with all devices and links. The topology is not yet built, and no switch is
    /// registered at the controller.
    fn net(variant: usize) -> Result<Network, NetworkError>;

    /// Get the network, with the topology built and all switches registered.
    fn ready(variant: usize) -> Result<Network, NetworkError> {
        let mut net = Self::net(variant)?;
        net.build_topology();
        net.register_all_switches()?;
        Ok(net)
    }

    /// Get the traffic workload as pairs of sending host and destination address. By default,
    /// every host sends to every other host.
    fn traffic(net: &Network) -> Vec<(EntityId, Ipv4Addr)> {
        all_pairs(net)
    }
}

/// Traffic workload in which every host sends to every other host, ordered by the sending host.
pub fn all_pairs(net: &Network) -> Vec<(EntityId, Ipv4Addr)> {
    let hosts: Vec<(EntityId, Ipv4Addr)> = net.hosts().map(|h| (h.id(), h.ip())).collect();
    hosts
        .iter()
        .cartesian_product(hosts.iter())
        .filter(|(src, dst)| src.0 != dst.0)
        .map(|(src, dst)| (src.0, dst.1))
        .collect()
}
