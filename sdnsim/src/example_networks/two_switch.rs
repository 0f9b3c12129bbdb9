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

//! # Two switch network

use super::ExampleNetwork;
use crate::netsim::{EntityId, Network, NetworkError};

use std::net::Ipv4Addr;

/// # Two switch network
///
/// ```text
///                 .-- h2
/// h1 ---- s1 ---- s2
///                 '-- h3
/// ```
///
/// Host `h{i}` has address `10.0.0.{i}`. Only `h1` sends traffic, to `h2` and to `h3`, such that
/// `s1` forwards everything towards `s2`.
pub struct TwoSwitchNet {}

impl ExampleNetwork for TwoSwitchNet {
    fn net(_variant: usize) -> Result<Network, NetworkError> {
        let mut net = Network::new();

        let h1 = net.add_host("h1", Ipv4Addr::new(10, 0, 0, 1));
        let h2 = net.add_host("h2", Ipv4Addr::new(10, 0, 0, 2));
        let h3 = net.add_host("h3", Ipv4Addr::new(10, 0, 0, 3));
        let s1 = net.add_switch("s1");
        let s2 = net.add_switch("s2");

        net.add_link(h1, s1)?;
        net.add_link(s1, s2)?;
        net.add_link(s2, h2)?;
        net.add_link(s2, h3)?;

        Ok(net)
    }

    fn traffic(net: &Network) -> Vec<(EntityId, Ipv4Addr)> {
        match net.get_entity_id("h1") {
            Ok(h1) => vec![(h1, Ipv4Addr::new(10, 0, 0, 2)), (h1, Ipv4Addr::new(10, 0, 0, 3))],
            Err(_) => Vec::new(),
        }
    }
}
