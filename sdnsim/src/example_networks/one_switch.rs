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

//! # One switch network

use super::ExampleNetwork;
use crate::netsim::{Network, NetworkError};

use std::net::Ipv4Addr;

/// # One switch network
///
/// ```text
/// h1 ---- s1 ---- h2
/// ```
///
/// `h1` has address `10.0.0.1`, `h2` has address `10.0.0.2`.
pub struct OneSwitchNet {}

impl ExampleNetwork for OneSwitchNet {
    /// The variant is ignored.
    fn net(_variant: usize) -> Result<Network, NetworkError> {
        let mut net = Network::new();

        let h1 = net.add_host("h1", Ipv4Addr::new(10, 0, 0, 1));
        let h2 = net.add_host("h2", Ipv4Addr::new(10, 0, 0, 2));
        let s1 = net.add_switch("s1");

        net.add_link(h1, s1)?;
        net.add_link(s1, h2)?;

        Ok(net)
    }
}
