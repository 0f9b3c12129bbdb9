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

//! # Address Resolution Table
//!
//! Maps the network address of every directly attached host interface to its hardware address.

use crate::netsim::topology::TopologyGraph;
use crate::netsim::MacAddr;

use log::*;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// # Address Resolution Table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArpTable {
    entries: BTreeMap<Ipv4Addr, MacAddr>,
}

impl ArpTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one entry per host interface of the graph.
    pub fn populate(graph: &TopologyGraph) -> Self {
        let entries: BTreeMap<Ipv4Addr, MacAddr> =
            graph.nodes().filter_map(|n| n.ip.map(|ip| (ip, n.mac))).collect();
        debug!("Address resolution table computed with {} entries", entries.len());
        Self { entries }
    }

    /// Resolve the hardware address of `ip`. Returns `None` if the address is unknown.
    pub fn resolve(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.entries.get(&ip).copied()
    }

    /// Iterate over all entries, ordered by network address
    pub fn iter(&self) -> impl Iterator<Item = (&Ipv4Addr, &MacAddr)> {
        self.entries.iter()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entry
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
