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

//! # Flow Table
//!
//! Per-switch cache of installed forwarding rules, keyed by the transport 5-tuple.
//!
//! Entries are kept in install order and are never evicted. The table grows without bound until
//! flows are removed explicitly with [`FlowTable::remove`].

use crate::netsim::{FlowKey, InterfaceId};

use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Stable handle of an installed flow. It remains valid until the flow is removed.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct FlowId(pub u64);

/// Cached forwarding decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowEntry {
    /// 5-tuple of the flow
    pub key: FlowKey,
    /// Interface out of which matching frames are forwarded
    pub output: InterfaceId,
    /// Number of frames forwarded with this entry
    pub packets: u64,
    /// Number of bytes forwarded with this entry
    pub bytes: u64,
}

impl FlowEntry {
    /// Create a new entry with zeroed counters
    pub fn new(key: FlowKey, output: InterfaceId) -> Self {
        Self { key, output, packets: 0, bytes: 0 }
    }
}

/// # Flow Table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowTable {
    /// Installed entries. Handles are allocated monotonically, so the map iterates in install
    /// order.
    entries: BTreeMap<FlowId, FlowEntry>,
    next_id: u64,
}

impl FlowTable {
    /// Create an empty flow table
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the entry and return its handle.
    pub fn install(&mut self, entry: FlowEntry) -> FlowId {
        let id = FlowId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, entry);
        id
    }

    /// Remove the first entry whose 5-tuple equals `key` (including the protocol). Returns true if
    /// an entry was removed.
    pub fn remove(&mut self, key: &FlowKey) -> bool {
        let found = self.entries.iter().find(|(_, e)| e.key == *key).map(|(id, _)| *id);
        match found {
            Some(id) => self.entries.remove(&id).is_some(),
            None => false,
        }
    }

    /// Find the first entry (in install order) matching the addresses and ports. The transport
    /// protocol is not part of the match.
    pub fn lookup(
        &self,
        src_ip: Ipv4Addr,
        dst_ip: Ipv4Addr,
        src_port: u16,
        dst_port: u16,
    ) -> Option<FlowId> {
        self.entries
            .iter()
            .find(|(_, e)| {
                e.key.src_ip == src_ip
                    && e.key.dst_ip == dst_ip
                    && e.key.src_port == src_port
                    && e.key.dst_port == dst_port
            })
            .map(|(id, _)| *id)
    }

    /// Add `packets` and `bytes` to the counters of the flow. Does nothing if the handle is not
    /// given or no longer valid.
    pub fn update_stats(&mut self, flow: Option<FlowId>, packets: u64, bytes: u64) {
        if let Some(entry) = flow.and_then(|id| self.entries.get_mut(&id)) {
            entry.packets += packets;
            entry.bytes += bytes;
        }
    }

    /// Get the entry
    pub fn get(&self, flow: FlowId) -> Option<&FlowEntry> {
        self.entries.get(&flow)
    }

    /// Iterate over all entries in install order
    pub fn entries(&self) -> impl Iterator<Item = (&FlowId, &FlowEntry)> {
        self.entries.iter()
    }

    /// Number of installed flows
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no flow is installed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
