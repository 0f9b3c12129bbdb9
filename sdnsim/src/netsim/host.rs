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

//! Module defining an endpoint (host) of the network.

use crate::netsim::codec::ArpPacket;
use crate::netsim::{EntityId, Frame, InterfaceId, MacAddr, ETHER_TYPE_ARP};

use log::*;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Endpoint with a single network address. A host does not forward anything. It records every
/// frame it receives, and learns hardware addresses from address resolution replies sent to it.
#[derive(Debug, Clone)]
pub struct Host {
    id: EntityId,
    name: String,
    ip: Ipv4Addr,
    interfaces: Vec<InterfaceId>,
    arp_cache: BTreeMap<Ipv4Addr, MacAddr>,
    received: Vec<(InterfaceId, Frame)>,
}

impl Host {
    pub(crate) fn new(id: EntityId, name: String, ip: Ipv4Addr) -> Self {
        Self {
            id,
            name,
            ip,
            interfaces: Vec::new(),
            arp_cache: BTreeMap::new(),
            received: Vec::new(),
        }
    }

    /// Return the id of the host
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Return the name of the host
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Return the network address of the host
    pub fn ip(&self) -> Ipv4Addr {
        self.ip
    }

    pub(crate) fn add_interface(&mut self, interface: InterfaceId) {
        self.interfaces.push(interface);
    }

    /// Interface used to send frames (the first one)
    pub fn uplink(&self) -> Option<InterfaceId> {
        self.interfaces.first().copied()
    }

    /// Hardware address learned for `ip`
    pub fn resolved(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.arp_cache.get(&ip).copied()
    }

    /// All frames received so far, in arrival order
    pub fn received(&self) -> &[(InterfaceId, Frame)] {
        &self.received
    }

    /// Handle a received frame
    pub(crate) fn receive(&mut self, interface: InterfaceId, frame: Frame) {
        if frame.ether_type == ETHER_TYPE_ARP {
            match ArpPacket::parse(&frame.payload) {
                Ok(arp) if !arp.is_request() && arp.target_ip == self.ip => {
                    debug!(
                        "Host {}: learned {} is at {}",
                        self.name, arp.sender_ip, arp.sender_mac
                    );
                    self.arp_cache.insert(arp.sender_ip, arp.sender_mac);
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("Host {}: cannot parse address resolution frame: {}", self.name, e)
                }
            }
        }
        trace!("Host {}: received {} bytes at {}", self.name, frame.size(), interface);
        self.received.push((interface, frame));
    }
}
