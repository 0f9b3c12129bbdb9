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

//! # Control messages
//!
//! In-process messages exchanged between a switch and the controller. A message is built by the
//! switch, handed to the controller by mutable reference, and filled in by the controller.

use crate::netsim::flow_table::FlowId;
use crate::netsim::{FlowKey, MacAddr};

use std::net::Ipv4Addr;

/// Type of a control message.
///
/// Only [`ArpRequest`](ControlType::ArpRequest), [`FlowAdd`](ControlType::FlowAdd) and
/// [`Error`](ControlType::Error) are produced by the switch pipeline. All other types are part of
/// the protocol surface, but the controller rejects them as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ControlType {
    /// Resolve the hardware address of `dst_ip`
    ArpRequest,
    /// Answer to an address resolution request
    ArpReply,
    /// Install a new flow on the requesting switch
    FlowAdd,
    /// Remove a flow
    FlowDelete,
    /// Modify an existing flow
    FlowModify,
    /// Topology update notification
    LinkStateUpdate,
    /// Controller asking the switch for statistics
    StatsRequest,
    /// Switch replying with statistics
    StatsReply,
    /// Frame arrived at a switch without matching rule
    PacketIn,
    /// Controller sending a frame out of a switch port
    PacketOut,
    /// A switch joins the network
    SwitchJoin,
    /// A switch leaves the network
    SwitchLeave,
    /// Initial handshake
    Hello,
    /// Synchronization barrier
    BarrierRequest,
    /// Answer to a synchronization barrier
    BarrierReply,
    /// The message could not be built completely
    Error,
}

impl ControlType {
    /// Returns true if the controller acts upon messages of this type.
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::ArpRequest | Self::FlowAdd)
    }
}

/// Control message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlMessage {
    /// Type of the message
    pub kind: ControlType,
    /// Source network address
    pub src_ip: Ipv4Addr,
    /// Destination network address
    pub dst_ip: Ipv4Addr,
    /// Source transport port
    pub src_port: u16,
    /// Destination transport port
    pub dst_port: u16,
    /// Transport protocol number
    pub protocol: u8,
    /// Source hardware address
    pub src_mac: MacAddr,
    /// Destination hardware address
    pub dst_mac: MacAddr,
    /// Flow installed on the requesting switch, set by the controller on `FlowAdd`.
    pub flow: Option<FlowId>,
}

impl ControlMessage {
    /// Create an empty message of the given type
    pub fn new(kind: ControlType) -> Self {
        Self {
            kind,
            src_ip: Ipv4Addr::UNSPECIFIED,
            dst_ip: Ipv4Addr::UNSPECIFIED,
            src_port: 0,
            dst_port: 0,
            protocol: 0,
            src_mac: MacAddr::ZERO,
            dst_mac: MacAddr::ZERO,
            flow: None,
        }
    }

    /// Address resolution request from `src_ip` (with hardware address `src_mac`) for `dst_ip`.
    pub fn arp_request(src_ip: Ipv4Addr, src_mac: MacAddr, dst_ip: Ipv4Addr) -> Self {
        Self { src_ip, dst_ip, src_mac, ..Self::new(ControlType::ArpRequest) }
    }

    /// Flow installation request for the given 5-tuple.
    pub fn flow_add(key: FlowKey) -> Self {
        Self {
            src_ip: key.src_ip,
            dst_ip: key.dst_ip,
            src_port: key.src_port,
            dst_port: key.dst_port,
            protocol: key.protocol,
            ..Self::new(ControlType::FlowAdd)
        }
    }

    /// The 5-tuple carried by the message
    pub fn flow_key(&self) -> FlowKey {
        FlowKey {
            src_ip: self.src_ip,
            dst_ip: self.dst_ip,
            src_port: self.src_port,
            dst_port: self.dst_port,
            protocol: self.protocol,
        }
    }
}
