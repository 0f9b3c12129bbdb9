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

//! Module containing all type definitions

use crate::netsim::control::ControlType;
use crate::netsim::event::Event;
use crate::netsim::flow_table::FlowId;
use petgraph::prelude::*;
use petgraph::stable_graph::StableGraph;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;

type IndexType = u32;

/// Entity identification. Every host and every switch in the fabric has exactly one.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct EntityId(pub u32);

/// Interface identification (handle of a network device attached to an entity).
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct InterfaceId(pub u32);

/// Identification of a controller, used by switches as non-owning back-reference.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct ControllerId(pub u32);

/// Link Weight for the topology graph (hop count)
pub type LinkWeight = u32;

/// Directed topology graph. Every node carries the entity it represents, every edge the
/// [`Link`](crate::netsim::topology::Link) used to reach the neighbor.
pub type TopologyNetwork =
    StableGraph<EntityId, crate::netsim::topology::Link, Directed, IndexType>;

/// Index of an entity inside the [`TopologyNetwork`].
pub type TopologyIndex = NodeIndex<IndexType>;

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if{}", self.0)
    }
}

/// 48 bit hardware address
#[derive(
    PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Default, Serialize, Deserialize,
)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    /// The all-zero address, used as "unknown"
    pub const ZERO: MacAddr = MacAddr([0; 6]);
    /// The broadcast address `ff:ff:ff:ff:ff:ff`
    pub const BROADCAST: MacAddr = MacAddr([0xff; 6]);

    /// Generate the `n`-th address of a sequential allocation, starting at `00:00:00:00:00:01`
    /// for `n = 1`.
    pub fn from_index(n: u64) -> Self {
        let b = n.to_be_bytes();
        MacAddr([b[2], b[3], b[4], b[5], b[6], b[7]])
    }

    /// Returns true if this is the all-zero address
    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", b[0], b[1], b[2], b[3], b[4], b[5])
    }
}

/// EtherType of address resolution frames
pub const ETHER_TYPE_ARP: u16 = 0x0806;
/// EtherType of IPv4 frames
pub const ETHER_TYPE_IPV4: u16 = 0x0800;
/// IP protocol number of TCP
pub const PROTOCOL_TCP: u8 = 6;
/// IP protocol number of UDP
pub const PROTOCOL_UDP: u8 = 17;

/// Classification of a received frame, as reported by the link layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClass {
    /// Addressed to the receiving interface
    Host,
    /// Broadcast frame
    Broadcast,
    /// Addressed to some other interface
    OtherHost,
}

/// A frame as it travels over a link. The payload starts after the link-layer header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Link-layer payload
    pub payload: Vec<u8>,
    /// Source hardware address
    pub src_mac: MacAddr,
    /// Destination hardware address
    pub dst_mac: MacAddr,
    /// Declared protocol (EtherType)
    pub ether_type: u16,
}

impl Frame {
    /// Size of the frame in bytes, as accounted in flow statistics
    pub fn size(&self) -> usize {
        self.payload.len()
    }

    /// Classify the frame relative to the hardware address of the receiving interface.
    pub fn class(&self, receiver: MacAddr) -> FrameClass {
        if self.dst_mac == MacAddr::BROADCAST {
            FrameClass::Broadcast
        } else if self.dst_mac == receiver {
            FrameClass::Host
        } else {
            FrameClass::OtherHost
        }
    }
}

/// Transport 5-tuple identifying a flow.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy)]
pub struct FlowKey {
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
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} -> {}:{} (proto {})",
            self.src_ip, self.src_port, self.dst_ip, self.dst_port, self.protocol
        )
    }
}

/// Errors of the header codec
#[derive(Error, Debug, PartialEq)]
pub enum CodecError {
    /// The header is shorter than required
    #[error("Truncated {what} header: need {needed} bytes, got {got}")]
    Truncated {
        /// Which header was parsed
        what: &'static str,
        /// Number of bytes required
        needed: usize,
        /// Number of bytes available
        got: usize,
    },
    /// The header contains values which cannot be interpreted
    #[error("Malformed {0} header")]
    Malformed(&'static str),
    /// The transport protocol is neither TCP nor UDP
    #[error("Unsupported transport protocol: {0}")]
    UnsupportedProtocol(u8),
    /// Error reported by the IP / transport header parser
    #[error("Cannot read header: {0}")]
    Read(String),
    /// The packet cannot be built
    #[error("Cannot build packet: {0}")]
    Build(String),
}

impl From<etherparse::ReadError> for CodecError {
    fn from(cause: etherparse::ReadError) -> Self {
        Self::Read(format!("{:?}", cause))
    }
}

/// Topology Errors
#[derive(Error, Debug, PartialEq)]
pub enum TopologyError {
    /// Entity is not present in the fabric
    #[error("Entity was not found in the fabric: {0:?}")]
    EntityNotFound(EntityId),
    /// Interface is not present in the fabric
    #[error("Interface was not found in the fabric: {0:?}")]
    InterfaceNotFound(InterfaceId),
    /// Name is not present in the fabric
    #[error("Device name was not found in the fabric: {0}")]
    NameNotFound(String),
    /// Name is used twice
    #[error("Device name is used twice: {0}")]
    DuplicateName(String),
    /// The entity must be a host
    #[error("Entity is not a host: {0:?}")]
    NotAHost(EntityId),
    /// The entity must be a switch
    #[error("Entity is not a switch: {0:?}")]
    NotASwitch(EntityId),
    /// The host has no interface to send frames
    #[error("Host has no interface: {0:?}")]
    HostNotConnected(EntityId),
}

/// Controller Errors
#[derive(Error, Debug, PartialEq)]
pub enum ControllerError {
    /// No graph node owns the given interface
    #[error("No entity owns interface {0:?}")]
    UnresolvedInterface(InterfaceId),
    /// No graph node carries the given network address
    #[error("No entity has the network address {0}")]
    UnresolvedAddress(Ipv4Addr),
    /// Both entities are known, but no route exists between them
    #[error("No route from {0:?} to {1:?}")]
    NoRoute(EntityId, EntityId),
    /// The switch sending the request is not registered at this controller
    #[error("Switch {0:?} is not registered at the controller")]
    UnknownSwitch(EntityId),
    /// Reserved control message type, which is not acted upon
    #[error("Control message type {0:?} is not supported")]
    Unsupported(ControlType),
    /// The control message is marked as an error
    #[error("Received an error control message")]
    ErrorMessage,
}

/// Errors of the switch packet pipeline. All of them are fatal for the current frame only.
#[derive(Error, Debug, PartialEq)]
pub enum PipelineError {
    /// Header could not be parsed
    #[error("Cannot parse header: {0}")]
    HeaderParse(CodecError),
    /// Transport protocol is neither TCP nor UDP, so no flow can be matched or installed.
    #[error("Unsupported transport protocol: {0}")]
    UnsupportedProtocol(u8),
    /// The switch is not attached to the controller it was called with
    #[error("Switch {0:?} is not registered at the controller")]
    NotRegistered(EntityId),
    /// The controller could not answer the request
    #[error("Controller Error: {0}")]
    Controller(#[from] ControllerError),
    /// The controller accepted the flow request, but did not return a flow
    #[error("Controller did not return a flow")]
    NoFlowInstalled,
    /// The flow handle is not known to the flow table
    #[error("Flow {0:?} is not installed")]
    UnknownFlow(FlowId),
}

impl From<CodecError> for PipelineError {
    fn from(cause: CodecError) -> Self {
        match cause {
            CodecError::UnsupportedProtocol(p) => Self::UnsupportedProtocol(p),
            e => Self::HeaderParse(e),
        }
    }
}

/// Network Errors
#[derive(Error, Debug, PartialEq)]
pub enum NetworkError {
    /// Topology error
    #[error("Topology Error: {0}")]
    TopologyError(#[from] TopologyError),
    /// Switch pipeline error which could not be handled at the frame boundary
    #[error("Pipeline Error: {0}")]
    PipelineError(#[from] PipelineError),
    /// Host cannot build the requested frame
    #[error("Codec Error: {0}")]
    CodecError(#[from] CodecError),
    /// Too many events were processed
    #[error("Network cannot converge in the given time!")]
    NoConvergence,
    /// Event cannot be handled by the network
    #[error("Cannot handle the event: {0:?}")]
    InvalidEvent(Event),
}
