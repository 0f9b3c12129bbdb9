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

#![deny(missing_docs, missing_debug_implementations)]

//! # NetSim
//!
//! This is a library for simulating the control plane of a software-defined network: a single
//! logically centralized controller, and switches that forward frames according to flows
//! installed reactively by the controller.
//!
//! The controller enumerates the physical fabric into a [`TopologyGraph`], computes all shortest
//! paths with Dijkstra's algorithm, and derives a [`RoutingTable`] (source and destination entity
//! to outgoing interface) and an [`ArpTable`] (network address to hardware address). Switches
//! answer address resolution requests on behalf of the hosts, and forward IPv4 frames carrying TCP
//! or UDP according to their [`FlowTable`]. On a flow miss, the switch asks the controller, which
//! installs a flow towards the next hop.
//!
//! ## Example usage
//!
//! ```rust
//! use sdnsim::netsim::{Network, FrameOutcome};
//! use std::net::Ipv4Addr;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut net = Network::new();
//!
//!     let h1 = net.add_host("h1", Ipv4Addr::new(10, 0, 0, 1));
//!     let h2 = net.add_host("h2", Ipv4Addr::new(10, 0, 0, 2));
//!     let s1 = net.add_switch("s1");
//!
//!     net.add_link(h1, s1)?;
//!     net.add_link(s1, h2)?;
//!
//!     net.build_topology();
//!     net.register_switch(s1)?;
//!
//!     // h1 learns the hardware address of h2 from the switch
//!     net.send_arp_request(h1, Ipv4Addr::new(10, 0, 0, 2))?;
//!     assert!(net.get_host(h1)?.resolved(Ipv4Addr::new(10, 0, 0, 2)).is_some());
//!
//!     // the first packet installs a flow, the second one uses it
//!     net.send_udp(h1, Ipv4Addr::new(10, 0, 0, 2), 49153, 9, &[0; 64])?;
//!     net.send_udp(h1, Ipv4Addr::new(10, 0, 0, 2), 49153, 9, &[0; 64])?;
//!     assert_eq!(net.get_switch(s1)?.flow_table().len(), 1);
//!     assert!(matches!(net.outcomes().last(), Some((_, FrameOutcome::Forwarded { .. }))));
//!     assert_eq!(net.get_host(h2)?.received().len(), 2);
//!
//!     Ok(())
//! }
//! ```

pub mod arp_table;
pub mod codec;
pub mod config;
pub mod control;
pub mod controller;
pub(crate) mod event;
pub mod fabric;
pub mod flow_table;
pub mod host;
pub(crate) mod network;
pub mod printer;
pub mod routing_table;
pub mod shortest_path;
pub mod switch;
pub mod topology;
pub(crate) mod types;

pub use arp_table::ArpTable;
pub use config::TopologyConfig;
pub use control::{ControlMessage, ControlType};
pub use controller::{Controller, Datapath};
pub use event::Event;
pub use fabric::{Fabric, LinkLayer, TopologyObservation};
pub use flow_table::{FlowEntry, FlowId, FlowTable};
pub use host::Host;
pub use network::Network;
pub use routing_table::{Route, RoutingTable};
pub use shortest_path::ShortestPaths;
pub use switch::{FrameOutcome, Switch};
pub use topology::TopologyGraph;
pub use types::{
    CodecError, ControllerError, ControllerId, EntityId, FlowKey, Frame, FrameClass, InterfaceId,
    LinkWeight, MacAddr, NetworkError, PipelineError, TopologyError, TopologyIndex,
    TopologyNetwork, ETHER_TYPE_ARP, ETHER_TYPE_IPV4, PROTOCOL_TCP, PROTOCOL_UDP,
};
