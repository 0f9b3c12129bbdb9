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

#![deny(missing_docs)]

//! # SdnSim: Simulating a Software-Defined Network Control Plane
//! This is a library for simulating the control plane of a software-defined network, in which a
//! single controller computes shortest paths over the whole topology and installs flows into the
//! switches on demand.
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`NetSim`](netsim)**: The control plane and the simulated fabric underneath. See the main
//!   structure [`Network`](netsim::Network), which owns the [`Controller`](netsim::Controller),
//!   all [`Switches`](netsim::Switch) and [`Hosts`](netsim::Host), and processes frames in order.
//!
//! - **[`Configuration`](netsim::config)**: Topologies described in JSON, which can be loaded
//!   into a network with [`Network::from_config`](netsim::Network::from_config).
//!
//! - **[`ExampleNetworks`](example_networks)**: Collection of prepared topologies, including a
//!   seeded random mesh of arbitrary size.
//!
//! ## Usage
//!
//! ```
//! use sdnsim::example_networks::*;
//! use sdnsim::netsim::printer;
//! use sdnsim::Error;
//!
//! fn main() -> Result<(), Error> {
//!     // prepare the network, with the topology built and all switches registered
//!     let mut net = TwoSwitchNet::ready(0)?;
//!
//!     // send some traffic
//!     for (host, dst) in TwoSwitchNet::traffic(&net) {
//!         net.send_arp_request(host, dst)?;
//!         net.send_udp(host, dst, 49153, 9, b"hello")?;
//!     }
//!
//!     // show what the control plane did
//!     printer::print_routing_table(&net)?;
//!     printer::print_flow_tables(&net);
//!
//!     Ok(())
//! }
//! ```

mod error;
pub mod netsim;

pub use error::Error;

// test modules
pub mod example_networks;
mod test;
