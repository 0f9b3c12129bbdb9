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

//! # Controller
//!
//! The controller owns the topology graph, the routing table and the address resolution table.
//! All of them are computed once in [`Controller::build_topology`] and are only read afterwards.
//! Switches call [`Controller::handle_packet_in`] synchronously whenever they need a decision.

use crate::netsim::arp_table::ArpTable;
use crate::netsim::control::{ControlMessage, ControlType};
use crate::netsim::fabric::TopologyObservation;
use crate::netsim::flow_table::{FlowEntry, FlowId};
use crate::netsim::routing_table::RoutingTable;
use crate::netsim::switch::Switch;
use crate::netsim::topology::TopologyGraph;
use crate::netsim::{ControllerError, ControllerId, EntityId, InterfaceId, MacAddr};

use log::*;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_CONTROLLER_ID: AtomicU32 = AtomicU32::new(0);

/// Interface of a switch towards the controller. The controller never touches the flow table of
/// a switch directly, it always installs flows through this trait.
pub trait Datapath {
    /// Entity id of the switch
    fn datapath_id(&self) -> EntityId;
    /// Install the flow entry into the flow table of the switch, and return its handle.
    fn install_flow(&mut self, entry: FlowEntry) -> FlowId;
}

/// # Controller
#[derive(Debug)]
pub struct Controller {
    id: ControllerId,
    graph: TopologyGraph,
    routing_table: RoutingTable,
    arp_table: ArpTable,
    switches: Vec<EntityId>,
    handled: BTreeMap<ControlType, usize>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Create a new controller with empty tables.
    pub fn new() -> Self {
        let id = ControllerId(NEXT_CONTROLLER_ID.fetch_add(1, Ordering::Relaxed));
        debug!("Controller {:?} created", id);
        Self {
            id,
            graph: TopologyGraph::new(),
            routing_table: RoutingTable::new(),
            arp_table: ArpTable::new(),
            switches: Vec::new(),
            handled: BTreeMap::new(),
        }
    }

    /// Return the id of the controller
    pub fn id(&self) -> ControllerId {
        self.id
    }

    /// Build the topology graph from the observation, and compute the routing table and the
    /// address resolution table. Any previous state is replaced entirely.
    pub fn build_topology(&mut self, observation: &TopologyObservation) {
        self.graph = TopologyGraph::build(observation);
        self.routing_table = RoutingTable::populate(&self.graph);
        self.arp_table = ArpTable::populate(&self.graph);
        info!(
            "Controller {:?}: {} routes, {} address resolution entries",
            self.id,
            self.routing_table.len(),
            self.arp_table.len()
        );
    }

    /// Register a switch at the controller, and point the switch back to this controller.
    pub fn add_switch(&mut self, switch: &mut Switch) {
        if !self.switches.contains(&switch.id()) {
            self.switches.push(switch.id());
        }
        switch.set_controller(self.id);
        debug!("Switch {} registered at controller {:?}", switch.id(), self.id);
    }

    /// All registered switches, in registration order
    pub fn switches(&self) -> &[EntityId] {
        &self.switches
    }

    /// Resolve the hardware address of `ip`.
    pub fn address_resolution(&self, ip: Ipv4Addr) -> Option<MacAddr> {
        self.arp_table.resolve(ip)
    }

    /// Find the outgoing interface for a frame at interface `current` destined to `dst_ip`.
    pub fn next_hop(
        &self,
        current: InterfaceId,
        dst_ip: Ipv4Addr,
    ) -> Result<InterfaceId, ControllerError> {
        self.routing_table.lookup(&self.graph, current, dst_ip)
    }

    /// Handle a control message sent by a switch, for a frame that was received at `ingress`.
    ///
    /// - `ArpRequest`: the hardware address of `dst_ip` is written into `dst_mac`.
    /// - `FlowAdd`: a flow towards `dst_ip` is installed on the switch, and its handle is written
    ///   into `flow`. If no route exists, nothing is installed.
    /// - `Error` and all reserved types are rejected.
    pub fn handle_packet_in(
        &mut self,
        datapath: &mut dyn Datapath,
        msg: &mut ControlMessage,
        ingress: InterfaceId,
    ) -> Result<(), ControllerError> {
        if !self.switches.contains(&datapath.datapath_id()) {
            return Err(ControllerError::UnknownSwitch(datapath.datapath_id()));
        }
        *self.handled.entry(msg.kind).or_insert(0) += 1;

        match msg.kind {
            ControlType::ArpRequest => {
                msg.dst_mac = match self.arp_table.resolve(msg.dst_ip) {
                    Some(mac) => mac,
                    None => {
                        warn!("Cannot resolve the hardware address of {}", msg.dst_ip);
                        return Err(ControllerError::UnresolvedAddress(msg.dst_ip));
                    }
                };
                debug!("Resolved {} to {}", msg.dst_ip, msg.dst_mac);
                Ok(())
            }
            ControlType::FlowAdd => {
                let output = self.next_hop(ingress, msg.dst_ip)?;
                let entry = FlowEntry::new(msg.flow_key(), output);
                msg.flow = Some(datapath.install_flow(entry));
                debug!(
                    "Flow installed on switch {}: {} via {}",
                    datapath.datapath_id(),
                    entry.key,
                    output
                );
                Ok(())
            }
            ControlType::Error => Err(ControllerError::ErrorMessage),
            kind => {
                debug!("Ignore control message of type {:?}", kind);
                Err(ControllerError::Unsupported(kind))
            }
        }
    }

    /// Number of control messages of type `kind` handled so far (including rejected ones).
    pub fn num_handled(&self, kind: ControlType) -> usize {
        self.handled.get(&kind).copied().unwrap_or(0)
    }

    /// The topology graph
    pub fn graph(&self) -> &TopologyGraph {
        &self.graph
    }

    /// The routing table
    pub fn routing_table(&self) -> &RoutingTable {
        &self.routing_table
    }

    /// The address resolution table
    pub fn arp_table(&self) -> &ArpTable {
        &self.arp_table
    }
}
