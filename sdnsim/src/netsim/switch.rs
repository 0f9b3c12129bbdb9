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

//! # Switch
//!
//! Data-plane device holding one flow table. Every frame received on one of its interfaces runs
//! through [`Switch::receive`]:
//!
//! 1. Address resolution frames: requests are answered on behalf of the target, using the
//!    hardware address returned by the controller. Replies are ignored.
//! 2. All other frames are treated as IPv4. The 5-tuple is matched against the flow table. On a
//!    hit, the frame is forwarded immediately. On a miss, the controller is asked to install a flow
//!    (the call returns before the switch continues), and the frame is forwarded with the new flow.
//!
//! Every error aborts the processing of the current frame only.

use crate::netsim::codec::{self, ArpPacket};
use crate::netsim::control::ControlMessage;
use crate::netsim::controller::{Controller, Datapath};
use crate::netsim::fabric::LinkLayer;
use crate::netsim::flow_table::{FlowEntry, FlowId, FlowTable};
use crate::netsim::{
    ControllerId, EntityId, FlowKey, Frame, InterfaceId, MacAddr, PipelineError, ETHER_TYPE_ARP,
    ETHER_TYPE_IPV4,
};

use log::*;
use std::net::Ipv4Addr;

/// What happened to a frame processed by the switch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Address resolution request answered with a reply
    ArpReplied {
        /// Address that was asked for
        target_ip: Ipv4Addr,
        /// Hardware address sent back
        target_mac: MacAddr,
    },
    /// Forwarded with an already installed flow
    Forwarded {
        /// Flow used
        flow: FlowId,
        /// Outgoing interface
        interface: InterfaceId,
    },
    /// Forwarded with a flow which was just installed by the controller
    Installed {
        /// Flow used
        flow: FlowId,
        /// Outgoing interface
        interface: InterfaceId,
    },
    /// Frame is not processed (e.g., address resolution replies)
    Ignored,
}

/// # Switch
#[derive(Debug, Clone)]
pub struct Switch {
    id: EntityId,
    name: String,
    interfaces: Vec<InterfaceId>,
    flow_table: FlowTable,
    controller: Option<ControllerId>,
}

impl Switch {
    /// Create a new switch without interfaces, not yet attached to any controller.
    pub fn new<S: Into<String>>(id: EntityId, name: S) -> Self {
        Self {
            id,
            name: name.into(),
            interfaces: Vec::new(),
            flow_table: FlowTable::new(),
            controller: None,
        }
    }

    /// Return the id of the switch
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Return the name of the switch
    pub fn name(&self) -> &str {
        self.name.as_ref()
    }

    /// Attach an interface to the switch. Frames arriving at this interface are processed by the
    /// switch.
    pub fn add_interface(&mut self, interface: InterfaceId) {
        if !self.interfaces.contains(&interface) {
            self.interfaces.push(interface);
        }
    }

    /// All interfaces of the switch
    pub fn interfaces(&self) -> &[InterfaceId] {
        &self.interfaces
    }

    /// Controller this switch is attached to
    pub fn controller(&self) -> Option<ControllerId> {
        self.controller
    }

    pub(crate) fn set_controller(&mut self, controller: ControllerId) {
        self.controller = Some(controller);
    }

    /// The flow table of the switch
    pub fn flow_table(&self) -> &FlowTable {
        &self.flow_table
    }

    /// Remove the flow with the given 5-tuple. Returns true if a flow was removed.
    pub fn remove_flow(&mut self, key: &FlowKey) -> bool {
        self.flow_table.remove(key)
    }

    /// Process a frame received at `ingress`. The controller is only consulted for address
    /// resolution and on flow misses; `link` is used to transmit frames.
    pub fn receive(
        &mut self,
        controller: &mut Controller,
        link: &mut dyn LinkLayer,
        ingress: InterfaceId,
        frame: &Frame,
    ) -> Result<FrameOutcome, PipelineError> {
        trace!(
            "Switch {}: frame from {} to {} ({:?}) at {}",
            self.name,
            frame.src_mac,
            frame.dst_mac,
            frame.ether_type,
            ingress
        );
        if frame.ether_type == ETHER_TYPE_ARP {
            self.handle_arp(controller, link, ingress, frame)
        } else {
            self.handle_flow(controller, link, ingress, frame)
        }
    }

    fn handle_arp(
        &mut self,
        controller: &mut Controller,
        link: &mut dyn LinkLayer,
        ingress: InterfaceId,
        frame: &Frame,
    ) -> Result<FrameOutcome, PipelineError> {
        let arp = ArpPacket::parse(&frame.payload)?;
        if !arp.is_request() {
            trace!("Switch {}: ignore address resolution reply", self.name);
            return Ok(FrameOutcome::Ignored);
        }
        debug!(
            "Switch {}: address resolution request from {} asking for {}",
            self.name, arp.sender_ip, arp.target_ip
        );

        let mut msg = ControlMessage::arp_request(arp.sender_ip, frame.src_mac, arp.target_ip);
        self.ask_controller(controller, &mut msg, ingress)?;

        let reply = ArpPacket::reply(msg.dst_mac, arp.target_ip, msg.src_mac, arp.sender_ip);
        link.send(ingress, reply.to_bytes(), frame.src_mac, ETHER_TYPE_ARP);
        debug!(
            "Switch {}: address resolution reply ({}) sent to {} for {}",
            self.name, msg.dst_mac, arp.sender_ip, arp.target_ip
        );
        Ok(FrameOutcome::ArpReplied { target_ip: arp.target_ip, target_mac: msg.dst_mac })
    }

    fn handle_flow(
        &mut self,
        controller: &mut Controller,
        link: &mut dyn LinkLayer,
        ingress: InterfaceId,
        frame: &Frame,
    ) -> Result<FrameOutcome, PipelineError> {
        let key = codec::parse_flow_key(&frame.payload)?;
        trace!("Switch {}: looking up {}", self.name, key);

        if let Some(flow) =
            self.flow_table.lookup(key.src_ip, key.dst_ip, key.src_port, key.dst_port)
        {
            debug!("Switch {}: flow matched, forwarding", self.name);
            let interface = self.forward(link, flow, frame)?;
            return Ok(FrameOutcome::Forwarded { flow, interface });
        }

        debug!("Switch {}: no flow matches {}", self.name, key);
        let mut msg = ControlMessage::flow_add(key);
        self.ask_controller(controller, &mut msg, ingress)?;
        let flow = msg.flow.ok_or(PipelineError::NoFlowInstalled)?;
        let interface = self.forward(link, flow, frame)?;
        Ok(FrameOutcome::Installed { flow, interface })
    }

    /// Hand the message to the controller, if this switch is attached to it.
    fn ask_controller(
        &mut self,
        controller: &mut Controller,
        msg: &mut ControlMessage,
        ingress: InterfaceId,
    ) -> Result<(), PipelineError> {
        if self.controller != Some(controller.id()) {
            return Err(PipelineError::NotRegistered(self.id));
        }
        controller.handle_packet_in(self, msg, ingress)?;
        Ok(())
    }

    /// Send the frame out of the interface of the flow, and update the counters. Returns the
    /// interface used.
    fn forward(
        &mut self,
        link: &mut dyn LinkLayer,
        flow: FlowId,
        frame: &Frame,
    ) -> Result<InterfaceId, PipelineError> {
        let interface =
            self.flow_table.get(flow).map(|e| e.output).ok_or(PipelineError::UnknownFlow(flow))?;
        link.send(interface, frame.payload.clone(), frame.dst_mac, ETHER_TYPE_IPV4);
        self.flow_table.update_stats(Some(flow), 1, frame.size() as u64);
        trace!("Switch {}: forwarded {} bytes out of {}", self.name, frame.size(), interface);
        Ok(interface)
    }
}

impl Datapath for Switch {
    fn datapath_id(&self) -> EntityId {
        self.id
    }

    fn install_flow(&mut self, entry: FlowEntry) -> FlowId {
        self.flow_table.install(entry)
    }
}
