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

//! # Top-level Network module
//!
//! This module ties the control plane to the simulated fabric. It owns every device, the
//! controller, and the event queue, and delivers frames to switches and hosts in order.

use crate::netsim::codec::{self, ArpPacket};
use crate::netsim::config::TopologyConfig;
use crate::netsim::controller::Controller;
use crate::netsim::event::{Event, EventQueue};
use crate::netsim::fabric::{DeviceKind, Fabric, LinkLayer, QueueTransmitter};
use crate::netsim::host::Host;
use crate::netsim::printer;
use crate::netsim::switch::{FrameOutcome, Switch};
use crate::netsim::{
    EntityId, InterfaceId, MacAddr, NetworkError, PipelineError, TopologyError, ETHER_TYPE_ARP,
    ETHER_TYPE_IPV4,
};

use log::*;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

static DEFAULT_STOP_AFTER: usize = 10_000;

/// # Network
///
/// The network contains the physical [`Fabric`], all hosts and switches, and the single
/// [`Controller`]. Frames are put onto a FIFO event queue and processed one after the other by
/// [`Network::do_queue`]. Processing a frame at a switch may call into the controller; this call
/// completes before the next event is processed.
///
/// Setup happens in three steps: add devices and links, build the topology in the controller
/// ([`Network::build_topology`]), and register the switches at the controller
/// ([`Network::register_switch`]). The topology must not be rebuilt while frames are queued.
#[derive(Debug)]
pub struct Network {
    fabric: Fabric,
    controller: Controller,
    switches: BTreeMap<EntityId, Switch>,
    hosts: BTreeMap<EntityId, Host>,
    queue: EventQueue,
    stop_after: Option<usize>,
    outcomes: Vec<(EntityId, FrameOutcome)>,
    dropped: Vec<(InterfaceId, PipelineError)>,
}

impl Default for Network {
    fn default() -> Self {
        Self::new()
    }
}

impl Network {
    /// Generate an empty Network
    pub fn new() -> Self {
        Self {
            fabric: Fabric::new(),
            controller: Controller::new(),
            switches: BTreeMap::new(),
            hosts: BTreeMap::new(),
            queue: EventQueue::new(),
            stop_after: Some(DEFAULT_STOP_AFTER),
            outcomes: Vec::new(),
            dropped: Vec::new(),
        }
    }

    /// Generate the network described by the configuration. The topology is built and all
    /// switches are registered at the controller.
    pub fn from_config(config: &TopologyConfig) -> Result<Self, NetworkError> {
        let mut net = config.instantiate()?;
        net.build_topology();
        net.register_all_switches()?;
        Ok(net)
    }

    /// Add a new host with the given network address.
    pub fn add_host<S: Into<String>>(&mut self, name: S, ip: Ipv4Addr) -> EntityId {
        let name = name.into();
        let id = self.fabric.add_host(name.clone(), ip);
        self.hosts.insert(id, Host::new(id, name, ip));
        id
    }

    /// Add a new switch. The switch is not yet registered at the controller.
    pub fn add_switch<S: Into<String>>(&mut self, name: S) -> EntityId {
        let name = name.into();
        let id = self.fabric.add_switch(name.clone());
        self.switches.insert(id, Switch::new(id, name));
        id
    }

    /// Connect two devices. Returns the two new interfaces, in the order of the devices.
    pub fn add_link(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> Result<(InterfaceId, InterfaceId), NetworkError> {
        self.add_link_with_macs(a, None, b, None)
    }

    /// Connect two devices, using the given hardware addresses where they are set.
    pub fn add_link_with_macs(
        &mut self,
        a: EntityId,
        a_mac: Option<MacAddr>,
        b: EntityId,
        b_mac: Option<MacAddr>,
    ) -> Result<(InterfaceId, InterfaceId), NetworkError> {
        let (if_a, if_b) = self.fabric.add_link_with_macs(a, a_mac, b, b_mac)?;
        self.attach_interface(a, if_a);
        self.attach_interface(b, if_b);
        Ok((if_a, if_b))
    }

    fn attach_interface(&mut self, entity: EntityId, interface: InterfaceId) {
        if let Some(s) = self.switches.get_mut(&entity) {
            s.add_interface(interface);
        } else if let Some(h) = self.hosts.get_mut(&entity) {
            h.add_interface(interface);
        }
    }

    /// Enumerate the fabric, and let the controller build its graph, routing table and address
    /// resolution table.
    pub fn build_topology(&mut self) {
        let observation = self.fabric.observe();
        self.controller.build_topology(&observation);
    }

    /// Register a switch at the controller.
    pub fn register_switch(&mut self, switch: EntityId) -> Result<(), NetworkError> {
        let s = self.switches.get_mut(&switch).ok_or(TopologyError::NotASwitch(switch))?;
        self.controller.add_switch(s);
        Ok(())
    }

    /// Register all switches at the controller, ordered by their id.
    pub fn register_all_switches(&mut self) -> Result<(), NetworkError> {
        let ids: Vec<EntityId> = self.switches.keys().copied().collect();
        for id in ids {
            self.register_switch(id)?;
        }
        Ok(())
    }

    /// Configure the maximum number of events processed by [`Network::do_queue`]. `None` means
    /// no limit.
    pub fn set_stop_after(&mut self, stop_after: Option<usize>) {
        self.stop_after = stop_after;
    }

    /// Send an address resolution request from `host` for `target_ip`, and process all events.
    pub fn send_arp_request(
        &mut self,
        host: EntityId,
        target_ip: Ipv4Addr,
    ) -> Result<(), NetworkError> {
        let (ip, uplink) = self.host_uplink(host)?;
        let mac = self.fabric.interface(uplink)?.mac;
        let request = ArpPacket::request(mac, ip, target_ip);
        debug!("Host {}: who has {}?", host, target_ip);
        self.transmit(uplink, request.to_bytes(), MacAddr::BROADCAST, ETHER_TYPE_ARP)
    }

    /// Send an UDP packet from `host` to `dst_ip`, and process all events.
    pub fn send_udp(
        &mut self,
        host: EntityId,
        dst_ip: Ipv4Addr,
        src_port: u16,
        dst_port: u16,
        payload: &[u8],
    ) -> Result<(), NetworkError> {
        let (ip, uplink) = self.host_uplink(host)?;
        let packet = codec::build_udp(ip, dst_ip, src_port, dst_port, payload)?;
        let dst_mac = self.destination_mac(host, dst_ip);
        self.transmit(uplink, packet, dst_mac, ETHER_TYPE_IPV4)
    }

    /// Send a TCP segment from `host` to `dst_ip`, and process all events.
    pub fn send_tcp(
        &mut self,
        host: EntityId,
        dst_ip: Ipv4Addr,
        src_port: u16,
        dst_port: u16,
        seq: u32,
        payload: &[u8],
    ) -> Result<(), NetworkError> {
        let (ip, uplink) = self.host_uplink(host)?;
        let packet = codec::build_tcp(ip, dst_ip, src_port, dst_port, seq, payload)?;
        let dst_mac = self.destination_mac(host, dst_ip);
        self.transmit(uplink, packet, dst_mac, ETHER_TYPE_IPV4)
    }

    /// Send an arbitrary payload from `host`, and process all events.
    pub fn send_raw(
        &mut self,
        host: EntityId,
        payload: Vec<u8>,
        dst_mac: MacAddr,
        ether_type: u16,
    ) -> Result<(), NetworkError> {
        let (_, uplink) = self.host_uplink(host)?;
        self.transmit(uplink, payload, dst_mac, ether_type)
    }

    fn host_uplink(&self, host: EntityId) -> Result<(Ipv4Addr, InterfaceId), NetworkError> {
        let h = self.hosts.get(&host).ok_or(TopologyError::NotAHost(host))?;
        let uplink = h.uplink().ok_or(TopologyError::HostNotConnected(host))?;
        Ok((h.ip(), uplink))
    }

    fn destination_mac(&self, host: EntityId, dst_ip: Ipv4Addr) -> MacAddr {
        self.hosts.get(&host).and_then(|h| h.resolved(dst_ip)).unwrap_or(MacAddr::BROADCAST)
    }

    fn transmit(
        &mut self,
        outgoing: InterfaceId,
        payload: Vec<u8>,
        dst_mac: MacAddr,
        ether_type: u16,
    ) -> Result<(), NetworkError> {
        let mut link = QueueTransmitter { fabric: &self.fabric, queue: &mut self.queue };
        link.send(outgoing, payload, dst_mac, ether_type);
        self.do_queue()
    }

    /// Process all queued events, in order. Frames that a switch cannot process are dropped,
    /// logged and recorded (see [`Network::dropped_frames`]); processing continues with the next
    /// event. If more than `stop_after` events are processed, the queue is cleared and
    /// [`NetworkError::NoConvergence`] is returned.
    pub fn do_queue(&mut self) -> Result<(), NetworkError> {
        let mut remaining = self.stop_after;
        while let Some(event) = self.queue.pop_front() {
            if let Some(rem) = remaining.as_mut() {
                if *rem == 0 {
                    self.queue.clear();
                    return Err(NetworkError::NoConvergence);
                }
                *rem -= 1;
            }
            match event {
                Event::Frame(interface, frame) => {
                    let owner = self.fabric.owner(interface)?;
                    if let Some(switch) = self.switches.get_mut(&owner) {
                        let mut link =
                            QueueTransmitter { fabric: &self.fabric, queue: &mut self.queue };
                        match switch.receive(&mut self.controller, &mut link, interface, &frame) {
                            Ok(outcome) => self.outcomes.push((owner, outcome)),
                            Err(e) => {
                                warn!(
                                    "Switch {} drops frame at {}: {}",
                                    switch.name(),
                                    interface,
                                    e
                                );
                                self.dropped.push((interface, e));
                            }
                        }
                    } else if let Some(host) = self.hosts.get_mut(&owner) {
                        host.receive(interface, frame);
                    } else {
                        return Err(NetworkError::InvalidEvent(Event::Frame(interface, frame)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Return the controller
    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Return the fabric
    pub fn fabric(&self) -> &Fabric {
        &self.fabric
    }

    /// Return the switch
    pub fn get_switch(&self, id: EntityId) -> Result<&Switch, NetworkError> {
        Ok(self.switches.get(&id).ok_or(TopologyError::NotASwitch(id))?)
    }

    /// Return a mutable reference to the switch
    pub fn get_switch_mut(&mut self, id: EntityId) -> Result<&mut Switch, NetworkError> {
        Ok(self.switches.get_mut(&id).ok_or(TopologyError::NotASwitch(id))?)
    }

    /// Return the host
    pub fn get_host(&self, id: EntityId) -> Result<&Host, NetworkError> {
        Ok(self.hosts.get(&id).ok_or(TopologyError::NotAHost(id))?)
    }

    /// Iterate over all switches, ordered by their id
    pub fn switches(&self) -> impl Iterator<Item = &Switch> {
        self.switches.values()
    }

    /// Iterate over all hosts, ordered by their id
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    /// Return the id of the device with the given name
    pub fn get_entity_id(&self, name: impl AsRef<str>) -> Result<EntityId, NetworkError> {
        Ok(self.fabric.entity_id(name)?)
    }

    /// Return the name of the device
    pub fn get_entity_name(&self, id: EntityId) -> Result<&str, NetworkError> {
        Ok(self.fabric.name(id)?)
    }

    /// Returns true if the entity is a host
    pub fn is_host(&self, id: EntityId) -> bool {
        matches!(self.fabric.device(id).map(|d| d.kind), Ok(DeviceKind::Host(_)))
    }

    /// Outcome of every frame successfully processed by a switch, in processing order.
    pub fn outcomes(&self) -> &[(EntityId, FrameOutcome)] {
        &self.outcomes
    }

    /// Every frame dropped by a switch, with the interface it arrived at and the reason.
    pub fn dropped_frames(&self) -> &[(InterfaceId, PipelineError)] {
        &self.dropped
    }

    /// Human readable routing table of the controller, one line per entry.
    pub fn dump_routing_table(&self) -> Result<Vec<String>, NetworkError> {
        printer::routing_table(self)
    }

    /// Human readable address resolution table of the controller, one line per entry.
    pub fn dump_arp_table(&self) -> Vec<String> {
        printer::arp_table(self)
    }

    /// Human readable flow statistics of all switches.
    pub fn dump_flow_statistics(&self) -> Vec<String> {
        self.switches.values().flat_map(printer::flow_table).collect()
    }
}
