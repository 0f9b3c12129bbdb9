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

//! # Physical fabric
//!
//! The fabric is the link layer underneath the control plane. It knows every device, every
//! interface and every point-to-point link, enumerates the topology for the controller, and
//! carries frames from an outgoing interface to its peer. It does not make any forwarding
//! decision.

use crate::netsim::event::{Event, EventQueue};
use crate::netsim::{EntityId, Frame, InterfaceId, MacAddr, TopologyError};

use log::*;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Kind of a device attached to the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    /// Endpoint with a network address
    Host(Ipv4Addr),
    /// Switch without network address
    Switch,
}

/// Device attached to the fabric
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    /// Name of the device
    pub name: String,
    /// Kind of the device
    pub kind: DeviceKind,
    /// All interfaces of the device, in the order in which they were created
    pub interfaces: Vec<InterfaceId>,
}

/// Interface of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interface {
    /// Device owning the interface
    pub owner: EntityId,
    /// Hardware address of the interface
    pub mac: MacAddr,
    /// Interface at the other end of the link, if connected
    pub peer: Option<InterfaceId>,
}

/// Observation of a single interface, as needed by the controller to build its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceObservation {
    /// Entity owning the interface
    pub entity: EntityId,
    /// The interface itself
    pub interface: InterfaceId,
    /// Hardware address of the interface
    pub mac: MacAddr,
    /// Network address of the interface (`None` for switches)
    pub ip: Option<Ipv4Addr>,
}

/// Result of the topology enumeration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopologyObservation {
    /// Interfaces of all hosts
    pub hosts: Vec<InterfaceObservation>,
    /// Interfaces of all switches
    pub switches: Vec<InterfaceObservation>,
    /// All point-to-point links, given by the two interfaces they connect.
    pub links: Vec<(InterfaceId, InterfaceId)>,
}

/// Frame transmission, as seen by the switch pipeline. Transmission is fire-and-forget.
pub trait LinkLayer {
    /// Send the payload out of the given interface.
    fn send(&mut self, outgoing: InterfaceId, payload: Vec<u8>, dst_mac: MacAddr, ether_type: u16);
}

/// # Fabric
/// Container of all devices, interfaces and links.
#[derive(Debug, Clone, Default)]
pub struct Fabric {
    devices: BTreeMap<EntityId, Device>,
    interfaces: BTreeMap<InterfaceId, Interface>,
    links: Vec<(InterfaceId, InterfaceId)>,
    next_entity: u32,
    next_interface: u32,
    next_mac: u64,
}

impl Fabric {
    /// Create an empty fabric
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host with the given network address.
    pub fn add_host<S: Into<String>>(&mut self, name: S, ip: Ipv4Addr) -> EntityId {
        self.add_device(name.into(), DeviceKind::Host(ip))
    }

    /// Add a switch.
    pub fn add_switch<S: Into<String>>(&mut self, name: S) -> EntityId {
        self.add_device(name.into(), DeviceKind::Switch)
    }

    fn add_device(&mut self, name: String, kind: DeviceKind) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.devices.insert(id, Device { name, kind, interfaces: Vec::new() });
        id
    }

    /// Connect two devices with a new point-to-point link. This creates one new interface on
    /// each device, with sequentially allocated hardware addresses, and returns them in the same
    /// order as the devices were given.
    pub fn add_link(
        &mut self,
        a: EntityId,
        b: EntityId,
    ) -> Result<(InterfaceId, InterfaceId), TopologyError> {
        self.add_link_with_macs(a, None, b, None)
    }

    /// Connect two devices, and use the given hardware addresses if they are set.
    pub fn add_link_with_macs(
        &mut self,
        a: EntityId,
        a_mac: Option<MacAddr>,
        b: EntityId,
        b_mac: Option<MacAddr>,
    ) -> Result<(InterfaceId, InterfaceId), TopologyError> {
        if !self.devices.contains_key(&a) {
            return Err(TopologyError::EntityNotFound(a));
        }
        if !self.devices.contains_key(&b) {
            return Err(TopologyError::EntityNotFound(b));
        }
        let if_a = self.add_interface(a, a_mac);
        let if_b = self.add_interface(b, b_mac);
        // both interfaces exist, we just created them.
        if let Some(i) = self.interfaces.get_mut(&if_a) {
            i.peer = Some(if_b);
        }
        if let Some(i) = self.interfaces.get_mut(&if_b) {
            i.peer = Some(if_a);
        }
        self.links.push((if_a, if_b));
        Ok((if_a, if_b))
    }

    fn add_interface(&mut self, owner: EntityId, mac: Option<MacAddr>) -> InterfaceId {
        let id = InterfaceId(self.next_interface);
        self.next_interface += 1;
        let mac = mac.unwrap_or_else(|| {
            self.next_mac += 1;
            MacAddr::from_index(self.next_mac)
        });
        self.interfaces.insert(id, Interface { owner, mac, peer: None });
        if let Some(d) = self.devices.get_mut(&owner) {
            d.interfaces.push(id);
        }
        id
    }

    /// Enumerate the topology: all host and switch interfaces, and all links.
    pub fn observe(&self) -> TopologyObservation {
        let mut obs = TopologyObservation::default();
        for (entity, device) in self.devices.iter() {
            for interface in device.interfaces.iter() {
                let mac = match self.interfaces.get(interface) {
                    Some(i) => i.mac,
                    None => continue,
                };
                match device.kind {
                    DeviceKind::Host(ip) => obs.hosts.push(InterfaceObservation {
                        entity: *entity,
                        interface: *interface,
                        mac,
                        ip: Some(ip),
                    }),
                    DeviceKind::Switch => obs.switches.push(InterfaceObservation {
                        entity: *entity,
                        interface: *interface,
                        mac,
                        ip: None,
                    }),
                }
            }
        }
        obs.links = self.links.clone();
        obs
    }

    /// Get the device
    pub fn device(&self, id: EntityId) -> Result<&Device, TopologyError> {
        self.devices.get(&id).ok_or(TopologyError::EntityNotFound(id))
    }

    /// Iterate over all devices, ordered by their id.
    pub fn devices(&self) -> impl Iterator<Item = (&EntityId, &Device)> {
        self.devices.iter()
    }

    /// Get the interface
    pub fn interface(&self, id: InterfaceId) -> Result<&Interface, TopologyError> {
        self.interfaces.get(&id).ok_or(TopologyError::InterfaceNotFound(id))
    }

    /// Return the entity owning the interface
    pub fn owner(&self, id: InterfaceId) -> Result<EntityId, TopologyError> {
        Ok(self.interface(id)?.owner)
    }

    /// Return the name of the entity
    pub fn name(&self, id: EntityId) -> Result<&str, TopologyError> {
        Ok(self.device(id)?.name.as_str())
    }

    /// Return the id of the entity with the given name
    pub fn entity_id(&self, name: impl AsRef<str>) -> Result<EntityId, TopologyError> {
        self.devices
            .iter()
            .find(|(_, d)| d.name == name.as_ref())
            .map(|(id, _)| *id)
            .ok_or_else(|| TopologyError::NameNotFound(name.as_ref().to_string()))
    }

    /// Return the interface of `entity` which is connected to `neighbor`, if the two are adjacent.
    pub fn interface_towards(&self, entity: EntityId, neighbor: EntityId) -> Option<InterfaceId> {
        self.devices.get(&entity)?.interfaces.iter().copied().find(|i| {
            self.interfaces
                .get(i)
                .and_then(|i| i.peer)
                .and_then(|p| self.interfaces.get(&p))
                .map(|p| p.owner == neighbor)
                .unwrap_or(false)
        })
    }

    /// Transmit a frame out of `outgoing`, and return the frame as it arrives at the peer
    /// interface. Returns `None` if the interface does not exist or is not connected.
    pub fn transmit(
        &self,
        outgoing: InterfaceId,
        payload: Vec<u8>,
        dst_mac: MacAddr,
        ether_type: u16,
    ) -> Option<(InterfaceId, Frame)> {
        let iface = self.interfaces.get(&outgoing)?;
        let peer = iface.peer?;
        Some((peer, Frame { payload, src_mac: iface.mac, dst_mac, ether_type }))
    }
}

/// Link layer that puts every transmitted frame onto the event queue.
pub(crate) struct QueueTransmitter<'a> {
    pub(crate) fabric: &'a Fabric,
    pub(crate) queue: &'a mut EventQueue,
}

impl<'a> LinkLayer for QueueTransmitter<'a> {
    fn send(&mut self, outgoing: InterfaceId, payload: Vec<u8>, dst_mac: MacAddr, ether_type: u16) {
        match self.fabric.transmit(outgoing, payload, dst_mac, ether_type) {
            Some((peer, frame)) => {
                trace!("{} -> {}: {} bytes to {}", outgoing, peer, frame.size(), dst_mac);
                self.queue.push_back(Event::Frame(peer, frame));
            }
            None => debug!("Frame sent out of unconnected interface {} is lost", outgoing),
        }
    }
}
