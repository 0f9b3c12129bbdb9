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

//! Test the controller, without running the network.

use crate::netsim::fabric::Fabric;
use crate::netsim::{
    ControlMessage, ControlType, Controller, ControllerError, Datapath, EntityId, FlowEntry,
    FlowId, FlowKey, InterfaceId, MacAddr, Switch,
};
use std::net::Ipv4Addr;

/// Datapath recording every installed flow
struct RecordingDatapath {
    id: EntityId,
    installed: Vec<FlowEntry>,
}

impl Datapath for RecordingDatapath {
    fn datapath_id(&self) -> EntityId {
        self.id
    }

    fn install_flow(&mut self, entry: FlowEntry) -> FlowId {
        self.installed.push(entry);
        FlowId(self.installed.len() as u64 - 1)
    }
}

/// # Test network
///
/// ```text
/// h1 if0 -- if1 s1 if2 -- if3 s2 if4 -- if5 h2
/// ```
fn get_test_controller() -> (Controller, Switch, Switch) {
    let mut f = Fabric::new();
    let h1 = f.add_host("h1", Ipv4Addr::new(10, 0, 0, 1));
    let h2 = f.add_host("h2", Ipv4Addr::new(10, 0, 0, 2));
    let s1 = f.add_switch("s1");
    let s2 = f.add_switch("s2");
    f.add_link(h1, s1).unwrap();
    f.add_link(s1, s2).unwrap();
    f.add_link(s2, h2).unwrap();

    let mut c = Controller::new();
    c.build_topology(&f.observe());
    let mut sw1 = Switch::new(s1, "s1");
    let mut sw2 = Switch::new(s2, "s2");
    c.add_switch(&mut sw1);
    c.add_switch(&mut sw2);
    (c, sw1, sw2)
}

fn udp_key() -> FlowKey {
    FlowKey {
        src_ip: Ipv4Addr::new(10, 0, 0, 1),
        dst_ip: Ipv4Addr::new(10, 0, 0, 2),
        src_port: 49153,
        dst_port: 9,
        protocol: 17,
    }
}

#[test]
fn test_register() {
    let (c, sw1, sw2) = get_test_controller();
    assert_eq!(c.switches(), &[sw1.id(), sw2.id()]);
    assert_eq!(sw1.controller(), Some(c.id()));
    assert_eq!(sw2.controller(), Some(c.id()));
    // every controller has its own id
    assert_ne!(Controller::new().id(), c.id());
}

#[test]
fn test_register_twice() {
    let (mut c, mut sw1, _) = get_test_controller();
    c.add_switch(&mut sw1);
    assert_eq!(c.switches().len(), 2);
}

#[test]
fn test_tables() {
    let (c, _, _) = get_test_controller();
    assert_eq!(c.graph().num_entities(), 4);
    assert_eq!(c.routing_table().len(), 12);
    assert_eq!(c.arp_table().len(), 2);
    assert_eq!(c.address_resolution(Ipv4Addr::new(10, 0, 0, 2)), Some(MacAddr::from_index(6)));
    assert_eq!(c.next_hop(InterfaceId(1), Ipv4Addr::new(10, 0, 0, 2)), Ok(InterfaceId(2)));
    assert_eq!(c.next_hop(InterfaceId(3), Ipv4Addr::new(10, 0, 0, 2)), Ok(InterfaceId(4)));
}

#[test]
fn test_arp_request() {
    let (mut c, mut sw1, _) = get_test_controller();
    let mut msg = ControlMessage::arp_request(
        Ipv4Addr::new(10, 0, 0, 1),
        MacAddr::from_index(1),
        Ipv4Addr::new(10, 0, 0, 2),
    );
    c.handle_packet_in(&mut sw1, &mut msg, InterfaceId(1)).unwrap();
    assert_eq!(msg.dst_mac, MacAddr::from_index(6));
    assert_eq!(msg.src_mac, MacAddr::from_index(1));
    assert_eq!(c.num_handled(ControlType::ArpRequest), 1);
    // nothing is installed for address resolution
    assert!(sw1.flow_table().is_empty());

    let mut msg = ControlMessage::arp_request(
        Ipv4Addr::new(10, 0, 0, 1),
        MacAddr::from_index(1),
        Ipv4Addr::new(10, 0, 0, 99),
    );
    assert_eq!(
        c.handle_packet_in(&mut sw1, &mut msg, InterfaceId(1)),
        Err(ControllerError::UnresolvedAddress(Ipv4Addr::new(10, 0, 0, 99)))
    );
    assert_eq!(msg.dst_mac, MacAddr::ZERO);
    assert_eq!(c.num_handled(ControlType::ArpRequest), 2);
}

#[test]
fn test_flow_add() {
    let (mut c, mut sw1, mut sw2) = get_test_controller();

    let mut msg = ControlMessage::flow_add(udp_key());
    c.handle_packet_in(&mut sw1, &mut msg, InterfaceId(1)).unwrap();
    let flow = msg.flow.unwrap();
    let entry = sw1.flow_table().get(flow).unwrap();
    assert_eq!(entry.key, udp_key());
    assert_eq!(entry.output, InterfaceId(2));

    let mut msg = ControlMessage::flow_add(udp_key());
    c.handle_packet_in(&mut sw2, &mut msg, InterfaceId(3)).unwrap();
    assert_eq!(sw2.flow_table().get(msg.flow.unwrap()).unwrap().output, InterfaceId(4));

    assert_eq!(c.num_handled(ControlType::FlowAdd), 2);
}

#[test]
fn test_flow_add_through_datapath() {
    let (mut c, sw1, _) = get_test_controller();
    let mut dp = RecordingDatapath { id: sw1.id(), installed: Vec::new() };
    let mut msg = ControlMessage::flow_add(udp_key());
    c.handle_packet_in(&mut dp, &mut msg, InterfaceId(1)).unwrap();
    assert_eq!(msg.flow, Some(FlowId(0)));
    assert_eq!(dp.installed, vec![FlowEntry::new(udp_key(), InterfaceId(2))]);
}

#[test]
fn test_flow_add_without_route() {
    let (mut c, sw1, _) = get_test_controller();
    let mut dp = RecordingDatapath { id: sw1.id(), installed: Vec::new() };

    let mut key = udp_key();
    key.dst_ip = Ipv4Addr::new(10, 0, 0, 99);
    let mut msg = ControlMessage::flow_add(key);
    assert_eq!(
        c.handle_packet_in(&mut dp, &mut msg, InterfaceId(1)),
        Err(ControllerError::UnresolvedAddress(Ipv4Addr::new(10, 0, 0, 99)))
    );
    let mut msg = ControlMessage::flow_add(udp_key());
    assert_eq!(
        c.handle_packet_in(&mut dp, &mut msg, InterfaceId(42)),
        Err(ControllerError::UnresolvedInterface(InterfaceId(42)))
    );
    assert_eq!(msg.flow, None);
    assert!(dp.installed.is_empty());
}

#[test]
fn test_unknown_switch() {
    let (mut c, _, _) = get_test_controller();
    let mut dp = RecordingDatapath { id: EntityId(0), installed: Vec::new() };
    let mut msg = ControlMessage::flow_add(udp_key());
    assert_eq!(
        c.handle_packet_in(&mut dp, &mut msg, InterfaceId(1)),
        Err(ControllerError::UnknownSwitch(EntityId(0)))
    );
    assert!(dp.installed.is_empty());
    assert_eq!(c.num_handled(ControlType::FlowAdd), 0);
}

#[test]
fn test_unsupported_types() {
    let (mut c, mut sw1, _) = get_test_controller();
    for kind in [
        ControlType::ArpReply,
        ControlType::FlowDelete,
        ControlType::FlowModify,
        ControlType::LinkStateUpdate,
        ControlType::StatsRequest,
        ControlType::StatsReply,
        ControlType::PacketIn,
        ControlType::PacketOut,
        ControlType::SwitchJoin,
        ControlType::SwitchLeave,
        ControlType::Hello,
        ControlType::BarrierRequest,
        ControlType::BarrierReply,
    ]
    .iter()
    {
        assert!(!kind.is_supported());
        let mut msg = ControlMessage::new(*kind);
        assert_eq!(
            c.handle_packet_in(&mut sw1, &mut msg, InterfaceId(1)),
            Err(ControllerError::Unsupported(*kind))
        );
        assert_eq!(c.num_handled(*kind), 1);
    }
    let mut msg = ControlMessage::new(ControlType::Error);
    assert_eq!(
        c.handle_packet_in(&mut sw1, &mut msg, InterfaceId(1)),
        Err(ControllerError::ErrorMessage)
    );
    assert!(sw1.flow_table().is_empty());
}
