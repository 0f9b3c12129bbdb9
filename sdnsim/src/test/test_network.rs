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

//! Test the whole network: switch pipeline, controller and hosts, driven by the event queue.

use crate::example_networks::{ExampleNetwork, OneSwitchNet, RandomMesh, TwoSwitchNet};
use crate::netsim::codec::{self, ArpPacket};
use crate::netsim::{
    CodecError, ControlType, ControllerError, EntityId, FrameClass, FrameOutcome, InterfaceId,
    MacAddr, Network, NetworkError, PipelineError, TopologyError, ETHER_TYPE_ARP,
    ETHER_TYPE_IPV4,
};
use std::net::Ipv4Addr;

const H1_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
const H2_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);
const H3_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 3);

/// One switch network: `h1 (if0) -- (if1) s1 (if2) -- (if3) h2`
fn one_switch() -> (Network, EntityId, EntityId, EntityId) {
    // logs are shown with `RUST_LOG=debug cargo test -- --nocapture`
    let _ = pretty_env_logger::try_init();
    let net = OneSwitchNet::ready(0).unwrap();
    let h1 = net.get_entity_id("h1").unwrap();
    let h2 = net.get_entity_id("h2").unwrap();
    let s1 = net.get_entity_id("s1").unwrap();
    (net, h1, h2, s1)
}

#[test]
fn test_arp_reply() {
    let (mut net, h1, h2, s1) = one_switch();
    let h2_mac = net.fabric().interface(InterfaceId(3)).unwrap().mac;
    let h1_mac = net.fabric().interface(InterfaceId(0)).unwrap().mac;

    net.send_arp_request(h1, H2_IP).unwrap();

    assert_eq!(
        net.outcomes(),
        &[(s1, FrameOutcome::ArpReplied { target_ip: H2_IP, target_mac: h2_mac })]
    );
    assert_eq!(net.controller().num_handled(ControlType::ArpRequest), 1);

    // the reply arrives at h1, and is addressed to it
    let received = net.get_host(h1).unwrap().received();
    assert_eq!(received.len(), 1);
    let (iface, frame) = &received[0];
    assert_eq!(*iface, InterfaceId(0));
    assert_eq!(frame.ether_type, ETHER_TYPE_ARP);
    assert_eq!(frame.dst_mac, h1_mac);
    assert_eq!(frame.class(h1_mac), FrameClass::Host);
    assert_eq!(frame.class(h2_mac), FrameClass::OtherHost);
    let reply = ArpPacket::parse(&frame.payload).unwrap();
    assert!(!reply.is_request());
    assert_eq!(reply.sender_ip, H2_IP);
    assert_eq!(reply.sender_mac, h2_mac);
    assert_eq!(reply.target_ip, H1_IP);
    assert_eq!(reply.target_mac, h1_mac);
    assert_eq!(net.get_host(h1).unwrap().resolved(H2_IP), Some(h2_mac));

    // the request never reaches h2, and no flow is installed
    assert!(net.get_host(h2).unwrap().received().is_empty());
    assert!(net.get_switch(s1).unwrap().flow_table().is_empty());
    assert!(net.dropped_frames().is_empty());
}

#[test]
fn test_arp_reply_is_ignored() {
    let (mut net, h1, _, s1) = one_switch();
    let reply = ArpPacket::reply(MacAddr::from_index(1), H1_IP, MacAddr::from_index(4), H2_IP);
    net.send_raw(h1, reply.to_bytes(), MacAddr::BROADCAST, ETHER_TYPE_ARP).unwrap();
    assert_eq!(net.outcomes(), &[(s1, FrameOutcome::Ignored)]);
    assert_eq!(net.controller().num_handled(ControlType::ArpRequest), 0);
}

#[test]
fn test_arp_unknown_address() {
    let (mut net, h1, _, _) = one_switch();
    let unknown = Ipv4Addr::new(10, 0, 0, 99);
    net.send_arp_request(h1, unknown).unwrap();
    assert!(net.get_host(h1).unwrap().received().is_empty());
    assert_eq!(
        net.dropped_frames(),
        &[(
            InterfaceId(1),
            PipelineError::Controller(ControllerError::UnresolvedAddress(unknown))
        )]
    );
}

#[test]
fn test_flow_install_then_hit() {
    let (mut net, h1, h2, s1) = one_switch();
    net.send_arp_request(h1, H2_IP).unwrap();
    let h2_mac = net.get_host(h1).unwrap().resolved(H2_IP).unwrap();

    net.send_udp(h1, H2_IP, 49153, 9, &[0; 512]).unwrap();
    net.send_udp(h1, H2_IP, 49153, 9, &[0; 100]).unwrap();

    // exactly one flow installation
    assert_eq!(net.controller().num_handled(ControlType::FlowAdd), 1);
    let table = net.get_switch(s1).unwrap().flow_table();
    assert_eq!(table.len(), 1);
    let (flow, entry) = table.entries().next().unwrap();
    assert_eq!(entry.output, InterfaceId(2));
    assert_eq!(entry.key.src_ip, H1_IP);
    assert_eq!(entry.key.dst_ip, H2_IP);
    assert_eq!(entry.key.protocol, 17);
    assert_eq!(entry.packets, 2);
    assert_eq!(entry.bytes, (20 + 8 + 512) + (20 + 8 + 100));

    assert_eq!(
        &net.outcomes()[1..],
        &[
            (s1, FrameOutcome::Installed { flow: *flow, interface: InterfaceId(2) }),
            (s1, FrameOutcome::Forwarded { flow: *flow, interface: InterfaceId(2) }),
        ]
    );

    // both frames arrive at h2, with the destination address chosen by h1
    let received = net.get_host(h2).unwrap().received();
    assert_eq!(received.len(), 2);
    assert!(received.iter().all(|(_, f)| f.ether_type == ETHER_TYPE_IPV4));
    assert!(received.iter().all(|(_, f)| f.dst_mac == h2_mac));
    assert_eq!(codec::parse_flow_key(&received[0].1.payload).unwrap(), entry.key);
}

#[test]
fn test_tcp_and_udp_share_flow() {
    let (mut net, h1, _, s1) = one_switch();
    net.send_udp(h1, H2_IP, 5000, 80, b"udp").unwrap();
    net.send_tcp(h1, H2_IP, 5000, 80, 1, b"tcp").unwrap();
    // the protocol is not part of the match
    assert_eq!(net.get_switch(s1).unwrap().flow_table().len(), 1);
    assert_eq!(net.controller().num_handled(ControlType::FlowAdd), 1);
}

#[test]
fn test_reverse_direction_installs_new_flow() {
    let (mut net, h1, h2, s1) = one_switch();
    net.send_udp(h1, H2_IP, 5000, 80, b"ping").unwrap();
    net.send_udp(h2, H1_IP, 80, 5000, b"pong").unwrap();
    let table = net.get_switch(s1).unwrap().flow_table();
    assert_eq!(table.len(), 2);
    let outputs: Vec<InterfaceId> = table.entries().map(|(_, e)| e.output).collect();
    assert_eq!(outputs, vec![InterfaceId(2), InterfaceId(1)]);
    assert_eq!(net.get_host(h1).unwrap().received().len(), 1);
}

#[test]
fn test_two_switches() {
    let mut net = TwoSwitchNet::ready(0).unwrap();
    let h1 = net.get_entity_id("h1").unwrap();
    let h2 = net.get_entity_id("h2").unwrap();
    let h3 = net.get_entity_id("h3").unwrap();
    let s1 = net.get_entity_id("s1").unwrap();
    let s2 = net.get_entity_id("s2").unwrap();

    // s1 routes towards both far hosts through s2
    let route = *net.controller().routing_table().get(s1, h3).unwrap();
    assert_eq!(route.next_hop, s2);
    assert_eq!(Some(route.interface), net.fabric().interface_towards(s1, s2));

    for (host, dst) in TwoSwitchNet::traffic(&net) {
        net.send_arp_request(host, dst).unwrap();
        net.send_udp(host, dst, 49153, 9, &[0; 64]).unwrap();
    }

    assert!(net.dropped_frames().is_empty());
    assert_eq!(net.get_host(h2).unwrap().received().len(), 1);
    assert_eq!(net.get_host(h3).unwrap().received().len(), 1);
    assert_eq!(net.controller().num_handled(ControlType::FlowAdd), 4);

    let s1_table = net.get_switch(s1).unwrap().flow_table();
    assert_eq!(s1_table.len(), 2);
    let towards_s2 = net.fabric().interface_towards(s1, s2);
    assert!(s1_table.entries().all(|(_, e)| Some(e.output) == towards_s2));
    let s2_table = net.get_switch(s2).unwrap().flow_table();
    let to_h3 = s2_table.entries().find(|(_, e)| e.key.dst_ip == H3_IP).unwrap().1;
    assert_eq!(Some(to_h3.output), net.fabric().interface_towards(s2, h3));
}

#[test]
fn test_malformed_frames_are_dropped() {
    let (mut net, h1, h2, s1) = one_switch();

    net.send_raw(h1, vec![0x45, 0, 0], MacAddr::BROADCAST, ETHER_TYPE_IPV4).unwrap();
    net.send_raw(h1, vec![0, 1, 8, 0], MacAddr::BROADCAST, ETHER_TYPE_ARP).unwrap();
    assert_eq!(net.dropped_frames().len(), 2);
    assert!(matches!(
        net.dropped_frames()[0],
        (InterfaceId(1), PipelineError::HeaderParse(CodecError::Read(_)))
    ));
    assert_eq!(
        net.dropped_frames()[1],
        (
            InterfaceId(1),
            PipelineError::HeaderParse(CodecError::Truncated { what: "ARP", needed: 28, got: 4 })
        )
    );

    // processing continues with the next frame
    net.send_udp(h1, H2_IP, 49153, 9, b"hello").unwrap();
    assert_eq!(net.get_host(h2).unwrap().received().len(), 1);
    assert_eq!(net.get_switch(s1).unwrap().flow_table().len(), 1);
}

#[test]
fn test_unsupported_protocol_is_dropped() {
    let (mut net, h1, h2, s1) = one_switch();
    let mut packet = codec::build_udp(H1_IP, H2_IP, 1, 2, &[0; 8]).unwrap();
    // pretend to be ICMP
    packet[9] = 1;
    net.send_raw(h1, packet, MacAddr::BROADCAST, ETHER_TYPE_IPV4).unwrap();

    assert_eq!(net.dropped_frames(), &[(InterfaceId(1), PipelineError::UnsupportedProtocol(1))]);
    assert_eq!(net.controller().num_handled(ControlType::FlowAdd), 0);
    assert!(net.get_switch(s1).unwrap().flow_table().is_empty());
    assert!(net.get_host(h2).unwrap().received().is_empty());
}

#[test]
fn test_no_route_installs_nothing() {
    let (mut net, h1, _, s1) = one_switch();
    let unknown = Ipv4Addr::new(10, 0, 0, 99);
    net.send_udp(h1, unknown, 49153, 9, b"lost").unwrap();
    assert_eq!(
        net.dropped_frames(),
        &[(
            InterfaceId(1),
            PipelineError::Controller(ControllerError::UnresolvedAddress(unknown))
        )]
    );
    assert_eq!(net.controller().num_handled(ControlType::FlowAdd), 1);
    assert!(net.get_switch(s1).unwrap().flow_table().is_empty());
}

#[test]
fn test_unregistered_switch() {
    let mut net = OneSwitchNet::net(0).unwrap();
    net.build_topology();
    let h1 = net.get_entity_id("h1").unwrap();
    let s1 = net.get_entity_id("s1").unwrap();
    assert_eq!(net.get_switch(s1).unwrap().controller(), None);

    net.send_udp(h1, H2_IP, 49153, 9, b"hello").unwrap();
    assert_eq!(net.dropped_frames(), &[(InterfaceId(1), PipelineError::NotRegistered(s1))]);

    net.register_switch(s1).unwrap();
    net.send_udp(h1, H2_IP, 49153, 9, b"hello").unwrap();
    assert_eq!(net.dropped_frames().len(), 1);
    assert_eq!(net.get_switch(s1).unwrap().flow_table().len(), 1);
}

#[test]
fn test_remove_flow() {
    let (mut net, h1, _, s1) = one_switch();
    net.send_udp(h1, H2_IP, 49153, 9, b"hello").unwrap();
    let entry = *net.get_switch(s1).unwrap().flow_table().entries().next().unwrap().1;
    assert!(net.get_switch_mut(s1).unwrap().remove_flow(&entry.key));
    assert!(net.get_switch(s1).unwrap().flow_table().is_empty());

    // the next frame installs the flow again
    net.send_udp(h1, H2_IP, 49153, 9, b"hello").unwrap();
    assert_eq!(net.controller().num_handled(ControlType::FlowAdd), 2);
}

#[test]
fn test_device_errors() {
    let (mut net, h1, _, s1) = one_switch();
    assert_eq!(
        net.send_udp(s1, H2_IP, 1, 2, b""),
        Err(NetworkError::TopologyError(TopologyError::NotAHost(s1)))
    );
    assert!(net.register_switch(h1).is_err());
    assert!(net.get_entity_id("x").is_err());

    let lonely = net.add_host("lonely", Ipv4Addr::new(10, 0, 0, 42));
    assert_eq!(
        net.send_arp_request(lonely, H1_IP),
        Err(NetworkError::TopologyError(TopologyError::HostNotConnected(lonely)))
    );
}

#[test]
fn test_stop_after() {
    let (mut net, h1, _, _) = one_switch();
    net.set_stop_after(Some(1));
    // the request is processed, the reply exceeds the limit
    assert_eq!(net.send_arp_request(h1, H2_IP), Err(NetworkError::NoConvergence));
    net.set_stop_after(None);
    assert_eq!(net.send_arp_request(h1, H2_IP), Ok(()));
}

#[test]
fn test_random_mesh_delivers_everything() {
    for seed in 0..5 {
        let mut net = RandomMesh::ready(seed).unwrap();
        let traffic = RandomMesh::traffic(&net);
        for (host, dst) in traffic.iter() {
            net.send_arp_request(*host, *dst).unwrap();
            net.send_udp(*host, *dst, 40000, 7, b"data").unwrap();
        }
        assert!(net.dropped_frames().is_empty());
        for host in net.hosts() {
            let received = host.received().iter();
            let arp_replies = received.clone().filter(|(_, f)| f.ether_type == ETHER_TYPE_ARP);
            let data = received.filter(|(_, f)| f.ether_type == ETHER_TYPE_IPV4);
            // one reply per request sent, one packet from every other host
            assert_eq!(arp_replies.count(), 5);
            assert_eq!(data.count(), 5);
        }
    }
}

#[test]
fn test_dump() {
    let (mut net, h1, _, _) = one_switch();
    net.send_udp(h1, H2_IP, 49153, 9, b"hello").unwrap();
    let routes = net.dump_routing_table().unwrap();
    assert_eq!(routes.len(), 6);
    assert!(routes.contains(&"s1 -> h2: out if2, next hop h2".to_string()));
    let arp = net.dump_arp_table();
    assert_eq!(
        arp,
        vec!["10.0.0.1 is at 00:00:00:00:00:01 (h1)", "10.0.0.2 is at 00:00:00:00:00:04 (h2)"]
    );
    let flows = net.dump_flow_statistics();
    assert_eq!(flows.len(), 2);
    assert!(flows[0].starts_with("Flow table of s1 (1 flows"));
    assert!(flows[1].ends_with("=> if2, packets: 1, bytes: 33"));
}
