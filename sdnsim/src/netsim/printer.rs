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

//! # Helper (printer) functions for the Network
//! Module containing helper functions to get formatted strings and print the tables of the
//! controller and of the switches.

use crate::netsim::flow_table::FlowEntry;
use crate::netsim::network::Network;
use crate::netsim::switch::Switch;
use crate::netsim::NetworkError;

use itertools::Itertools;

/// Get a vector of strings, which represent the routing table of the controller. Each `String`
/// represents one entry, with the names of the devices inserted. Entries are ordered by source,
/// then by destination.
pub fn routing_table(net: &Network) -> Result<Vec<String>, NetworkError> {
    net.controller()
        .routing_table()
        .iter()
        .map(|((source, dest), route)| {
            Ok(format!(
                "{src} -> {dst}: out {iface}, next hop {nh}",
                src = net.get_entity_name(*source)?,
                dst = net.get_entity_name(*dest)?,
                iface = route.interface,
                nh = net.get_entity_name(route.next_hop)?,
            ))
        })
        .collect()
}

/// Get a vector of strings, which represent the address resolution table of the controller,
/// ordered by network address.
pub fn arp_table(net: &Network) -> Vec<String> {
    let graph = net.controller().graph();
    net.controller()
        .arp_table()
        .iter()
        .map(|(ip, mac)| {
            let name = graph
                .entity_with_ip(*ip)
                .and_then(|e| net.get_entity_name(e).ok())
                .unwrap_or("?");
            format!("{} is at {} ({})", ip, mac, name)
        })
        .collect()
}

/// Returns the formatted string of a single flow entry.
pub fn flow_entry(entry: &FlowEntry) -> String {
    format!(
        "{} => {}, packets: {}, bytes: {}",
        entry.key, entry.output, entry.packets, entry.bytes
    )
}

/// Get a vector of strings, which represent the flow table of the switch. The first line names
/// the switch, every following line is one installed flow.
pub fn flow_table(switch: &Switch) -> Vec<String> {
    let table = switch.flow_table();
    std::iter::once(format!(
        "Flow table of {} ({} flows, interfaces: {})",
        switch.name(),
        table.len(),
        switch.interfaces().iter().join(", ")
    ))
    .chain(table.entries().map(|(id, e)| format!("  [{}] {}", id.0, flow_entry(e))))
    .collect()
}

/// Print the routing table of the controller
pub fn print_routing_table(net: &Network) -> Result<(), NetworkError> {
    println!("Routing table:");
    for entry in routing_table(net)? {
        println!("    {}", entry);
    }
    Ok(())
}

/// Print the address resolution table of the controller
pub fn print_arp_table(net: &Network) {
    println!("Address resolution table:");
    for entry in arp_table(net) {
        println!("    {}", entry);
    }
}

/// Print the flow table of every switch
pub fn print_flow_tables(net: &Network) {
    for switch in net.switches() {
        for line in flow_table(switch) {
            println!("{}", line);
        }
    }
}
