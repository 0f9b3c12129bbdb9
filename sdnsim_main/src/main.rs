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

use sdnsim::netsim::{printer, ControlType, Network};
use sdnsim::Error;

use clap::Parser;
use log::*;

mod example_topologies;
use example_topologies::*;

fn main() -> Result<(), Error> {
    // initialize the env logger
    pretty_env_logger::init();
    // run clap
    let args = CommandLineArguments::parse();

    let (mut net, traffic) = get_network(&args.network)?;
    info!(
        "Network with {} hosts and {} switches, {} flows to send",
        net.hosts().count(),
        net.switches().count(),
        traffic.len()
    );

    run_workload(&mut net, &traffic, &args)?;

    printer::print_routing_table(&net)?;
    printer::print_arp_table(&net);
    printer::print_flow_tables(&net);

    println!(
        "Controller handled {} address resolution requests and {} flow requests",
        net.controller().num_handled(ControlType::ArpRequest),
        net.controller().num_handled(ControlType::FlowAdd)
    );
    if !net.dropped_frames().is_empty() {
        println!("Dropped frames:");
        for (interface, reason) in net.dropped_frames() {
            println!("    at {}: {}", interface, reason);
        }
    }

    Ok(())
}

/// Every host resolves the address of its destination (unless disabled), and then sends the
/// configured number of packets.
fn run_workload(
    net: &mut Network,
    traffic: &[(sdnsim::netsim::EntityId, std::net::Ipv4Addr)],
    args: &CommandLineArguments,
) -> Result<(), Error> {
    let payload = vec![0u8; args.payload_size];
    for (i, (host, dst)) in traffic.iter().enumerate() {
        if !args.no_arp {
            net.send_arp_request(*host, *dst)?;
        }
        let src_port = 49152u16.wrapping_add(i as u16);
        for seq in 0..args.packets {
            if args.tcp {
                net.send_tcp(*host, *dst, src_port, args.dst_port, seq, &payload)?;
            } else {
                net.send_udp(*host, *dst, src_port, args.dst_port, &payload)?;
            }
        }
        debug!("{} sent {} packets to {}", net.get_entity_name(*host)?, args.packets, dst);
    }
    Ok(())
}

/// Simulate the control plane of a software-defined network: build a topology, let the controller
/// compute its routing and address resolution tables, send traffic through the switches and print
/// the resulting tables and flow statistics.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct CommandLineArguments {
    /// Number of packets per flow
    #[clap(short = 'n', long, default_value = "2")]
    packets: u32,
    /// Payload size of every packet in bytes
    #[clap(short = 's', long, default_value = "512")]
    payload_size: usize,
    /// Destination port of every packet
    #[clap(short = 'p', long, default_value = "9")]
    dst_port: u16,
    /// Send TCP segments instead of UDP datagrams
    #[clap(long)]
    tcp: bool,
    /// Skip address resolution before sending
    #[clap(long)]
    no_arp: bool,
    /// Topology to use
    #[clap(subcommand)]
    network: NetworkSelection,
}
