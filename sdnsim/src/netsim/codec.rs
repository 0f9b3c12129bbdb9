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

//! # Header codec
//!
//! Parsing and building of the headers the switch pipeline needs to look at: address resolution
//! packets (Ethernet / IPv4 ARP), and IPv4 carrying TCP or UDP. The payload passed to these
//! functions always starts right after the link-layer header.

use crate::netsim::{CodecError, FlowKey, MacAddr, PROTOCOL_TCP, PROTOCOL_UDP};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use etherparse::{Ipv4HeaderSlice, PacketBuilder, TcpHeaderSlice, UdpHeaderSlice};
use std::io::{Cursor, Read, Write};
use std::net::Ipv4Addr;

/// Length of an Ethernet / IPv4 address resolution packet
pub const ARP_PACKET_LEN: usize = 28;
/// Time to live of IPv4 packets built by hosts
pub const DEFAULT_TTL: u8 = 64;

const ARP_HTYPE_ETHERNET: u16 = 1;
const ARP_PTYPE_IPV4: u16 = 0x0800;

/// Operation of an address resolution packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArpOperation {
    /// Who has `target_ip`?
    Request,
    /// `sender_ip` is at `sender_mac`
    Reply,
}

/// Address resolution packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpPacket {
    /// Request or reply
    pub operation: ArpOperation,
    /// Hardware address of the sender
    pub sender_mac: MacAddr,
    /// Network address of the sender
    pub sender_ip: Ipv4Addr,
    /// Hardware address of the target (zero in requests)
    pub target_mac: MacAddr,
    /// Network address of the target
    pub target_ip: Ipv4Addr,
}

impl ArpPacket {
    /// Request asking for the hardware address of `target_ip`
    pub fn request(sender_mac: MacAddr, sender_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Self {
        Self {
            operation: ArpOperation::Request,
            sender_mac,
            sender_ip,
            target_mac: MacAddr::ZERO,
            target_ip,
        }
    }

    /// Reply telling `target` that `sender_ip` is at `sender_mac`
    pub fn reply(
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> Self {
        Self { operation: ArpOperation::Reply, sender_mac, sender_ip, target_mac, target_ip }
    }

    /// Returns true if the packet is a request
    pub fn is_request(&self) -> bool {
        self.operation == ArpOperation::Request
    }

    /// Parse an address resolution packet.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < ARP_PACKET_LEN {
            return Err(CodecError::Truncated {
                what: "ARP",
                needed: ARP_PACKET_LEN,
                got: bytes.len(),
            });
        }
        let mut cursor = Cursor::new(bytes);
        let htype = cursor.read_u16::<BigEndian>().map_err(malformed)?;
        let ptype = cursor.read_u16::<BigEndian>().map_err(malformed)?;
        let hlen = cursor.read_u8().map_err(malformed)?;
        let plen = cursor.read_u8().map_err(malformed)?;
        if htype != ARP_HTYPE_ETHERNET || ptype != ARP_PTYPE_IPV4 || hlen != 6 || plen != 4 {
            return Err(CodecError::Malformed("ARP"));
        }
        let operation = match cursor.read_u16::<BigEndian>().map_err(malformed)? {
            1 => ArpOperation::Request,
            2 => ArpOperation::Reply,
            _ => return Err(CodecError::Malformed("ARP")),
        };
        let sender_mac = read_mac(&mut cursor)?;
        let sender_ip = Ipv4Addr::from(cursor.read_u32::<BigEndian>().map_err(malformed)?);
        let target_mac = read_mac(&mut cursor)?;
        let target_ip = Ipv4Addr::from(cursor.read_u32::<BigEndian>().map_err(malformed)?);
        Ok(Self { operation, sender_mac, sender_ip, target_mac, target_ip })
    }

    /// Write the packet
    pub fn write<W: Write>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_u16::<BigEndian>(ARP_HTYPE_ETHERNET)?;
        w.write_u16::<BigEndian>(ARP_PTYPE_IPV4)?;
        w.write_u8(6)?;
        w.write_u8(4)?;
        w.write_u16::<BigEndian>(match self.operation {
            ArpOperation::Request => 1,
            ArpOperation::Reply => 2,
        })?;
        w.write_all(&self.sender_mac.0)?;
        w.write_u32::<BigEndian>(u32::from(self.sender_ip))?;
        w.write_all(&self.target_mac.0)?;
        w.write_u32::<BigEndian>(u32::from(self.target_ip))?;
        Ok(())
    }

    /// Serialize the packet
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(ARP_PACKET_LEN);
        // writing into a vector cannot fail
        self.write(&mut buf).ok();
        buf
    }
}

fn malformed(_: std::io::Error) -> CodecError {
    CodecError::Malformed("ARP")
}

fn read_mac<R: Read>(r: &mut R) -> Result<MacAddr, CodecError> {
    let mut mac = [0u8; 6];
    r.read_exact(&mut mac).map_err(malformed)?;
    Ok(MacAddr(mac))
}

/// Parse the IPv4 header and the TCP or UDP header following it, and return the 5-tuple.
/// Any other transport protocol yields [`CodecError::UnsupportedProtocol`].
pub fn parse_flow_key(payload: &[u8]) -> Result<FlowKey, CodecError> {
    let ip = Ipv4HeaderSlice::from_slice(payload)?;
    let rest = &payload[ip.slice().len()..];
    let protocol = ip.protocol();
    let (src_port, dst_port) = match protocol {
        PROTOCOL_TCP => {
            let tcp = TcpHeaderSlice::from_slice(rest)?;
            (tcp.source_port(), tcp.destination_port())
        }
        PROTOCOL_UDP => {
            let udp = UdpHeaderSlice::from_slice(rest)?;
            (udp.source_port(), udp.destination_port())
        }
        p => return Err(CodecError::UnsupportedProtocol(p)),
    };
    Ok(FlowKey {
        src_ip: ip.source_addr(),
        dst_ip: ip.destination_addr(),
        src_port,
        dst_port,
        protocol,
    })
}

/// Build an IPv4 / UDP packet
pub fn build_udp(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let builder =
        PacketBuilder::ipv4(src.octets(), dst.octets(), DEFAULT_TTL).udp(src_port, dst_port);
    let mut buf = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut buf, payload).map_err(|e| CodecError::Build(format!("{:?}", e)))?;
    Ok(buf)
}

/// Build an IPv4 / TCP packet
pub fn build_tcp(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    seq: u32,
    payload: &[u8],
) -> Result<Vec<u8>, CodecError> {
    let builder = PacketBuilder::ipv4(src.octets(), dst.octets(), DEFAULT_TTL).tcp(
        src_port,
        dst_port,
        seq,
        u16::MAX,
    );
    let mut buf = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut buf, payload).map_err(|e| CodecError::Build(format!("{:?}", e)))?;
    Ok(buf)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn arp_request_reply() {
        let mac = MacAddr([0, 0, 0, 0, 0, 1]);
        let req = ArpPacket::request(mac, Ipv4Addr::new(10, 1, 1, 1), Ipv4Addr::new(10, 1, 1, 2));
        let bytes = req.to_bytes();
        assert_eq!(bytes.len(), ARP_PACKET_LEN);
        assert_eq!(&bytes[6..8], &[0, 1]);
        let parsed = ArpPacket::parse(&bytes).unwrap();
        assert!(parsed.is_request());
        assert_eq!(parsed, req);

        let reply = ArpPacket::reply(
            MacAddr([0, 0, 0, 0, 0, 2]),
            Ipv4Addr::new(10, 1, 1, 2),
            mac,
            Ipv4Addr::new(10, 1, 1, 1),
        );
        let parsed = ArpPacket::parse(&reply.to_bytes()).unwrap();
        assert!(!parsed.is_request());
        assert_eq!(parsed.sender_mac, MacAddr([0, 0, 0, 0, 0, 2]));
    }

    #[test]
    fn arp_truncated_or_malformed() {
        assert_eq!(
            ArpPacket::parse(&[0, 1, 8, 0]),
            Err(CodecError::Truncated { what: "ARP", needed: ARP_PACKET_LEN, got: 4 })
        );
        let mut bytes =
            ArpPacket::request(MacAddr::ZERO, Ipv4Addr::LOCALHOST, Ipv4Addr::LOCALHOST)
                .to_bytes();
        // operation 3 does not exist
        bytes[7] = 3;
        assert_eq!(ArpPacket::parse(&bytes), Err(CodecError::Malformed("ARP")));
    }

    #[test]
    fn udp_and_tcp_flow_key() {
        let src = Ipv4Addr::new(10, 1, 1, 1);
        let dst = Ipv4Addr::new(10, 1, 1, 3);
        let udp = build_udp(src, dst, 49153, 9, &[0u8; 512]).unwrap();
        assert_eq!(udp.len(), 20 + 8 + 512);
        assert_eq!(
            parse_flow_key(&udp).unwrap(),
            FlowKey { src_ip: src, dst_ip: dst, src_port: 49153, dst_port: 9, protocol: 17 }
        );

        let tcp = build_tcp(dst, src, 80, 50000, 1, b"hello").unwrap();
        assert_eq!(
            parse_flow_key(&tcp).unwrap(),
            FlowKey { src_ip: dst, dst_ip: src, src_port: 80, dst_port: 50000, protocol: 6 }
        );
    }

    #[test]
    fn flow_key_errors() {
        let mut packet =
            build_udp(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 2), 1, 2, &[]).unwrap();
        // truncate the UDP header
        assert!(matches!(parse_flow_key(&packet[..24]), Err(CodecError::Read(_))));
        // pretend to be ICMP
        packet[9] = 1;
        assert_eq!(parse_flow_key(&packet), Err(CodecError::UnsupportedProtocol(1)));
        assert!(matches!(parse_flow_key(&[0x45, 0]), Err(CodecError::Read(_))));
    }
}
