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

//! # Topology configuration
//!
//! A topology can be described in JSON and loaded with [`TopologyConfig::from_file`] or
//! [`TopologyConfig::from_json`]:
//!
//! ```json
//! {
//!     "hosts": [
//!         { "name": "h1", "ip": "10.0.0.1" },
//!         { "name": "h2", "ip": "10.0.0.2", "mac": [2, 0, 0, 0, 0, 2] }
//!     ],
//!     "switches": [{ "name": "s1" }],
//!     "links": [{ "a": "h1", "b": "s1" }, { "a": "s1", "b": "h2" }]
//! }
//! ```
//!
//! The hardware address of a host is used for its first link only. All other interfaces get an
//! address allocated by the fabric.

use crate::netsim::network::Network;
use crate::netsim::{EntityId, MacAddr, NetworkError, TopologyError};
use crate::Error;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;

/// Host description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Unique name of the host
    pub name: String,
    /// Network address of the host
    pub ip: Ipv4Addr,
    /// Hardware address of the interface towards the first link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<MacAddr>,
}

/// Switch description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    /// Unique name of the switch
    pub name: String,
}

/// Point-to-point link between two named devices
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// First endpoint
    pub a: String,
    /// Second endpoint
    pub b: String,
}

/// Description of a whole topology
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyConfig {
    /// All hosts
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
    /// All switches
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
    /// All links
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

impl TopologyConfig {
    /// Parse the configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse the configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Serialize the configuration to (pretty) JSON
    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Create the devices and links in a new network. The topology is not yet built, and no
    /// switch is registered.
    pub(crate) fn instantiate(&self) -> Result<Network, NetworkError> {
        let mut net = Network::new();
        let mut names: HashSet<&str> = HashSet::new();
        let mut host_macs: HashMap<EntityId, MacAddr> = HashMap::new();

        for h in self.hosts.iter() {
            if !names.insert(h.name.as_str()) {
                return Err(TopologyError::DuplicateName(h.name.clone()).into());
            }
            let id = net.add_host(h.name.as_str(), h.ip);
            if let Some(mac) = h.mac {
                host_macs.insert(id, mac);
            }
        }
        for s in self.switches.iter() {
            if !names.insert(s.name.as_str()) {
                return Err(TopologyError::DuplicateName(s.name.clone()).into());
            }
            net.add_switch(s.name.as_str());
        }
        for l in self.links.iter() {
            let a = net.get_entity_id(&l.a)?;
            let b = net.get_entity_id(&l.b)?;
            net.add_link_with_macs(a, host_macs.remove(&a), b, host_macs.remove(&b))?;
        }
        Ok(net)
    }
}
