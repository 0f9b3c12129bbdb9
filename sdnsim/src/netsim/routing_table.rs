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

//! # Routing Table
//!
//! Mapping from `(source entity, destination entity)` to the interface of the source that leads
//! towards the destination. The table is derived entirely from the [`TopologyGraph`].

use crate::netsim::shortest_path::ShortestPaths;
use crate::netsim::topology::TopologyGraph;
use crate::netsim::{ControllerError, EntityId, InterfaceId};

use log::*;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Single route of the routing table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Outgoing interface on the source entity
    pub interface: InterfaceId,
    /// Adjacent entity reached through `interface`
    pub next_hop: EntityId,
}

/// # Routing Table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingTable {
    routes: BTreeMap<(EntityId, EntityId), Route>,
}

impl RoutingTable {
    /// Create an empty routing table
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the routing table for all pairs of entities of the graph. Pairs without a path
    /// have no entry.
    pub fn populate(graph: &TopologyGraph) -> Self {
        let mut routes = BTreeMap::new();
        for source in graph.entities() {
            let paths = ShortestPaths::compute(graph, source);
            for dest in graph.entities().filter(|d| *d != source) {
                let next_hop = match paths.next_hop(dest) {
                    Some(nh) => nh,
                    None => {
                        trace!("No path from {} to {}", source, dest);
                        continue;
                    }
                };
                match graph.interface_towards(source, next_hop) {
                    Some(interface) => {
                        routes.insert((source, dest), Route { interface, next_hop });
                    }
                    None => warn!("No outgoing interface found from {} to {}", source, next_hop),
                }
            }
        }
        debug!("Routing table computed with {} entries", routes.len());
        Self { routes }
    }

    /// Return the route from `source` to `dest`
    pub fn get(&self, source: EntityId, dest: EntityId) -> Option<&Route> {
        self.routes.get(&(source, dest))
    }

    /// Find the outgoing interface for a frame that is currently at `current` (an interface) and
    /// is destined to the entity having the network address `dst_ip`.
    pub fn lookup(
        &self,
        graph: &TopologyGraph,
        current: InterfaceId,
        dst_ip: Ipv4Addr,
    ) -> Result<InterfaceId, ControllerError> {
        let source = match graph.owner_of(current) {
            Some(s) => s,
            None => {
                warn!("Could not find the entity owning interface {}", current);
                return Err(ControllerError::UnresolvedInterface(current));
            }
        };
        let dest = match graph.entity_with_ip(dst_ip) {
            Some(d) => d,
            None => {
                warn!("Could not find the entity with address {}", dst_ip);
                return Err(ControllerError::UnresolvedAddress(dst_ip));
            }
        };
        match self.routes.get(&(source, dest)) {
            Some(route) => Ok(route.interface),
            None => {
                warn!("No route from entity {} to entity {}", source, dest);
                Err(ControllerError::NoRoute(source, dest))
            }
        }
    }

    /// Iterate over all routes, ordered by source and then by destination.
    pub fn iter(&self) -> impl Iterator<Item = (&(EntityId, EntityId), &Route)> {
        self.routes.iter()
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if the table holds no route
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
