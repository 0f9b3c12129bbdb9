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

//! # Topology Graph
//!
//! The controller's view of the network: one graph node per entity (host or switch), and one
//! directed edge per link endpoint, carrying the local interface used to reach the neighbor.
//! Every interface observed by the fabric becomes a [`GraphNode`], which stores the addresses of
//! the interface and the entity owning it.

use crate::netsim::fabric::{InterfaceObservation, TopologyObservation};
use crate::netsim::types::{TopologyIndex, TopologyNetwork};
use crate::netsim::{EntityId, InterfaceId, LinkWeight, MacAddr};

use log::*;
use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

/// Addressable point in the topology: an interface of a host or a switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphNode {
    /// Entity owning the interface
    pub entity: EntityId,
    /// The interface itself
    pub interface: InterfaceId,
    /// Hardware address of the interface
    pub mac: MacAddr,
    /// Network address, unset for switches
    pub ip: Option<Ipv4Addr>,
}

impl From<&InterfaceObservation> for GraphNode {
    fn from(obs: &InterfaceObservation) -> Self {
        Self { entity: obs.entity, interface: obs.interface, mac: obs.mac, ip: obs.ip }
    }
}

/// Directed edge of the topology graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    /// Entity at the other end of the link
    pub neighbor: EntityId,
    /// Local interface used to reach the neighbor
    pub interface: InterfaceId,
    /// Weight of the link (hop count)
    pub weight: LinkWeight,
}

/// # Topology Graph
///
/// Built once from a [`TopologyObservation`]. Rebuilding means building a new graph; the graph
/// is never modified incrementally.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    graph: TopologyNetwork,
    indices: BTreeMap<EntityId, TopologyIndex>,
    nodes: BTreeMap<InterfaceId, GraphNode>,
}

impl TopologyGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the graph from the observed topology. First, every switch interface and every host
    /// interface is added as a graph node. Then, for every link, a directed edge with weight 1 is
    /// added from each end towards the other one. Links whose interfaces are not known as graph
    /// nodes are skipped.
    pub fn build(observation: &TopologyObservation) -> Self {
        let mut g = Self::new();
        for obs in observation.switches.iter().chain(observation.hosts.iter()) {
            g.add_node(GraphNode::from(obs));
        }
        for (a, b) in observation.links.iter() {
            g.add_link(*a, *b);
            g.add_link(*b, *a);
        }
        info!(
            "Topology graph built with {} entities, {} interfaces and {} links",
            g.indices.len(),
            g.nodes.len(),
            g.graph.edge_count()
        );
        g
    }

    /// Add a graph node. A second node with the same interface replaces the first one.
    fn add_node(&mut self, node: GraphNode) {
        let graph = &mut self.graph;
        self.indices.entry(node.entity).or_insert_with(|| graph.add_node(node.entity));
        if self.nodes.insert(node.interface, node).is_some() {
            warn!("Interface {} observed twice! Keep the last observation", node.interface);
        }
    }

    /// Add a directed link from the owner of `from` to the owner of `to`.
    fn add_link(&mut self, from: InterfaceId, to: InterfaceId) {
        let (source, target) = match (self.nodes.get(&from), self.nodes.get(&to)) {
            (Some(s), Some(t)) => (s.entity, t.entity),
            _ => {
                debug!("Skip link {} -> {}: interface not part of the graph", from, to);
                return;
            }
        };
        let (s_idx, t_idx) = (self.indices[&source], self.indices[&target]);
        self.graph.add_edge(s_idx, t_idx, Link { neighbor: target, interface: from, weight: 1 });
    }

    /// Iterate over all entities in the graph, ordered by their id.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.indices.keys().copied()
    }

    /// Number of entities in the graph
    pub fn num_entities(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if the entity is part of the graph
    pub fn contains(&self, entity: EntityId) -> bool {
        self.indices.contains_key(&entity)
    }

    /// Iterate over all graph nodes (interfaces), ordered by entity, then by interface.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        let mut nodes: Vec<&GraphNode> = self.nodes.values().collect();
        nodes.sort_by_key(|n| (n.entity, n.interface));
        nodes.into_iter()
    }

    /// Get the graph node of an interface
    pub fn node(&self, interface: InterfaceId) -> Option<&GraphNode> {
        self.nodes.get(&interface)
    }

    /// Return the entity owning the interface, if the interface is a graph node.
    pub fn owner_of(&self, interface: InterfaceId) -> Option<EntityId> {
        self.nodes.get(&interface).map(|n| n.entity)
    }

    /// Return the entity having the given network address.
    pub fn entity_with_ip(&self, ip: Ipv4Addr) -> Option<EntityId> {
        self.nodes().find(|n| n.ip == Some(ip)).map(|n| n.entity)
    }

    /// Return all outgoing links of an entity, in graph iteration order. Unknown entities have no
    /// links.
    pub fn links(&self, entity: EntityId) -> Vec<Link> {
        match self.indices.get(&entity) {
            Some(idx) => self.graph.edges(*idx).map(|e| *e.weight()).collect(),
            None => Vec::new(),
        }
    }

    /// Return the local interface of `entity` whose link leads to `neighbor`.
    pub fn interface_towards(&self, entity: EntityId, neighbor: EntityId) -> Option<InterfaceId> {
        self.links(entity).into_iter().find(|l| l.neighbor == neighbor).map(|l| l.interface)
    }

    /// Total number of directed links
    pub fn num_links(&self) -> usize {
        self.graph.edge_count()
    }
}
