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

//! # Path Computation
//!
//! Single-source shortest paths over the [`TopologyGraph`], using Dijkstra's algorithm with a
//! min-priority queue. The result is a predecessor map, from which the next hop towards any
//! reachable destination can be extracted.

use crate::netsim::topology::TopologyGraph;
use crate::netsim::{EntityId, LinkWeight};

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap};

/// Shortest path tree rooted at `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPaths {
    source: EntityId,
    /// Distance to every reachable entity. Unreachable entities are absent (infinite distance).
    distances: BTreeMap<EntityId, LinkWeight>,
    /// Predecessor of every entity in the graph. `None` for the source and for unreachable
    /// entities.
    predecessors: BTreeMap<EntityId, Option<EntityId>>,
}

impl ShortestPaths {
    /// Compute the shortest paths from `source` to all entities of the graph.
    ///
    /// Outgoing links are relaxed in graph iteration order, and the predecessor of a neighbor is
    /// only replaced if a strictly shorter path is found. Hence, among equally short paths, the
    /// first one discovered is kept. This is stable for a fixed graph, but depends on the order
    /// in which the topology was enumerated.
    pub fn compute(graph: &TopologyGraph, source: EntityId) -> Self {
        let mut distances: BTreeMap<EntityId, LinkWeight> = BTreeMap::new();
        let mut predecessors: BTreeMap<EntityId, Option<EntityId>> =
            graph.entities().map(|e| (e, None)).collect();

        if !graph.contains(source) {
            return Self { source, distances, predecessors };
        }

        let mut queue: BinaryHeap<Reverse<(LinkWeight, EntityId)>> = BinaryHeap::new();
        distances.insert(source, 0);
        queue.push(Reverse((0, source)));

        while let Some(Reverse((dist, current))) = queue.pop() {
            // skip stale queue entries
            if distances.get(&current).map(|d| dist > *d).unwrap_or(false) {
                continue;
            }
            for link in graph.links(current) {
                let candidate = dist.saturating_add(link.weight);
                let shorter = match distances.get(&link.neighbor) {
                    Some(known) => candidate < *known,
                    None => true,
                };
                if shorter {
                    distances.insert(link.neighbor, candidate);
                    predecessors.insert(link.neighbor, Some(current));
                    queue.push(Reverse((candidate, link.neighbor)));
                }
            }
        }

        Self { source, distances, predecessors }
    }

    /// Root of the tree
    pub fn source(&self) -> EntityId {
        self.source
    }

    /// Distance (number of hops) to `dest`, or `None` if `dest` is not reachable.
    pub fn distance(&self, dest: EntityId) -> Option<LinkWeight> {
        self.distances.get(&dest).copied()
    }

    /// Predecessor of `dest` on the shortest path from the source.
    pub fn predecessor(&self, dest: EntityId) -> Option<EntityId> {
        self.predecessors.get(&dest).copied().flatten()
    }

    /// The predecessor map
    pub fn predecessors(&self) -> &BTreeMap<EntityId, Option<EntityId>> {
        &self.predecessors
    }

    /// Extract the next hop towards `dest`, by walking the predecessors back from `dest` until
    /// reaching the entity whose predecessor is the source. Returns `None` if `dest` is the source
    /// itself, or if no path exists.
    pub fn next_hop(&self, dest: EntityId) -> Option<EntityId> {
        if dest == self.source {
            return None;
        }
        let mut current = dest;
        // a valid tree has no path longer than the number of entities
        for _ in 0..self.predecessors.len() {
            match self.predecessor(current)? {
                p if p == self.source => return Some(current),
                p => current = p,
            }
        }
        None
    }

    /// Return the path from the source to `dest` (both included), or `None` if `dest` is not
    /// reachable.
    pub fn path_to(&self, dest: EntityId) -> Option<Vec<EntityId>> {
        self.distance(dest)?;
        let mut path = vec![dest];
        let mut current = dest;
        while current != self.source {
            current = self.predecessor(current)?;
            path.push(current);
            if path.len() > self.predecessors.len() {
                return None;
            }
        }
        path.reverse();
        Some(path)
    }
}
