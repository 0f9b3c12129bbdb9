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

//! Module for defining events

use crate::netsim::{Frame, InterfaceId};
use std::collections::VecDeque;

/// Event to handle
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A frame arrives at interface `#0`.
    Frame(InterfaceId, Frame),
}

impl Event {
    /// Returns the interface at which the event happens.
    pub fn interface(&self) -> InterfaceId {
        match self {
            Event::Frame(iface, _) => *iface,
        }
    }
}

/// Event queue for enqueuing events.
pub(crate) type EventQueue = VecDeque<Event>;
