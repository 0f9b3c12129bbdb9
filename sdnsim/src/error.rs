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

//! Module containing all error types

use crate::netsim::{NetworkError, TopologyError};
use thiserror::Error;

/// Main error type
#[derive(Debug, Error)]
pub enum Error {
    /// Error propagated from `netsim`
    #[error("Network Error: {0}")]
    NetworkError(#[from] NetworkError),
    /// The topology file cannot be read
    #[error("Cannot read the topology file: {0}")]
    Io(#[from] std::io::Error),
    /// The topology description is not valid JSON, or does not match the expected structure
    #[error("Cannot parse the topology: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<TopologyError> for Error {
    fn from(cause: TopologyError) -> Self {
        Self::NetworkError(NetworkError::TopologyError(cause))
    }
}
