// SimGlass - a glass-cockpit navigation and flight-performance engine
// Copyright (C) 2017-2018  Datong Sun (dndx@idndx.com)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Rejected wholesale, nothing of the plan was applied
    #[error("invalid flight plan: {0}")]
    InvalidPlan(String),

    #[error("index {index} out of range for a plan of {len} waypoints")]
    OutOfRange { index: usize, len: usize },

    #[error("unknown waypoint {0}")]
    UnknownWaypoint(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid runway designator {0}")]
    InvalidRunway(String),

    #[error("weather unavailable for {0}")]
    WeatherUnavailable(String),

    #[error("IO error {0}")]
    Io(#[from] io::Error),

    #[error("serde error {0}")]
    Json(#[from] serde_json::Error),
}

pub fn invalid_plan(msg: impl ToString) -> Error {
    Error::InvalidPlan(msg.to_string())
}

pub fn parse_error(msg: impl ToString) -> Error {
    Error::Parse(msg.to_string())
}
