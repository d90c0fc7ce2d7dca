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

pub mod fuel;
pub mod navigation;
pub mod trip;
pub mod vnav;
pub mod wind;

use crate::cockpit::handle::Pushable;
use crate::cockpit::Status;
use crate::sensor::{AircraftState, SensorData};
use std::iter::Chain;
use std::slice::Iter;

#[derive(PartialEq, Debug, Clone)]
pub enum Report {
    Aircraft(AircraftState),
    Navigation(navigation::NavigationSnapshot),
    Fuel(fuel::FuelReport),
    Vnav(vnav::VnavReport),
    Wind(wind::WindAdvisory),
    Trip(trip::TripSummary),
    Status(Status),
}

pub type ChainedIter<'a> = Chain<Iter<'a, SensorData>, Iter<'a, SensorData>>;

/// A `Processor` takes in input from the sensor layer and
/// generates `Report` as necessary for the next layer
pub trait Processor {
    /// Deliver sensor data `e` to this processor
    fn run(&mut self, handle: &mut dyn Pushable<Report>, i: ChainedIter);

    /// Drop everything derived from the previous telemetry source
    fn reset(&mut self) {}
}

/// Latest aircraft state found in `i`, if any
fn latest_aircraft(i: ChainedIter) -> Option<AircraftState> {
    i.filter_map(|e| match *e {
        SensorData::Aircraft(a) => Some(a),
        _ => None,
    })
    .last()
}

#[cfg(test)]
pub(crate) mod test_util {
    use super::*;
    use crate::cockpit::handle::{BasicHandle, PushableHandle};
    use crate::plan::FlightPlan;
    use chrono::{DateTime, TimeZone, Utc};
    use std::collections::VecDeque;

    pub fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 3, 1, 12, 0, 0).unwrap()
    }

    /// Runs `p` once over `input` the way the pipeline does and returns what it reported
    pub fn run_once(
        p: &mut dyn Processor,
        plan: &FlightPlan,
        freq: u16,
        input: Vec<SensorData>,
    ) -> Vec<Report> {
        let b = BasicHandle::at(noon(), freq, plan);
        let mut q = VecDeque::new();
        let input: VecDeque<SensorData> = input.into();

        {
            let mut h = PushableHandle::new(&b, &mut q);
            let (first, second) = input.as_slices();
            p.run(&mut h, first.iter().chain(second));
        }

        q.into()
    }
}
