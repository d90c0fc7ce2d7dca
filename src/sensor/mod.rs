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

pub mod bridge;
pub mod simulator;
pub mod weather;

use self::weather::WindReport;
use crate::cockpit::handle::Pushable;
use crate::geodesy::Position;
use crate::processor::fuel::FuelState;

#[derive(PartialEq, Debug, Default, Copy, Clone, Serialize)]
pub struct AircraftState {
    /// Altitude in ft
    pub altitude: f64,
    /// Indicated airspeed in kts
    pub ias: f64,
    /// Ground speed in kts
    pub gs: f64,
    /// Heading in deg, true or magnetic depending on the source
    pub heading: f64,
    /// Vertical speed in fpm
    pub vs: f64,
    pub mach: f64,
    pub position: Position,
}

#[derive(PartialEq, Debug, Clone)]
/// Represents data received from the sensor layer
pub enum SensorData {
    Aircraft(AircraftState),
    Fuel(FuelState),
    Wind(WindReport),
    /// Plan index of the waypoint the source is flying to
    ActiveLeg(usize),
}

/// Where aircraft telemetry currently comes from, at most one at a time
#[derive(PartialEq, Eq, Debug, Default, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TelemetrySource {
    None,
    #[default]
    Synthetic,
    External,
}

/// A type for representing a sensor
pub trait Sensor {
    /// Run the provider, may or may not yield any result
    fn run(&mut self, h: &mut dyn Pushable<SensorData>);

    /// `true` when the upstream link is lost and the sensor is serving fallback values
    fn degraded(&self) -> bool {
        false
    }
}
