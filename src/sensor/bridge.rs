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

//! Telemetry pushed by an external simulator bridge.
//!
//! The I/O side lives elsewhere and hands over raw JSON text messages through
//! a channel. Every message may carry any subset of sections, and every
//! section only the fields that changed.

use super::weather::{WindOrigin, WindReport};
use super::{AircraftState, Sensor, SensorData};
use crate::cockpit::handle::Pushable;
use crate::errors::Result;
use crate::processor::fuel::FuelState;
use crate::processor::wind::WindObservation;
use chrono::{DateTime, Utc};
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct FlightPatch {
    altitude: Option<f64>,
    speed: Option<f64>,
    heading: Option<f64>,
    vertical_speed: Option<f64>,
    ground_speed: Option<f64>,
    mach: Option<f64>,
    lat: Option<f64>,
    lng: Option<f64>,
}

#[derive(Deserialize, Default)]
struct FuelPatch {
    current: Option<f64>,
    max: Option<f64>,
    flow: Option<f64>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct WeatherPatch {
    location: Option<String>,
    wind_dir: Option<f64>,
    wind_speed: Option<f64>,
    wind_gust: Option<f64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Message {
    seq: Option<u64>,
    flight_data: Option<FlightPatch>,
    fuel: Option<FuelPatch>,
    weather: Option<WeatherPatch>,
}

fn merge(field: &mut f64, v: Option<f64>) {
    if let Some(v) = v {
        *field = v;
    }
}

/// `false` for a section not newer than the last one applied
fn accept(last: &mut Option<u64>, seq: Option<u64>) -> bool {
    match (seq, *last) {
        (Some(s), Some(l)) if s <= l => false,
        (Some(s), _) => {
            *last = Some(s);
            true
        }
        (None, _) => true,
    }
}

/// Accumulated bridge state, one merge per message
#[derive(Default, Debug)]
pub struct BridgeState {
    aircraft: AircraftState,
    fuel: FuelState,
    wind: WindObservation,
    station: String,
    flight_seq: Option<u64>,
    fuel_seq: Option<u64>,
    weather_seq: Option<u64>,
}

impl BridgeState {
    /// Merges one message, returning what changed as sensor data
    pub fn apply(&mut self, msg: &str, now: DateTime<Utc>) -> Result<Vec<SensorData>> {
        let m: Message = serde_json::from_str(msg)?;
        let mut out = Vec::with_capacity(3);

        if let Some(f) = m.flight_data {
            if accept(&mut self.flight_seq, m.seq) {
                let a = &mut self.aircraft;
                merge(&mut a.altitude, f.altitude);
                merge(&mut a.ias, f.speed);
                merge(&mut a.heading, f.heading);
                merge(&mut a.vs, f.vertical_speed);
                merge(&mut a.gs, f.ground_speed);
                merge(&mut a.mach, f.mach);
                merge(&mut a.position.lat, f.lat);
                merge(&mut a.position.lng, f.lng);

                out.push(SensorData::Aircraft(*a));
            } else {
                debug!("dropping stale flight data, seq {:?}", m.seq);
            }
        }

        if let Some(f) = m.fuel {
            if accept(&mut self.fuel_seq, m.seq) {
                merge(&mut self.fuel.current, f.current);
                merge(&mut self.fuel.max, f.max);
                merge(&mut self.fuel.flow, f.flow);

                out.push(SensorData::Fuel(self.fuel));
            } else {
                debug!("dropping stale fuel data, seq {:?}", m.seq);
            }
        }

        if let Some(w) = m.weather {
            if accept(&mut self.weather_seq, m.seq) {
                if let Some(l) = w.location {
                    self.station = l;
                }
                merge(&mut self.wind.direction, w.wind_dir);
                merge(&mut self.wind.speed, w.wind_speed);
                if w.wind_gust.is_some() {
                    self.wind.gust = w.wind_gust;
                }

                out.push(SensorData::Wind(WindReport {
                    station: self.station.clone(),
                    wind: self.wind,
                    observed: now,
                    origin: WindOrigin::Live,
                }));
            } else {
                debug!("dropping stale weather, seq {:?}", m.seq);
            }
        }

        Ok(out)
    }
}

pub struct BridgeTelemetry {
    rx: Receiver<String>,
    state: BridgeState,
    degraded: bool,
}

impl BridgeTelemetry {
    /// The sender goes to whatever reads the bridge connection
    pub fn new() -> (Box<Self>, Sender<String>) {
        let (tx, rx) = channel();

        (
            Box::new(BridgeTelemetry {
                rx,
                state: BridgeState::default(),
                degraded: false,
            }),
            tx,
        )
    }
}

impl Sensor for BridgeTelemetry {
    fn run(&mut self, h: &mut dyn Pushable<SensorData>) {
        loop {
            match self.rx.try_recv() {
                Ok(msg) => match self.state.apply(&msg, h.get_utc()) {
                    Ok(data) => {
                        for d in data {
                            h.push_data(d);
                        }
                    }
                    Err(e) => warn!("skipping malformed bridge message: {}", e),
                },
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if !self.degraded {
                        warn!("bridge link lost");
                        self.degraded = true;
                    }
                    break;
                }
            }
        }
    }

    fn degraded(&self) -> bool {
        self.degraded
    }
}
