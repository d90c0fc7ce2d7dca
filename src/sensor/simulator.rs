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

//! Synthetic telemetry: a virtual aircraft flying the loaded plan.
//!
//! Position is a linear blend between the leg end points, close enough at
//! the leg lengths involved.

use super::weather::{WindOrigin, WindReport};
use super::{AircraftState, Sensor, SensorData};
use crate::cockpit::handle::Pushable;
use crate::plan::Waypoint;
use crate::processor::fuel::FuelState;
use crate::processor::wind::WindObservation;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BASE_INCREMENT: f64 = 0.005;
const MAX_JITTER: f64 = 0.003;
const CRUISE_GS: f64 = 120.0;
const SIM_HZ: u32 = 2;

const INITIAL_FUEL: FuelState = FuelState {
    current: 8200.0,
    max: 12000.0,
    flow: 1800.0,
};
const SIM_STATION: &str = "KMRY";
const SIM_WIND: WindObservation = WindObservation {
    direction: 310.0,
    speed: 12.0,
    gust: None,
};

/// Progress cursor of the simulated flight
#[derive(PartialEq, Debug, Copy, Clone, Default)]
pub struct SimContext {
    /// Index of the waypoint being flown to
    pub leg_index: usize,
    /// Fraction of the current leg flown, [0, 1)
    pub leg_progress: f64,
    /// Last leg completed, parked at the destination
    pub halted: bool,
}

impl SimContext {
    pub fn start() -> Self {
        SimContext {
            leg_index: 1,
            ..Default::default()
        }
    }
}

/// Altitude step table, ft
fn step_altitude(leg_index: usize) -> f64 {
    if leg_index <= 2 {
        1500.0 + 750.0 * leg_index as f64
    } else {
        3000.0
    }
}

/// Advances `ctx` by one simulation step and returns the new context with the
/// resulting aircraft state. All randomness comes from `rng`.
pub fn tick<R: Rng>(
    ctx: SimContext,
    waypoints: &[Waypoint],
    rng: &mut R,
) -> (SimContext, AircraftState) {
    let last = match waypoints.len() {
        0 => {
            return (
                SimContext {
                    halted: true,
                    ..ctx
                },
                AircraftState::default(),
            )
        }
        n => n - 1,
    };

    let mut next = SimContext {
        leg_index: ctx.leg_index.min(last),
        ..ctx
    };

    if !next.halted {
        next.leg_progress += BASE_INCREMENT + rng.random_range(0.0..MAX_JITTER);

        if next.leg_progress >= 1.0 {
            next.leg_progress = 0.0;

            if next.leg_index >= last {
                info!("simulated flight arrived at {}", waypoints[last].ident);
                next.halted = true;
            } else {
                next.leg_index += 1;
            }
        }
    }

    let from = &waypoints[next.leg_index.saturating_sub(1)];
    let to = &waypoints[next.leg_index];

    let heading = if from.position != to.position {
        from.position.bearing_deg(&to.position).round()
    } else {
        0.0
    };

    if next.halted {
        let state = AircraftState {
            altitude: to
                .altitude
                .map_or_else(|| step_altitude(next.leg_index), f64::from),
            heading,
            position: to.position,
            ..Default::default()
        };

        return (next, state);
    }

    let gs = CRUISE_GS + f64::from(rng.random_range(-5_i32..5));
    let ias = gs - 10.0 + f64::from(rng.random_range(0_i32..6));
    let altitude = step_altitude(next.leg_index) + f64::from(rng.random_range(-25_i32..25));
    let vs = if next.leg_progress < 0.1 {
        rng.random_range(0_i32..300)
    } else {
        rng.random_range(-30_i32..30)
    };

    let state = AircraftState {
        altitude,
        ias,
        gs,
        heading,
        vs: f64::from(vs),
        mach: kts_to_mach!(gs),
        position: from.position.lerp(&to.position, next.leg_progress),
    };

    (next, state)
}

pub struct SyntheticTelemetry {
    ctx: SimContext,
    rng: StdRng,
    counter: u32,
    started: bool,
    reported_leg: Option<usize>,
}

impl SyntheticTelemetry {
    pub fn new(seed: Option<u64>) -> Box<Self> {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };

        Box::new(SyntheticTelemetry {
            ctx: SimContext::start(),
            rng,
            counter: 0,
            started: false,
            reported_leg: None,
        })
    }
}

impl Sensor for SyntheticTelemetry {
    fn run(&mut self, h: &mut dyn Pushable<SensorData>) {
        if !self.started {
            debug!("synthetic telemetry starting at leg {}", self.ctx.leg_index);

            h.push_data(SensorData::Fuel(INITIAL_FUEL));
            h.push_data(SensorData::Wind(WindReport {
                station: SIM_STATION.to_string(),
                wind: SIM_WIND,
                observed: h.get_utc(),
                origin: WindOrigin::Simulated,
            }));
            self.started = true;
        }

        run_every!(SIM_HZ, self.counter, h, {
            let (ctx, state) = tick(self.ctx, h.get_plan().waypoints(), &mut self.rng);
            self.ctx = ctx;

            if self.reported_leg != Some(ctx.leg_index) {
                h.push_data(SensorData::ActiveLeg(ctx.leg_index));
                self.reported_leg = Some(ctx.leg_index);
            }
            h.push_data(SensorData::Aircraft(state));
        });
    }
}
