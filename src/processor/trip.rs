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

//! Trip planning over the whole flight plan.

use super::*;
use crate::plan::{leg_ete, FlightPlan};
use crate::utils::{format_eta, format_hours, UNKNOWN_TIME, UNKNOWN_UTC};
use chrono::{DateTime, Utc};

/// Added to the highest altitude constraint for the en route safe altitude, ft
const ESA_MARGIN: i32 = 1000;

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct TripLeg {
    pub ident: String,
    pub dtk: f64,
    pub distance: f64,
    /// `M:SS`
    pub ete: Option<String>,
    pub altitude: Option<i32>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct TripSummary {
    /// Ground speed the figures were computed with, kts
    pub gs: f64,
    pub legs: Vec<TripLeg>,
    pub total_distance: f64,
    /// `H:MM`
    pub total_ete: String,
    pub eta: String,
    /// En route safe altitude, ft
    pub esa: i32,
}

pub fn plan_trip(plan: &FlightPlan, gs: f64, utc: DateTime<Utc>) -> TripSummary {
    let legs = plan
        .waypoints()
        .iter()
        .map(|w| TripLeg {
            ident: w.ident.clone(),
            dtk: w.dtk,
            distance: w.distance,
            ete: leg_ete(w.distance, gs),
            altitude: w.altitude,
        })
        .collect();

    let total_distance = plan.total_distance();
    let total_hours = if gs > 0.0 {
        Some(total_distance / gs)
    } else {
        None
    };

    let eta = total_hours.map_or_else(
        || UNKNOWN_UTC.to_string(),
        |h| format_eta(&utc, h * 3600.0),
    );

    let highest = plan
        .waypoints()
        .iter()
        .filter_map(|w| w.altitude)
        .max()
        .unwrap_or(0);

    TripSummary {
        gs,
        legs,
        total_distance,
        total_ete: total_hours.map_or_else(|| UNKNOWN_TIME.to_string(), format_hours),
        eta,
        esa: highest + ESA_MARGIN,
    }
}

pub struct Trip {
    manual_gs: f64,
    sensor_gs: Option<f64>,
    counter: u32,
}

impl Trip {
    pub fn new(manual_gs: f64) -> Box<dyn Processor> {
        Box::new(Trip {
            manual_gs,
            sensor_gs: None,
            counter: 0,
        })
    }

    /// Sensor ground speed when moving, the manual planning speed otherwise
    fn gs(&self) -> f64 {
        match self.sensor_gs {
            Some(gs) if gs > 0.0 => gs,
            _ => self.manual_gs,
        }
    }
}

impl Processor for Trip {
    fn run(&mut self, handle: &mut dyn Pushable<Report>, i: ChainedIter) {
        if let Some(a) = latest_aircraft(i) {
            self.sensor_gs = Some(a.gs);
        }

        let gs = self.gs();
        run_every!(1, self.counter, handle, {
            let summary = plan_trip(handle.get_plan(), gs, handle.get_utc());
            handle.push_data(Report::Trip(summary));
        });
    }

    fn reset(&mut self) {
        self.sensor_gs = None;
        self.counter = 0;
    }
}
