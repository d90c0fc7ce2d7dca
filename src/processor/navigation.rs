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

//! Live navigation snapshot: where we are going, how far, and when we get there.

use super::*;
use crate::plan::{DirectTo, FlightPlan};
use crate::utils::{format_eta, UNKNOWN_UTC};
use chrono::{DateTime, Utc};

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct NavigationSnapshot {
    /// Ident of the waypoint the active leg starts from
    pub current_waypoint: String,
    /// Ident of the waypoint being flown to, direct-to target included
    pub next_waypoint: String,
    /// nm
    pub distance_to_next: f64,
    /// nm, sum of every leg of the plan
    pub total_distance: f64,
    /// nm
    pub distance_remaining: f64,
    /// Seconds to the end of the plan, unknown without ground speed
    pub ete: Option<f64>,
    pub eta: String,
    /// Desired track in deg
    pub dtk: f64,
    pub active_leg_index: usize,
    pub direct_to: bool,
    pub obs: bool,
}

/// Recomputes the whole snapshot from scratch
pub fn compute(state: &AircraftState, plan: &FlightPlan, utc: DateTime<Utc>) -> NavigationSnapshot {
    let (target, after) = match plan.direct_to() {
        Some(DirectTo::Planned(i)) => (&plan.waypoints()[*i], plan.distance_after(*i)),
        // off plan, nothing follows
        Some(DirectTo::Fix(w)) => (w, 0.0),
        None => (plan.active_waypoint(), plan.distance_after(plan.active_index())),
    };

    let distance_to_next = state.position.distance_nm(&target.position);
    let distance_remaining = distance_to_next + after;

    let obs = plan.obs();
    let dtk = if obs.enabled {
        obs.course
    } else if plan.direct_to().is_some() && distance_to_next > 0.0 {
        state.position.bearing_deg(&target.position)
    } else {
        target.dtk
    };

    let ete = ete_seconds(distance_remaining, state.gs);
    let eta = ete.map_or_else(
        || UNKNOWN_UTC.to_string(),
        |s| format_eta(&utc, s),
    );

    NavigationSnapshot {
        current_waypoint: plan.from_waypoint().ident.clone(),
        next_waypoint: target.ident.clone(),
        distance_to_next,
        total_distance: plan.total_distance(),
        distance_remaining,
        ete,
        eta,
        dtk,
        active_leg_index: plan.active_index(),
        direct_to: plan.direct_to().is_some(),
        obs: obs.enabled,
    }
}

/// `None` unless the ground speed is positive
pub fn ete_seconds(distance: f64, gs: f64) -> Option<f64> {
    if gs > 0.0 {
        Some(distance / gs * 3600.0)
    } else {
        None
    }
}

#[derive(Default)]
pub struct Navigation {
    aircraft: Option<AircraftState>,
}

impl Processor for Navigation {
    fn run(&mut self, handle: &mut dyn Pushable<Report>, i: ChainedIter) {
        if let Some(a) = latest_aircraft(i) {
            self.aircraft = Some(a);
            handle.push_data(Report::Aircraft(a));
        }

        // the plan may change between ticks, so this runs with or without fresh data
        if let Some(ref a) = self.aircraft {
            let snapshot = compute(a, handle.get_plan(), handle.get_utc());
            trace!("navigation: {:?}", snapshot);

            handle.push_data(Report::Navigation(snapshot));
        }
    }

    fn reset(&mut self) {
        self.aircraft = None;
    }
}

impl Navigation {
    pub fn new() -> Box<dyn Processor> {
        Box::new(Navigation::default())
    }
}
