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

//! Vertical navigation.
//!
//! Two computations live side by side and are reported together. The
//! constraint based one works leg by leg towards the next altitude constraint
//! of the plan. The angle based one (the vertical calculator) plans a fixed
//! angle descent to a pilot selected altitude at the end of the plan.

use super::*;
use crate::plan::FlightPlan;
use crate::processor::navigation;
use crate::utils::{format_minutes, FT_PER_NM, UNKNOWN_TIME};

pub const MAX_TARGET_ALTITUDE: f64 = 45000.0;
pub const MIN_ANGLE: f64 = 1.0;
pub const MAX_ANGLE: f64 = 6.0;
pub const MAX_OFFSET: f64 = 30.0;

#[derive(PartialEq, Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VnavSettings {
    pub enabled: bool,
    /// ft
    pub target_altitude: f64,
    /// Descent angle in deg
    pub angle: f64,
    /// nm before the target the descent should end
    pub offset: f64,
}

impl Default for VnavSettings {
    fn default() -> Self {
        VnavSettings {
            enabled: true,
            target_altitude: 3000.0,
            angle: 3.0,
            offset: 0.0,
        }
    }
}

impl VnavSettings {
    pub fn clamped(self) -> Self {
        VnavSettings {
            enabled: self.enabled,
            target_altitude: self.target_altitude.clamp(0.0, MAX_TARGET_ALTITUDE),
            angle: self.angle.clamp(MIN_ANGLE, MAX_ANGLE),
            offset: self.offset.clamp(0.0, MAX_OFFSET),
        }
    }
}

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum VnavStatus {
    Above,
    Approaching,
    Descending,
    AtTarget,
    Below,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ConstraintProfile {
    /// Constrained waypoint
    pub target: String,
    pub target_altitude: i32,
    /// nm
    pub distance: f64,
    /// fpm per the distance ratio heuristic, unknown over a zero distance
    pub required_vs: Option<i32>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct AngleProfile {
    /// Current minus target, ft
    pub altitude_difference: f64,
    /// nm
    pub distance_needed: f64,
    pub distance_to_target: f64,
    pub distance_to_tod: f64,
    /// Minutes
    pub time_to_tod: Option<f64>,
    /// `M:SS`, or `--:--`
    pub time_to_tod_display: String,
    /// fpm
    pub required_vs: Option<f64>,
    pub status: VnavStatus,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct VnavReport {
    pub constraint: Option<ConstraintProfile>,
    pub angle: Option<AngleProfile>,
}

/// Next altitude constraint strictly after the active waypoint
pub fn constraint_profile(plan: &FlightPlan, altitude: f64) -> Option<ConstraintProfile> {
    let active = plan.active_index();
    let waypoints = plan.waypoints();

    let (index, target_altitude) = waypoints
        .iter()
        .enumerate()
        .skip(active + 1)
        .find_map(|(i, w)| w.altitude.map(|a| (i, a)))?;

    let distance: f64 = waypoints[active..=index].iter().map(|w| w.distance).sum();

    let required_vs = if distance > 0.0 {
        Some(((f64::from(target_altitude) - altitude) / distance * 100.0).round() as i32)
    } else {
        None
    };

    Some(ConstraintProfile {
        target: waypoints[index].ident.clone(),
        target_altitude,
        distance,
        required_vs,
    })
}

pub fn classify(altitude_difference: f64, distance_to_tod: f64) -> VnavStatus {
    if altitude_difference.abs() < 100.0 {
        VnavStatus::AtTarget
    } else if altitude_difference < -100.0 {
        VnavStatus::Below
    } else if distance_to_tod < 0.5 {
        VnavStatus::Descending
    } else if distance_to_tod < 3.0 {
        VnavStatus::Approaching
    } else {
        VnavStatus::Above
    }
}

/// `None` when the calculator is disabled
pub fn angle_profile(
    settings: &VnavSettings,
    altitude: f64,
    gs: f64,
    distance_remaining: f64,
) -> Option<AngleProfile> {
    let settings = settings.clamped();
    if !settings.enabled {
        return None;
    }

    let altitude_difference = altitude - settings.target_altitude;
    let distance_to_target = distance_remaining + settings.offset;

    let tan = settings.angle.to_radians().tan();
    let distance_needed = if tan > 0.0 {
        altitude_difference / (tan * FT_PER_NM)
    } else {
        0.0
    };
    let distance_to_tod = (distance_to_target - distance_needed).max(0.0);

    let (time_to_tod, time_to_target) = if gs > 0.0 {
        (
            Some(distance_to_tod / gs * 60.0),
            Some(distance_to_target / gs * 60.0),
        )
    } else {
        (None, None)
    };

    let required_vs = time_to_target
        .filter(|t| *t > 0.0)
        .map(|t| -(altitude_difference / t));

    let time_to_tod_display = match time_to_tod {
        Some(t) if t > 0.0 => format_minutes(t),
        _ => UNKNOWN_TIME.to_string(),
    };

    Some(AngleProfile {
        altitude_difference,
        distance_needed,
        distance_to_target,
        distance_to_tod,
        time_to_tod,
        time_to_tod_display,
        required_vs,
        status: classify(altitude_difference, distance_to_tod),
    })
}

pub struct Vnav {
    settings: VnavSettings,
    aircraft: Option<AircraftState>,
}

impl Processor for Vnav {
    fn run(&mut self, handle: &mut dyn Pushable<Report>, i: ChainedIter) {
        if let Some(a) = latest_aircraft(i) {
            self.aircraft = Some(a);
        }

        if let Some(ref a) = self.aircraft {
            let plan = handle.get_plan();
            let remaining = navigation::compute(a, plan, handle.get_utc()).distance_remaining;

            let report = VnavReport {
                constraint: constraint_profile(plan, a.altitude),
                angle: angle_profile(&self.settings, a.altitude, a.gs, remaining),
            };

            handle.push_data(Report::Vnav(report));
        }
    }

    fn reset(&mut self) {
        self.aircraft = None;
    }
}

impl Vnav {
    pub fn new(settings: VnavSettings) -> Box<dyn Processor> {
        Box::new(Vnav {
            settings: settings.clamped(),
            aircraft: None,
        })
    }
}
