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

//! The flight plan: an ordered waypoint sequence plus the active leg and the
//! direct-to/OBS overrides. Overrides never touch the sequence itself.

pub mod fpl;
pub mod text;

use crate::errors::{invalid_plan, Error, Result};
use crate::geodesy::Position;
use crate::utils::format_minutes;
use std::collections::HashSet;
use std::path::Path;

/// Ground speed used to estimate per leg ETE at planning time, in kts
pub const PLANNING_GS_KTS: f64 = 120.0;

#[derive(PartialEq, Eq, Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaypointKind {
    Airport,
    Vor,
    Ndb,
    Fix,
    User,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub ident: String,
    pub kind: WaypointKind,
    pub position: Position,
    /// Desired track from the prior waypoint in deg, derived
    #[serde(default)]
    pub dtk: f64,
    /// Leg distance from the prior waypoint in nm, derived
    #[serde(default)]
    pub distance: f64,
    /// Altitude constraint in ft
    pub altitude: Option<i32>,
    /// Leg ETE at `PLANNING_GS_KTS` in seconds, derived
    #[serde(default)]
    pub ete: f64,
    #[serde(default)]
    pub active: bool,
}

impl Waypoint {
    pub fn new(ident: &str, kind: WaypointKind, lat: f64, lng: f64) -> Self {
        Waypoint {
            ident: ident.to_string(),
            kind,
            position: Position::new(lat, lng),
            dtk: 0.0,
            distance: 0.0,
            altitude: None,
            ete: 0.0,
            active: false,
        }
    }

    pub fn with_altitude(mut self, altitude: i32) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// Leg ETE as `MM:SS`
    pub fn ete_display(&self) -> String {
        let secs = self.ete.round() as u64;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum DirectTo {
    /// Direct to a waypoint of the plan, by index
    Planned(usize),
    /// Direct to a fix outside of the plan
    Fix(Waypoint),
}

#[derive(PartialEq, Debug, Copy, Clone, Default, Serialize)]
pub struct Obs {
    pub enabled: bool,
    /// Pilot selected course in deg
    pub course: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct FlightPlan {
    waypoints: Vec<Waypoint>,
    active: usize,
    direct_to: Option<DirectTo>,
    obs: Obs,
}

impl FlightPlan {
    /// Builds a plan from `waypoints`, see `replace`
    pub fn new(waypoints: Vec<Waypoint>) -> Result<Self> {
        let mut plan = FlightPlan {
            waypoints: Vec::new(),
            active: 0,
            direct_to: None,
            obs: Obs::default(),
        };
        plan.replace(waypoints)?;

        Ok(plan)
    }

    /// Salinas to Monterey, the plan the simulator flies when nothing else is loaded
    pub fn demo() -> Self {
        use self::WaypointKind::*;

        let waypoints = vec![
            Waypoint::new("KSNS", Airport, 36.6628, -121.6064).with_altitude(137),
            Waypoint::new("MANNA", Fix, 36.7200, -121.7100).with_altitude(3000),
            Waypoint::new("GIPVY", Fix, 36.7600, -121.8200).with_altitude(3000),
            Waypoint::new("JELCO", Fix, 36.7900, -121.8700).with_altitude(2500),
            Waypoint::new("SISGY", Fix, 36.8100, -121.9000).with_altitude(2000),
            Waypoint::new("RW31", Fix, 36.5700, -121.8400).with_altitude(1500),
            Waypoint::new("MAFAF", Fix, 36.5900, -121.8600).with_altitude(500),
            Waypoint::new("KMRY", Airport, 36.5870, -121.8430).with_altitude(257),
        ];

        let mut plan = FlightPlan {
            waypoints,
            active: 0,
            direct_to: None,
            obs: Obs::default(),
        };
        plan.compute_legs();
        plan.mark_active(0);

        plan
    }

    /// Loads a plan file, see `read_waypoints`
    pub fn load(path: &Path) -> Result<Self> {
        FlightPlan::new(read_waypoints(path)?)
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        &self.waypoints
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Waypoint the active leg flies to
    pub fn active_waypoint(&self) -> &Waypoint {
        &self.waypoints[self.active]
    }

    /// Waypoint the active leg starts from
    pub fn from_waypoint(&self) -> &Waypoint {
        &self.waypoints[self.active.saturating_sub(1)]
    }

    pub fn direct_to(&self) -> Option<&DirectTo> {
        self.direct_to.as_ref()
    }

    pub fn direct_to_waypoint(&self) -> Option<&Waypoint> {
        match self.direct_to {
            Some(DirectTo::Planned(i)) => self.waypoints.get(i),
            Some(DirectTo::Fix(ref w)) => Some(w),
            None => None,
        }
    }

    pub fn obs(&self) -> Obs {
        self.obs
    }

    pub fn find(&self, ident: &str) -> Option<usize> {
        self.waypoints.iter().position(|w| w.ident == ident)
    }

    /// Sum of all leg distances, does not change as the flight progresses
    pub fn total_distance(&self) -> f64 {
        self.waypoints.iter().map(|w| w.distance).sum()
    }

    /// Sum of the legs following waypoint `index`
    pub fn distance_after(&self, index: usize) -> f64 {
        self.waypoints.iter().skip(index + 1).map(|w| w.distance).sum()
    }

    pub fn set_active_waypoint(&mut self, index: usize) -> Result<()> {
        if index >= self.waypoints.len() {
            return Err(Error::OutOfRange {
                index,
                len: self.waypoints.len(),
            });
        }

        self.mark_active(index);
        debug!("active leg now {} ({})", index, self.waypoints[index].ident);

        Ok(())
    }

    /// Replaces the whole sequence. Coordinates are authoritative, DTK and
    /// distances are always recomputed.
    pub fn replace(&mut self, waypoints: Vec<Waypoint>) -> Result<()> {
        if waypoints.is_empty() {
            return Err(invalid_plan("a plan needs at least 1 waypoint"));
        }

        {
            let mut seen = HashSet::with_capacity(waypoints.len());
            for w in &waypoints {
                if !seen.insert(w.ident.as_str()) {
                    return Err(invalid_plan(format!("duplicate waypoint {}", w.ident)));
                }
            }
        }

        self.waypoints = waypoints;
        self.direct_to = None;
        self.compute_legs();
        self.mark_active(0);

        Ok(())
    }

    pub fn activate_direct_to(&mut self, ident: &str) -> Result<()> {
        let index = self
            .find(ident)
            .ok_or_else(|| Error::UnknownWaypoint(ident.to_string()))?;

        info!("direct to {}", ident);
        self.direct_to = Some(DirectTo::Planned(index));

        Ok(())
    }

    pub fn activate_direct_to_fix(&mut self, fix: Waypoint) {
        info!("direct to off plan fix {}", fix.ident);
        self.direct_to = Some(DirectTo::Fix(fix));
    }

    pub fn cancel_direct_to(&mut self) {
        self.direct_to = None;
    }

    pub fn set_obs_mode(&mut self, on: bool) {
        self.obs.enabled = on;
    }

    pub fn set_obs_course(&mut self, course: f64) {
        self.obs.course = course.rem_euclid(360.0);
    }

    fn mark_active(&mut self, index: usize) {
        for (i, w) in self.waypoints.iter_mut().enumerate() {
            w.active = i == index;
        }
        self.active = index;
    }

    fn compute_legs(&mut self) {
        if let Some(first) = self.waypoints.first_mut() {
            first.dtk = 0.0;
            first.distance = 0.0;
            first.ete = 0.0;
        }

        for i in 1..self.waypoints.len() {
            let prev = self.waypoints[i - 1].position;
            let cur = &mut self.waypoints[i];

            cur.distance = prev.distance_nm(&cur.position);
            cur.dtk = if cur.distance > 0.0 {
                prev.bearing_deg(&cur.position)
            } else {
                0.0
            };
            cur.ete = cur.distance / PLANNING_GS_KTS * 3600.0;
        }
    }
}

/// Reads the waypoints of a plan file, picking the format by extension
pub fn read_waypoints(path: &Path) -> Result<Vec<Waypoint>> {
    let content = std::fs::read_to_string(path)?;
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    let waypoints = match ext.as_deref() {
        Some("fpl") | Some("xml") => fpl::parse(&content)?,
        Some("txt") | Some("csv") => text::parse(&content)?.waypoints,
        _ => match fpl::parse(&content) {
            Ok(w) => w,
            Err(e) => {
                debug!("not a Garmin FPL ({}), trying text format", e);
                text::parse(&content)?.waypoints
            }
        },
    };

    info!("loaded {} waypoints from {}", waypoints.len(), path.display());
    Ok(waypoints)
}

/// Per leg ETE as `M:SS` at an arbitrary ground speed
pub fn leg_ete(distance: f64, gs: f64) -> Option<String> {
    if gs > 0.0 {
        Some(format_minutes(distance / gs * 60.0))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three() -> Vec<Waypoint> {
        vec![
            Waypoint::new("A", WaypointKind::Fix, 0.0, 0.0),
            Waypoint::new("B", WaypointKind::Fix, 0.0, 1.0),
            Waypoint::new("C", WaypointKind::Vor, 1.0, 1.0).with_altitude(5000),
        ]
    }

    #[test]
    fn test_replace_computes_legs() {
        let plan = FlightPlan::new(three()).unwrap();
        let w = plan.waypoints();

        assert_eq!(w[0].distance, 0.0);
        assert!((w[1].dtk - 90.0).abs() < 1e-9);
        assert!((w[1].distance - 60.04).abs() < 0.01);
        assert!(w[2].dtk.abs() < 1e-9 || (w[2].dtk - 360.0).abs() < 1e-9);
        assert_eq!(w[1].ete_display(), "30:01");
        assert_eq!(plan.active_index(), 0);
        assert!(w[0].active);
    }

    #[test]
    fn test_imported_legs_not_trusted() {
        let mut bogus = three();
        bogus[1].dtk = 270.0;
        bogus[1].distance = 999.0;

        let plan = FlightPlan::new(bogus).unwrap();
        assert!((plan.waypoints()[1].dtk - 90.0).abs() < 1e-9);
        assert!(plan.waypoints()[1].distance < 61.0);
    }

    #[test]
    fn test_replace_rejects() {
        let mut plan = FlightPlan::new(three()).unwrap();
        plan.set_active_waypoint(2).unwrap();

        assert!(matches!(plan.replace(vec![]), Err(Error::InvalidPlan(_))));

        let mut dup = three();
        dup[2].ident = "A".to_string();
        assert!(matches!(plan.replace(dup), Err(Error::InvalidPlan(_))));

        // nothing applied
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.active_index(), 2);
    }

    #[test]
    fn test_set_active_waypoint() {
        let mut plan = FlightPlan::new(three()).unwrap();

        plan.set_active_waypoint(1).unwrap();
        assert_eq!(plan.active_index(), 1);
        assert_eq!(plan.waypoints().iter().filter(|w| w.active).count(), 1);
        assert!(plan.waypoints()[1].active);
        assert_eq!(plan.from_waypoint().ident, "A");
        assert_eq!(plan.active_waypoint().ident, "B");

        match plan.set_active_waypoint(3) {
            Err(Error::OutOfRange { index: 3, len: 3 }) => {}
            r => panic!("unexpected {:?}", r),
        }
        assert_eq!(plan.active_index(), 1);
        assert!(plan.waypoints()[1].active);
    }

    #[test]
    fn test_direct_to_is_an_override() {
        let mut plan = FlightPlan::new(three()).unwrap();
        plan.set_active_waypoint(1).unwrap();
        let before = plan.waypoints().to_vec();

        plan.activate_direct_to("C").unwrap();
        assert_eq!(plan.direct_to_waypoint().unwrap().ident, "C");
        assert_eq!(plan.waypoints(), &before[..]);
        assert_eq!(plan.active_index(), 1);

        assert!(matches!(
            plan.activate_direct_to("ZZZ"),
            Err(Error::UnknownWaypoint(_))
        ));
        // previous target survives a failed activation
        assert_eq!(plan.direct_to(), Some(&DirectTo::Planned(2)));

        plan.activate_direct_to_fix(Waypoint::new("KWVI", WaypointKind::Airport, 36.93, -121.79));
        assert_eq!(plan.direct_to_waypoint().unwrap().ident, "KWVI");

        plan.cancel_direct_to();
        assert!(plan.direct_to().is_none());
    }

    #[test]
    fn test_obs() {
        let mut plan = FlightPlan::demo();
        plan.set_obs_mode(true);
        plan.set_obs_course(-45.0);

        assert!(plan.obs().enabled);
        assert_eq!(plan.obs().course, 315.0);
    }

    #[test]
    fn test_distances() {
        let plan = FlightPlan::new(three()).unwrap();
        let total = plan.total_distance();

        assert!((total - (plan.waypoints()[1].distance + plan.waypoints()[2].distance)).abs() < 1e-12);
        assert_eq!(plan.distance_after(1), plan.waypoints()[2].distance);
        assert_eq!(plan.distance_after(2), 0.0);
    }

    #[test]
    fn test_demo_plan() {
        let plan = FlightPlan::demo();

        assert_eq!(plan.len(), 8);
        assert_eq!(plan.waypoints()[0].ident, "KSNS");
        assert_eq!(plan.waypoints()[7].kind, WaypointKind::Airport);
        assert!(plan.total_distance() > 30.0);
    }

    #[test]
    fn test_leg_ete() {
        assert_eq!(leg_ete(12.0, 120.0).unwrap(), "6:00");
        assert!(leg_ete(12.0, 0.0).is_none());
    }
}
