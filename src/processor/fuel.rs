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

//! Fuel burn integration, endurance, range and destination reserve.

use super::*;
use crate::processor::navigation;
use crate::utils::{format_hours, UNKNOWN_TIME};
use std::time::Duration;

/// Reserve required at the destination, in hours at the current flow
const RESERVE_HOURS: f64 = 0.75;

#[derive(PartialEq, Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct FuelState {
    /// Quantity on board in lbs
    pub current: f64,
    /// Capacity in lbs
    pub max: f64,
    /// Flow in lbs per hour
    pub flow: f64,
}

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelLevel {
    Normal,
    Low,
    Critical,
}

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
pub struct DestinationFuel {
    pub to_destination: f64,
    pub at_destination: f64,
    /// 45 minutes at the current flow left on arrival
    pub reserve_ok: bool,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct FuelReport {
    pub state: FuelState,
    /// `H:MM`, or `--:--`
    pub endurance: String,
    /// nm
    pub range: f64,
    pub percent: Option<f64>,
    pub level: FuelLevel,
    pub destination: Option<DestinationFuel>,
}

impl FuelState {
    pub fn new(current: f64, max: f64, flow: f64) -> Self {
        FuelState { current, max, flow }
    }

    /// Never goes below empty
    pub fn burn(&mut self, elapsed: Duration) {
        if self.flow > 0.0 {
            self.current -= self.flow / 3600.0 * elapsed.as_secs_f64();
        }
        self.current = self.current.max(0.0);
    }

    pub fn endurance_hours(&self) -> Option<f64> {
        if self.flow > 0.0 && self.current > 0.0 {
            Some(self.current / self.flow)
        } else {
            None
        }
    }

    pub fn endurance(&self) -> String {
        self.endurance_hours()
            .map_or_else(|| UNKNOWN_TIME.to_string(), format_hours)
    }

    /// nm, 0 whenever endurance or ground speed is unknown
    pub fn range(&self, gs: f64) -> f64 {
        match self.endurance_hours() {
            Some(h) if gs > 0.0 => h * gs,
            _ => 0.0,
        }
    }

    pub fn percent(&self) -> Option<f64> {
        if self.max > 0.0 {
            Some(self.current / self.max * 100.0)
        } else {
            None
        }
    }

    pub fn level(&self) -> FuelLevel {
        match self.percent() {
            Some(p) if p < 10.0 => FuelLevel::Critical,
            Some(p) if p < 20.0 => FuelLevel::Low,
            Some(_) => FuelLevel::Normal,
            None => FuelLevel::Critical,
        }
    }

    pub fn destination(&self, distance_remaining: f64, gs: f64) -> Option<DestinationFuel> {
        if gs <= 0.0 {
            return None;
        }

        let to_destination = distance_remaining / gs * self.flow;
        let at_destination = (self.current - to_destination).max(0.0);

        Some(DestinationFuel {
            to_destination,
            at_destination,
            reserve_ok: at_destination > self.flow * RESERVE_HOURS,
        })
    }

    pub fn report(&self, aircraft: Option<&AircraftState>, distance_remaining: Option<f64>) -> FuelReport {
        let gs = aircraft.map_or(0.0, |a| a.gs);

        FuelReport {
            state: *self,
            endurance: self.endurance(),
            range: self.range(gs),
            percent: self.percent(),
            level: self.level(),
            destination: distance_remaining.and_then(|d| self.destination(d, gs)),
        }
    }
}

#[derive(Default)]
pub struct Fuel {
    state: Option<FuelState>,
    aircraft: Option<AircraftState>,
}

impl Processor for Fuel {
    fn run(&mut self, handle: &mut dyn Pushable<Report>, i: ChainedIter) {
        let mut fresh = false;

        for e in i {
            match *e {
                SensorData::Fuel(f) => {
                    self.state = Some(f);
                    fresh = true;
                }
                SensorData::Aircraft(a) => self.aircraft = Some(a),
                _ => {} // do nothing
            }
        }

        if let Some(ref mut s) = self.state {
            if !fresh {
                s.burn(handle.get_elapsed());
            }

            let remaining = self
                .aircraft
                .map(|a| navigation::compute(&a, handle.get_plan(), handle.get_utc()).distance_remaining);

            handle.push_data(Report::Fuel(s.report(self.aircraft.as_ref(), remaining)));
        }
    }

    fn reset(&mut self) {
        self.state = None;
        self.aircraft = None;
    }
}

impl Fuel {
    pub fn new() -> Box<dyn Processor> {
        Box::new(Fuel::default())
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;
    use crate::plan::FlightPlan;

    #[test]
    fn test_burn_never_negative() {
        let mut f = FuelState::new(1.0, 100.0, 3600.0);

        f.burn(Duration::from_millis(500));
        assert!((f.current - 0.5).abs() < 1e-9);

        for _ in 0..10 {
            f.burn(Duration::from_secs(1));
            assert!(f.current >= 0.0);
        }
        assert_eq!(f.current, 0.0);
    }

    #[test]
    fn test_endurance() {
        let f = FuelState::new(8200.0, 12000.0, 1800.0);
        assert_eq!(f.endurance(), "4:33");
        assert!((f.range(120.0) - 8200.0 / 1800.0 * 120.0).abs() < 1e-9);

        let no_flow = FuelState::new(8200.0, 12000.0, 0.0);
        assert_eq!(no_flow.endurance(), "--:--");
        assert_eq!(no_flow.range(120.0), 0.0);
    }

    #[test]
    fn test_empty_tank() {
        let f = FuelState::new(0.0, 100.0, 10.0);

        assert_eq!(f.endurance(), "--:--");
        assert_eq!(f.range(120.0), 0.0);
    }

    #[test]
    fn test_level() {
        assert_eq!(FuelState::new(50.0, 100.0, 1.0).level(), FuelLevel::Normal);
        assert_eq!(FuelState::new(15.0, 100.0, 1.0).level(), FuelLevel::Low);
        assert_eq!(FuelState::new(5.0, 100.0, 1.0).level(), FuelLevel::Critical);
        assert_eq!(FuelState::new(5.0, 0.0, 1.0).percent(), None);
    }

    #[test]
    fn test_destination() {
        let f = FuelState::new(1000.0, 2000.0, 600.0);

        // 1 hour out, 400 left, reserve is 450
        let d = f.destination(120.0, 120.0).unwrap();
        assert_eq!(d.to_destination, 600.0);
        assert_eq!(d.at_destination, 400.0);
        assert!(!d.reserve_ok);

        let d = f.destination(30.0, 120.0).unwrap();
        assert_eq!(d.at_destination, 850.0);
        assert!(d.reserve_ok);

        let d = f.destination(1200.0, 120.0).unwrap();
        assert_eq!(d.at_destination, 0.0);

        assert!(f.destination(30.0, 0.0).is_none());
    }

    #[test]
    fn test_processor_burns_between_readings() {
        let plan = FlightPlan::demo();
        let mut p = Fuel::default();

        assert!(run_once(&mut p, &plan, 2, vec![]).is_empty());

        let reading = FuelState::new(8200.0, 12000.0, 1800.0);
        let r = run_once(&mut p, &plan, 2, vec![SensorData::Fuel(reading)]);
        match r[0] {
            Report::Fuel(ref f) => assert_eq!(f.state.current, 8200.0),
            ref r => panic!("unexpected {:?}", r),
        }

        // half a second at 1800 lbs/h is 0.25 lbs
        let r = run_once(&mut p, &plan, 2, vec![]);
        match r[0] {
            Report::Fuel(ref f) => {
                assert!((f.state.current - 8199.75).abs() < 1e-9);
                assert!(f.destination.is_none());
            }
            ref r => panic!("unexpected {:?}", r),
        }

        p.reset();
        assert!(run_once(&mut p, &plan, 2, vec![]).is_empty());
    }
}
