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

//! Wind components, preferred runway selection and crosswind limits.

use super::*;
use crate::errors::{Error, Result};
use crate::sensor::weather::WindReport;

#[derive(PartialEq, Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct WindObservation {
    /// Direction the wind blows from, deg
    pub direction: f64,
    /// kts
    pub speed: f64,
    /// kts
    pub gust: Option<f64>,
}

#[derive(PartialEq, Eq, Debug, Default, Copy, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunwayCondition {
    #[default]
    Dry,
    Wet,
    Snow,
    Ice,
}

impl RunwayCondition {
    /// Multiplier applied to crosswind limits
    pub fn factor(self) -> f64 {
        match self {
            RunwayCondition::Dry => 1.0,
            RunwayCondition::Wet => 0.85,
            RunwayCondition::Snow => 0.65,
            RunwayCondition::Ice => 0.5,
        }
    }
}

#[derive(PartialEq, Eq, Debug, Copy, Clone, Serialize)]
pub enum Category {
    SE,
    ME,
    JET,
}

#[derive(PartialEq, Debug, Serialize)]
pub struct AircraftProfile {
    pub id: &'static str,
    pub name: &'static str,
    /// Demonstrated crosswind component, kts
    pub limit: f64,
    /// kts
    pub caution: f64,
    pub category: Category,
}

macro_rules! profile {
    ($id:expr, $name:expr, $limit:expr, $caution:expr, $cat:ident) => {
        AircraftProfile {
            id: $id,
            name: $name,
            limit: $limit,
            caution: $caution,
            category: Category::$cat,
        }
    };
}

pub static PROFILES: [AircraftProfile; 10] = [
    profile!("c172", "Cessna 172 Skyhawk", 15.0, 12.0, SE),
    profile!("c182", "Cessna 182 Skylane", 15.0, 12.0, SE),
    profile!("c152", "Cessna 152", 12.0, 9.0, SE),
    profile!("pa28", "Piper PA-28 Cherokee", 17.0, 14.0, SE),
    profile!("sr22", "Cirrus SR22", 20.0, 16.0, SE),
    profile!("be36", "Beechcraft Bonanza A36", 17.0, 14.0, SE),
    profile!("da40", "Diamond DA40", 20.0, 16.0, SE),
    profile!("be58", "Beechcraft Baron 58", 22.0, 18.0, ME),
    profile!("pa44", "Piper PA-44 Seminole", 17.0, 14.0, ME),
    profile!("c525", "Cessna Citation CJ2", 25.0, 20.0, JET),
];

/// Unknown ids fall back to the first profile
pub fn profile(id: &str) -> &'static AircraftProfile {
    PROFILES
        .iter()
        .find(|p| p.id.eq_ignore_ascii_case(id))
        .unwrap_or(&PROFILES[0])
}

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
pub struct WindComponents {
    /// Negative is a tailwind
    pub headwind: i32,
    /// Positive is from the right
    pub crosswind: i32,
}

pub fn components(direction: f64, speed: f64, runway_heading: f64) -> WindComponents {
    let angle = (direction - runway_heading).to_radians();

    WindComponents {
        headwind: (speed * angle.cos()).round() as i32,
        crosswind: (speed * angle.sin()).round() as i32,
    }
}

/// `28L` is 280 deg
pub fn designator_heading(designator: &str) -> Result<f64> {
    let d = designator.trim();
    let number = d.trim_end_matches(|c: char| matches!(c, 'L' | 'R' | 'C' | 'l' | 'r' | 'c'));

    // at most one side suffix
    if d.len() - number.len() > 1 || number.is_empty() || number.len() > 2 {
        return Err(Error::InvalidRunway(designator.to_string()));
    }

    match number.parse::<u8>() {
        Ok(n) if (1..=36).contains(&n) => Ok(f64::from(n) * 10.0),
        _ => Err(Error::InvalidRunway(designator.to_string())),
    }
}

/// A physical runway, both ends
#[derive(PartialEq, Debug, Clone)]
pub struct Runway {
    pub ends: [String; 2],
    pub headings: [f64; 2],
}

impl Runway {
    /// Parses `10R/28L`
    pub fn parse(s: &str) -> Result<Self> {
        let mut parts = s.split('/');

        match (parts.next(), parts.next(), parts.next()) {
            (Some(a), Some(b), None) => Ok(Runway {
                headings: [designator_heading(a)?, designator_heading(b)?],
                ends: [a.trim().to_ascii_uppercase(), b.trim().to_ascii_uppercase()],
            }),
            _ => Err(Error::InvalidRunway(s.to_string())),
        }
    }

    pub fn name(&self) -> String {
        format!("{}/{}", self.ends[0], self.ends[1])
    }

    /// End with the most headwind, the first one on a tie
    pub fn preferred_end(&self, wind_direction: f64) -> usize {
        let hw0 = (wind_direction - self.headings[0]).to_radians().cos();
        let hw1 = (wind_direction - self.headings[1]).to_radians().cos();

        if hw0 >= hw1 {
            0
        } else {
            1
        }
    }
}

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CrosswindStatus {
    Nominal,
    Caution,
    Exceeded,
}

#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
pub struct Limits {
    pub limit: i32,
    pub caution: i32,
}

pub fn effective_limits(profile: &AircraftProfile, condition: RunwayCondition) -> Limits {
    Limits {
        limit: (profile.limit * condition.factor()).round() as i32,
        caution: (profile.caution * condition.factor()).round() as i32,
    }
}

pub fn classify(steady: i32, gust: Option<i32>, limits: &Limits) -> CrosswindStatus {
    let worst = gust.map_or(steady.abs(), |g| g.abs().max(steady.abs()));

    if worst > limits.limit {
        CrosswindStatus::Exceeded
    } else if worst > limits.caution {
        CrosswindStatus::Caution
    } else {
        CrosswindStatus::Nominal
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct RunwayAdvisory {
    pub runway: String,
    /// Preferred end
    pub end: String,
    pub heading: f64,
    pub condition: RunwayCondition,
    pub components: WindComponents,
    pub gust_crosswind: Option<i32>,
    pub limits: Limits,
    pub status: CrosswindStatus,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct WindAdvisory {
    pub station: String,
    pub wind: WindObservation,
    /// Wind is last known or simulated
    pub degraded: bool,
    pub aircraft: &'static str,
    pub runways: Vec<RunwayAdvisory>,
}

pub fn advise(
    wind: &WindObservation,
    runways: &[(Runway, RunwayCondition)],
    profile: &AircraftProfile,
) -> Vec<RunwayAdvisory> {
    runways
        .iter()
        .map(|&(ref rw, condition)| {
            let end = rw.preferred_end(wind.direction);
            let heading = rw.headings[end];
            let steady = components(wind.direction, wind.speed, heading);
            let gust_crosswind = wind.gust.map(|g| components(wind.direction, g, heading).crosswind);
            let limits = effective_limits(profile, condition);

            RunwayAdvisory {
                runway: rw.name(),
                end: rw.ends[end].clone(),
                heading,
                condition,
                components: steady,
                gust_crosswind,
                status: classify(steady.crosswind, gust_crosswind, &limits),
                limits,
            }
        })
        .collect()
}

pub struct Wind {
    profile: &'static AircraftProfile,
    runways: Vec<(Runway, RunwayCondition)>,
    last: Option<WindAdvisory>,
    counter: u32,
}

impl Processor for Wind {
    fn run(&mut self, handle: &mut dyn Pushable<Report>, i: ChainedIter) {
        let mut fresh = false;

        for e in i {
            if let SensorData::Wind(WindReport {
                ref station,
                ref wind,
                origin,
                ..
            }) = *e
            {
                self.last = Some(WindAdvisory {
                    station: station.clone(),
                    wind: *wind,
                    degraded: origin.is_degraded(),
                    aircraft: self.profile.id,
                    runways: advise(wind, &self.runways, self.profile),
                });
                fresh = true;
            }
        }

        if let Some(ref a) = self.last {
            if fresh {
                handle.push_data(Report::Wind(a.clone()));
                self.counter = 0;
            } else {
                run_every!(1, self.counter, handle, {
                    handle.push_data(Report::Wind(a.clone()));
                });
            }
        }
    }

    fn reset(&mut self) {
        self.last = None;
        self.counter = 0;
    }
}

impl Wind {
    pub fn new(aircraft: &str, runways: Vec<(Runway, RunwayCondition)>) -> Box<dyn Processor> {
        let profile = profile(aircraft);
        if !profile.id.eq_ignore_ascii_case(aircraft) {
            warn!("unknown aircraft type {}, using {}", aircraft, profile.id);
        }

        Box::new(Wind {
            profile,
            runways,
            last: None,
            counter: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;
    use crate::plan::FlightPlan;
    use crate::sensor::weather::WindOrigin;

    #[test]
    fn test_components_scenario() {
        let c = components(270.0, 20.0, 280.0);

        assert_eq!(c.headwind, 20);
        assert_eq!(c.crosswind, -3);
    }

    #[test]
    fn test_components_magnitude() {
        for dir in (0..360).step_by(15) {
            for rwy in (10..=360).step_by(50) {
                let c = components(dir as f64, 25.0, rwy as f64);
                let m = (f64::from(c.headwind).powi(2) + f64::from(c.crosswind).powi(2)).sqrt();
                assert!((m - 25.0).abs() <= 0.75, "{} {} {:?}", dir, rwy, c);
            }
        }
    }

    #[test]
    fn test_crosswind_side() {
        assert!(components(310.0, 10.0, 280.0).crosswind > 0);
        assert!(components(250.0, 10.0, 280.0).crosswind < 0);
        assert!(components(280.0, 10.0, 280.0).crosswind == 0);
    }

    #[test]
    fn test_designators() {
        assert_eq!(designator_heading("28L").unwrap(), 280.0);
        assert_eq!(designator_heading("01R").unwrap(), 10.0);
        assert_eq!(designator_heading("9").unwrap(), 90.0);
        assert_eq!(designator_heading("36C").unwrap(), 360.0);
        assert!(designator_heading("37").is_err());
        assert!(designator_heading("0").is_err());
        assert!(designator_heading("28LR").is_err());
        assert!(designator_heading("X").is_err());

        let r = Runway::parse("10R/28L").unwrap();
        assert_eq!(r.headings, [100.0, 280.0]);
        assert_eq!(r.name(), "10R/28L");
        assert!(Runway::parse("10R").is_err());
    }

    #[test]
    fn test_preferred_end() {
        let r = Runway::parse("10R/28L").unwrap();

        assert_eq!(r.preferred_end(310.0), 1);
        assert_eq!(r.preferred_end(90.0), 0);
        // direct crosswind is a tie
        assert_eq!(r.preferred_end(10.0), 0);
    }

    #[test]
    fn test_effective_limits() {
        let c172 = profile("c172");

        assert_eq!(effective_limits(c172, RunwayCondition::Dry), Limits { limit: 15, caution: 12 });
        assert_eq!(effective_limits(c172, RunwayCondition::Wet), Limits { limit: 13, caution: 10 });
        assert_eq!(effective_limits(c172, RunwayCondition::Ice), Limits { limit: 8, caution: 6 });

        for p in PROFILES.iter() {
            assert!(
                effective_limits(p, RunwayCondition::Ice).limit
                    <= effective_limits(p, RunwayCondition::Dry).limit
            );
        }
    }

    #[test]
    fn test_profile_fallback() {
        assert_eq!(profile("SR22").limit, 20.0);
        assert_eq!(profile("b747").id, "c172");
    }

    #[test]
    fn test_classify() {
        let l = Limits { limit: 15, caution: 12 };

        assert_eq!(classify(10, None, &l), CrosswindStatus::Nominal);
        assert_eq!(classify(-13, None, &l), CrosswindStatus::Caution);
        assert_eq!(classify(15, None, &l), CrosswindStatus::Caution);
        assert_eq!(classify(-16, None, &l), CrosswindStatus::Exceeded);
        assert_eq!(classify(10, Some(16), &l), CrosswindStatus::Exceeded);
        assert_eq!(classify(10, Some(13), &l), CrosswindStatus::Caution);
        assert_eq!(classify(12, Some(12), &l), CrosswindStatus::Nominal);
    }

    #[test]
    fn test_advise() {
        let wind = WindObservation {
            direction: 190.0,
            speed: 20.0,
            gust: Some(30.0),
        };
        let runways = vec![
            (Runway::parse("10R/28L").unwrap(), RunwayCondition::Dry),
            (Runway::parse("10L/28R").unwrap(), RunwayCondition::Wet),
        ];

        let a = advise(&wind, &runways, profile("c172"));

        assert_eq!(a.len(), 2);
        assert_eq!(a[0].end, "10R");
        // 90 deg off, all crosswind from the right
        assert_eq!(a[0].components.crosswind, 20);
        assert_eq!(a[0].gust_crosswind, Some(30));
        assert_eq!(a[0].status, CrosswindStatus::Exceeded);
        assert_eq!(a[1].limits.limit, 13);
    }

    #[test]
    fn test_processor() {
        let plan = FlightPlan::demo();
        let mut p = Wind::new("c172", vec![(Runway::parse("10R/28L").unwrap(), RunwayCondition::Dry)]);

        let report = WindReport {
            station: "KMRY".to_string(),
            wind: WindObservation {
                direction: 310.0,
                speed: 12.0,
                gust: None,
            },
            observed: noon(),
            origin: WindOrigin::Simulated,
        };

        let r = run_once(p.as_mut(), &plan, 2, vec![SensorData::Wind(report)]);
        match r[0] {
            Report::Wind(ref a) => {
                assert!(a.degraded);
                assert_eq!(a.runways[0].end, "28L");
                assert_eq!(a.runways[0].status, CrosswindStatus::Nominal);
            }
            ref r => panic!("unexpected {:?}", r),
        }

        // republished once a second
        assert!(run_once(p.as_mut(), &plan, 2, vec![]).is_empty());
        assert_eq!(run_once(p.as_mut(), &plan, 2, vec![]).len(), 1);
    }
}
