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

//! Wind observations for one station, polled on a background thread.
//!
//! Failures never reach the computation layer: the last known observation,
//! or a simulated one, is served instead and the sensor reports itself
//! degraded until the provider recovers.

use super::{Sensor, SensorData};
use crate::cockpit::handle::Pushable;
use crate::errors::{parse_error, Error, Result};
use crate::processor::wind::WindObservation;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::thread::{sleep, spawn, JoinHandle};
use std::time::Duration;

#[derive(PartialEq, Eq, Debug, Copy, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WindOrigin {
    Live,
    LastKnown,
    Simulated,
}

impl WindOrigin {
    pub fn is_degraded(self) -> bool {
        self != WindOrigin::Live
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct WindReport {
    pub station: String,
    pub wind: WindObservation,
    pub observed: DateTime<Utc>,
    pub origin: WindOrigin,
}

#[derive(PartialEq, Debug, Copy, Clone)]
pub struct Observation {
    pub wind: WindObservation,
    pub observed: DateTime<Utc>,
}

pub trait WeatherProvider: Send {
    fn observe(&mut self, station: &str) -> Result<Observation>;
}

#[derive(Deserialize)]
struct StationEntry {
    direction: f64,
    speed: f64,
    gust: Option<f64>,
    /// RFC 3339, the file modification time when absent
    observed: Option<String>,
}

/// Reads a JSON object of `{ "STATION": { direction, speed, gust?, observed? } }`
/// kept up to date by an external fetcher
pub struct JsonFileWeather {
    path: PathBuf,
}

impl JsonFileWeather {
    pub fn new(path: PathBuf) -> Self {
        JsonFileWeather { path }
    }
}

impl WeatherProvider for JsonFileWeather {
    fn observe(&mut self, station: &str) -> Result<Observation> {
        let content = fs::read_to_string(&self.path)?;
        let mut stations: HashMap<String, StationEntry> = serde_json::from_str(&content)?;

        let e = stations
            .remove(station)
            .ok_or_else(|| Error::WeatherUnavailable(station.to_string()))?;

        let observed = match e.observed {
            Some(ref s) => DateTime::parse_from_rfc3339(s)
                .map_err(|err| parse_error(format!("observation time {:?}: {}", s, err)))?
                .with_timezone(&Utc),
            None => DateTime::<Utc>::from(fs::metadata(&self.path)?.modified()?),
        };

        Ok(Observation {
            wind: WindObservation {
                direction: e.direction,
                speed: e.speed,
                gust: e.gust,
            },
            observed,
        })
    }
}

/// Decides what each poll result turns into
#[derive(Debug)]
pub struct WindMerger {
    station: String,
    fallback: WindObservation,
    last: Option<Observation>,
    degraded: bool,
}

impl WindMerger {
    pub fn new(station: &str, fallback: WindObservation) -> Self {
        WindMerger {
            station: station.to_string(),
            fallback,
            last: None,
            degraded: false,
        }
    }

    pub fn degraded(&self) -> bool {
        self.degraded
    }

    fn report(&self, o: &Observation, origin: WindOrigin) -> WindReport {
        WindReport {
            station: self.station.clone(),
            wind: o.wind,
            observed: o.observed,
            origin,
        }
    }

    /// `None` when there is nothing new to publish
    pub fn apply(&mut self, poll: Result<Observation>, now: DateTime<Utc>) -> Option<WindReport> {
        match poll {
            Ok(o) => {
                if let Some(ref last) = self.last {
                    if o.observed < last.observed {
                        debug!("dropping {} observation older than the one applied", self.station);
                        return None;
                    }

                    if o.observed == last.observed && !self.degraded {
                        return None;
                    }
                }

                if self.degraded {
                    info!("weather for {} recovered", self.station);
                }

                self.degraded = false;
                self.last = Some(o);

                Some(self.report(&o, WindOrigin::Live))
            }
            Err(e) => {
                warn!("weather for {} unavailable: {}", self.station, e);
                self.degraded = true;

                Some(match self.last {
                    Some(ref o) => self.report(o, WindOrigin::LastKnown),
                    None => self.report(
                        &Observation {
                            wind: self.fallback,
                            observed: now,
                        },
                        WindOrigin::Simulated,
                    ),
                })
            }
        }
    }
}

pub struct WeatherSensor {
    rx: Receiver<Result<Observation>>,
    merger: WindMerger,
    disconnected: bool,
    _handle: JoinHandle<()>,
}

impl WeatherSensor {
    pub fn new(
        mut provider: Box<dyn WeatherProvider>,
        station: &str,
        fallback: WindObservation,
        interval: Duration,
    ) -> Box<Self> {
        let (tx, rx) = channel();
        let name = station.to_string();

        let handle = spawn(move || loop {
            let r = provider.observe(&name);

            if tx.send(r).is_err() {
                debug!("weather sensor dropped, stopping poll thread for {}", name);
                break;
            }

            sleep(interval);
        });

        info!("polling weather for {} every {:?}", station, interval);

        Box::new(WeatherSensor {
            rx,
            merger: WindMerger::new(station, fallback),
            disconnected: false,
            _handle: handle,
        })
    }
}

impl Sensor for WeatherSensor {
    fn run(&mut self, h: &mut dyn Pushable<SensorData>) {
        loop {
            let poll = match self.rx.try_recv() {
                Ok(r) => r,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.disconnected {
                        break;
                    }

                    error!("weather poll thread is gone");
                    self.disconnected = true;
                    Err(Error::WeatherUnavailable(self.merger.station.clone()))
                }
            };

            if let Some(r) = self.merger.apply(poll, h.get_utc()) {
                h.push_data(SensorData::Wind(r));
            }
        }
    }

    fn degraded(&self) -> bool {
        self.merger.degraded()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cockpit::handle::{BasicHandle, PushableHandle};
    use crate::plan::FlightPlan;
    use chrono::TimeZone;
    use std::collections::VecDeque;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use std::time::Instant;

    fn at(min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2018, 3, 1, 12, min, 0).unwrap()
    }

    fn obs(speed: f64, min: u32) -> Observation {
        Observation {
            wind: WindObservation {
                direction: 280.0,
                speed,
                gust: None,
            },
            observed: at(min),
        }
    }

    fn fallback() -> WindObservation {
        WindObservation {
            direction: 310.0,
            speed: 12.0,
            gust: None,
        }
    }

    fn unavailable() -> Result<Observation> {
        Err(Error::WeatherUnavailable("KMRY".to_string()))
    }

    #[test]
    fn test_simulated_before_first_observation() {
        let mut m = WindMerger::new("KMRY", fallback());
        let r = m.apply(unavailable(), at(5)).unwrap();

        assert_eq!(r.origin, WindOrigin::Simulated);
        assert_eq!(r.wind, fallback());
        assert_eq!(r.observed, at(5));
        assert!(m.degraded());
    }

    #[test]
    fn test_last_known_and_recovery() {
        let mut m = WindMerger::new("KMRY", fallback());

        let r = m.apply(Ok(obs(8.0, 0)), at(0)).unwrap();
        assert_eq!(r.origin, WindOrigin::Live);
        assert!(!m.degraded());

        let r = m.apply(unavailable(), at(1)).unwrap();
        assert_eq!(r.origin, WindOrigin::LastKnown);
        assert_eq!(r.wind.speed, 8.0);
        assert_eq!(r.observed, at(0));
        assert!(m.degraded());

        // same observation again, but the link is back
        let r = m.apply(Ok(obs(8.0, 0)), at(2)).unwrap();
        assert_eq!(r.origin, WindOrigin::Live);
        assert!(!m.degraded());
    }

    #[test]
    fn test_out_of_order_dropped() {
        let mut m = WindMerger::new("KMRY", fallback());

        m.apply(Ok(obs(8.0, 10)), at(10)).unwrap();
        assert!(m.apply(Ok(obs(20.0, 5)), at(11)).is_none());
        assert!(m.apply(Ok(obs(8.0, 10)), at(11)).is_none());

        let r = m.apply(Ok(obs(14.0, 15)), at(15)).unwrap();
        assert_eq!(r.wind.speed, 14.0);
    }

    #[test]
    fn test_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wind.json");
        let mut f = fs::File::create(&path).unwrap();
        write!(
            f,
            r#"{{
                "KMRY": {{ "direction": 300, "speed": 14, "gust": 22, "observed": "2018-03-01T11:56:00Z" }},
                "KSNS": {{ "direction": 290, "speed": 9 }}
            }}"#
        )
        .unwrap();
        drop(f);

        let mut p = JsonFileWeather::new(path.clone());

        let o = p.observe("KMRY").unwrap();
        assert_eq!(o.wind.gust, Some(22.0));
        assert_eq!(o.observed, Utc.with_ymd_and_hms(2018, 3, 1, 11, 56, 0).unwrap());

        assert_eq!(p.observe("KSNS").unwrap().wind.gust, None);
        assert!(matches!(p.observe("KSFO"), Err(Error::WeatherUnavailable(_))));

        let mut missing = JsonFileWeather::new(dir.path().join("nope.json"));
        assert!(matches!(missing.observe("KMRY"), Err(Error::Io(_))));
    }

    struct Scripted(Arc<Mutex<Vec<Result<Observation>>>>);

    impl WeatherProvider for Scripted {
        fn observe(&mut self, station: &str) -> Result<Observation> {
            self.0
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(Error::WeatherUnavailable(station.to_string())))
        }
    }

    #[test]
    fn test_sensor_degrades() {
        let script = Arc::new(Mutex::new(vec![unavailable()]));
        let mut s = WeatherSensor::new(
            Box::new(Scripted(script)),
            "KMRY",
            fallback(),
            Duration::from_millis(5),
        );

        let plan = FlightPlan::demo();
        let mut q = VecDeque::new();
        let deadline = Instant::now() + Duration::from_secs(5);

        while q.is_empty() && Instant::now() < deadline {
            let b = BasicHandle::new(10, &plan);
            let mut h = PushableHandle::new(&b, &mut q);
            s.run(&mut h);
            sleep(Duration::from_millis(5));
        }

        match q.front() {
            Some(SensorData::Wind(ref r)) => assert_eq!(r.origin, WindOrigin::Simulated),
            d => panic!("unexpected {:?}", d),
        }
        assert!(s.degraded());
    }
}
