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

//! Startup configuration, a JSON file in which every field is optional.

use crate::errors::Result;
use crate::processor::vnav::VnavSettings;
use crate::processor::wind::{Runway, RunwayCondition, WindObservation};
use crate::sensor::TelemetrySource;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(PartialEq, Debug, Clone, Deserialize)]
pub struct RunwayConfig {
    /// Both ends, e.g. `10R/28L`
    pub designator: String,
    #[serde(default)]
    pub condition: RunwayCondition,
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirportConfig {
    pub station: String,
    pub runways: Vec<RunwayConfig>,
}

impl Default for AirportConfig {
    fn default() -> Self {
        AirportConfig {
            station: "KMRY".to_string(),
            runways: vec![RunwayConfig {
                designator: "10R/28L".to_string(),
                condition: RunwayCondition::Dry,
            }],
        }
    }
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Observations written by an external fetcher, polling is off without one
    pub file: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub fallback: WindObservation,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        WeatherConfig {
            file: None,
            poll_interval_secs: 300,
            fallback: WindObservation {
                direction: 310.0,
                speed: 12.0,
                gust: None,
            },
        }
    }
}

impl WeatherConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[derive(PartialEq, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Loop frequency in Hz
    pub frequency: u16,
    pub telemetry: TelemetrySource,
    /// Seed for the synthetic telemetry, OS entropy when absent
    pub seed: Option<u64>,
    pub plan_file: Option<PathBuf>,
    pub preferences_file: PathBuf,
    pub airport: AirportConfig,
    pub weather: WeatherConfig,
    /// Display endpoints, output goes to stdout when empty
    pub displays: Vec<SocketAddr>,
    pub vnav: VnavSettings,
    /// Planning ground speed in kts when telemetry has none
    pub manual_gs: f64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            frequency: 2,
            telemetry: TelemetrySource::default(),
            seed: None,
            plan_file: None,
            preferences_file: PathBuf::from("simglass-preferences.json"),
            airport: AirportConfig::default(),
            weather: WeatherConfig::default(),
            displays: vec![],
            vnav: VnavSettings::default(),
            manual_gs: 120.0,
        }
    }
}

impl Config {
    /// Defaults when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => return Ok(Config::default()),
        };

        let c: Config = serde_json::from_str(&fs::read_to_string(path)?)?;
        info!("loaded configuration from {}", path.display());

        Ok(c)
    }

    pub fn runways(&self) -> Result<Vec<(Runway, RunwayCondition)>> {
        self.airport
            .runways
            .iter()
            .map(|r| Ok((Runway::parse(&r.designator)?, r.condition)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let c = Config::load(None).unwrap();

        assert_eq!(c.frequency, 2);
        assert_eq!(c.telemetry, TelemetrySource::Synthetic);
        assert_eq!(c.weather.poll_interval(), Duration::from_secs(300));

        let r = c.runways().unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r[0].0.name(), "10R/28L");
    }

    #[test]
    fn test_partial_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{
                "telemetry": "external",
                "displays": ["127.0.0.1:4000"],
                "airport": {{"station": "KSNS", "runways": [{{"designator": "13/31", "condition": "wet"}}]}},
                "vnav": {{"angle": 4.5}}
            }}"#
        )
        .unwrap();

        let c = Config::load(Some(f.path())).unwrap();

        assert_eq!(c.telemetry, TelemetrySource::External);
        assert_eq!(c.displays, vec!["127.0.0.1:4000".parse().unwrap()]);
        assert_eq!(c.airport.station, "KSNS");
        assert_eq!(c.airport.runways[0].condition, RunwayCondition::Wet);
        assert_eq!(c.vnav.angle, 4.5);
        assert_eq!(c.vnav.target_altitude, 3000.0);
        assert_eq!(c.manual_gs, 120.0);
    }

    #[test]
    fn test_errors() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"frequency": "fast"}}"#).unwrap();
        assert!(Config::load(Some(f.path())).is_err());

        let c = Config {
            airport: AirportConfig {
                station: "KMRY".to_string(),
                runways: vec![RunwayConfig {
                    designator: "XX".to_string(),
                    condition: RunwayCondition::Dry,
                }],
            },
            ..Default::default()
        };
        assert!(c.runways().is_err());
    }
}
