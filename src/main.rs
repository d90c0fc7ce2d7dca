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

#[macro_use]
extern crate log;

use simglass::cockpit::{input, Cockpit};
use simglass::config::Config;
use simglass::errors::Result;
use simglass::plan::FlightPlan;
use simglass::preferences::Preferences;
use simglass::processor::{fuel::Fuel, navigation::Navigation, trip::Trip, vnav::Vnav, wind::Wind};
use simglass::protocol::json::Json;
use simglass::sensor::bridge::BridgeTelemetry;
use simglass::sensor::simulator::SyntheticTelemetry;
use simglass::sensor::weather::{JsonFileWeather, WeatherSensor};
use simglass::sensor::TelemetrySource;
use simglass::transport::{stream::Stream, udp::UDP};
use std::env;
use std::io;
use std::path::Path;
use std::process::exit;
use std::sync::mpsc::channel;
use std::thread::spawn;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        error!("{}", e);
        exit(1);
    }
}

fn run() -> Result<()> {
    let arg = env::args().nth(1);
    let config = Config::load(arg.as_deref().map(Path::new))?;
    let prefs = Preferences::load(&config.preferences_file)?;

    let plan = match config.plan_file {
        Some(ref p) => FlightPlan::load(p)?,
        None => FlightPlan::demo(),
    };

    let mut c = Cockpit::new(config.frequency, plan);

    if let Some(ref f) = config.weather.file {
        c.link_sensor(WeatherSensor::new(
            Box::new(JsonFileWeather::new(f.clone())),
            &config.airport.station,
            config.weather.fallback,
            config.weather.poll_interval(),
        ));
    }

    c.link_processor(Navigation::new());
    c.link_processor(Fuel::new());
    c.link_processor(Vnav::new(config.vnav));
    c.link_processor(Wind::new(prefs.aircraft_type(), config.runways()?));
    c.link_processor(Trip::new(config.manual_gs));

    c.link_protocol(Json::new());

    if config.displays.is_empty() {
        c.link_transport(Stream::stdout());
    } else {
        c.link_transport(UDP::new(config.displays.clone())?);
    }

    let (actions, rx) = channel();
    c.link_actions(rx);

    let bridge = match config.telemetry {
        TelemetrySource::None => {
            info!("telemetry disabled");
            None
        }
        TelemetrySource::Synthetic => {
            c.select_telemetry(TelemetrySource::Synthetic, SyntheticTelemetry::new(config.seed));
            None
        }
        TelemetrySource::External => {
            let (bridge, tx) = BridgeTelemetry::new();
            c.select_telemetry(TelemetrySource::External, bridge);
            Some(tx)
        }
    };

    // one JSON message per line
    spawn(move || input::forward(io::stdin().lock(), actions, bridge));

    if let Some(id) = prefs.pilot_id() {
        info!("pilot {}", id);
    }

    c.run();

    Ok(())
}
