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

pub mod handle;
pub mod input;

use self::handle::{BasicHandle, PushableHandle};
use crate::errors::Result;
use crate::plan::{read_waypoints, FlightPlan, Waypoint};
use crate::processor::{Processor, Report};
use crate::protocol::{Payload, Protocol};
use crate::sensor::{Sensor, SensorData, TelemetrySource};
use crate::transport::Transport;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::mpsc::Receiver;
use std::thread::sleep;
use std::time::{Duration, Instant};

/// Link state reported to displays every tick
#[derive(PartialEq, Debug, Copy, Clone, Serialize)]
pub struct Status {
    pub source: TelemetrySource,
    pub degraded: bool,
}

/// A discrete pilot input, applied between ticks.
///
/// On the wire: `{"action": "direct-to", "value": "KMRY"}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", content = "value", rename_all = "kebab-case")]
pub enum PilotAction {
    ActivateLeg(usize),
    ReplacePlan(Vec<Waypoint>),
    ImportPlan(PathBuf),
    DirectTo(String),
    DirectToFix(Waypoint),
    CancelDirectTo,
    SetObs(bool),
    SetObsCourse(f64),
}

#[derive(Default)]
struct Pipeline {
    telemetry: Option<Box<dyn Sensor>>,
    sensors: Vec<Box<dyn Sensor>>,
    processors: Vec<Box<dyn Processor>>,
    protocols: Vec<Box<dyn Protocol>>,
    transports: Vec<Box<dyn Transport>>,
    sensor_queue: VecDeque<SensorData>,
    report_queue: VecDeque<Report>,
    payload_queue: VecDeque<Payload>,
}

impl Pipeline {
    fn run_sensors(&mut self, h: &BasicHandle) {
        let mut handle = PushableHandle::new(h, &mut self.sensor_queue);

        if let Some(ref mut t) = self.telemetry {
            t.run(&mut handle);
        }

        for s in self.sensors.iter_mut() {
            s.run(&mut handle);
        }
    }

    fn run_processors(&mut self, h: &BasicHandle, status: Status) {
        let mut handle = PushableHandle::new(h, &mut self.report_queue);

        {
            let (first, second) = self.sensor_queue.as_slices();
            debug!("total {} sensor message to process", self.sensor_queue.len());
            trace!("{:?}", first);
            trace!("{:?}", second);

            for p in self.processors.iter_mut() {
                p.run(&mut handle, first.iter().chain(second));
            }
        }

        self.report_queue.push_back(Report::Status(status));
        self.sensor_queue.clear();
    }

    fn run_protocols(&mut self, h: &BasicHandle) {
        let mut handle = PushableHandle::new(h, &mut self.payload_queue);

        {
            let (first, second) = self.report_queue.as_slices();
            debug!("total {} report message to process", self.report_queue.len());
            trace!("{:?}", first);
            trace!("{:?}", second);

            for p in self.protocols.iter_mut() {
                p.run(&mut handle, first.iter().chain(second));
            }
        }

        self.report_queue.clear();
    }

    fn run_transports(&mut self, h: &BasicHandle) {
        {
            let (first, second) = self.payload_queue.as_slices();
            debug!("total {} payload message to process", self.payload_queue.len());

            for t in self.transports.iter_mut() {
                t.run(h, first.iter().chain(second));
            }
        }

        self.payload_queue.clear();
    }

    fn degraded(&self) -> bool {
        self.telemetry.iter().chain(self.sensors.iter()).any(|s| s.degraded())
    }

    /// Forget everything derived from the previous telemetry source
    fn reset(&mut self) {
        self.sensor_queue.clear();
        self.report_queue.clear();
        self.payload_queue.clear();

        for p in self.processors.iter_mut() {
            p.reset();
        }
    }
}

pub struct Cockpit {
    plan: FlightPlan,
    pipeline: Pipeline,
    source: TelemetrySource,
    actions: Option<Receiver<PilotAction>>,
    interval: Duration,
    frequency: u16,
}

impl Cockpit {
    pub fn new(freq: u16, plan: FlightPlan) -> Self {
        let freq = freq.max(1);

        Cockpit {
            plan,
            pipeline: Pipeline::default(),
            source: TelemetrySource::None,
            actions: None,
            interval: Duration::from_millis(1000 / u64::from(freq)),
            frequency: freq,
        }
    }

    pub fn link_sensor(&mut self, s: Box<dyn Sensor>) {
        self.pipeline.sensors.push(s);
    }

    pub fn link_processor(&mut self, p: Box<dyn Processor>) {
        self.pipeline.processors.push(p);
    }

    pub fn link_protocol(&mut self, p: Box<dyn Protocol>) {
        self.pipeline.protocols.push(p);
    }

    pub fn link_transport(&mut self, t: Box<dyn Transport>) {
        self.pipeline.transports.push(t);
    }

    /// Pilot actions received here are applied at the start of each tick
    pub fn link_actions(&mut self, rx: Receiver<PilotAction>) {
        self.actions = Some(rx);
    }

    /// Replaces the active telemetry source, dropping the previous one
    pub fn select_telemetry(&mut self, source: TelemetrySource, sensor: Box<dyn Sensor>) {
        info!("telemetry source {:?} -> {:?}", self.source, source);

        self.pipeline.telemetry = Some(sensor);
        self.pipeline.reset();
        self.source = source;
    }

    pub fn disconnect_telemetry(&mut self) {
        if self.pipeline.telemetry.take().is_some() {
            info!("telemetry source {:?} disconnected", self.source);
        }

        self.pipeline.reset();
        self.source = TelemetrySource::None;
    }

    pub fn source(&self) -> TelemetrySource {
        self.source
    }

    pub fn plan(&self) -> &FlightPlan {
        &self.plan
    }

    pub fn status(&self) -> Status {
        Status {
            source: self.source,
            degraded: self.pipeline.degraded(),
        }
    }

    pub fn apply(&mut self, action: PilotAction) -> Result<()> {
        debug!("pilot action {:?}", action);

        match action {
            PilotAction::ActivateLeg(i) => self.plan.set_active_waypoint(i),
            PilotAction::ReplacePlan(w) => self.plan.replace(w),
            PilotAction::ImportPlan(path) => self.plan.replace(read_waypoints(&path)?),
            PilotAction::DirectTo(ident) => self.plan.activate_direct_to(&ident),
            PilotAction::DirectToFix(fix) => {
                self.plan.activate_direct_to_fix(fix);
                Ok(())
            }
            PilotAction::CancelDirectTo => {
                self.plan.cancel_direct_to();
                Ok(())
            }
            PilotAction::SetObs(on) => {
                self.plan.set_obs_mode(on);
                Ok(())
            }
            PilotAction::SetObsCourse(c) => {
                self.plan.set_obs_course(c);
                Ok(())
            }
        }
    }

    fn apply_pending(&mut self) {
        let pending: Vec<PilotAction> = match self.actions {
            Some(ref rx) => rx.try_iter().collect(),
            None => return,
        };

        for action in pending {
            if let Err(e) = self.apply(action) {
                warn!("pilot action rejected: {}", e);
            }
        }
    }

    /// Moves the active leg to the one the telemetry source reports flying
    fn follow_active_leg(&mut self) {
        let reported = self.pipeline.sensor_queue.iter().rev().find_map(|d| match *d {
            SensorData::ActiveLeg(i) => Some(i),
            _ => None,
        });

        if let Some(i) = reported {
            if i != self.plan.active_index() {
                if let Err(e) = self.plan.set_active_waypoint(i) {
                    warn!("ignoring reported leg: {}", e);
                }
            }
        }
    }

    /// One pass of every stage at `utc`
    pub fn tick(&mut self, utc: DateTime<Utc>) {
        self.apply_pending();

        {
            let handle = BasicHandle::at(utc, self.frequency, &self.plan);
            self.pipeline.run_sensors(&handle);
        }

        self.follow_active_leg();

        let status = self.status();
        let handle = BasicHandle::at(utc, self.frequency, &self.plan);

        self.pipeline.run_processors(&handle, status);
        self.pipeline.run_protocols(&handle);
        self.pipeline.run_transports(&handle);
    }

    pub fn run(&mut self) {
        loop {
            // main event loop
            let before = Instant::now();

            self.tick(Utc::now());

            let elapsed = before.elapsed();

            if elapsed < self.interval {
                sleep(self.interval - elapsed);
            } else {
                warn!("loop unable to keep up with the set frequency");
            }
        }
    }
}

impl Default for Cockpit {
    fn default() -> Cockpit {
        Cockpit::new(2, FlightPlan::demo())
    }
}
