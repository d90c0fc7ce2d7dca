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

use crate::plan::FlightPlan;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::time::Duration;

pub trait Handle {
    fn get_utc(&self) -> DateTime<Utc>;
    fn get_frequency(&self) -> u16;
    /// Read only view of the loaded flight plan
    fn get_plan(&self) -> &FlightPlan;

    /// Nominal time covered by one tick
    fn get_elapsed(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.get_frequency().max(1)))
    }
}

pub trait Pushable<D>: Handle {
    fn push_data(&mut self, d: D);
}

pub struct BasicHandle<'a> {
    utc: DateTime<Utc>,
    freq: u16,
    plan: &'a FlightPlan,
}

impl<'a> Handle for BasicHandle<'a> {
    fn get_utc(&self) -> DateTime<Utc> {
        self.utc
    }

    fn get_frequency(&self) -> u16 {
        self.freq
    }

    fn get_plan(&self) -> &FlightPlan {
        self.plan
    }
}

impl<'a> BasicHandle<'a> {
    pub fn new(freq: u16, plan: &'a FlightPlan) -> Self {
        Self::at(Utc::now(), freq, plan)
    }

    pub fn at(utc: DateTime<Utc>, freq: u16, plan: &'a FlightPlan) -> Self {
        Self {
            utc,
            freq,
            plan,
        }
    }
}

pub struct PushableHandle<'a, H, D>
where
    D: 'a,
    H: 'a + Handle,
{
    handle: &'a H,
    queue: &'a mut VecDeque<D>,
}

impl<'a, H, D> Handle for PushableHandle<'a, H, D>
where
    H: 'a + Handle,
{
    fn get_utc(&self) -> DateTime<Utc> {
        self.handle.get_utc()
    }

    fn get_frequency(&self) -> u16 {
        self.handle.get_frequency()
    }

    fn get_plan(&self) -> &FlightPlan {
        self.handle.get_plan()
    }
}

impl<'a, H, D> Pushable<D> for PushableHandle<'a, H, D>
where
    H: 'a + Handle,
{
    fn push_data(&mut self, d: D) {
        self.queue.push_back(d);
    }
}

impl<'a, H, D> PushableHandle<'a, H, D>
where
    H: 'a + Handle,
{
    pub fn new(handle: &'a H, queue: &'a mut VecDeque<D>) -> Self {
        Self { handle, queue }
    }
}
