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

//! Newline delimited JSON for display clients, one object per report.
//!
//! Trip summaries are large and already a second stale, so they are marked
//! queueable and may trail the live reports.

use super::*;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Default)]
pub struct Json;

impl Json {
    pub fn new() -> Box<Self> {
        Box::new(Json)
    }

    fn encode<T: Serialize>(&self, kind: &str, r: &T, queueable: bool) -> Option<Payload> {
        let mut js = match serde_json::to_value(r) {
            Ok(js) => js,
            Err(e) => {
                error!("unable to serialize {} report: {}", kind, e);
                return None;
            }
        };

        if let Value::Object(ref mut m) = js {
            m.insert("type".to_string(), kind.into());
        } else {
            js = json!({ "type": kind, "value": js });
        }

        let mut payload = js.to_string().into_bytes();
        payload.push(b'\n');

        Some(Payload {
            queueable,
            payload,
        })
    }
}

impl Protocol for Json {
    fn run(&mut self, handle: &mut dyn Pushable<Payload>, i: ChainedIter) {
        for r in i {
            let p = match *r {
                Report::Aircraft(ref a) => self.encode("Aircraft", a, false),
                Report::Navigation(ref n) => self.encode("Navigation", n, false),
                Report::Fuel(ref f) => self.encode("Fuel", f, false),
                Report::Vnav(ref v) => self.encode("Vnav", v, false),
                Report::Wind(ref w) => self.encode("Wind", w, false),
                Report::Trip(ref t) => self.encode("Trip", t, true),
                Report::Status(ref s) => self.encode("Status", s, false),
            };

            if let Some(p) = p {
                handle.push_data(p);
            }
        }
    }
}
