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

//! Plain text flight plans, one `IDENT,LAT,LNG[,ALT]` row per line

use super::{Waypoint, WaypointKind};
use crate::errors::{invalid_plan, Result};
use nom::{
    bytes::complete::take_while1,
    character::complete::i32 as altitude,
    combinator::{all_consuming, opt, verify},
    number::complete::double,
    sequence::{preceded, tuple},
    IResult,
};

#[derive(Debug, PartialEq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: String,
}

#[derive(Debug)]
pub struct TextImport {
    pub waypoints: Vec<Waypoint>,
    pub skipped: Vec<SkippedRow>,
}

fn separator(i: &str) -> IResult<&str, &str> {
    verify(
        take_while1(|c: char| c == ',' || c == '\t' || c == ' '),
        |s: &str| s.contains(|c: char| c == ',' || c == '\t'),
    )(i)
}

fn ident(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_')(i)
}

fn row(i: &str) -> IResult<&str, (&str, f64, f64, Option<i32>)> {
    all_consuming(tuple((
        ident,
        preceded(separator, double),
        preceded(separator, double),
        opt(preceded(separator, altitude)),
    )))(i)
}

/// `K` followed by 2 or 3 letters
fn looks_like_airport(ident: &str) -> bool {
    let len = ident.len();
    ident.starts_with('K') && (3..=4).contains(&len) && ident.chars().all(|c| c.is_ascii_uppercase())
}

fn parse_row(line: &str) -> std::result::Result<Waypoint, String> {
    // trailing separators are tolerated
    let line = line.trim_end_matches(|c: char| c == ',' || c == '\t' || c == ' ');

    let (_, (id, lat, lng, alt)) = row(line).map_err(|e| format!("malformed row ({})", e))?;

    if !(-90.0..=90.0).contains(&lat) {
        return Err(format!("latitude {} out of range", lat));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(format!("longitude {} out of range", lng));
    }

    let id = id.to_ascii_uppercase();
    let kind = if looks_like_airport(&id) {
        WaypointKind::Airport
    } else {
        WaypointKind::Fix
    };

    let mut w = Waypoint::new(&id, kind, lat, lng);
    w.altitude = alt;

    Ok(w)
}

/// Parses every usable row. Bad rows are skipped and reported, the import
/// as a whole fails only when fewer than 2 waypoints survive.
pub fn parse(input: &str) -> Result<TextImport> {
    let mut waypoints = Vec::new();
    let mut skipped = Vec::new();

    for (n, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("//") {
            continue;
        }

        match parse_row(line) {
            Ok(w) => waypoints.push(w),
            Err(reason) => {
                warn!("skipping flight plan line {}: {}", n + 1, reason);
                skipped.push(SkippedRow { line: n + 1, reason });
            }
        }
    }

    if waypoints.len() < 2 {
        return Err(invalid_plan(format!(
            "text import needs at least 2 waypoints, got {}",
            waypoints.len()
        )));
    }

    Ok(TextImport { waypoints, skipped })
}

pub fn export(waypoints: &[Waypoint]) -> String {
    let mut out = String::new();

    for w in waypoints {
        // `{}` on f64 is the shortest representation that parses back to the same value
        out.push_str(&format!("{},{},{}", w.ident, w.position.lat, w.position.lng));
        if let Some(alt) = w.altitude {
            out.push_str(&format!(",{}", alt));
        }
        out.push('\n');
    }

    out
}
