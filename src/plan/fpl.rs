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

//! Garmin `.fpl` flight plans.
//!
//! Only the XML subset these files use is understood: elements, attributes,
//! text, comments and the prolog. Anything structurally broken fails the
//! whole import.

use super::{Waypoint, WaypointKind};
use crate::errors::{invalid_plan, parse_error, Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use nom::{
    branch::alt,
    bytes::complete::{tag, take_until, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, opt, recognize, value, verify},
    multi::many0,
    sequence::{delimited, tuple},
    IResult,
};
use std::collections::HashMap;

const NAMESPACE: &str = "http://www8.garmin.com/xmlschemas/FlightPlan/v1";

#[derive(Debug, PartialEq, Default)]
struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    fn text(&self) -> &str {
        self.text.trim()
    }
}

enum Node {
    Child(Element),
    Text(String),
    Skip,
}

fn name(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.')(i)
}

fn quoted(i: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        delimited(char('\''), take_until("'"), char('\'')),
    ))(i)
}

fn attribute(i: &str) -> IResult<&str, ()> {
    value(
        (),
        tuple((multispace1, name, multispace0, char('='), multispace0, quoted)),
    )(i)
}

fn comment(i: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("<!--"), take_until("-->"), tag("-->"))))(i)
}

fn instruction(i: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("<?"), take_until("?>"), tag("?>"))))(i)
}

fn misc(i: &str) -> IResult<&str, ()> {
    value((), many0(alt((multispace1, comment, instruction))))(i)
}

fn unescape(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn content(i: &str) -> IResult<&str, Node> {
    alt((
        map(comment, |_| Node::Skip),
        map(element, Node::Child),
        map(take_while1(|c: char| c != '<'), |t: &str| Node::Text(unescape(t))),
    ))(i)
}

fn element(i: &str) -> IResult<&str, Element> {
    let (i, _) = char('<')(i)?;
    let (i, open) = name(i)?;
    let (i, _) = many0(attribute)(i)?;
    let (i, _) = multispace0(i)?;

    let mut e = Element {
        name: open.to_string(),
        ..Default::default()
    };

    let (i, empty) = opt(tag("/>"))(i)?;
    if empty.is_some() {
        return Ok((i, e));
    }

    let (i, _) = char('>')(i)?;
    let (i, nodes) = many0(content)(i)?;
    let (i, _) = tag("</")(i)?;
    let (i, _) = verify(name, |n: &str| n == open)(i)?;
    let (i, _) = multispace0(i)?;
    let (i, _) = char('>')(i)?;

    for n in nodes {
        match n {
            Node::Child(c) => e.children.push(c),
            Node::Text(t) => e.text.push_str(&t),
            Node::Skip => {}
        }
    }

    Ok((i, e))
}

fn document(i: &str) -> Result<Element> {
    let i = i.trim_start_matches('\u{feff}');

    all_consuming(delimited(misc, element, misc))(i)
        .map(|(_, root)| root)
        .map_err(|e| parse_error(format!("malformed XML: {}", e)))
}

fn kind_from_type(t: &str) -> WaypointKind {
    let t = t.to_ascii_uppercase();

    if t.contains("AIRPORT") {
        WaypointKind::Airport
    } else if t.contains("VOR") {
        WaypointKind::Vor
    } else if t.contains("NDB") {
        WaypointKind::Ndb
    } else if t.contains("USER") {
        WaypointKind::User
    } else {
        WaypointKind::Fix
    }
}

fn type_from_kind(k: WaypointKind) -> &'static str {
    match k {
        WaypointKind::Airport => "AIRPORT",
        WaypointKind::Vor => "VOR",
        WaypointKind::Ndb => "NDB",
        WaypointKind::Fix => "INT",
        WaypointKind::User => "USER WAYPOINT",
    }
}

fn coordinate(wp: &Element, field: &str) -> Result<f64> {
    let raw = wp
        .child(field)
        .ok_or_else(|| parse_error(format!("waypoint without <{}>", field)))?
        .text();

    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| parse_error(format!("bad <{}> value {:?}", field, raw)))
}

/// Returns the route as waypoints, in route order
pub fn parse(input: &str) -> Result<Vec<Waypoint>> {
    let root = document(input)?;
    if root.name != "flight-plan" {
        return Err(parse_error(format!("unexpected root element <{}>", root.name)));
    }

    let table = root
        .child("waypoint-table")
        .ok_or_else(|| parse_error("missing <waypoint-table>"))?;

    let mut lookup = HashMap::new();
    for wp in table.children("waypoint") {
        let ident = wp.child("identifier").map(|e| e.text()).unwrap_or_default();
        if ident.is_empty() {
            return Err(parse_error("waypoint without identifier"));
        }

        let kind = kind_from_type(wp.child("type").map(|e| e.text()).unwrap_or_default());
        let lat = coordinate(wp, "lat")?;
        let lng = coordinate(wp, "lon")?;

        lookup.insert(ident.to_string(), Waypoint::new(ident, kind, lat, lng));
    }

    let route = root
        .child("route")
        .ok_or_else(|| parse_error("missing <route>"))?;

    let mut waypoints = Vec::new();
    for rp in route.children("route-point") {
        let ident = rp
            .child("waypoint-identifier")
            .map(|e| e.text())
            .unwrap_or_default();

        let w = lookup
            .get(ident)
            .ok_or_else(|| Error::UnknownWaypoint(ident.to_string()))?;
        waypoints.push(w.clone());
    }

    if waypoints.len() < 2 {
        return Err(invalid_plan(format!(
            "route needs at least 2 points, got {}",
            waypoints.len()
        )));
    }

    debug!(
        "parsed FPL with {} table entries, {} route points",
        lookup.len(),
        waypoints.len()
    );

    Ok(waypoints)
}

pub fn export(waypoints: &[Waypoint], created: &DateTime<Utc>) -> String {
    let orig = waypoints.first().map_or("ORIG", |w| w.ident.as_str());
    let dest = waypoints.last().map_or("DEST", |w| w.ident.as_str());
    let mut out = String::new();

    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    out.push_str(&format!("<flight-plan xmlns=\"{}\">\n", NAMESPACE));
    out.push_str(&format!(
        "  <created>{}</created>\n",
        created.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));

    out.push_str("  <waypoint-table>\n");
    for w in waypoints {
        out.push_str("    <waypoint>\n");
        out.push_str(&format!("      <identifier>{}</identifier>\n", escape(&w.ident)));
        out.push_str(&format!("      <type>{}</type>\n", type_from_kind(w.kind)));
        out.push_str("      <country-code></country-code>\n");
        out.push_str(&format!("      <lat>{}</lat>\n", w.position.lat));
        out.push_str(&format!("      <lon>{}</lon>\n", w.position.lng));
        out.push_str("      <comment></comment>\n");
        out.push_str("    </waypoint>\n");
    }
    out.push_str("  </waypoint-table>\n");

    out.push_str("  <route>\n");
    out.push_str(&format!(
        "    <route-name>{} - {}</route-name>\n",
        escape(orig),
        escape(dest)
    ));
    for w in waypoints {
        out.push_str("    <route-point>\n");
        out.push_str(&format!(
            "      <waypoint-identifier>{}</waypoint-identifier>\n",
            escape(&w.ident)
        ));
        out.push_str(&format!(
            "      <waypoint-type>{}</waypoint-type>\n",
            type_from_kind(w.kind)
        ));
        out.push_str("      <waypoint-country-code></waypoint-country-code>\n");
        out.push_str("    </route-point>\n");
    }
    out.push_str("  </route>\n");
    out.push_str("</flight-plan>\n");

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::FlightPlan;
    use chrono::TimeZone;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<flight-plan xmlns="http://www8.garmin.com/xmlschemas/FlightPlan/v1">
  <!-- exported by hand -->
  <waypoint-table>
    <waypoint>
      <identifier>KSNS</identifier>
      <type>AIRPORT</type>
      <country-code>K2</country-code>
      <lat>36.662778</lat>
      <lon>-121.606389</lon>
      <comment/>
    </waypoint>
    <waypoint>
      <identifier>SNS</identifier>
      <type>VOR</type>
      <lat>36.664</lat>
      <lon>-121.603</lon>
    </waypoint>
    <waypoint>
      <identifier>MY POINT</identifier>
      <type>USER WAYPOINT</type>
      <lat>36.7</lat>
      <lon>-121.7</lon>
    </waypoint>
    <waypoint>
      <identifier>KMRY</identifier>
      <type>AIRPORT</type>
      <lat>36.587</lat>
      <lon>-121.843</lon>
    </waypoint>
  </waypoint-table>
  <route>
    <route-name>KSNS - KMRY</route-name>
    <route-point>
      <waypoint-identifier>KSNS</waypoint-identifier>
    </route-point>
    <route-point>
      <waypoint-identifier>MY POINT</waypoint-identifier>
    </route-point>
    <route-point>
      <waypoint-identifier>KMRY</waypoint-identifier>
    </route-point>
  </route>
</flight-plan>
"#;

    #[test]
    fn test_parse() {
        let w = parse(SAMPLE).unwrap();

        assert_eq!(w.len(), 3);
        assert_eq!(w[0].ident, "KSNS");
        assert_eq!(w[0].kind, WaypointKind::Airport);
        assert_eq!(w[0].position.lat, 36.662778);
        assert_eq!(w[1].ident, "MY POINT");
        assert_eq!(w[1].kind, WaypointKind::User);
        assert_eq!(w[2].position.lng, -121.843);
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(kind_from_type("airport"), WaypointKind::Airport);
        assert_eq!(kind_from_type("VOR-DME"), WaypointKind::Vor);
        assert_eq!(kind_from_type("NDB"), WaypointKind::Ndb);
        assert_eq!(kind_from_type("INT"), WaypointKind::Fix);
        assert_eq!(kind_from_type(""), WaypointKind::Fix);
    }

    #[test]
    fn test_malformed_fails_whole_import() {
        let truncated = &SAMPLE[..SAMPLE.len() / 2];
        assert!(matches!(parse(truncated), Err(Error::Parse(_))));

        let mismatched = SAMPLE.replace("</route>", "</rout>");
        assert!(matches!(parse(&mismatched), Err(Error::Parse(_))));

        assert!(matches!(parse("not xml at all"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_unknown_route_point() {
        let bad = SAMPLE.replace(
            "<waypoint-identifier>MY POINT</waypoint-identifier>",
            "<waypoint-identifier>NOWHERE</waypoint-identifier>",
        );

        match parse(&bad) {
            Err(Error::UnknownWaypoint(id)) => assert_eq!(id, "NOWHERE"),
            r => panic!("unexpected {:?}", r),
        }
    }

    #[test]
    fn test_missing_sections() {
        let no_route = r#"<flight-plan><waypoint-table></waypoint-table></flight-plan>"#;
        assert!(matches!(parse(no_route), Err(Error::Parse(_))));

        let one_point = r#"<flight-plan>
            <waypoint-table>
              <waypoint><identifier>A</identifier><lat>0</lat><lon>0</lon></waypoint>
            </waypoint-table>
            <route><route-point><waypoint-identifier>A</waypoint-identifier></route-point></route>
          </flight-plan>"#;
        assert!(matches!(parse(one_point), Err(Error::InvalidPlan(_))));
    }

    #[test]
    fn test_export_import() {
        let plan = FlightPlan::demo();
        let created = Utc.with_ymd_and_hms(2018, 3, 1, 17, 5, 0).unwrap();

        let xml = export(plan.waypoints(), &created);
        assert!(xml.contains("<route-name>KSNS - KMRY</route-name>"));
        assert!(xml.contains("<created>2018-03-01T17:05:00Z</created>"));
        assert!(xml.contains("<type>INT</type>"));

        let back = FlightPlan::new(parse(&xml).unwrap()).unwrap();
        assert_eq!(back.len(), plan.len());

        for (a, b) in plan.waypoints().iter().zip(back.waypoints()) {
            assert_eq!(a.ident, b.ident);
            assert_eq!(a.kind, b.kind);
            assert_eq!(a.position, b.position);
            assert_eq!(a.dtk, b.dtk);
            assert_eq!(a.distance, b.distance);
        }
    }
}
