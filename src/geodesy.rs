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

//! Great circle distance and bearing on a spherical earth.
//!
//! Bearing between identical points is undefined (`NaN`), callers must guard.

/// Earth radius in nautical miles
pub const EARTH_RADIUS_NM: f64 = 3440.065;

#[derive(PartialEq, Debug, Default, Copy, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in deg
    pub lat: f64,
    /// Longitude in deg
    pub lng: f64,
}

impl Position {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn distance_nm(&self, other: &Position) -> f64 {
        distance_nm(self.lat, self.lng, other.lat, other.lng)
    }

    pub fn bearing_deg(&self, other: &Position) -> f64 {
        bearing_deg(self.lat, self.lng, other.lat, other.lng)
    }

    /// Linear blend towards `other`, not a great circle interpolation
    pub fn lerp(&self, other: &Position, t: f64) -> Position {
        Position {
            lat: lerp(self.lat, other.lat, t),
            lng: lerp(self.lng, other.lng, t),
        }
    }
}

/// Haversine distance in nm
pub fn distance_nm(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);

    EARTH_RADIUS_NM * 2.0 * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Initial bearing from point 1 to point 2, in [0, 360)
pub fn bearing_deg(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lng = (lng2 - lng1).to_radians();
    let (lat1, lat2) = (lat1.to_radians(), lat2.to_radians());

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const KSNS: Position = Position {
        lat: 36.6628,
        lng: -121.6064,
    };
    const KMRY: Position = Position {
        lat: 36.5870,
        lng: -121.8430,
    };

    #[test]
    fn test_equator_one_degree() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(0.0, 1.0);

        assert!((a.bearing_deg(&b) - 90.0).abs() < 1e-9);
        assert!((a.distance_nm(&b) - 60.04).abs() < 0.01);
    }

    #[test]
    fn test_distance_symmetric() {
        let pairs = [
            (KSNS, KMRY),
            (Position::new(-33.9, 151.2), Position::new(51.5, -0.1)),
            (Position::new(60.0, 10.0), Position::new(-45.0, -100.0)),
            (Position::new(0.0, 179.5), Position::new(0.0, -179.5)),
        ];

        for (a, b) in pairs.iter() {
            assert_eq!(a.distance_nm(b), b.distance_nm(a));
        }
    }

    #[test]
    fn test_bearing_normalized() {
        // KSNS to KMRY is roughly west south west
        let b = KSNS.bearing_deg(&KMRY);
        assert!(b > 240.0 && b < 250.0);

        let back = KMRY.bearing_deg(&KSNS);
        assert!(back >= 0.0 && back < 360.0);
        assert!((back - (b - 180.0)).abs() < 1.0);

        let north = Position::new(0.0, 0.0).bearing_deg(&Position::new(1.0, 0.0));
        assert!(north.abs() < 1e-9);
    }

    #[test]
    fn test_identical_points() {
        assert_eq!(KSNS.distance_nm(&KSNS), 0.0);
        // no error condition, just propagates
        let b = KSNS.bearing_deg(&KSNS);
        assert!(b.is_nan() || (b >= 0.0 && b < 360.0));
    }

    #[test]
    fn test_lerp() {
        let mid = KSNS.lerp(&KMRY, 0.5);
        assert!((mid.lat - 36.6249).abs() < 1e-9);
        assert!((mid.lng - -121.7247).abs() < 1e-9);
        assert_eq!(KSNS.lerp(&KMRY, 0.0), KSNS);
    }
}
