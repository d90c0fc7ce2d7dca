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

use chrono::{DateTime, TimeDelta, Utc};

/// Feet in one nautical mile
pub const FT_PER_NM: f64 = 6076.12;
/// Speed of sound used for the mach readout, in kts
pub const MACH_KTS: f64 = 661.0;

pub const UNKNOWN_TIME: &str = "--:--";
pub const UNKNOWN_UTC: &str = "--:-- UTC";

#[macro_export]
macro_rules! kts_to_mach {
    ($x:expr) => {
        (($x as f64) / $crate::utils::MACH_KTS * 100.0).round() / 100.0
    };
}

#[macro_export]
macro_rules! run_every {
    ($hz:expr, $counter:expr, $handle:expr, $action:block) => {
        $counter += 1;
        if $counter >= ($handle.get_frequency() as f32 / $hz as f32) as u32 {
            $counter = 0;
            $action;
        }
    };
}

/// Hours as `H:MM`, rounded to the whole minute
pub fn format_hours(hours: f64) -> String {
    let minutes = (hours * 60.0).round() as u64;
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Minutes as `M:SS`, rounded to the whole second
pub fn format_minutes(minutes: f64) -> String {
    let seconds = (minutes * 60.0).round() as u64;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_utc(t: &DateTime<Utc>) -> String {
    t.format("%H:%M UTC").to_string()
}

/// `utc` plus `seconds` as `HH:MM UTC`, unknown when out of the representable range
pub fn format_eta(utc: &DateTime<Utc>, seconds: f64) -> String {
    if !seconds.is_finite() {
        return UNKNOWN_UTC.to_string();
    }

    TimeDelta::try_milliseconds((seconds * 1000.0).round() as i64)
        .and_then(|d| utc.checked_add_signed(d))
        .map_or_else(|| UNKNOWN_UTC.to_string(), |t| format_utc(&t))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_hours() {
        assert_eq!(format_hours(8200.0 / 1800.0), "4:33");
        assert_eq!(format_hours(0.0), "0:00");
        // never renders 60 minutes
        assert_eq!(format_hours(4.9999), "5:00");
    }

    #[test]
    fn test_format_minutes() {
        assert_eq!(format_minutes(5.5), "5:30");
        assert_eq!(format_minutes(0.25), "0:15");
    }

    #[test]
    fn test_format_utc() {
        let t = Utc.with_ymd_and_hms(2014, 7, 8, 9, 10, 11).unwrap();
        assert_eq!(format_utc(&t), "09:10 UTC");
    }

    #[test]
    fn test_format_eta() {
        let t = Utc.with_ymd_and_hms(2018, 3, 1, 12, 0, 0).unwrap();

        assert_eq!(format_eta(&t, 1800.0), "12:30 UTC");
        assert_eq!(format_eta(&t, 1e21), UNKNOWN_UTC);
        assert_eq!(format_eta(&t, 1e15), UNKNOWN_UTC);
        assert_eq!(format_eta(&t, f64::INFINITY), UNKNOWN_UTC);
    }

    #[test]
    fn test_kts_to_mach() {
        assert_eq!(kts_to_mach!(120), 0.18);
        assert_eq!(kts_to_mach!(0), 0.0);
    }
}
