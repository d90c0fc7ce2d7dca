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

//! Flat key-value pilot preferences, persisted as one JSON object.

use crate::errors::Result;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

pub const AIRCRAFT_TYPE: &str = "aircraft_type";
pub const PILOT_ID: &str = "pilot_id";
pub const DEFAULT_AIRCRAFT_TYPE: &str = "c172";

#[derive(Debug)]
pub struct Preferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Preferences {
    /// A missing file is an empty store
    pub fn load(path: &Path) -> Result<Self> {
        let values = match fs::read_to_string(path) {
            Ok(s) => serde_json::from_str(&s)?,
            Err(ref e) if e.kind() == ErrorKind::NotFound => {
                debug!("no preferences at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Preferences {
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Stores `value` and writes the whole store back
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        fs::write(&self.path, serde_json::to_string_pretty(&self.values)?)?;

        Ok(())
    }

    pub fn aircraft_type(&self) -> &str {
        self.get(AIRCRAFT_TYPE).unwrap_or(DEFAULT_AIRCRAFT_TYPE)
    }

    pub fn pilot_id(&self) -> Option<&str> {
        self.get(PILOT_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = Preferences::load(&dir.path().join("prefs.json")).unwrap();

        assert_eq!(p.aircraft_type(), "c172");
        assert_eq!(p.pilot_id(), None);
    }

    #[test]
    fn test_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let mut p = Preferences::load(&path).unwrap();
        p.set(AIRCRAFT_TYPE, "sr22").unwrap();
        p.set(PILOT_ID, "N12345").unwrap();

        let p = Preferences::load(&path).unwrap();
        assert_eq!(p.aircraft_type(), "sr22");
        assert_eq!(p.pilot_id(), Some("N12345"));
    }

    #[test]
    fn test_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "[1, 2]").unwrap();

        assert!(Preferences::load(&path).is_err());
    }
}
