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

//! Line oriented input from the host: pilot actions and bridge telemetry
//! share one stream of JSON messages.

use super::PilotAction;
use serde_json::Value;
use std::io::BufRead;
use std::sync::mpsc::Sender;

/// Routes each line of `r` until it ends or every receiver hangs up. Lines
/// carrying an `action` key are pilot actions, the rest go to `bridge`.
pub fn forward<R: BufRead>(r: R, actions: Sender<PilotAction>, bridge: Option<Sender<String>>) {
    for line in r.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                error!("unable to read input: {}", e);
                break;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let is_action = serde_json::from_str::<Value>(&line)
            .map(|v| v.get("action").is_some())
            .unwrap_or(false);

        if is_action {
            match serde_json::from_str::<PilotAction>(&line) {
                Ok(a) => {
                    if actions.send(a).is_err() {
                        break;
                    }
                }
                Err(e) => warn!("malformed pilot action: {}", e),
            }
        } else if let Some(ref tx) = bridge {
            if tx.send(line).is_err() {
                break;
            }
        } else {
            debug!("no telemetry bridge, dropping input line");
        }
    }

    info!("input closed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::mpsc::channel;

    #[test]
    fn test_forward() {
        let input = concat!(
            "{\"action\": \"activate-leg\", \"value\": 3}\n",
            "\n",
            "{\"seq\": 1, \"gs\": 110.0}\n",
            "{\"action\": \"warp\"}\n",
            "{\"action\": \"set-obs\", \"value\": true}\n",
        );

        let (atx, arx) = channel();
        let (btx, brx) = channel();
        forward(Cursor::new(input), atx, Some(btx));

        let actions: Vec<PilotAction> = arx.try_iter().collect();
        assert_eq!(actions.len(), 2);
        assert!(matches!(actions[0], PilotAction::ActivateLeg(3)));
        assert!(matches!(actions[1], PilotAction::SetObs(true)));

        let lines: Vec<String> = brx.try_iter().collect();
        assert_eq!(lines, vec!["{\"seq\": 1, \"gs\": 110.0}".to_string()]);
    }

    #[test]
    fn test_forward_without_bridge() {
        let (atx, arx) = channel();
        forward(
            Cursor::new("{\"seq\": 1}\n{\"action\": \"cancel-obs\"}\n{\"action\": \"cancel-direct-to\"}\n"),
            atx,
            None,
        );

        let actions: Vec<PilotAction> = arx.try_iter().collect();
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], PilotAction::CancelDirectTo));
    }
}
