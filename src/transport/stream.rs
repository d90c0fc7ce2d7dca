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

use super::*;
use std::io::{self, Stdout, Write};

/// Writes payloads to a byte stream, stdout unless told otherwise
pub struct Stream<W: Write> {
    out: W,
}

impl Stream<Stdout> {
    pub fn stdout() -> Box<Self> {
        Box::new(Stream { out: io::stdout() })
    }
}

impl<W: Write> Stream<W> {
    pub fn new(out: W) -> Self {
        Stream { out }
    }

    fn write_all<'a>(&mut self, i: ChainedIter<'a>) -> io::Result<()> {
        for p in i {
            self.out.write_all(&p.payload)?;
        }

        self.out.flush()
    }
}

impl<W: Write> Transport for Stream<W> {
    fn run(&mut self, _handle: &dyn Handle, i: ChainedIter) {
        if let Err(e) = self.write_all(i) {
            error!("unable to write payloads: {}", e);
        }
    }
}
