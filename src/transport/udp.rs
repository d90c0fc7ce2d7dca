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
use std::collections::VecDeque;
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, UdpSocket};

const UDP_MAX_SIZE: usize = 1472; // maximum UDP payload size without fragmentation in Ethernet environment

/// Sends payloads to a fixed set of display endpoints
pub struct UDP {
    sock: UdpSocket,
    endpoints: Vec<SocketAddr>,
    queue: VecDeque<Payload>,
}

impl UDP {
    pub fn new(endpoints: Vec<SocketAddr>) -> io::Result<Box<Self>> {
        let sock = UdpSocket::bind("0.0.0.0:0")?;
        sock.set_nonblocking(true)?;

        for e in endpoints.iter() {
            info!("sending display data to {}", e);
        }

        Ok(Box::new(UDP {
            sock,
            endpoints,
            queue: VecDeque::new(),
        }))
    }

    fn send_to_all_endpoints(&self, buffer: &[u8]) {
        for e in self.endpoints.iter() {
            if let Err(err) = self.sock.send_to(buffer, e) {
                match err.kind() {
                    ErrorKind::WouldBlock => warn!("UDP send overwhelming buffers"),
                    _ => error!("UDP send to {} failed: {}", e, err),
                }
            }
        }
    }

    /// Appends `p` to `buffer`, flushing first when it would not fit
    fn pack(&self, buffer: &mut Vec<u8>, p: &Payload) {
        if !buffer.is_empty() && buffer.len() + p.payload.len() > UDP_MAX_SIZE {
            self.send_to_all_endpoints(buffer);
            buffer.clear();
        }

        if p.payload.len() > UDP_MAX_SIZE {
            warn!("{} byte payload will be fragmented", p.payload.len());
        }

        buffer.extend(p.payload.iter());
    }
}

impl Transport for UDP {
    fn run(&mut self, handle: &dyn Handle, i: ChainedIter) {
        let mut buffer = Vec::with_capacity(UDP_MAX_SIZE);

        for p in i {
            if p.queueable {
                self.queue.push_back(p.clone());
                continue;
            }

            self.pack(&mut buffer, p);
        }

        trace!("queue size: {}", self.queue.len());
        // drain queue size * 1/freq of all queued items
        let to_drain =
            ((1_f32 / handle.get_frequency() as f32) * self.queue.len() as f32).ceil() as usize;

        for _ in 0..to_drain {
            if let Some(p) = self.queue.pop_front() {
                self.pack(&mut buffer, &p);
            }
        }

        // if buffer is not empty, and we still have space to squeeze, don't waste
        // it as long as we do not introduce new packets
        if !buffer.is_empty() {
            while self
                .queue
                .front()
                .map_or(false, |p| buffer.len() + p.payload.len() <= UDP_MAX_SIZE)
            {
                if let Some(p) = self.queue.pop_front() {
                    buffer.extend(p.payload.iter());
                }
            }

            self.send_to_all_endpoints(&buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cockpit::handle::BasicHandle;
    use crate::plan::FlightPlan;
    use std::time::Duration;

    fn payload(queueable: bool, n: usize) -> Payload {
        Payload {
            queueable,
            payload: vec![b'x'; n],
        }
    }

    #[test]
    fn test_batching() {
        let rx = UdpSocket::bind("127.0.0.1:0").unwrap();
        rx.set_read_timeout(Some(Duration::from_secs(2))).unwrap();

        let plan = FlightPlan::demo();
        let h = BasicHandle::new(2, &plan);
        let mut udp = UDP::new(vec![rx.local_addr().unwrap()]).unwrap();

        let now = [payload(false, 1000), payload(false, 400), payload(false, 100)];
        let queued = [payload(true, 10), payload(true, 10), payload(true, 10), payload(true, 10)];

        udp.run(&h, now.iter().chain(queued.iter()));

        let mut buf = [0_u8; 4096];
        // 1000 + 400 fit in one datagram, the rest goes in a second one
        assert_eq!(rx.recv(&mut buf).unwrap(), 1400);
        // half the queue is due at 2 Hz, and the spare room takes the rest
        assert_eq!(rx.recv(&mut buf).unwrap(), 140);
        assert!(udp.queue.is_empty());
    }
}
