//! Scripted mock port shared by protocol and flasher tests.

use std::collections::VecDeque;
use std::io::{Read, Write};
use std::time::Duration;

use crate::error::Result;
use crate::port::Port;

/// Mock serial port with independent read/write sides.
///
/// Reads drain a pre-scripted response buffer and time out once it is
/// exhausted, mirroring how a real port with a read timeout behaves.
pub(crate) struct MockPort {
    read_buf: VecDeque<u8>,
    /// Everything the code under test wrote, in order.
    pub write_buf: Vec<u8>,
    /// Length of each individual `write` call.
    pub write_sizes: Vec<usize>,
    /// DTR levels in the order they were set.
    pub dtr_levels: Vec<bool>,
    /// Number of `clear_buffers` calls.
    pub clear_count: usize,
    write_cap: Option<usize>,
    timeout: Duration,
}

impl MockPort {
    pub fn new(script: &[u8]) -> Self {
        Self {
            read_buf: script.iter().copied().collect(),
            write_buf: Vec::new(),
            write_sizes: Vec::new(),
            dtr_levels: Vec::new(),
            clear_count: 0,
            write_cap: None,
            timeout: Duration::from_millis(100),
        }
    }

    /// Limit how many bytes a single `write` call accepts, to provoke
    /// short writes.
    pub fn with_write_cap(mut self, cap: usize) -> Self {
        self.write_cap = Some(cap);
        self
    }
}

impl Read for MockPort {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.read_buf.is_empty() {
            return Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "no data"));
        }
        let n = buf.len().min(self.read_buf.len());
        for b in buf.iter_mut().take(n) {
            *b = self.read_buf.pop_front().unwrap();
        }
        Ok(n)
    }
}

impl Write for MockPort {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.write_cap.map_or(buf.len(), |cap| cap.min(buf.len()));
        self.write_buf.extend_from_slice(&buf[..n]);
        self.write_sizes.push(n);
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Port for MockPort {
    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    fn clear_buffers(&mut self) -> Result<()> {
        self.clear_count += 1;
        Ok(())
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn set_dtr(&mut self, level: bool) -> Result<()> {
        self.dtr_levels.push(level);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
