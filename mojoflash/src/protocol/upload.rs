//! Mojo loader upload protocol.
//!
//! The loader MCU on the Mojo board speaks a minimal request/acknowledge
//! protocol over the serial link. Every step is gated on a single-byte
//! acknowledgement from the board; any missing or mismatched byte aborts
//! the session.
//!
//! ## Protocol Overview
//!
//! ```text
//! Step | Host -> Board                  | Board -> Host
//! -----+--------------------------------+---------------
//!  1   | (buffers flushed)              | -
//!  2   | 'R'                            | 'R'
//!  3   | size, 4 bytes, little-endian   | 'O'
//!  4   | data, <=1024-byte chunks       | -
//!  5   | -                              | 'D'
//! ```
//!
//! The transfer loop is size-driven, not EOF-driven: step 3 commits the
//! host to sending exactly the announced number of bytes, so the loop runs
//! until that count is reached. The final `'D'` acknowledgement, not data
//! exhaustion, is authoritative for success.

use crate::error::{Error, Result};
use crate::image::Image;
use crate::port::Port;
use byteorder::{ByteOrder, LittleEndian};
use log::{debug, info};
use std::io::Read;

/// Protocol marker bytes.
pub mod marker {
    /// Upload request; the board echoes it back when it is listening.
    pub const REQUEST: u8 = b'R';
    /// Acknowledgement of the announced bitstream size.
    pub const SIZE_OK: u8 = b'O';
    /// Acknowledgement of the completed transfer.
    pub const DONE: u8 = b'D';
}

/// Maximum number of data bytes sent per chunk.
pub const CHUNK_SIZE: usize = 1024;

/// Percentage of the transfer that is complete, for display purposes.
///
/// An empty bitstream is considered fully transferred. Render with one
/// decimal place (`{:.1}`).
#[allow(clippy::cast_precision_loss)]
pub fn percent_complete(transferred: u64, total: u64) -> f64 {
    if total == 0 {
        100.0
    } else {
        transferred as f64 / total as f64 * 100.0
    }
}

/// Upload protocol engine.
///
/// Borrows the port for the duration of one session; the protocol is
/// strictly sequential and owns the stream until it returns.
pub struct Uploader<'a, P: Port> {
    port: &'a mut P,
}

impl<'a, P: Port> Uploader<'a, P> {
    /// Create a new uploader on the given port.
    pub fn new(port: &'a mut P) -> Self {
        Self { port }
    }

    /// Read a single acknowledgement byte.
    ///
    /// Returns `None` when the board sent nothing within the port timeout;
    /// each phase treats that the same as a mismatched byte.
    fn read_ack(&mut self) -> Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.port.read(&mut buf) {
            Ok(1) => Ok(Some(buf[0])),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(Error::Io(e)),
        }
    }

    /// Run the full upload session.
    ///
    /// Streams `image` to the board in [`CHUNK_SIZE`]-byte chunks, invoking
    /// `progress` with `(transferred, total)` once before the first chunk
    /// and after every chunk.
    pub fn upload<R, F>(&mut self, image: &mut Image<R>, mut progress: F) -> Result<()>
    where
        R: Read,
        F: FnMut(u64, u64),
    {
        let total = image.len();
        info!("Uploading {} bytes via {}", total, self.port.name());

        // Step 1: discard anything an interrupted session left queued.
        self.port.clear_buffers()?;

        // Step 2: request an upload; the board echoes 'R' when listening.
        self.port.write_all_bytes(&[marker::REQUEST])?;
        match self.read_ack()? {
            Some(marker::REQUEST) => debug!("Board is listening"),
            other => {
                debug!("Upload request not echoed (got {other:02X?})");
                return Err(Error::NotResponding);
            },
        }

        // Step 3: announce the size as a 4-byte little-endian field.
        let mut size_field = [0u8; 4];
        LittleEndian::write_u32(&mut size_field, total);
        self.port.write_all_bytes(&size_field)?;
        match self.read_ack()? {
            Some(marker::SIZE_OK) => debug!("Size acknowledged"),
            other => {
                debug!("Size not acknowledged (got {other:02X?})");
                return Err(Error::SizeNotAcknowledged);
            },
        }

        // Step 4: stream the data, exactly `total` bytes.
        let mut buf = [0u8; CHUNK_SIZE];
        let mut transferred: u32 = 0;
        progress(0, u64::from(total));

        while transferred < total {
            let want = CHUNK_SIZE.min((total - transferred) as usize);
            image.read_exact(&mut buf[..want])?;

            let written = self.port.write(&buf[..want])?;
            if written != want {
                return Err(Error::ShortWrite {
                    expected: want,
                    written,
                });
            }

            // Safe cast: want <= CHUNK_SIZE
            #[allow(clippy::cast_possible_truncation)]
            {
                transferred += want as u32;
            }
            progress(u64::from(transferred), u64::from(total));
        }
        self.port.flush()?;

        // Step 5: the board confirms once the image has been consumed.
        match self.read_ack()? {
            Some(marker::DONE) => {
                info!("Upload complete ({transferred} bytes)");
                Ok(())
            },
            other => {
                debug!("Transfer not acknowledged (got {other:02X?})");
                Err(Error::TransferNotAcknowledged)
            },
        }
    }
}
