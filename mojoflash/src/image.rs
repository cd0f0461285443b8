//! Bitstream image source.
//!
//! An [`Image`] is a sequential byte source of known length. The length is
//! validated against the wire protocol's 4-byte size field on construction,
//! so any `Image` that reaches the upload engine is guaranteed to fit a
//! `u32`. The data itself is streamed in bounded chunks; the file is never
//! loaded into memory as a whole.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};

/// Upper bound (exclusive) on bitstream size: the protocol announces the
/// size as a 4-byte unsigned field.
pub const MAX_IMAGE_SIZE: u64 = 1 << 32;

/// A bitstream of known total length, read sequentially.
pub struct Image<R> {
    source: R,
    len: u32,
}

impl Image<BufReader<File>> {
    /// Open a bitstream file and validate its size.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Self::from_reader(BufReader::new(file), len)
    }
}

impl<R: Read> Image<R> {
    /// Wrap an arbitrary reader with a known length.
    ///
    /// Fails with [`Error::ImageTooLarge`] if `len` does not fit the wire
    /// protocol's 4-byte size field.
    pub fn from_reader(source: R, len: u64) -> Result<Self> {
        if len >= MAX_IMAGE_SIZE {
            return Err(Error::ImageTooLarge { size: len });
        }
        // Safe cast: bounded by MAX_IMAGE_SIZE above
        #[allow(clippy::cast_possible_truncation)]
        Ok(Self {
            source,
            len: len as u32,
        })
    }

    /// Total length of the bitstream in bytes.
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Whether the bitstream is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Fill `buf` with the next bytes of the bitstream.
    ///
    /// The upload loop is size-driven, so the caller never asks for more
    /// bytes than the announced total; running out of data early is an
    /// I/O error, not end-of-transfer.
    pub(crate) fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.source.read_exact(buf)?;
        Ok(())
    }
}
