//! Error types for mojoflash.

use std::io;
use thiserror::Error;

/// Result type for mojoflash operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for mojoflash operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (serial port, file operations).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serial port error.
    #[cfg(feature = "native")]
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Bitstream exceeds the 4-byte size field of the wire protocol.
    #[error("Bitstream is too large: {size} bytes (limit is 4 GiB)")]
    ImageTooLarge {
        /// Size of the rejected bitstream in bytes.
        size: u64,
    },

    /// No usable serial device was found.
    #[error("No serial device found")]
    DeviceNotFound,

    /// The board did not echo the upload request marker.
    #[error("Board did not respond to the upload request (is the port correct?)")]
    NotResponding,

    /// The board did not acknowledge the announced bitstream size.
    #[error("Board did not acknowledge the bitstream size")]
    SizeNotAcknowledged,

    /// A data chunk was only partially accepted by the serial stream.
    #[error("Short write during data transfer: wrote {written} of {expected} bytes")]
    ShortWrite {
        /// Bytes that should have been written.
        expected: usize,
        /// Bytes actually accepted by the stream.
        written: usize,
    },

    /// All data was sent but the board never confirmed the transfer.
    #[error("Board did not acknowledge the completed transfer")]
    TransferNotAcknowledged,
}
