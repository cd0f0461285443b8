//! # mojoflash
//!
//! A library for uploading bitstreams to the Mojo FPGA development board.
//!
//! This crate provides the core functionality for talking to the Mojo's
//! on-board loader MCU over a serial port, including:
//!
//! - The DTR reset sequence that drops the board into programming mode
//! - The request/acknowledge upload protocol (`'R'`/`'O'`/`'D'` markers)
//! - Size-bounded, streamed chunk transfer of the bitstream
//! - Serial port discovery and board classification
//!
//! ## Features
//!
//! - `native` (default): Native serial port support via the `serialport`
//!   crate
//! - `serde`: Serialization support for data types
//!
//! ## Example
//!
//! ```rust,no_run
//! use mojoflash::{Image, MojoFlasher, UploadOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Open the bitstream (size-validated against the wire format)
//!     let mut image = Image::open("top.bin")?;
//!
//!     // Open the board and upload (native only)
//!     #[cfg(feature = "native")]
//!     {
//!         let mut flasher = MojoFlasher::open("/dev/ttyACM0", UploadOptions::default())?;
//!         flasher.upload(&mut image, |transferred, total| {
//!             println!("{transferred}/{total} bytes");
//!         })?;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod device;
pub mod error;
pub mod flasher;
pub mod image;
pub mod port;
pub mod protocol;

#[cfg(test)]
pub(crate) mod testutil;

// Re-exports for convenience
// Native-specific re-exports
#[cfg(feature = "native")]
pub use port::{NativePort, NativePortEnumerator};
pub use {
    device::{DetectedPort, DeviceKind},
    error::{Error, Result},
    flasher::{DEFAULT_BAUD, MojoFlasher, UploadOptions},
    image::{Image, MAX_IMAGE_SIZE},
    port::{Port, PortEnumerator, PortInfo, SerialConfig},
    protocol::upload::{CHUNK_SIZE, Uploader, marker, percent_complete},
};
