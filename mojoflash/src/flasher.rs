//! Mojo board flasher.
//!
//! Combines the two halves of an upload: the DTR reset sequence that drops
//! the board's loader MCU into programming mode, and the upload protocol
//! engine that streams the bitstream.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mojoflash::{Image, MojoFlasher, UploadOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut image = Image::open("top.bin")?;
//!     let mut flasher = MojoFlasher::open("/dev/ttyACM0", UploadOptions::default())?;
//!
//!     flasher.upload(&mut image, |transferred, total| {
//!         println!("{transferred}/{total}");
//!     })?;
//!
//!     Ok(())
//! }
//! ```

use crate::error::Result;
use crate::image::Image;
use crate::port::Port;
use crate::protocol::upload::Uploader;
use log::{debug, trace};
use std::io::Read;
use std::thread;
use std::time::Duration;

/// Baud rate the loader MCU listens at.
pub const DEFAULT_BAUD: u32 = 115200;

/// Read timeout applied to the port; an acknowledgement that does not
/// arrive within this budget counts as a missing acknowledgement.
pub const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Delay between DTR transitions during the reset sequence.
const RESET_PULSE_DELAY: Duration = Duration::from_millis(5);

/// Number of deassert/assert pulses after the initial assert.
const RESET_PULSES: usize = 5;

/// Upload switches, parsed once from the CLI and carried immutably.
///
/// Both switches are accepted for compatibility with existing loaders but
/// exercise no protocol steps today; the loader MCU decides on its own
/// whether the image lands in RAM or flash.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadOptions {
    /// Verify the uploaded bitstream.
    pub verify: bool,
    /// Store the bitstream in flash rather than RAM.
    pub flash: bool,
}

/// Mojo flasher.
///
/// Generic over the port type `P` so the protocol can be exercised against
/// scripted ports in tests.
pub struct MojoFlasher<P: Port> {
    port: P,
    options: UploadOptions,
}

impl<P: Port> MojoFlasher<P> {
    /// Create a flasher with an existing port.
    pub fn new(port: P, options: UploadOptions) -> Self {
        Self { port, options }
    }

    /// Get a reference to the underlying port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Consume the flasher and return the underlying port.
    pub fn into_port(self) -> P {
        self.port
    }

    /// Pulse DTR to force the loader MCU into programming mode.
    ///
    /// Assert, wait, then deassert/assert [`RESET_PULSES`] times. Control
    /// line failures are not surfaced: nothing observable comes back on
    /// this path, and an unresponsive board shows up as a failed handshake
    /// in the very next step.
    pub fn reset_to_loader(&mut self) {
        debug!("Resetting board into loader mode");

        self.pulse_dtr(true);
        thread::sleep(RESET_PULSE_DELAY);
        for _ in 0..RESET_PULSES {
            self.pulse_dtr(false);
            thread::sleep(RESET_PULSE_DELAY);
            self.pulse_dtr(true);
        }
    }

    fn pulse_dtr(&mut self, level: bool) {
        if let Err(e) = self.port.set_dtr(level) {
            trace!("DTR write failed (ignoring): {e}");
        }
    }

    /// Reset the board and upload a bitstream.
    ///
    /// The reset sequence always runs first and cannot be skipped, even if
    /// a previous session left the board mid-transfer. `progress` receives
    /// `(transferred, total)` byte counts.
    pub fn upload<R, F>(&mut self, image: &mut Image<R>, progress: F) -> Result<()>
    where
        R: Read,
        F: FnMut(u64, u64),
    {
        if self.options.verify {
            debug!("Verify requested; the loader protocol has no verify step yet");
        }
        if self.options.flash {
            debug!("Flash storage requested; the loader protocol has no flash step yet");
        }

        self.reset_to_loader();
        Uploader::new(&mut self.port).upload(image, progress)
    }

    /// Close the flasher and release the serial port.
    ///
    /// Safe to call more than once.
    pub fn close(&mut self) {
        let _ = self.port.close();
    }
}

#[cfg(feature = "native")]
mod native_impl {
    use super::{DEFAULT_BAUD, MojoFlasher, READ_TIMEOUT, Result, UploadOptions};
    use crate::port::{NativePort, SerialConfig};

    impl MojoFlasher<NativePort> {
        /// Open the serial device and create a flasher.
        ///
        /// Applies the loader's transport contract: 115200 baud, 8 data
        /// bits, no parity, one stop bit, no flow control, bounded read
        /// timeout.
        pub fn open(port_name: &str, options: UploadOptions) -> Result<Self> {
            let config = SerialConfig::new(port_name, DEFAULT_BAUD).with_timeout(READ_TIMEOUT);
            let port = NativePort::open(&config)?;
            Ok(Self::new(port, options))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::upload::marker;
    use crate::testutil::MockPort;
    use std::io::Cursor;

    #[test]
    fn test_reset_sequence_dtr_pattern() {
        let mut flasher = MojoFlasher::new(MockPort::new(&[]), UploadOptions::default());
        flasher.reset_to_loader();

        // Initial assert, then 5 x (deassert, assert)
        let expected = vec![
            true, false, true, false, true, false, true, false, true, false, true,
        ];
        assert_eq!(flasher.port().dtr_levels, expected);
    }

    #[test]
    fn test_upload_resets_before_handshake() {
        let port = MockPort::new(&[marker::REQUEST, marker::SIZE_OK, marker::DONE]);
        let mut flasher = MojoFlasher::new(port, UploadOptions::default());

        let data = vec![0x5A; 300];
        let mut image = Image::from_reader(Cursor::new(data), 300).unwrap();
        flasher.upload(&mut image, |_, _| {}).unwrap();

        let port = flasher.into_port();
        assert_eq!(port.dtr_levels.len(), 11, "reset sequence must run first");
        assert_eq!(port.write_buf[0], b'R');
        assert_eq!(port.write_buf.len(), 1 + 4 + 300);
    }

    #[test]
    fn test_upload_with_inert_switches() {
        let port = MockPort::new(&[marker::REQUEST, marker::SIZE_OK, marker::DONE]);
        let options = UploadOptions {
            verify: true,
            flash: true,
        };
        let mut flasher = MojoFlasher::new(port, options);

        let mut image = Image::from_reader(Cursor::new(vec![0u8; 64]), 64).unwrap();
        // Switches change nothing on the wire
        flasher.upload(&mut image, |_, _| {}).unwrap();
        assert_eq!(flasher.port().write_sizes, vec![1, 4, 64]);
    }
}
