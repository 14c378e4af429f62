//! Pure Rust USB-to-serial driver for FTDI FT232-family chips.
//!
//! This crate talks to FT232/FT2232 USB-to-serial converters directly over
//! USB bulk transfers, using [nusb](https://crates.io/crates/nusb) as the
//! backend — no C dependencies or `libusb` required. It handles device
//! discovery, hot-plug attach/detach, multi-port enumeration on dual-channel
//! chips, the chip setup control-transfer sequence, and the FTDI 2-byte
//! status framing on the bulk read path.
//!
//! # Quick Start
//!
//! ```no_run
//! use ftdi_serial::constants::baud::BAUD_115200;
//! use ftdi_serial::{DeviceRegistry, NusbHost};
//!
//! let mut registry = DeviceRegistry::new(NusbHost::new());
//! let session = registry.discover()?;
//!
//! let port = session.port_mut(0).expect("device has at least one port");
//! port.open(BAUD_115200)?;
//! port.write(b"Hello from Rust!\r\n")?;
//!
//! let mut buf = [0u8; 64];
//! let n = port.read(&mut buf)?; // Ok(0) means nothing to read right now
//! println!("received {:?}", &buf[..n]);
//! # Ok::<(), ftdi_serial::Error>(())
//! ```
//!
//! # Design
//!
//! - **Discovery**: [`DeviceRegistry`] matches connected devices against the
//!   fixed allow-list in [`constants::KNOWN_DEVICES`]; the first match wins
//!   and becomes the single active [`DeviceSession`].
//! - **Ports**: one [`SerialPort`] per interface; dual-channel chips like
//!   the FT2232 yield two independently open/closable ports.
//! - **Serial profile**: fixed 8N1, no flow control; the baud rate is the
//!   only configurable line parameter.
//! - **Host stack boundary**: the driver core is generic over the traits in
//!   [`host`], so the USB backend is replaceable (and testable).
//! - **`Read` / `Write` traits**: an open [`SerialPort`] can be used
//!   anywhere `std::io::Read` or `std::io::Write` is expected.

mod baudrate;
pub mod constants;
pub mod error;
pub mod host;
mod init;
pub mod native;
mod port;
mod registry;
mod transport;

// ---- Convenience re-exports ----

pub use baudrate::compute_divisor;
pub use constants::{FTDI_VID, KNOWN_DEVICES};
pub use error::{Error, Result};
pub use host::{
    ClaimedInterface, Connection, DeviceEntry, DeviceIdentity, Direction, EndpointDesc,
    InterfaceDesc, UsbHost,
};
pub use init::InitMode;
pub use native::{NusbConnection, NusbHost, NusbInterface};
pub use port::{PortHandle, SerialPort};
pub use registry::{DeviceRegistry, DeviceSession};
