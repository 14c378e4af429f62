//! Protocol constants for FTDI chip communication.
//!
//! These constants define the USB vendor request codes and wire-level details
//! of the FTDI serial protocol. Most users should not need to use these
//! directly.

use crate::host::DeviceIdentity;

// ---- FTDI Vendor ID and known Product IDs ----

/// Default FTDI vendor ID.
pub const FTDI_VID: u16 = 0x0403;

/// Known FTDI product IDs.
pub mod pid {
    /// FT232AM, FT232BM, FT232R.
    pub const FT232: u16 = 0x6001;
    /// FT2232C/D/H.
    pub const FT2232: u16 = 0x6010;
}

/// Devices recognized by [`DeviceRegistry`](crate::DeviceRegistry).
///
/// The first connected device matching one of these identities is used.
pub const KNOWN_DEVICES: [DeviceIdentity; 2] = [
    DeviceIdentity::new(FTDI_VID, pid::FT232),
    DeviceIdentity::new(FTDI_VID, pid::FT2232),
];

// ---- SIO vendor request codes ----

/// Reset the port / purge FIFOs (selected by the value field).
pub(crate) const SIO_RESET_REQUEST: u8 = 0x00;
/// Set flow control register.
pub(crate) const SIO_SET_FLOW_CTRL_REQUEST: u8 = 0x02;
/// Set baud rate.
pub(crate) const SIO_SET_BAUDRATE_REQUEST: u8 = 0x03;
/// Set data characteristics (bits, parity, stop, break).
pub(crate) const SIO_SET_DATA_REQUEST: u8 = 0x04;

// ---- Reset sub-commands ----

/// SIO reset (device reset).
pub(crate) const SIO_RESET_SIO: u16 = 0;
/// Purge the RX buffer (chip -> host direction).
pub(crate) const SIO_RESET_PURGE_RX: u16 = 1;
/// Purge the TX buffer (host -> chip direction).
pub(crate) const SIO_RESET_PURGE_TX: u16 = 2;

// ---- SIO request values ----

/// Disable flow control.
pub(crate) const SIO_DISABLE_FLOW_CTRL: u16 = 0x0000;
/// 8 data bits, no parity, 1 stop bit, TX disabled during setup.
pub(crate) const SIO_DATA_8N1: u16 = 0x0008;

// ---- Clocking ----

/// Base clock for FT232BM / FT2232C / FT232RL divisor calculation: 48 MHz.
pub(crate) const C_CLK: u32 = 48_000_000;

/// Highest baud rate the divisor generator can be programmed for.
pub(crate) const MAX_BAUDRATE: u32 = 3_000_000;

// ---- Framing ----

/// Modem/line status bytes prefixed to every bulk IN packet.
pub(crate) const STATUS_BYTES: usize = 2;

/// Fallback endpoint packet size when the descriptor reports 0
/// (seen on some FT232 devices).
pub(crate) const DEFAULT_MAX_PACKET_SIZE: usize = 64;

// ---- Named baud rates ----

/// Commonly used baud rates. Any positive rate up to 3 Mbaud is accepted
/// by the divisor calculation; these are just named conveniences.
pub mod baud {
    /// 9600 baud.
    pub const BAUD_9600: u32 = 9600;
    /// 14400 baud.
    pub const BAUD_14400: u32 = 14400;
    /// 19200 baud.
    pub const BAUD_19200: u32 = 19200;
    /// 38400 baud.
    pub const BAUD_38400: u32 = 38400;
    /// 57600 baud.
    pub const BAUD_57600: u32 = 57600;
    /// 115200 baud.
    pub const BAUD_115200: u32 = 115200;
    /// 230400 baud.
    pub const BAUD_230400: u32 = 230400;
}
