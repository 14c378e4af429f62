//! Serial port lifecycle and byte-stream I/O.
//!
//! A [`SerialPort`] owns one claimable interface on an opened device
//! connection. It is constructed Closed by the registry, claims the
//! interface and runs the chip setup sequence on [`open`](SerialPort::open),
//! and releases the claim on [`close`](SerialPort::close) or drop.

use std::io;

use crate::constants::DEFAULT_MAX_PACKET_SIZE;
use crate::error::{Error, Result};
use crate::host::{Connection, Direction, InterfaceDesc};
use crate::init::{self, InitMode};
use crate::transport::FramedTransport;

/// Endpoint addressing for one claimable interface.
#[derive(Debug, Clone, Copy)]
pub struct PortHandle {
    /// USB interface number (0-based).
    pub interface_number: u8,
    /// `wIndex` value used in setup control transfers. Offset by 1 from the
    /// interface number on multi-interface chips.
    pub usb_index: u16,
    /// Bulk IN endpoint address (device to host).
    pub in_endpoint: u8,
    /// Bulk OUT endpoint address (host to device).
    pub out_endpoint: u8,
    /// Max packet size of the IN endpoint.
    pub in_max_packet: usize,
    /// Max packet size of the OUT endpoint.
    pub out_max_packet: usize,
}

impl PortHandle {
    /// Resolve a handle from an interface descriptor.
    ///
    /// Fails with [`Error::InvalidInterface`] unless the interface exposes
    /// at least one bulk IN and one bulk OUT endpoint. A descriptor
    /// reporting a packet size of 0 gets the 64-byte default (a known
    /// device quirk).
    pub(crate) fn from_descriptor(desc: &InterfaceDesc, usb_index: u16) -> Result<Self> {
        let ep_in = desc
            .endpoints
            .iter()
            .find(|ep| ep.direction == Direction::In)
            .ok_or(Error::InvalidInterface)?;
        let ep_out = desc
            .endpoints
            .iter()
            .find(|ep| ep.direction == Direction::Out)
            .ok_or(Error::InvalidInterface)?;

        let effective = |size: usize| {
            if size == 0 {
                DEFAULT_MAX_PACKET_SIZE
            } else {
                size
            }
        };

        Ok(Self {
            interface_number: desc.number,
            usb_index,
            in_endpoint: ep_in.address,
            out_endpoint: ep_out.address,
            in_max_packet: effective(ep_in.max_packet_size),
            out_max_packet: effective(ep_out.max_packet_size),
        })
    }
}

/// One serial port on an FTDI device.
///
/// The port is a state machine with two states: Closed (constructed, or
/// after [`close`](Self::close)) and Open (after a successful
/// [`open`](Self::open)). Bulk I/O is only valid while Open. Opening an
/// already-open port and closing an already-closed port are no-ops.
///
/// `SerialPort` also implements [`std::io::Read`] and [`std::io::Write`],
/// so an open port can be used anywhere those traits are expected.
pub struct SerialPort<C: Connection> {
    connection: C,
    handle: PortHandle,
    init_mode: InitMode,
    claimed: Option<C::Claimed>,
}

impl<C: Connection> SerialPort<C> {
    /// Construct a Closed port over the given interface.
    pub(crate) fn new(connection: C, desc: &InterfaceDesc, usb_index: u16) -> Result<Self> {
        let handle = PortHandle::from_descriptor(desc, usb_index)?;
        Ok(Self {
            connection,
            handle,
            init_mode: InitMode::default(),
            claimed: None,
        })
    }

    /// The endpoint addressing of this port.
    pub fn handle(&self) -> &PortHandle {
        &self.handle
    }

    /// Whether the port is currently Open.
    pub fn is_open(&self) -> bool {
        self.claimed.is_some()
    }

    /// Select how chip setup failures are handled on the next `open`.
    pub fn set_init_mode(&mut self, mode: InitMode) {
        self.init_mode = mode;
    }

    /// Claim the interface and initialize the chip at `baudrate`.
    ///
    /// No-op returning success when the port is already Open. Fails with
    /// [`Error::ClaimFailed`] when the host stack refuses the claim, and in
    /// [`InitMode::Strict`] with the first failed setup transfer; either way
    /// the port stays Closed.
    pub fn open(&mut self, baudrate: u32) -> Result<()> {
        if self.claimed.is_some() {
            return Ok(());
        }

        let mut claimed = self.connection.claim_interface(self.handle.interface_number)?;
        init::initialize(&mut claimed, self.handle.usb_index, baudrate, self.init_mode)?;

        self.claimed = Some(claimed);
        Ok(())
    }

    /// Release the claimed interface. No-op when already Closed.
    pub fn close(&mut self) {
        self.claimed = None;
    }

    /// Read up to `buf.len()` payload bytes.
    ///
    /// Status bytes are stripped from every bulk packet. `Ok(0)` means no
    /// data is currently available, not end-of-stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let iface = self.claimed.as_mut().ok_or(Error::NotOpen)?;
        FramedTransport::new(iface, &self.handle).read(buf)
    }

    /// Write all of `buf` and return its length, or fail the whole write.
    pub fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let iface = self.claimed.as_mut().ok_or(Error::NotOpen)?;
        FramedTransport::new(iface, &self.handle).write(buf)
    }
}

impl<C: Connection> std::fmt::Debug for SerialPort<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPort")
            .field("interface", &self.handle.interface_number)
            .field("is_open", &self.is_open())
            .finish_non_exhaustive()
    }
}

// ---- std::io trait implementations ----

impl<C: Connection> io::Read for SerialPort<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        SerialPort::read(self, buf).map_err(io::Error::other)
    }
}

impl<C: Connection> io::Write for SerialPort<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        SerialPort::write(self, buf).map_err(io::Error::other)
    }

    fn flush(&mut self) -> io::Result<()> {
        // Writes go straight to the bulk endpoint; nothing is buffered here.
        Ok(())
    }
}
