//! Device discovery, hot-plug handling, and session ownership.
//!
//! [`DeviceRegistry`] matches connected devices against the fixed identity
//! allow-list in [`constants::KNOWN_DEVICES`](crate::constants::KNOWN_DEVICES)
//! and owns at most one [`DeviceSession`] at a time: the first matching
//! device wins, and a new attach does not replace a live session. The
//! registry provides no internal locking; callers serialize discovery,
//! attach/detach, and port operations against each other.

use crate::constants::KNOWN_DEVICES;
use crate::error::{Error, Result};
use crate::host::{Connection, DeviceEntry, DeviceIdentity, UsbHost};
use crate::port::SerialPort;

/// The ports of one currently-attached matching device.
///
/// Each port holds its own clone of the device connection, so the device
/// stays open as long as the session lives and closes when it is dropped.
pub struct DeviceSession<C: Connection> {
    identity: DeviceIdentity,
    ports: Vec<SerialPort<C>>,
}

impl<C: Connection> DeviceSession<C> {
    /// Identity of the device backing this session.
    pub fn identity(&self) -> DeviceIdentity {
        self.identity
    }

    /// Number of serial ports found on the device.
    pub fn port_count(&self) -> usize {
        self.ports.len()
    }

    /// All ports on the device.
    pub fn ports(&self) -> &[SerialPort<C>] {
        &self.ports
    }

    /// Borrow one port by number.
    pub fn port(&self, number: usize) -> Option<&SerialPort<C>> {
        self.ports.get(number)
    }

    /// Mutably borrow one port by number.
    pub fn port_mut(&mut self, number: usize) -> Option<&mut SerialPort<C>> {
        self.ports.get_mut(number)
    }

    /// Close every port. The connection itself closes when the last port is
    /// dropped with the session.
    fn teardown(&mut self) {
        for port in &mut self.ports {
            port.close();
        }
    }
}

/// Discovers FTDI devices and owns the active [`DeviceSession`].
pub struct DeviceRegistry<H: UsbHost> {
    host: H,
    session: Option<DeviceSession<H::Connection>>,
}

impl<H: UsbHost> DeviceRegistry<H> {
    /// Create a registry over the given host USB stack.
    pub fn new(host: H) -> Self {
        Self {
            host,
            session: None,
        }
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&DeviceSession<H::Connection>> {
        self.session.as_ref()
    }

    /// The active session, mutably.
    pub fn session_mut(&mut self) -> Option<&mut DeviceSession<H::Connection>> {
        self.session.as_mut()
    }

    /// Enumerate connected devices and commit a session for the first one
    /// matching the allow-list.
    ///
    /// A device that matches but yields zero usable ports is closed again
    /// and enumeration continues. Returns the (possibly pre-existing)
    /// session, or [`Error::NoMatchingDevice`] when nothing matched.
    pub fn discover(&mut self) -> Result<&mut DeviceSession<H::Connection>> {
        if self.session.is_none() {
            let entries = self.host.devices()?;
            for entry in &entries {
                if self.begin_device(entry) {
                    break;
                }
            }
        }
        self.session.as_mut().ok_or(Error::NoMatchingDevice)
    }

    /// Handle a hot-plug attach notification for one device.
    ///
    /// Runs the same matching logic as [`discover`](Self::discover) for just
    /// this device. Returns whether a session was committed; refused while
    /// another session is active.
    pub fn attach(&mut self, entry: &H::Entry) -> bool {
        self.begin_device(entry)
    }

    /// Handle a hot-plug detach notification.
    ///
    /// Tears down the active session only when the detached identity matches
    /// the tracked device: every port is closed and the connection released.
    pub fn detach(&mut self, identity: DeviceIdentity) {
        let matches = self
            .session
            .as_ref()
            .is_some_and(|session| session.identity == identity);
        if matches {
            log::debug!("device {} detached", identity);
            self.shutdown();
        }
    }

    /// Tear down the active session unconditionally.
    pub fn shutdown(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
    }

    /// Try to build a session from one device. Failures along the way skip
    /// the device rather than aborting discovery.
    fn begin_device(&mut self, entry: &H::Entry) -> bool {
        if self.session.is_some() {
            return false;
        }

        let identity = entry.identity();
        if !KNOWN_DEVICES.contains(&identity) {
            return false;
        }

        let connection = match self.host.open(entry) {
            Ok(connection) => connection,
            Err(err) => {
                log::debug!("cannot open device {}: {}", identity, err);
                return false;
            }
        };
        let descriptors = match connection.interfaces() {
            Ok(descriptors) => descriptors,
            Err(err) => {
                log::debug!("cannot read interfaces of {}: {}", identity, err);
                return false;
            }
        };

        // Multi-interface chips index setup requests per port, 1-based.
        let multi = descriptors.len() > 1;
        let mut ports = Vec::new();
        for desc in &descriptors {
            let usb_index = if multi {
                desc.number as u16 + 1
            } else {
                desc.number as u16
            };
            match SerialPort::new(connection.clone(), desc, usb_index) {
                Ok(port) => ports.push(port),
                Err(err) => {
                    log::debug!("skipping interface {} of {}: {}", desc.number, identity, err)
                }
            }
        }

        if ports.is_empty() {
            // Dropping the connection here closes it.
            return false;
        }

        log::debug!("using device {} with {} port(s)", identity, ports.len());
        self.session = Some(DeviceSession { identity, ports });
        true
    }
}

impl<H: UsbHost> Drop for DeviceRegistry<H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
