//! Boundary to the host USB stack.
//!
//! The driver core never talks to a USB backend directly; it goes through
//! the traits in this module. [`UsbHost`] enumerates and opens devices,
//! [`Connection`] describes and claims interfaces, and [`ClaimedInterface`]
//! carries the control and bulk transfer primitives. The production
//! implementation lives in [`native`](crate::native); tests use the
//! scripted mock at the bottom of this file.

use std::fmt;

use crate::error::Result;

/// USB vendor/product identity of a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceIdentity {
    /// USB vendor ID.
    pub vendor_id: u16,
    /// USB product ID.
    pub product_id: u16,
}

impl DeviceIdentity {
    /// Create an identity from vendor and product IDs.
    pub const fn new(vendor_id: u16, product_id: u16) -> Self {
        Self {
            vendor_id,
            product_id,
        }
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04x}:{:04x}", self.vendor_id, self.product_id)
    }
}

/// Direction of a USB endpoint, from the host's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Device to host.
    In,
    /// Host to device.
    Out,
}

/// Descriptor data for one bulk endpoint.
#[derive(Debug, Clone, Copy)]
pub struct EndpointDesc {
    /// Endpoint address, including the direction bit.
    pub address: u8,
    /// Transfer direction.
    pub direction: Direction,
    /// Maximum packet size reported by the descriptor. May be 0 on some
    /// devices; callers substitute a 64-byte default.
    pub max_packet_size: usize,
}

/// Descriptor data for one claimable interface.
#[derive(Debug, Clone)]
pub struct InterfaceDesc {
    /// Interface number (0-based).
    pub number: u8,
    /// Bulk endpoints exposed by the interface.
    pub endpoints: Vec<EndpointDesc>,
}

/// A connected device as reported by enumeration, not yet opened.
pub trait DeviceEntry {
    /// The vendor/product identity of the device.
    fn identity(&self) -> DeviceIdentity;
}

/// Enumerates connected devices and opens connections to them.
pub trait UsbHost {
    /// Enumeration result type.
    type Entry: DeviceEntry;
    /// Opened connection type.
    type Connection: Connection;

    /// List all currently connected devices.
    fn devices(&mut self) -> Result<Vec<Self::Entry>>;

    /// Open a connection to the given device.
    fn open(&mut self, entry: &Self::Entry) -> Result<Self::Connection>;
}

/// An opened device connection.
///
/// Cloning yields another handle to the same connection, so several ports
/// on a multi-interface device can share it. The connection is closed when
/// the last handle is dropped.
pub trait Connection: Clone {
    /// Claimed interface type.
    type Claimed: ClaimedInterface;

    /// Describe every interface on the device.
    fn interfaces(&self) -> Result<Vec<InterfaceDesc>>;

    /// Claim the given interface for exclusive use.
    ///
    /// Fails with [`Error::ClaimFailed`](crate::Error::ClaimFailed) when the
    /// host stack refuses, e.g. because the interface is held elsewhere.
    fn claim_interface(&self, number: u8) -> Result<Self::Claimed>;
}

/// A claimed interface carrying the transfer primitives.
///
/// The claim is released when the value is dropped. Transfers block until
/// the host stack completes or reports a failure.
pub trait ClaimedInterface {
    /// Issue a vendor OUT control transfer with no data stage.
    fn control_out(&mut self, request: u8, value: u16, index: u16) -> Result<()>;

    /// Issue a bulk IN transfer requesting at most `max_len` bytes.
    ///
    /// Returns the bytes the device actually delivered; a short or empty
    /// completion is not an error.
    fn bulk_in(&mut self, endpoint: u8, max_len: usize) -> Result<Vec<u8>>;

    /// Issue a bulk OUT transfer and return the number of bytes accepted.
    fn bulk_out(&mut self, endpoint: u8, data: &[u8]) -> Result<usize>;
}

// ---- Scripted mock for unit tests ----

#[cfg(test)]
pub(crate) mod mock {
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    use super::*;
    use crate::error::Error;

    /// Scripted reply for one bulk IN transfer.
    pub(crate) enum InReply {
        /// Deliver these bytes (truncated to the requested length).
        Data(Vec<u8>),
        /// Report a transport failure.
        Fail,
    }

    /// Per-interface mock state: scripted replies plus a log of everything
    /// the driver did to it.
    pub(crate) struct InterfaceState {
        pub endpoints: Vec<EndpointDesc>,
        pub claimed: bool,
        pub refuse_claim: bool,
        pub control_fail: bool,
        pub control_log: Vec<(u8, u16, u16)>,
        pub in_script: VecDeque<InReply>,
        pub in_requests: Vec<usize>,
        pub out_chunks: Vec<Vec<u8>>,
        pub out_fail_at: Option<usize>,
        pub out_accept_limit: Option<usize>,
    }

    impl InterfaceState {
        pub fn new() -> Self {
            Self {
                endpoints: serial_endpoints(),
                claimed: false,
                refuse_claim: false,
                control_fail: false,
                control_log: Vec::new(),
                in_script: VecDeque::new(),
                in_requests: Vec::new(),
                out_chunks: Vec::new(),
                out_fail_at: None,
                out_accept_limit: None,
            }
        }
    }

    /// One bulk IN + one bulk OUT endpoint, 64-byte packets.
    pub(crate) fn serial_endpoints() -> Vec<EndpointDesc> {
        vec![
            EndpointDesc {
                address: 0x81,
                direction: Direction::In,
                max_packet_size: 64,
            },
            EndpointDesc {
                address: 0x02,
                direction: Direction::Out,
                max_packet_size: 64,
            },
        ]
    }

    #[derive(Clone)]
    pub(crate) struct MockConnection {
        pub state: Rc<RefCell<Vec<InterfaceState>>>,
    }

    impl MockConnection {
        pub fn new(interface_count: usize) -> Self {
            let states = (0..interface_count).map(|_| InterfaceState::new()).collect();
            Self {
                state: Rc::new(RefCell::new(states)),
            }
        }

        pub fn with_state(&self, number: u8, f: impl FnOnce(&mut InterfaceState)) {
            f(&mut self.state.borrow_mut()[number as usize]);
        }
    }

    impl Connection for MockConnection {
        type Claimed = MockClaimed;

        fn interfaces(&self) -> Result<Vec<InterfaceDesc>> {
            Ok(self
                .state
                .borrow()
                .iter()
                .enumerate()
                .map(|(i, s)| InterfaceDesc {
                    number: i as u8,
                    endpoints: s.endpoints.clone(),
                })
                .collect())
        }

        fn claim_interface(&self, number: u8) -> Result<MockClaimed> {
            let mut states = self.state.borrow_mut();
            let state = &mut states[number as usize];
            if state.claimed || state.refuse_claim {
                return Err(Error::ClaimFailed);
            }
            state.claimed = true;
            Ok(MockClaimed {
                state: Rc::clone(&self.state),
                number,
            })
        }
    }

    pub(crate) struct MockClaimed {
        state: Rc<RefCell<Vec<InterfaceState>>>,
        number: u8,
    }

    impl Drop for MockClaimed {
        fn drop(&mut self) {
            self.state.borrow_mut()[self.number as usize].claimed = false;
        }
    }

    impl ClaimedInterface for MockClaimed {
        fn control_out(&mut self, request: u8, value: u16, index: u16) -> Result<()> {
            let mut states = self.state.borrow_mut();
            let state = &mut states[self.number as usize];
            state.control_log.push((request, value, index));
            if state.control_fail {
                return Err(Error::TransportFailure("control transfer"));
            }
            Ok(())
        }

        fn bulk_in(&mut self, _endpoint: u8, max_len: usize) -> Result<Vec<u8>> {
            let mut states = self.state.borrow_mut();
            let state = &mut states[self.number as usize];
            state.in_requests.push(max_len);
            match state.in_script.pop_front() {
                Some(InReply::Data(mut data)) => {
                    data.truncate(max_len);
                    Ok(data)
                }
                Some(InReply::Fail) => Err(Error::TransportFailure("bulk in")),
                // Nothing queued: zero-length completion.
                None => Ok(Vec::new()),
            }
        }

        fn bulk_out(&mut self, _endpoint: u8, data: &[u8]) -> Result<usize> {
            let mut states = self.state.borrow_mut();
            let state = &mut states[self.number as usize];
            if state.out_fail_at == Some(state.out_chunks.len()) {
                return Err(Error::TransportFailure("bulk out"));
            }
            // Short completion: accept at most `out_accept_limit` bytes per
            // transfer and report the accepted count, as a real endpoint may.
            let accepted = match state.out_accept_limit {
                Some(limit) => data.len().min(limit),
                None => data.len(),
            };
            state.out_chunks.push(data[..accepted].to_vec());
            Ok(accepted)
        }
    }

    #[derive(Clone)]
    pub(crate) struct MockEntry {
        pub identity: DeviceIdentity,
        pub connection: MockConnection,
        pub fail_open: bool,
    }

    impl MockEntry {
        pub fn new(identity: DeviceIdentity, interface_count: usize) -> Self {
            Self {
                identity,
                connection: MockConnection::new(interface_count),
                fail_open: false,
            }
        }
    }

    impl DeviceEntry for MockEntry {
        fn identity(&self) -> DeviceIdentity {
            self.identity
        }
    }

    pub(crate) struct MockHost {
        pub entries: Vec<MockEntry>,
    }

    impl UsbHost for MockHost {
        type Entry = MockEntry;
        type Connection = MockConnection;

        fn devices(&mut self) -> Result<Vec<MockEntry>> {
            Ok(self.entries.clone())
        }

        fn open(&mut self, entry: &MockEntry) -> Result<MockConnection> {
            if entry.fail_open {
                return Err(Error::TransportFailure("open device"));
            }
            Ok(entry.connection.clone())
        }
    }
}
