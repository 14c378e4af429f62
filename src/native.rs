//! Host USB stack implementation backed by [nusb](https://crates.io/crates/nusb).
//!
//! No C dependencies or `libusb` required. [`NusbHost`] plugs into
//! [`DeviceRegistry`](crate::DeviceRegistry); transfers block with a
//! configurable timeout.
//!
//! Hot-plug delivery is the caller's concern: wire the events of
//! `nusb::watch_devices()` to
//! [`DeviceRegistry::attach`](crate::DeviceRegistry::attach) /
//! [`DeviceRegistry::detach`](crate::DeviceRegistry::detach).

use std::time::Duration;

use nusb::transfer::{Bulk, ControlOut, ControlType, In, Out, Recipient};
use nusb::{DeviceInfo, MaybeFuture};

use crate::error::{Error, Result};
use crate::host::{
    ClaimedInterface, Connection, DeviceEntry, DeviceIdentity, Direction, EndpointDesc,
    InterfaceDesc, UsbHost,
};

/// Default transfer timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// The production [`UsbHost`]: enumerates and opens devices through nusb.
pub struct NusbHost {
    timeout: Duration,
}

impl NusbHost {
    /// Create a host with the default 5 s transfer timeout.
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a host with a custom transfer timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for NusbHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceEntry for DeviceInfo {
    fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(self.vendor_id(), self.product_id())
    }
}

impl UsbHost for NusbHost {
    type Entry = DeviceInfo;
    type Connection = NusbConnection;

    fn devices(&mut self) -> Result<Vec<DeviceInfo>> {
        Ok(nusb::list_devices().wait()?.collect())
    }

    fn open(&mut self, entry: &DeviceInfo) -> Result<NusbConnection> {
        let device = entry.open().wait()?;
        Ok(NusbConnection {
            device,
            timeout: self.timeout,
        })
    }
}

/// An opened nusb device connection. Clones share the underlying device.
#[derive(Clone)]
pub struct NusbConnection {
    device: nusb::Device,
    timeout: Duration,
}

impl Connection for NusbConnection {
    type Claimed = NusbInterface;

    fn interfaces(&self) -> Result<Vec<InterfaceDesc>> {
        let config = self
            .device
            .active_configuration()
            .map_err(|_| Error::Configuration)?;

        let mut descriptors = Vec::new();
        for iface_group in config.interfaces() {
            let mut endpoints = Vec::new();
            // Endpoints of the default alternate setting; FTDI chips expose
            // exactly one bulk pair per interface there.
            if let Some(alt) = iface_group.alt_settings().next() {
                for ep in alt.endpoints() {
                    if ep.transfer_type() != nusb::descriptors::TransferType::Bulk {
                        continue;
                    }
                    let direction = match ep.direction() {
                        nusb::transfer::Direction::In => Direction::In,
                        nusb::transfer::Direction::Out => Direction::Out,
                    };
                    endpoints.push(EndpointDesc {
                        address: ep.address(),
                        direction,
                        max_packet_size: ep.max_packet_size(),
                    });
                }
            }
            descriptors.push(InterfaceDesc {
                number: iface_group.interface_number(),
                endpoints,
            });
        }
        Ok(descriptors)
    }

    fn claim_interface(&self, number: u8) -> Result<NusbInterface> {
        // Detach kernel driver (e.g. ftdi_sio) and claim the interface.
        let interface = self
            .device
            .detach_and_claim_interface(number)
            .wait()
            .map_err(|_| Error::ClaimFailed)?;
        Ok(NusbInterface {
            interface,
            timeout: self.timeout,
        })
    }
}

/// A claimed nusb interface. Dropping it releases the claim.
pub struct NusbInterface {
    interface: nusb::Interface,
    timeout: Duration,
}

impl ClaimedInterface for NusbInterface {
    fn control_out(&mut self, request: u8, value: u16, index: u16) -> Result<()> {
        self.interface
            .control_out(
                ControlOut {
                    control_type: ControlType::Vendor,
                    recipient: Recipient::Device,
                    request,
                    value,
                    index,
                    data: &[],
                },
                self.timeout,
            )
            .wait()?;
        Ok(())
    }

    fn bulk_in(&mut self, endpoint: u8, max_len: usize) -> Result<Vec<u8>> {
        let mut ep = self
            .interface
            .endpoint::<Bulk, In>(endpoint)
            .map_err(Error::Usb)?;

        let buffer = nusb::transfer::Buffer::new(max_len);
        let completion = ep.transfer_blocking(buffer, self.timeout);
        completion.status.map_err(Error::Transfer)?;

        let mut data = completion.buffer.into_vec();
        data.truncate(completion.actual_len);
        Ok(data)
    }

    fn bulk_out(&mut self, endpoint: u8, data: &[u8]) -> Result<usize> {
        let mut ep = self
            .interface
            .endpoint::<Bulk, Out>(endpoint)
            .map_err(Error::Usb)?;

        let mut buffer = nusb::transfer::Buffer::new(data.len());
        buffer.extend_from_slice(data);

        let completion = ep.transfer_blocking(buffer, self.timeout);
        completion.status.map_err(Error::Transfer)?;
        Ok(completion.actual_len)
    }
}
