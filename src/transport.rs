//! Status-byte framing over raw USB bulk transfers.
//!
//! The FTDI chip prefixes every bulk IN packet with 2 modem/line status
//! bytes that are not payload. [`FramedTransport`] strips that prefix on the
//! read path and chunks writes at the endpoint packet size on the write
//! path. Status bytes are discarded; this driver does not surface modem or
//! line state.

use crate::constants::STATUS_BYTES;
use crate::error::{Error, Result};
use crate::host::ClaimedInterface;
use crate::port::PortHandle;

/// Byte-stream reads and writes over one claimed interface.
pub(crate) struct FramedTransport<'a, I: ClaimedInterface> {
    iface: &'a mut I,
    handle: &'a PortHandle,
}

impl<'a, I: ClaimedInterface> FramedTransport<'a, I> {
    pub(crate) fn new(iface: &'a mut I, handle: &'a PortHandle) -> Self {
        Self { iface, handle }
    }

    /// Read up to `buf.len()` payload bytes.
    ///
    /// Issues repeated bulk IN transfers, each requesting at most
    /// `min(packet size, remaining + 2)` bytes, and strips the 2-byte status
    /// prefix from every completion. A completion carrying only status bytes
    /// means no more data is currently available and ends the read with
    /// whatever was accumulated; returning 0 is "nothing to read right now",
    /// not an error.
    pub(crate) fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut total = 0;

        while total < buf.len() {
            let remaining = buf.len() - total;
            let request = (remaining + STATUS_BYTES).min(self.handle.in_max_packet);

            let packet = self.iface.bulk_in(self.handle.in_endpoint, request)?;
            if packet.len() <= STATUS_BYTES {
                break;
            }

            let payload = &packet[STATUS_BYTES..];
            let n = payload.len().min(remaining);
            buf[total..total + n].copy_from_slice(&payload[..n]);
            total += n;
        }

        Ok(total)
    }

    /// Write all of `buf`, chunked at the endpoint packet size.
    ///
    /// Bulk OUT packets carry no status prefix. Each transfer offers at
    /// most one packet and the next one resumes from the byte count the
    /// device actually accepted, so a short completion never punches a
    /// hole in the stream. Any failed transfer aborts the whole write;
    /// there is no partial-success value. Returns the total byte count on
    /// success.
    pub(crate) fn write(&mut self, buf: &[u8]) -> Result<usize> {
        let mut written = 0;

        while written < buf.len() {
            let end = (written + self.handle.out_max_packet).min(buf.len());
            let n = self
                .iface
                .bulk_out(self.handle.out_endpoint, &buf[written..end])?;
            if n == 0 {
                // A device accepting nothing would spin this loop forever.
                return Err(Error::TransportFailure("bulk out accepted no bytes"));
            }
            written += n;
        }

        Ok(written)
    }
}
