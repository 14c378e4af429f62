//! FTDI chip initialization sequence.
//!
//! Opening a port issues six vendor control transfers that reset the chip
//! and configure it for a fixed 8N1 serial profile at the requested baud
//! rate. Multi-interface chips select the target port through the `wIndex`
//! field of each request.

use crate::baudrate::compute_divisor;
use crate::constants::*;
use crate::error::Result;
use crate::host::ClaimedInterface;

/// How control-transfer failures during chip setup are handled.
///
/// The FTDI command model is forgiving: a chip that misses one setup request
/// usually still comes up usable, and a control write may legitimately
/// complete short. [`Lenient`](InitMode::Lenient) preserves that legacy
/// behavior; [`Strict`](InitMode::Strict) aborts on the first failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitMode {
    /// Log failed steps and continue. Partial initialization is accepted.
    #[default]
    Lenient,
    /// Abort on the first failed step.
    Strict,
}

/// One step of the setup sequence.
struct InitStep {
    label: &'static str,
    request: u8,
    value: u16,
}

/// The fixed six-step setup sequence, in issue order.
fn setup_sequence(divisor: u16) -> [InitStep; 6] {
    [
        InitStep {
            label: "reset",
            request: SIO_RESET_REQUEST,
            value: SIO_RESET_SIO,
        },
        InitStep {
            label: "purge rx",
            request: SIO_RESET_REQUEST,
            value: SIO_RESET_PURGE_RX,
        },
        InitStep {
            label: "purge tx",
            request: SIO_RESET_REQUEST,
            value: SIO_RESET_PURGE_TX,
        },
        InitStep {
            label: "flow control off",
            request: SIO_SET_FLOW_CTRL_REQUEST,
            value: SIO_DISABLE_FLOW_CTRL,
        },
        InitStep {
            label: "set baud rate",
            request: SIO_SET_BAUDRATE_REQUEST,
            value: divisor,
        },
        InitStep {
            label: "line 8N1",
            request: SIO_SET_DATA_REQUEST,
            value: SIO_DATA_8N1,
        },
    ]
}

/// Reset and configure one FTDI interface for 8N1 serial at `baudrate`.
///
/// `index` is the control-transfer `wIndex` selecting the interface on
/// multi-interface chips. The sequence is never retried or rolled back.
pub(crate) fn initialize(
    iface: &mut impl ClaimedInterface,
    index: u16,
    baudrate: u32,
    mode: InitMode,
) -> Result<()> {
    let divisor = compute_divisor(baudrate);
    let mut failed: Vec<&'static str> = Vec::new();

    for step in setup_sequence(divisor) {
        match iface.control_out(step.request, step.value, index) {
            Ok(()) => {}
            Err(err) if mode == InitMode::Strict => return Err(err),
            Err(err) => {
                log::warn!("chip setup step '{}' failed: {}", step.label, err);
                failed.push(step.label);
            }
        }
    }

    if !failed.is_empty() {
        log::warn!(
            "chip setup finished with {} failed step(s): {}",
            failed.len(),
            failed.join(", ")
        );
    }
    Ok(())
}
