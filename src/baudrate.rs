//! Baud rate calculation for FT232BM / FT2232C / FT232RL chips.
//!
//! These chips derive the baud rate from a 48 MHz clock through a 16x
//! predivisor and a 3-bit fractional divider. The 16-bit value programmed
//! into the baud-rate generator packs the integer divisor in the low 14 bits
//! and the fractional selection in the top 2 bits.

use crate::constants::{C_CLK, MAX_BAUDRATE};

/// Baud rate substituted when the requested rate cannot be generated.
const FALLBACK_BAUDRATE: u32 = 9600;

/// Convert a requested baud rate into the 16-bit FTDI clock divisor.
///
/// Rates above 3 Mbaud (and a requested rate of 0) cannot be generated;
/// the divisor for 9600 baud is substituted and a warning is logged. The
/// device is still initialized, at the substituted rate.
///
/// Reference values: 9600 -> `0x4138`, 19200 -> `0x809C`, 38400 -> `0xC04E`,
/// 57600 -> `0x0034`, 115200 -> `0x001A`, 230400 -> `0x000D`.
pub fn compute_divisor(requested_baud: u32) -> u16 {
    if requested_baud == 0 || requested_baud > MAX_BAUDRATE {
        log::warn!(
            "cannot generate {} baud, substituting {} baud",
            requested_baud,
            FALLBACK_BAUDRATE
        );
        return divisor_for(FALLBACK_BAUDRATE, C_CLK);
    }
    divisor_for(requested_baud, C_CLK)
}

/// Divisor calculation for a given base clock.
///
/// The integer part is `base / 16 / baud`. The fractional part is selected
/// from `base / 2 / baud`: bit 2 encodes +0.5 (`0x4000`), bit 1 encodes
/// +0.25 (`0x8000`), bit 0 encodes +0.125 (`0xC000`).
fn divisor_for(baud: u32, base: u32) -> u16 {
    let whole = base / 16 / baud;
    let half = base / 2 / baud;

    let fractional: u32 = if half & 4 != 0 {
        0x4000
    } else if half & 2 != 0 {
        0x8000
    } else if half & 1 != 0 {
        0xC000
    } else {
        0
    };

    (whole | fractional) as u16
}
