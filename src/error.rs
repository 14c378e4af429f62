//! Error types for the ftdi-serial crate.

/// The error type for driver operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An error from the nusb USB layer.
    #[error("USB error: {0}")]
    Usb(#[from] nusb::Error),

    /// A USB transfer error.
    #[error("USB transfer error: {0}")]
    Transfer(#[from] nusb::transfer::TransferError),

    /// Device discovery found no device matching the known identities.
    #[error("no matching FTDI device found")]
    NoMatchingDevice,

    /// Could not claim the USB interface.
    #[error("unable to claim USB interface; make sure it is not in use elsewhere")]
    ClaimFailed,

    /// The interface does not expose a bulk IN / bulk OUT endpoint pair.
    #[error("interface does not expose two bulk endpoints")]
    InvalidInterface,

    /// I/O was attempted on a port that is not open.
    #[error("port is not open")]
    NotOpen,

    /// The underlying control or bulk transfer reported a hard failure.
    #[error("transport failure: {0}")]
    TransportFailure(&'static str),

    /// The active configuration descriptor could not be read.
    #[error("unable to read USB configuration descriptor")]
    Configuration,
}

/// A specialized `Result` type for driver operations.
pub type Result<T> = std::result::Result<T, Error>;
