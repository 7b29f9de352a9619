//! Error type shared by every driver in the crate

pub use display_interface::DisplayError;

/// Convenience alias used throughout the crate
pub type Result<T> = core::result::Result<T, Error>;

/// Errors reported by the drivers.
///
/// Bad device ids, digit positions, bitmap sizes and other caller bugs are not
/// represented here: those are assertion failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Width/height combination the device cannot drive
    #[error("Unsupported display mode: {width} x {height}")]
    UnsupportedMode {
        /// Requested width in pixels
        width: u32,
        /// Requested height in pixels
        height: u32,
    },

    /// Width the segment device cannot drive
    #[error("Unsupported display mode: width={width}")]
    UnsupportedWidth {
        /// Requested width in characters
        width: u32,
    },

    /// Block orientation other than 0, 90, -90 or 180
    #[error("Invalid block orientation: {0}")]
    InvalidBlockOrientation(i32),

    /// Rotation other than 0, 90, 180 or 270 degrees
    #[error("Invalid rotation: {0}")]
    InvalidRotation(u16),

    /// Custom pixel mapping does not cover the device
    #[error("Mapping table has {actual} entries, device has {expected} pixels")]
    MappingLength {
        /// Number of pixels on the device
        expected: usize,
        /// Number of entries supplied
        actual: usize,
    },

    /// Custom pixel mapping points past the end of the chain
    #[error("Mapping entry {index} is outside the chain of {len} pixels")]
    MappingOutOfRange {
        /// Offending physical index
        index: usize,
        /// Number of pixels on the chain
        len: usize,
    },

    /// Substitute character has no segment pattern itself
    #[error("Substitute character {0:?} has no segment pattern")]
    UnknownSubstitute(char),

    /// Rendered text is wider than the device
    #[error("Device's capabilities insufficient for value '{text}'")]
    Overflow {
        /// The text that did not fit
        text: String,
    },

    /// SPI, GPIO or PWM failure
    #[error("Transport error: {0:?}")]
    Transport(DisplayError),

    /// Addressable strip driver reported a non-zero status
    #[error("Pixel driver render failed with status {code}")]
    Render {
        /// Status code returned by the driver
        code: i32,
    },

    /// HUB08 refresh thread could not be started
    #[error("Could not spawn refresh thread: {0}")]
    ThreadSpawn(#[from] std::io::Error),

    /// HUB08 refresh thread panicked
    #[error("Refresh thread panicked")]
    RefreshThreadPanicked,
}

impl From<DisplayError> for Error {
    fn from(err: DisplayError) -> Self {
        Error::Transport(err)
    }
}
