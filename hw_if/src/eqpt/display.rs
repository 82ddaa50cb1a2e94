//! # Numeric status display boundary
//!
//! The display is a four digit 7-segment module with per-digit decimal
//! points. The bit-level rasterisation protocol lives in the display driver
//! itself; the supervisor only pushes values at this boundary.

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors raised by a display backend.
#[derive(thiserror::Error, Debug)]
pub enum DisplayError {
    #[error("Display value must be between 0 and 9999, got {0}")]
    ValueOutOfRange(u16),

    #[error("The display peripheral rejected the command")]
    Rejected,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Trait providing write access to the numeric status display.
pub trait Display: Send {
    /// Show `value` (0 to 9999) with the decimal points given by `dot_mask`
    /// (bit n lights the point after digit n, most significant digit first).
    fn set_value(&mut self, value: u16, dot_mask: u8) -> Result<(), DisplayError>;

    /// Blank the display.
    fn clear(&mut self) -> Result<(), DisplayError>;
}
