use std::fmt;

use super::Driver;

/// Codes a driver leaves on its error stack
#[repr(u32)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DriverErrorCode {
    InvalidEnum = 0x0500,
    InvalidValue = 0x0501,
    InvalidOperation = 0x0502,
    StackOverflow = 0x0503,
    StackUnderflow = 0x0504,
    OutOfMemory = 0x0505,
    InvalidFramebufferOperation = 0x0506,
    ContextLost = 0x0507,
}

impl DriverErrorCode {
    /// Translate a raw driver code. Both "no error" (zero) and unknown codes yield [`None`].
    pub fn from_raw(code: u32) -> Option<Self> {
        Some(match code {
            0x0500 => Self::InvalidEnum,
            0x0501 => Self::InvalidValue,
            0x0502 => Self::InvalidOperation,
            0x0503 => Self::StackOverflow,
            0x0504 => Self::StackUnderflow,
            0x0505 => Self::OutOfMemory,
            0x0506 => Self::InvalidFramebufferOperation,
            0x0507 => Self::ContextLost,
            _ => return None,
        })
    }

    pub fn raw(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidEnum => "INVALID_ENUM",
            Self::InvalidValue => "INVALID_VALUE",
            Self::InvalidOperation => "INVALID_OPERATION",
            Self::StackOverflow => "STACK_OVERFLOW",
            Self::StackUnderflow => "STACK_UNDERFLOW",
            Self::OutOfMemory => "OUT_OF_MEMORY",
            Self::InvalidFramebufferOperation => "INVALID_FRAMEBUFFER_OPERATION",
            Self::ContextLost => "CONTEXT_LOST",
        }
    }
}

impl fmt::Display for DriverErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:#06x})", self.name(), self.raw())
    }
}

/// Pops every pending code off the driver error stack, oldest first
pub fn drain_errors<D: Driver + ?Sized>(driver: &D) -> Vec<DriverErrorCode> {
    std::iter::from_fn(|| driver.pop_error()).collect()
}
