use std::sync::PoisonError;

use crate::driver::{BufferTarget, DriverErrorCode};
use thiserror::Error;

/// Possible errors
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq, Hash)]
pub enum GlintError {
    #[error("Poisoned mutex")]
    Poisoned,

    #[error("Handle {0} does not name a live driver object")]
    InvalidHandle(u32),

    #[error("Object has already been destroyed")]
    Destroyed,

    #[error("Vertex attributes need between 1 and 4 components, got {0}")]
    InvalidAttribute(u8),

    #[error("Expected a {expected:?} buffer, got a {found:?} buffer")]
    BufferTargetMismatch {
        expected: BufferTarget,
        found: BufferTarget,
    },

    #[error("Image holds {found} bytes of pixel data, expected {expected}")]
    ImageSizeMismatch { expected: usize, found: usize },

    #[error("Driver ran out of object handles")]
    HandlesExhausted,

    #[error("Driver reported {0}")]
    Driver(DriverErrorCode),
}

impl<T> From<PoisonError<T>> for GlintError {
    fn from(_: PoisonError<T>) -> Self {
        GlintError::Poisoned
    }
}

impl From<DriverErrorCode> for GlintError {
    fn from(value: DriverErrorCode) -> Self {
        GlintError::Driver(value)
    }
}
