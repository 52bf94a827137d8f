//! Thin ownership layer over a graphics driver.
//!
//! Every driver-side object is named by an opaque [`Handle`] handed out by a [`Driver`]. The types
//! in [`resource`] own those handles and release them exactly once, either through
//! [`traits::Destructible::destroy`] or on drop when the `raii` feature is enabled.

pub mod driver;
pub mod error;
pub mod resource;
pub mod shader;
pub mod traits;
pub mod util;

pub use driver::{
    BufferTarget, BufferUsage, Driver, DriverErrorCode, Handle, HeadlessDriver, ObjectKind,
    drain_errors,
};
pub use error::GlintError;

// Re-exports
pub use bytemuck;
