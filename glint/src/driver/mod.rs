//! The boundary between glint and the graphics driver.
//!
//! Drivers are expected to be called from the thread owning the driver context, so [`Driver`]
//! does not require `Send` or `Sync`.

mod error_code;
mod headless;

use std::fmt;
use std::num::NonZeroU32;

pub use error_code::{DriverErrorCode, drain_errors};
pub use headless::HeadlessDriver;

use crate::GlintError;
use crate::resource::{ImageData, Sampling, VertexAttribute};
use crate::shader::ShaderKind;

/// Opaque identifier of a driver-side object
///
/// Drivers reserve zero for "no object", hence the [`NonZeroU32`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(NonZeroU32);

impl Handle {
    /// Wrap a raw driver name, [`None`] for zero
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BufferTarget {
    /// Per-vertex attribute data
    Vertex,
    /// Element indices
    Index,
}

/// Hint for how often the contents of a buffer change
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    #[default]
    Static,
    Dynamic,
    Stream,
}

/// Every kind of object a [`Driver`] can allocate
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Shader(ShaderKind),
    Program,
    Buffer {
        target: BufferTarget,
        usage: BufferUsage,
    },
    Texture,
    VertexArray,
}

/// Everything glint needs from a graphics driver
pub trait Driver {
    /// Allocate a fresh object of the given kind
    fn allocate(&self, kind: ObjectKind) -> Result<Handle, GlintError>;

    /// Replace the contents of a shader (its source) or buffer (its data)
    fn upload(&self, handle: Handle, data: &[u8]) -> Result<(), GlintError>;

    /// Define the storage and sampling of a texture
    fn upload_image(
        &self,
        handle: Handle,
        image: &ImageData,
        sampling: &Sampling,
    ) -> Result<(), GlintError>;

    /// Compile a shader object, returning whether the driver accepted it
    ///
    /// A rejected source is not an [`Err`]; the reason is available through [`Driver::get_log`].
    fn compile(&self, handle: Handle) -> Result<bool, GlintError>;

    /// Diagnostic text of the last compile (shaders) or link (programs)
    fn get_log(&self, handle: Handle) -> Result<String, GlintError>;

    /// Link compiled shader objects into a new program object
    ///
    /// The program is returned even when linking fails, matching driver behaviour; its log
    /// explains why it is unusable.
    fn link(&self, stages: &[Handle]) -> Result<Handle, GlintError>;

    fn set_vertex_attribute(
        &self,
        vertex_array: Handle,
        buffer: Handle,
        attribute: &VertexAttribute,
    ) -> Result<(), GlintError>;

    fn set_index_buffer(&self, vertex_array: Handle, buffer: Handle) -> Result<(), GlintError>;

    /// Delete an object. Unknown handles are reported on the error stack.
    fn release(&self, handle: Handle);

    /// Pop the oldest code off the driver error stack
    fn pop_error(&self) -> Option<DriverErrorCode>;
}
