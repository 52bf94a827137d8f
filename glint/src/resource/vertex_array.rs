#[cfg(feature = "log-lifetimes")]
use tracing::trace;

use super::Buffer;
use crate::GlintError;
use crate::driver::{BufferTarget, Driver, Handle, ObjectKind};
use crate::traits::Destructible;

/// Component type of a vertex attribute
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum AttributeFormat {
    #[default]
    F32,
    I32,
    U32,
    I16,
    U16,
    I8,
    U8,
}

impl AttributeFormat {
    pub fn size_bytes(self) -> u32 {
        match self {
            Self::F32 | Self::I32 | Self::U32 => 4,
            Self::I16 | Self::U16 => 2,
            Self::I8 | Self::U8 => 1,
        }
    }
}

/// Layout of one attribute within a vertex buffer
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VertexAttribute {
    /// Shader attribute location
    pub index: u32,
    /// Between 1 and 4
    pub components: u8,
    pub format: AttributeFormat,
    /// Map integer formats to `[0, 1]` or `[-1, 1]`
    pub normalized: bool,
    /// Byte distance between consecutive vertices, 0 for tightly packed
    pub stride: u32,
    pub offset: u32,
}

impl VertexAttribute {
    pub fn new(index: u32, components: u8, format: AttributeFormat) -> Self {
        Self {
            index,
            components,
            format,
            normalized: false,
            stride: 0,
            offset: 0,
        }
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.stride = stride;
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    pub fn normalized(mut self) -> Self {
        self.normalized = true;
        self
    }

    /// Bytes one vertex occupies for this attribute alone
    pub fn size_bytes(&self) -> u32 {
        self.components as u32 * self.format.size_bytes()
    }
}

/// Records which buffers feed which attributes, and the optional index buffer
#[derive(Debug)]
pub struct VertexArray<D: Driver> {
    handle: Option<Handle>,
    driver: D,
    attributes: Vec<VertexAttribute>,
    index_buffer: Option<Handle>,
}

impl<D: Driver> VertexArray<D> {
    pub fn new(driver: D) -> Result<Self, GlintError> {
        let handle = driver.allocate(ObjectKind::VertexArray)?;

        #[cfg(feature = "log-lifetimes")]
        trace!("Creating vertex array {handle}");

        Ok(Self {
            handle: Some(handle),
            driver,
            attributes: Vec::new(),
            index_buffer: None,
        })
    }

    /// Source attribute `attribute.index` from `buffer`, replacing any previous binding of that
    /// index
    pub fn add_attribute(
        &mut self,
        buffer: &Buffer<D>,
        attribute: VertexAttribute,
    ) -> Result<(), GlintError> {
        let handle = self.handle.ok_or(GlintError::Destroyed)?;
        if !(1..=4).contains(&attribute.components) {
            return Err(GlintError::InvalidAttribute(attribute.components));
        }
        if buffer.target() != BufferTarget::Vertex {
            return Err(GlintError::BufferTargetMismatch {
                expected: BufferTarget::Vertex,
                found: buffer.target(),
            });
        }
        let buffer_handle = buffer.handle().ok_or(GlintError::Destroyed)?;
        self.driver
            .set_vertex_attribute(handle, buffer_handle, &attribute)?;

        self.attributes
            .retain(|existing| existing.index != attribute.index);
        self.attributes.push(attribute);
        Ok(())
    }

    pub fn set_index_buffer(&mut self, buffer: &Buffer<D>) -> Result<(), GlintError> {
        let handle = self.handle.ok_or(GlintError::Destroyed)?;
        if buffer.target() != BufferTarget::Index {
            return Err(GlintError::BufferTargetMismatch {
                expected: BufferTarget::Index,
                found: buffer.target(),
            });
        }
        let buffer_handle = buffer.handle().ok_or(GlintError::Destroyed)?;
        self.driver.set_index_buffer(handle, buffer_handle)?;
        self.index_buffer = Some(buffer_handle);
        Ok(())
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    pub fn index_buffer(&self) -> Option<Handle> {
        self.index_buffer
    }
}

impl<D: Driver> Destructible for VertexArray<D> {
    fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            #[cfg(feature = "log-lifetimes")]
            trace!("Destroying vertex array {handle}");

            self.driver.release(handle);
            self.attributes.clear();
            self.index_buffer = None;
        }
    }
}

#[cfg(feature = "raii")]
impl<D: Driver> Drop for VertexArray<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
