#[cfg(feature = "log-lifetimes")]
use tracing::trace;

use crate::GlintError;
use crate::driver::{BufferTarget, BufferUsage, Driver, Handle, ObjectKind};
use crate::traits::Destructible;

/// A vertex or index buffer object
#[derive(Debug)]
pub struct Buffer<D: Driver> {
    handle: Option<Handle>,
    driver: D,
    target: BufferTarget,
    usage: BufferUsage,
    size: usize,
}

pub struct BufferCreateInfo<'a, D: Driver> {
    pub driver: D,
    pub target: BufferTarget,
    pub usage: BufferUsage,
    /// Initial contents, may be empty
    pub data: &'a [u8],
}

impl<D: Driver> Buffer<D> {
    pub fn new(create_info: BufferCreateInfo<'_, D>) -> Result<Self, GlintError> {
        let BufferCreateInfo {
            driver,
            target,
            usage,
            data,
        } = create_info;
        let handle = driver.allocate(ObjectKind::Buffer { target, usage })?;

        #[cfg(feature = "log-lifetimes")]
        trace!("Creating buffer {handle}");

        let mut buffer = Self {
            handle: Some(handle),
            driver,
            target,
            usage,
            size: 0,
        };
        if !data.is_empty() {
            if let Err(err) = buffer.upload(data) {
                buffer.destroy();
                return Err(err);
            }
        }
        Ok(buffer)
    }

    /// Replace the buffer contents with `content`
    pub fn upload<T: bytemuck::Pod>(&mut self, content: &[T]) -> Result<(), GlintError> {
        let handle = self.handle.ok_or(GlintError::Destroyed)?;
        let bytes: &[u8] = bytemuck::cast_slice(content);
        self.driver.upload(handle, bytes)?;
        self.size = bytes.len();
        Ok(())
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn target(&self) -> BufferTarget {
        self.target
    }

    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    /// Size in bytes of the last upload
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<D: Driver> Destructible for Buffer<D> {
    fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            #[cfg(feature = "log-lifetimes")]
            trace!("Destroying buffer {handle}");

            self.driver.release(handle);
        }
    }
}

#[cfg(feature = "raii")]
impl<D: Driver> Drop for Buffer<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
