#[cfg(feature = "log-lifetimes")]
use tracing::trace;

use crate::GlintError;
use crate::driver::{Driver, Handle, ObjectKind};
use crate::traits::Destructible;

/// Decoded 8-bit image, `channels` bytes per pixel, rows tightly packed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub channels: u8,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Number of pixel bytes implied by the dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    pub fn validate(&self) -> Result<(), GlintError> {
        let expected = self.expected_len();
        if self.pixels.len() != expected || !(1..=4).contains(&self.channels) {
            return Err(GlintError::ImageSizeMismatch {
                expected,
                found: self.pixels.len(),
            });
        }
        Ok(())
    }
}

/// Behaviour when sampling outside of `[0, 1]`
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Wrap {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    ClampToBorder,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum Filter {
    Nearest,
    #[default]
    Linear,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Sampling {
    /// Wrapping along the x axis
    pub wrap_s: Wrap,
    /// Wrapping along the y axis
    pub wrap_t: Wrap,
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub mipmaps: bool,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            wrap_s: Wrap::default(),
            wrap_t: Wrap::default(),
            min_filter: Filter::default(),
            mag_filter: Filter::default(),
            mipmaps: true,
        }
    }
}

pub struct TextureCreateInfo<'a, D: Driver> {
    pub driver: D,
    pub image: &'a ImageData,
    pub sampling: Sampling,
}

/// A 2D texture object
#[derive(Debug)]
pub struct Texture<D: Driver> {
    handle: Option<Handle>,
    driver: D,
    width: u32,
    height: u32,
    channels: u8,
    sampling: Sampling,
}

impl<D: Driver> Texture<D> {
    pub fn new(create_info: TextureCreateInfo<'_, D>) -> Result<Self, GlintError> {
        let TextureCreateInfo {
            driver,
            image,
            sampling,
        } = create_info;
        image.validate()?;

        let handle = driver.allocate(ObjectKind::Texture)?;
        if let Err(err) = driver.upload_image(handle, image, &sampling) {
            driver.release(handle);
            return Err(err);
        }

        #[cfg(feature = "log-lifetimes")]
        trace!(
            "Creating texture {handle} ({}x{}, {} channels)",
            image.width, image.height, image.channels
        );

        Ok(Self {
            handle: Some(handle),
            driver,
            width: image.width,
            height: image.height,
            channels: image.channels,
            sampling,
        })
    }

    pub fn handle(&self) -> Option<Handle> {
        self.handle
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn sampling(&self) -> Sampling {
        self.sampling
    }
}

impl<D: Driver> Destructible for Texture<D> {
    fn destroy(&mut self) {
        if let Some(handle) = self.handle.take() {
            #[cfg(feature = "log-lifetimes")]
            trace!("Destroying texture {handle}");

            self.driver.release(handle);
        }
    }
}

#[cfg(feature = "raii")]
impl<D: Driver> Drop for Texture<D> {
    fn drop(&mut self) {
        self.destroy();
    }
}
