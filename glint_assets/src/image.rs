//! Decoding images into [`ImageData`] and uploading them as textures.

use std::path::{Path, PathBuf};

use ::image::{DynamicImage, ImageError};
use glint::Driver;
use glint::resource::{ImageData, Sampling, Texture, TextureCreateInfo};
use tracing::debug;

use crate::LoaderError;

fn decode_image(bytes: &[u8]) -> Result<ImageData, ImageError> {
    let image = ::image::load_from_memory(bytes)?;
    Ok(into_image_data(image))
}

/// Keeps the channel count of the source, narrowing every channel to 8 bits
fn into_image_data(image: DynamicImage) -> ImageData {
    let (width, height) = (image.width(), image.height());
    let (channels, pixels) = match image.color().channel_count() {
        1 => (1, image.into_luma8().into_raw()),
        2 => (2, image.into_luma_alpha8().into_raw()),
        3 => (3, image.into_rgb8().into_raw()),
        _ => (4, image.into_rgba8().into_raw()),
    };
    ImageData {
        width,
        height,
        channels,
        pixels,
    }
}

/// Decode an encoded image held in memory
pub fn decode(bytes: &[u8]) -> Result<ImageData, LoaderError> {
    decode_image(bytes).map_err(|source| LoaderError::Decode { path: None, source })
}

pub fn read_image(path: impl AsRef<Path>) -> Result<ImageData, LoaderError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_image(&bytes).map_err(|source| LoaderError::Decode {
        path: Some(path.to_path_buf()),
        source,
    })
}

/// Read on the runtime and decode on its blocking pool
pub async fn read_image_async(path: impl Into<PathBuf>) -> Result<ImageData, LoaderError> {
    let path = path.into();
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|source| LoaderError::Io {
            path: path.clone(),
            source,
        })?;
    tokio::task::spawn_blocking(move || decode_image(&bytes))
        .await
        .map_err(|err| LoaderError::Worker(err.to_string()))?
        .map_err(|source| LoaderError::Decode {
            path: Some(path),
            source,
        })
}

/// Read, decode and upload an image. Nothing reaches the driver if decoding fails.
pub fn load_texture<D: Driver>(
    driver: D,
    path: impl AsRef<Path>,
    sampling: Sampling,
) -> Result<Texture<D>, LoaderError> {
    let path = path.as_ref();
    let image = read_image(path)?;
    debug!(
        path = %path.display(),
        width = image.width,
        height = image.height,
        channels = image.channels,
        "Decoded texture"
    );
    Ok(Texture::new(TextureCreateInfo {
        driver,
        image: &image,
        sampling,
    })?)
}
