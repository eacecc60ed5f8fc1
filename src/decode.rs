//! Image decode service.
//!
//! Decoding runs off the editor: the editor hands bytes to an
//! [`ImageDecoder`], gets a future back, and commits the result once the
//! future resolves.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use thiserror::Error;

/// Errors that can occur while decoding an uploaded image
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Failed to decode image: {0}")]
    Invalid(#[from] image::ImageError),

    #[error("Image has zero size: {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("Image decoding was abandoned before it finished")]
    Abandoned,
}

/// A successfully decoded upload: the original bytes and their pixel size
#[derive(Clone)]
pub struct DecodedImage {
    pub bytes: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecodedImage")
            .field("data_len", &self.bytes.len())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

pub type DecodeFuture = BoxFuture<'static, Result<DecodedImage, DecodeError>>;

/// Turns raw image bytes into natural pixel dimensions, asynchronously
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: Arc<Vec<u8>>) -> DecodeFuture;
}

/// Decodes with the `image` crate.
///
/// Natively the work happens on a worker thread so the UI keeps running;
/// on the web it happens when the future is first polled.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl RasterDecoder {
    /// Fully decode `bytes`, the same check a browser performs before `onload`
    pub fn decode_blocking(bytes: Arc<Vec<u8>>) -> Result<DecodedImage, DecodeError> {
        let image = image::load_from_memory(&bytes)?;
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(DecodeError::EmptyImage { width, height });
        }
        log::debug!("Decoded image: {}x{} ({} bytes)", width, height, bytes.len());
        Ok(DecodedImage {
            bytes,
            width,
            height,
        })
    }
}

impl ImageDecoder for RasterDecoder {
    #[cfg(not(target_arch = "wasm32"))]
    fn decode(&self, bytes: Arc<Vec<u8>>) -> DecodeFuture {
        let (sender, receiver) = futures::channel::oneshot::channel();
        std::thread::spawn(move || {
            // The receiver may be gone if the editor was dropped meanwhile
            let _ = sender.send(Self::decode_blocking(bytes));
        });
        async move { receiver.await.unwrap_or(Err(DecodeError::Abandoned)) }.boxed()
    }

    #[cfg(target_arch = "wasm32")]
    fn decode(&self, bytes: Arc<Vec<u8>>) -> DecodeFuture {
        async move { Self::decode_blocking(bytes) }.boxed()
    }
}
