use std::collections::{HashMap, HashSet};

use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use thiserror::Error;

use crate::element::{ImageData, ObjectId};

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Image has no pixels held in memory")]
    NotEmbedded,
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Image failed to decode earlier")]
    PreviouslyFailed,
}

/// Caches GPU textures for image objects, keyed by object id
pub struct TextureManager {
    texture_cache: HashMap<ObjectId, TextureHandle>,
    /// Tracks when each texture was last used
    last_used: HashMap<ObjectId, u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
    /// Images whose bytes could not be decoded; not retried
    failed: HashSet<ObjectId>,
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new(64)
    }
}

impl TextureManager {
    /// Creates a new texture manager with the specified cache size
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
            failed: HashSet::new(),
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    pub fn len(&self) -> usize {
        self.texture_cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texture_cache.is_empty()
    }

    /// Gets or uploads the texture for an image object
    pub fn get_or_create(
        &mut self,
        ctx: &Context,
        id: ObjectId,
        image: &ImageData,
    ) -> Result<TextureId, TextureGenerationError> {
        if let Some(handle) = self.texture_cache.get(&id) {
            self.last_used.insert(id, self.current_frame);
            return Ok(handle.id());
        }

        if self.failed.contains(&id) {
            return Err(TextureGenerationError::PreviouslyFailed);
        }

        let color_image = match Self::color_image(image) {
            Ok(color_image) => color_image,
            Err(err) => {
                log::warn!("No texture for image {}: {}", id, err);
                self.failed.insert(id);
                return Err(err);
            }
        };
        self.prune_cache_if_needed();

        let handle = ctx.load_texture(format!("image_{id}"), color_image, TextureOptions::LINEAR);
        let texture_id = handle.id();
        self.texture_cache.insert(id, handle);
        self.last_used.insert(id, self.current_frame);
        Ok(texture_id)
    }

    fn color_image(image: &ImageData) -> Result<ColorImage, TextureGenerationError> {
        let bytes = image
            .source
            .embedded_bytes()
            .ok_or(TextureGenerationError::NotEmbedded)?;
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_flat_samples().as_slice()))
    }

    /// Drop textures of objects that no longer exist in any visible document
    pub fn retain(&mut self, mut keep: impl FnMut(ObjectId) -> bool) {
        self.texture_cache.retain(|id, _| keep(*id));
        self.failed.retain(|id| keep(*id));
        let cache = &self.texture_cache;
        self.last_used.retain(|id, _| cache.contains_key(id));
    }

    fn prune_cache_if_needed(&mut self) {
        while self.texture_cache.len() >= self.max_cache_size {
            let Some(oldest) = self
                .last_used
                .iter()
                .min_by_key(|(_, frame)| **frame)
                .map(|(id, _)| *id)
            else {
                break;
            };
            log::debug!("Evicting texture for image {}", oldest);
            self.texture_cache.remove(&oldest);
            self.last_used.remove(&oldest);
        }
    }
}
