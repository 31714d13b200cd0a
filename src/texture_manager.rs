use std::collections::HashMap;
use std::path::{Path, PathBuf};

use egui::{ColorImage, Context, TextureHandle, TextureOptions};
use thiserror::Error;

/// Longest side uploaded to the GPU; larger images are downscaled for preview
pub const MAX_TEXTURE_SIDE: u32 = 4096;

/// Errors that can occur while turning an image file into a texture
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    #[error("Cannot read image {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("Image {path} has no pixels")]
    InvalidDimensions { path: PathBuf },
}

/// A decoded image ready for upload, with the file's own pixel size
pub struct DecodedImage {
    pub image: ColorImage,
    pub original_size: [u32; 2],
}

/// Decodes `path` with the `image` crate into straight RGBA
pub fn decode_image(path: &Path) -> Result<DecodedImage, TextureError> {
    let decoded = image::open(path).map_err(|e| TextureError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let original_size = [decoded.width(), decoded.height()];
    if original_size[0] == 0 || original_size[1] == 0 {
        return Err(TextureError::InvalidDimensions {
            path: path.to_path_buf(),
        });
    }
    let preview = if original_size[0] > MAX_TEXTURE_SIDE || original_size[1] > MAX_TEXTURE_SIDE {
        decoded.thumbnail(MAX_TEXTURE_SIDE, MAX_TEXTURE_SIDE)
    } else {
        decoded
    };
    let rgba = preview.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(DecodedImage {
        image: ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()),
        original_size,
    })
}

/// Caches image files as egui textures, keyed by path
pub struct TextureManager {
    texture_cache: HashMap<PathBuf, TextureHandle>,
    /// Pixel size of the file on disk, which may exceed the texture size
    sizes: HashMap<PathBuf, [u32; 2]>,
    /// Files that failed to decode; not retried until invalidated
    failed: HashMap<PathBuf, TextureError>,
    /// Tracks when each texture was last used
    last_used: HashMap<PathBuf, u64>,
    /// Current frame counter for LRU tracking
    current_frame: u64,
    /// Maximum number of textures to cache
    max_cache_size: usize,
}

impl TextureManager {
    /// Creates a new texture manager with the specified cache size
    pub fn new(max_cache_size: usize) -> Self {
        Self {
            texture_cache: HashMap::new(),
            sizes: HashMap::new(),
            failed: HashMap::new(),
            last_used: HashMap::new(),
            current_frame: 0,
            max_cache_size: max_cache_size.max(1),
        }
    }

    /// Increments the frame counter, should be called at the start of each frame
    pub fn begin_frame(&mut self) {
        self.current_frame += 1;
    }

    /// Texture for the image at `path`, decoding it on first use
    pub fn texture(&mut self, ctx: &Context, path: &Path) -> Result<TextureHandle, TextureError> {
        self.get_or_create_texture(ctx, path, || decode_image(path))
    }

    /// Gets a cached texture or uploads the one `generator` produces
    pub fn get_or_create_texture<F>(
        &mut self,
        ctx: &Context,
        path: &Path,
        generator: F,
    ) -> Result<TextureHandle, TextureError>
    where
        F: FnOnce() -> Result<DecodedImage, TextureError>,
    {
        if let Some(handle) = self.texture_cache.get(path) {
            self.last_used.insert(path.to_path_buf(), self.current_frame);
            return Ok(handle.clone());
        }
        if let Some(err) = self.failed.get(path) {
            return Err(err.clone());
        }

        let decoded = match generator() {
            Ok(decoded) => decoded,
            Err(err) => {
                log::warn!("{err}");
                self.failed.insert(path.to_path_buf(), err.clone());
                return Err(err);
            }
        };
        log::debug!(
            "Loaded texture {} ({}x{})",
            path.display(),
            decoded.original_size[0],
            decoded.original_size[1]
        );

        let name = format!("image:{}", path.display());
        let handle = ctx.load_texture(name, decoded.image, TextureOptions::LINEAR);
        let key = path.to_path_buf();
        self.texture_cache.insert(key.clone(), handle.clone());
        self.sizes.insert(key.clone(), decoded.original_size);
        self.last_used.insert(key, self.current_frame);
        self.prune_cache_if_needed();
        Ok(handle)
    }

    /// Pixel size of an already loaded image
    pub fn dimensions(&self, path: &Path) -> Option<[u32; 2]> {
        self.sizes.get(path).copied()
    }

    /// Error recorded for a file that failed to load
    pub fn failure(&self, path: &Path) -> Option<&TextureError> {
        self.failed.get(path)
    }

    /// Forgets the texture and any recorded failure so the file is read again
    pub fn invalidate(&mut self, path: &Path) {
        self.texture_cache.remove(path);
        self.sizes.remove(path);
        self.failed.remove(path);
        self.last_used.remove(path);
    }

    /// Drops least recently used textures beyond the cache limit
    fn prune_cache_if_needed(&mut self) {
        if self.texture_cache.len() <= self.max_cache_size {
            return;
        }

        let mut entries: Vec<(PathBuf, u64)> = self
            .last_used
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        entries.sort_by_key(|(_, frame)| *frame);

        let to_remove = self.texture_cache.len() - self.max_cache_size;
        for (path, _) in entries.into_iter().take(to_remove) {
            log::trace!("Evicting texture {}", path.display());
            self.texture_cache.remove(&path);
            self.sizes.remove(&path);
            self.last_used.remove(&path);
        }
    }

    /// Clears all textures and failures from the cache
    pub fn clear_cache(&mut self) {
        self.texture_cache.clear();
        self.sizes.clear();
        self.failed.clear();
        self.last_used.clear();
    }

    /// Returns the number of textures currently in the cache
    pub fn cache_size(&self) -> usize {
        self.texture_cache.len()
    }

    #[cfg(test)]
    fn is_cached(&self, path: &Path) -> bool {
        self.texture_cache.contains_key(path)
    }
}

impl Default for TextureManager {
    fn default() -> Self {
        Self::new(64)
    }
}
