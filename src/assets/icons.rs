use std::{
    collections::HashMap,
    path::{Component, Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
};

use image::{RgbaImage, imageops::FilterType};

use crate::assets::decode::{decode_raster, looks_like_svg, parse_svg, rasterize_svg};
use crate::foundation::error::{GifTextError, GifTextResult};

/// Read-only lookup of icon asset bytes by identifier.
///
/// Queried independently from every frame worker, so implementations must be shareable.
pub trait IconSource: Send + Sync {
    fn load(&self, id: &str) -> GifTextResult<Vec<u8>>;
}

/// Icons stored as files under a root directory; identifiers are relative paths.
#[derive(Clone, Debug)]
pub struct DirIconSource {
    root: PathBuf,
}

impl DirIconSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl IconSource for DirIconSource {
    fn load(&self, id: &str) -> GifTextResult<Vec<u8>> {
        let rel = Path::new(id);
        if !rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(GifTextError::render(format!(
                "icon id '{id}' must be a relative path without '..'"
            )));
        }
        let path = self.root.join(rel);
        std::fs::read(&path).map_err(|e| {
            GifTextError::render(format!("icon asset '{}' unavailable: {e}", path.display()))
        })
    }
}

/// In-memory icon table, for embedding callers and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryIconSource {
    assets: HashMap<String, Vec<u8>>,
}

impl MemoryIconSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(id, bytes);
        self
    }

    pub fn insert(&mut self, id: impl Into<String>, bytes: Vec<u8>) {
        self.assets.insert(id.into(), bytes);
    }
}

impl IconSource for MemoryIconSource {
    fn load(&self, id: &str) -> GifTextResult<Vec<u8>> {
        self.assets
            .get(id)
            .cloned()
            .ok_or_else(|| GifTextError::render(format!("icon asset '{id}' unavailable")))
    }
}

/// Decoded icons scaled to fit a target square, cached per `(id, size)`.
pub struct IconCache {
    source: Arc<dyn IconSource>,
    fontdb: Arc<usvg::fontdb::Database>,
    scaled: RwLock<HashMap<(String, u32), Arc<RgbaImage>>>,
}

impl std::fmt::Debug for IconCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self
            .scaled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("IconCache")
            .field("cached", &cached)
            .finish_non_exhaustive()
    }
}

impl IconCache {
    pub fn new(source: Arc<dyn IconSource>, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self {
            source,
            fontdb,
            scaled: RwLock::new(HashMap::new()),
        }
    }

    /// Icon `id` scaled uniformly so its larger side equals `size`.
    pub fn scaled(&self, id: &str, size: u32) -> GifTextResult<Arc<RgbaImage>> {
        let key = (id.to_owned(), size);
        if let Some(hit) = self
            .scaled
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(Arc::clone(hit));
        }

        let icon = Arc::new(self.load_scaled(id, size)?);
        self.scaled
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Arc::clone(&icon));
        Ok(icon)
    }

    fn load_scaled(&self, id: &str, size: u32) -> GifTextResult<RgbaImage> {
        if size == 0 {
            return Err(GifTextError::render("icon size must be > 0"));
        }
        let bytes = self.source.load(id)?;

        if looks_like_svg(&bytes) {
            let tree = parse_svg(&bytes, Arc::clone(&self.fontdb))
                .map_err(|e| GifTextError::render(format!("icon '{id}': {e}")))?;
            let (w, h) = fit_square(tree.size().width(), tree.size().height(), size);
            return rasterize_svg(&tree, w, h);
        }

        let raster = decode_raster(&bytes)
            .map_err(|e| GifTextError::render(format!("icon '{id}': {e}")))?;
        let (w, h) = fit_square(raster.width() as f32, raster.height() as f32, size);
        Ok(image::imageops::resize(&raster, w, h, FilterType::Lanczos3))
    }
}

/// Dimensions of a `width`x`height` box scaled so its larger side is `size`.
pub fn fit_square(width: f32, height: f32, size: u32) -> (u32, u32) {
    let longest = width.max(height);
    if !longest.is_finite() || longest <= 0.0 {
        return (size, size);
    }
    let scale = size as f32 / longest;
    let w = (width * scale).round().max(1.0) as u32;
    let h = (height * scale).round().max(1.0) as u32;
    (w.min(size), h.min(size))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/icons.rs"]
mod tests;
