use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::caption::glyphs::GlyphIconMap;
use crate::foundation::core::FrameSize;
use crate::foundation::error::{GifTextError, GifTextResult};
use crate::pipeline::run::{HolePolicy, PipelineOpts};
use crate::raster::palette::PaletteKind;
use crate::render::overlay::OverlayStyle;

/// A GIF job described as JSON. Relative paths resolve against the job file's directory.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// Source images, one frame each, in display order.
    pub images: Vec<PathBuf>,
    /// Caption with one status glyph per frame.
    pub caption: String,
    #[serde(default = "default_delay_cs")]
    pub delay_cs: u16,
    #[serde(default = "default_side")]
    pub width: u32,
    #[serde(default = "default_side")]
    pub height: u32,
    /// Glyph to icon id; the built-in checkmark/cross map when omitted.
    #[serde(default)]
    pub icons: Option<GlyphIconMap>,
    /// Directory icon ids are looked up in.
    #[serde(default)]
    pub icon_dir: Option<PathBuf>,
    /// Extra font files or directories for caption text.
    #[serde(default)]
    pub font_files: Vec<PathBuf>,
    #[serde(default)]
    pub hole_policy: HolePolicy,
    #[serde(default)]
    pub palette: PaletteKind,
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub unit_timeout_ms: Option<u64>,
    #[serde(default)]
    pub style: OverlayStyle,
}

fn default_delay_cs() -> u16 {
    100
}

fn default_side() -> u32 {
    300
}

impl JobConfig {
    pub fn load(path: &Path) -> GifTextResult<Self> {
        let f = File::open(path)
            .map_err(|e| GifTextError::io(format!("open job '{}': {e}", path.display())))?;
        let mut job: Self = serde_json::from_reader(BufReader::new(f))
            .map_err(|e| GifTextError::config(format!("parse job '{}': {e}", path.display())))?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        job.resolve_paths(base);
        job.validate()?;
        Ok(job)
    }

    /// Make relative image, icon and font paths relative to `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        self.images.iter_mut().for_each(rebase);
        self.font_files.iter_mut().for_each(rebase);
        if let Some(dir) = self.icon_dir.as_mut() {
            rebase(dir);
        }
    }

    pub fn validate(&self) -> GifTextResult<()> {
        if self.images.is_empty() {
            return Err(GifTextError::config("job lists no images"));
        }
        FrameSize::new(self.width, self.height)?;
        if self.unit_timeout_ms == Some(0) {
            return Err(GifTextError::config("unit_timeout_ms must be > 0"));
        }
        if self.threads == Some(0) {
            return Err(GifTextError::config("threads must be > 0"));
        }
        if self.style.icon_size == 0 {
            return Err(GifTextError::config("style.icon_size must be > 0"));
        }
        Ok(())
    }

    pub fn pipeline_opts(&self) -> GifTextResult<PipelineOpts> {
        Ok(PipelineOpts {
            size: FrameSize::new(self.width, self.height)?,
            delay_cs: self.delay_cs,
            hole_policy: self.hole_policy,
            palette: self.palette,
            threads: self.threads,
            unit_timeout: self.unit_timeout_ms.map(Duration::from_millis),
            style: self.style.clone(),
        })
    }

    pub fn glyph_map(&self) -> GlyphIconMap {
        self.icons.clone().unwrap_or_default()
    }

    /// Directory icons are read from: `icon_dir`, or the directory of the first image.
    pub fn icon_root(&self) -> PathBuf {
        self.icon_dir.clone().unwrap_or_else(|| {
            self.images
                .first()
                .and_then(|p| p.parent())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    /// Read every image from storage, in order.
    pub fn read_images(&self) -> GifTextResult<Vec<Vec<u8>>> {
        self.images.iter().map(|p| read_image(p)).collect()
    }
}

pub fn read_image(path: &Path) -> GifTextResult<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| GifTextError::io(format!("read image '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
