use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use image::RgbaImage;

use crate::assets::decode::{parse_svg, pixmap_to_rgba};
use crate::foundation::core::Rgb8;
use crate::foundation::error::{GifTextError, GifTextResult};

/// Font database with system fonts plus any extra font files or directories.
///
/// Directories are scanned one level deep for `.ttf`/`.otf`/`.ttc` files. Unreadable fonts are
/// logged and skipped.
pub fn build_fontdb(extra: &[PathBuf]) -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();

    for path in extra {
        if path.is_dir() {
            for file in font_files_in(path) {
                load_font(&mut db, &file);
            }
        } else {
            load_font(&mut db, path);
        }
    }

    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

fn load_font(db: &mut usvg::fontdb::Database, path: &Path) {
    if let Err(e) = db.load_font_file(path) {
        tracing::warn!(path = %path.display(), error = %e, "failed to load font file");
    }
}

fn font_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory unreadable");
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = rd
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_font_file(path))
        .collect();
    // Load order decides which face wins equal queries; keep it stable across platforms.
    files.sort();
    files
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ["ttf", "otf", "ttc"]
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Face selection for caption text. Fallback order: the requested families, then `sans-serif`,
/// then `serif`, then the first loaded face. Captions therefore render with whatever font is
/// installed; only an empty database yields no text.
pub(crate) fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families: Vec<usvg::fontdb::Family<'_>> =
                font.families().iter().map(fontdb_family).collect();
            for generic in [usvg::fontdb::Family::SansSerif, usvg::fontdb::Family::Serif] {
                if !families.contains(&generic) {
                    families.push(generic);
                }
            }

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style: fontdb_style(font.style()),
            };

            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|face| face.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

fn fontdb_family(family: &usvg::FontFamily) -> usvg::fontdb::Family<'_> {
    match family {
        usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
        usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
        usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
        usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
        usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
        usvg::FontFamily::Named(name) => usvg::fontdb::Family::Name(name),
    }
}

fn fontdb_style(style: usvg::FontStyle) -> usvg::fontdb::Style {
    match style {
        usvg::FontStyle::Normal => usvg::fontdb::Style::Normal,
        usvg::FontStyle::Italic => usvg::fontdb::Style::Italic,
        usvg::FontStyle::Oblique => usvg::fontdb::Style::Oblique,
    }
}

/// A rasterized line of caption text.
#[derive(Clone, Debug)]
pub struct TextLayer {
    /// Transparent layer the size of the target canvas, with the text drawn in place.
    pub image: RgbaImage,
    /// Drawn extent from the text origin to the right edge of the last glyph, in pixels.
    /// Zero when nothing could be shaped.
    pub width: f32,
}

/// Single-line caption text drawn through `usvg` text shaping and `resvg` rasterization.
#[derive(Clone, Debug)]
pub struct CaptionText {
    fontdb: Arc<usvg::fontdb::Database>,
    family: String,
    size_px: f32,
}

impl CaptionText {
    pub fn new(
        fontdb: Arc<usvg::fontdb::Database>,
        family: impl Into<String>,
        size_px: f32,
    ) -> Self {
        Self {
            fontdb,
            family: family.into(),
            size_px,
        }
    }

    pub fn fontdb(&self) -> &Arc<usvg::fontdb::Database> {
        &self.fontdb
    }

    /// Draw `text` left-aligned at `x` with its baseline at `baseline_y` onto a transparent
    /// `canvas_w`x`canvas_h` layer.
    pub fn render(
        &self,
        text: &str,
        canvas_w: u32,
        canvas_h: u32,
        x: f32,
        baseline_y: f32,
        color: Rgb8,
    ) -> GifTextResult<TextLayer> {
        if text.trim().is_empty() {
            return Ok(TextLayer {
                image: RgbaImage::new(canvas_w, canvas_h),
                width: 0.0,
            });
        }

        let svg = self.svg_document(text, canvas_w, canvas_h, x, baseline_y, color);
        let tree = parse_svg(svg.as_bytes(), Arc::clone(&self.fontdb))
            .map_err(|e| GifTextError::render(format!("caption text layout: {e}")))?;

        let right = text_right_edge(tree.root());
        let width = right.map_or(0.0, |r| (r - x).max(0.0));

        let mut pixmap = resvg::tiny_skia::Pixmap::new(canvas_w, canvas_h)
            .ok_or_else(|| GifTextError::render("failed to allocate text pixmap"))?;
        resvg::render(
            &tree,
            resvg::tiny_skia::Transform::identity(),
            &mut pixmap.as_mut(),
        );

        Ok(TextLayer {
            image: pixmap_to_rgba(pixmap)?,
            width,
        })
    }

    /// Measured width of `text` as [`CaptionText::render`] would draw it.
    pub fn measure(&self, text: &str) -> GifTextResult<f32> {
        let probe_w = (self.size_px * (text.chars().count() as f32 + 2.0)).ceil() as u32;
        let probe_h = (self.size_px * 2.0).ceil() as u32;
        Ok(self
            .render(text, probe_w.max(1), probe_h.max(1), 0.0, self.size_px, Rgb8::BLACK)?
            .width)
    }

    fn svg_document(
        &self,
        text: &str,
        canvas_w: u32,
        canvas_h: u32,
        x: f32,
        baseline_y: f32,
        color: Rgb8,
    ) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                r#"<text x="{x}" y="{y}" font-family="{family}" font-size="{size}" fill="{fill}" xml:space="preserve">{body}</text>"#,
                "</svg>"
            ),
            w = canvas_w,
            h = canvas_h,
            x = x,
            y = baseline_y,
            family = xml_escape(&self.family),
            size = self.size_px,
            fill = color.to_hex(),
            body = xml_escape(text),
        )
    }
}

fn text_right_edge(group: &usvg::Group) -> Option<f32> {
    let mut right: Option<f32> = None;
    for child in group.children() {
        let edge = match child {
            usvg::Node::Group(g) => text_right_edge(g.as_ref()),
            usvg::Node::Text(t) => Some(t.abs_bounding_box().right()),
            usvg::Node::Path(_) | usvg::Node::Image(_) => None,
        };
        if let Some(e) = edge {
            right = Some(right.map_or(e, |r| r.max(e)));
        }
    }
    right
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
