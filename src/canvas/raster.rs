use std::{collections::HashSet, io::Cursor};

use crate::{
    canvas::model::{Document, ShapeKind},
    foundation::{
        core::{Rect, Rgba8, ShapeId},
        error::{EaselError, EaselResult},
    },
};

/// Premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Largest raster edge the exporter will allocate.
pub const MAX_DIMENSION: u32 = 16_384;

/// Premultiplied RGBA8 raster, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pixmap {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Pixmap {
    /// Allocate a transparent pixmap. Sizes beyond [`MAX_DIMENSION`] on either
    /// axis are rejected.
    pub fn new(width: u32, height: u32) -> EaselResult<Self> {
        if width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(EaselError::encoding(format!(
                "raster {width}x{height} exceeds {MAX_DIMENSION}px limit"
            )));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(4))
            .ok_or_else(|| EaselError::encoding("raster buffer size overflows"))?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, f64::from(self.width), f64::from(self.height))
    }

    pub fn pixel(&self, x: u32, y: u32) -> PremulRgba8 {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Composite `color` over every pixel whose centre lies in `rect ∩ clip`.
    pub fn fill_rect(&mut self, rect: Rect, color: PremulRgba8, clip: Rect) {
        let area = rect.intersect(clip).intersect(self.bounds());
        let Some((x0, y0, x1, y1)) = pixel_span(area) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                let i = (y as usize * self.width as usize + x as usize) * 4;
                let dst = [
                    self.data[i],
                    self.data[i + 1],
                    self.data[i + 2],
                    self.data[i + 3],
                ];
                let out = over(dst, color);
                self.data[i..i + 4].copy_from_slice(&out);
            }
        }
    }

    /// Scale `image` (straight RGBA) into `dest` and composite it, clipped to `clip`.
    ///
    /// Only pixels inside `dest ∩ clip` are visited; each samples its nearest
    /// source pixel, so cost follows the visible area rather than `dest`.
    pub fn draw_image(&mut self, image: &image::RgbaImage, dest: Rect, clip: Rect) {
        let (iw, ih) = image.dimensions();
        if iw == 0 || ih == 0 || dest.width() <= 0.0 || dest.height() <= 0.0 {
            return;
        }
        let area = dest.intersect(clip).intersect(self.bounds());
        let Some((x0, y0, x1, y1)) = pixel_span(area) else {
            return;
        };
        let sx = f64::from(iw) / dest.width();
        let sy = f64::from(ih) / dest.height();
        for y in y0..y1 {
            let v = source_index(f64::from(y) + 0.5 - dest.y0, sy, ih);
            for x in x0..x1 {
                let u = source_index(f64::from(x) + 0.5 - dest.x0, sx, iw);
                let s = premultiply(image.get_pixel(u, v).0);
                let di = (y as usize * self.width as usize + x as usize) * 4;
                let d = [
                    self.data[di],
                    self.data[di + 1],
                    self.data[di + 2],
                    self.data[di + 3],
                ];
                self.data[di..di + 4].copy_from_slice(&over(d, s));
            }
        }
    }

    pub fn encode_png(&self) -> EaselResult<Vec<u8>> {
        let mut straight = self.data.clone();
        unpremultiply_rgba8_in_place(&mut straight);
        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| EaselError::encoding("pixmap buffer does not match its dimensions"))?;
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
        Ok(buf)
    }
}

/// Render the listed shapes of `doc` over `background`, cropped to their union bounds.
///
/// Shapes paint in page order (parents before children, siblings by index);
/// frames clip their descendants.
pub fn render_shapes(doc: &Document, ids: &[ShapeId], background: Rgba8) -> EaselResult<Pixmap> {
    let selected: HashSet<&ShapeId> = ids.iter().collect();
    let bounds = ids
        .iter()
        .filter_map(|id| visible_bounds(doc, id))
        .reduce(|a, b| a.union(b))
        .ok_or_else(|| EaselError::encoding("none of the requested shapes exist"))?;

    let width = pixel_extent(bounds.width())?;
    let height = pixel_extent(bounds.height())?;
    let mut pixmap = Pixmap::new(width, height)?;
    let full = pixmap.bounds();
    pixmap.fill_rect(full, background.premultiplied(), full);

    let offset = bounds.origin().to_vec2();
    for id in paint_order(doc) {
        if !selected.contains(&id) {
            continue;
        }
        let (Some(shape), Some(page_rect)) = (doc.shapes.get(&id), doc.page_bounds(&id)) else {
            continue;
        };
        let rect = page_rect - offset;
        let clip = frame_clip(doc, &id)
            .map(|c| c - offset)
            .unwrap_or(full);
        match &shape.kind {
            ShapeKind::Frame { .. } => pixmap.fill_rect(rect, Rgba8::WHITE.premultiplied(), clip),
            ShapeKind::Geo { fill } => pixmap.fill_rect(rect, fill.premultiplied(), clip),
            ShapeKind::Image { asset } => {
                let asset = doc.assets.get(asset).ok_or_else(|| {
                    EaselError::encoding(format!("image shape '{id}' has no asset '{asset}'"))
                })?;
                let decoded = decode_rgba(&asset.bytes)?;
                pixmap.draw_image(&decoded, rect, clip);
            }
        }
    }
    Ok(pixmap)
}

pub fn decode_rgba(bytes: &[u8]) -> EaselResult<image::RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)?;
    Ok(dyn_img.to_rgba8())
}

/// Pixel dimensions of an encoded image, read from its header.
pub fn image_dimensions(bytes: &[u8]) -> EaselResult<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| EaselError::encoding(format!("detect image format: {e}")))?;
    Ok(reader.into_dimensions()?)
}

/// Premultiplied source-over.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);

    let mut out = [0u8; 4];
    out[3] = src[3].saturating_add(mul_div255(u16::from(dst[3]), inv));
    for i in 0..3 {
        out[i] = src[i].saturating_add(mul_div255(u16::from(dst[i]), inv));
    }
    out
}

fn paint_order(doc: &Document) -> Vec<ShapeId> {
    fn visit(doc: &Document, id: &ShapeId, out: &mut Vec<ShapeId>) {
        out.push(id.clone());
        for child in doc.children_of(id) {
            visit(doc, &child.id, out);
        }
    }

    let mut roots: Vec<_> = doc.shapes.values().filter(|s| s.parent.is_none()).collect();
    roots.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.id.cmp(&b.id)));
    let mut out = Vec::with_capacity(doc.shapes.len());
    for root in roots {
        visit(doc, &root.id, &mut out);
    }
    out
}

/// Page bounds of `id` after clipping by its ancestor frames.
fn visible_bounds(doc: &Document, id: &ShapeId) -> Option<Rect> {
    let bounds = doc.page_bounds(id)?;
    let visible = match frame_clip(doc, id) {
        Some(clip) => bounds.intersect(clip),
        None => bounds,
    };
    (visible.width() > 0.0 && visible.height() > 0.0).then_some(visible)
}

/// Intersection of the page bounds of every frame above `id`.
fn frame_clip(doc: &Document, id: &ShapeId) -> Option<Rect> {
    let mut clip: Option<Rect> = None;
    let mut cursor = doc.shapes.get(id)?.parent.clone();
    while let Some(parent_id) = cursor {
        let parent = doc.shapes.get(&parent_id)?;
        if parent.frame_name().is_some() {
            let b = doc.page_bounds(&parent_id)?;
            clip = Some(clip.map_or(b, |c| c.intersect(b)));
        }
        cursor = parent.parent.clone();
    }
    clip
}

/// Pixel index span `[x0, x1) × [y0, y1)` of pixels whose centres lie in `area`.
fn pixel_span(area: Rect) -> Option<(u32, u32, u32, u32)> {
    if area.width() <= 0.0 || area.height() <= 0.0 {
        return None;
    }
    let x0 = (area.x0 - 0.5).ceil().max(0.0) as u32;
    let y0 = (area.y0 - 0.5).ceil().max(0.0) as u32;
    let x1 = (area.x1 - 0.5).ceil().max(0.0) as u32;
    let y1 = (area.y1 - 0.5).ceil().max(0.0) as u32;
    (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
}

fn premultiply(px: [u8; 4]) -> PremulRgba8 {
    let a = u16::from(px[3]);
    [
        mul_div255(u16::from(px[0]), a),
        mul_div255(u16::from(px[1]), a),
        mul_div255(u16::from(px[2]), a),
        px[3],
    ]
}

/// Source pixel under a destination offset `local` along one axis.
fn source_index(local: f64, scale: f64, len: u32) -> u32 {
    (local * scale).floor().clamp(0.0, f64::from(len - 1)) as u32
}

/// Whole-pixel size covering `extent`, at least one pixel.
fn pixel_extent(extent: f64) -> EaselResult<u32> {
    let px = extent.ceil().max(1.0);
    if !(px <= f64::from(MAX_DIMENSION)) {
        return Err(EaselError::encoding(format!(
            "export extent {extent} exceeds {MAX_DIMENSION}px limit"
        )));
    }
    Ok(px as u32)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u32::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/raster.rs"]
mod tests;
