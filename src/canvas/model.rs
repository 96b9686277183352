use std::{collections::BTreeMap, sync::Arc};

use crate::foundation::{
    core::{AssetId, Point, Rect, Rgba8, ShapeId, Size},
    error::{EaselError, EaselResult},
};

/// What a shape draws.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    /// A named container that clips its children and fills with the page background.
    Frame { name: String },
    /// A filled rectangle.
    Geo { fill: Rgba8 },
    /// A raster image backed by an [`ImageAsset`].
    Image { asset: AssetId },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Shape {
    pub id: ShapeId,
    pub parent: Option<ShapeId>,
    /// Sibling order; lower draws first.
    pub index: u64,
    /// Position local to `parent` (page space for top-level shapes).
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    #[serde(default)]
    pub locked: bool,
    pub kind: ShapeKind,
}

impl Shape {
    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    pub fn local_rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    pub fn frame_name(&self) -> Option<&str> {
        match &self.kind {
            ShapeKind::Frame { name } => Some(name.as_str()),
            _ => None,
        }
    }
}

/// Shape creation request; the editor assigns id and sibling index.
#[derive(Clone, Debug, PartialEq)]
pub struct NewShape {
    pub parent: Option<ShapeId>,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub locked: bool,
    pub kind: ShapeKind,
}

impl NewShape {
    pub fn frame(name: impl Into<String>, page_rect: Rect) -> Self {
        Self {
            parent: None,
            x: page_rect.x0,
            y: page_rect.y0,
            w: page_rect.width(),
            h: page_rect.height(),
            locked: false,
            kind: ShapeKind::Frame { name: name.into() },
        }
    }

    pub fn geo(parent: &ShapeId, local_rect: Rect, fill: Rgba8) -> Self {
        Self {
            parent: Some(parent.clone()),
            x: local_rect.x0,
            y: local_rect.y0,
            w: local_rect.width(),
            h: local_rect.height(),
            locked: false,
            kind: ShapeKind::Geo { fill },
        }
    }

    pub fn image(parent: &ShapeId, origin: Point, size: Size, asset: AssetId) -> Self {
        Self {
            parent: Some(parent.clone()),
            x: origin.x,
            y: origin.y,
            w: size.width,
            h: size.height,
            locked: false,
            kind: ShapeKind::Image { asset },
        }
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageAsset {
    pub id: AssetId,
    pub name: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    /// Encoded image bytes (PNG/JPEG), base64 in serialized documents.
    #[serde(with = "base64_bytes")]
    pub bytes: Arc<Vec<u8>>,
}

/// Asset creation request; the editor assigns the id.
#[derive(Clone, Debug, PartialEq)]
pub struct NewImageAsset {
    pub name: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
    pub bytes: Arc<Vec<u8>>,
}

/// Full persisted serialization of canvas content. Opaque to everything but
/// the editor that produced it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DocumentSnapshot(pub serde_json::Value);

impl DocumentSnapshot {
    pub fn as_json(&self) -> &serde_json::Value {
        &self.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Document {
    #[serde(default)]
    pub shapes: BTreeMap<ShapeId, Shape>,
    #[serde(default)]
    pub assets: BTreeMap<AssetId, ImageAsset>,
}

impl Document {
    pub fn to_snapshot(&self) -> EaselResult<DocumentSnapshot> {
        Ok(DocumentSnapshot(serde_json::to_value(self)?))
    }

    pub fn from_snapshot(snapshot: &DocumentSnapshot) -> EaselResult<Self> {
        let doc: Self = serde_json::from_value(snapshot.0.clone())?;
        doc.validate()?;
        Ok(doc)
    }

    /// Check referential integrity: parents and image assets must exist.
    pub fn validate(&self) -> EaselResult<()> {
        for (key, shape) in &self.shapes {
            if key != &shape.id {
                return Err(EaselError::validation(format!(
                    "shape key '{key}' does not match id '{}'",
                    shape.id
                )));
            }
            if let Some(parent) = &shape.parent
                && !self.shapes.contains_key(parent)
            {
                return Err(EaselError::validation(format!(
                    "shape '{}' references missing parent '{parent}'",
                    shape.id
                )));
            }
            if let ShapeKind::Image { asset } = &shape.kind
                && !self.assets.contains_key(asset)
            {
                return Err(EaselError::validation(format!(
                    "image shape '{}' references missing asset '{asset}'",
                    shape.id
                )));
            }
            if !(shape.w >= 0.0 && shape.h >= 0.0) {
                return Err(EaselError::validation(format!(
                    "shape '{}' has negative size",
                    shape.id
                )));
            }
        }
        Ok(())
    }

    /// Direct children of `parent` in sibling order.
    pub fn children_of(&self, parent: &ShapeId) -> Vec<&Shape> {
        let mut out: Vec<&Shape> = self
            .shapes
            .values()
            .filter(|s| s.parent.as_ref() == Some(parent))
            .collect();
        out.sort_by(|a, b| a.index.cmp(&b.index).then_with(|| a.id.cmp(&b.id)));
        out
    }

    /// Page-space offset of a shape's local origin (sum of ancestor positions).
    pub fn page_origin(&self, id: &ShapeId) -> Option<Point> {
        let mut shape = self.shapes.get(id)?;
        let mut origin = Point::new(shape.x, shape.y);
        let mut depth = 0usize;
        while let Some(parent) = &shape.parent {
            shape = self.shapes.get(parent)?;
            origin.x += shape.x;
            origin.y += shape.y;
            depth += 1;
            if depth > self.shapes.len() {
                return None;
            }
        }
        Some(origin)
    }

    pub fn page_bounds(&self, id: &ShapeId) -> Option<Rect> {
        let shape = self.shapes.get(id)?;
        let origin = self.page_origin(id)?;
        Some(Rect::from_origin_size(origin, shape.size()))
    }
}

mod base64_bytes {
    use std::sync::Arc;

    use base64::{Engine as _, engine::general_purpose::STANDARD};

    pub fn serialize<S: serde::Serializer>(bytes: &Arc<Vec<u8>>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes.as_slice()))
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Arc<Vec<u8>>, D::Error> {
        let text: String = serde::Deserialize::deserialize(d)?;
        STANDARD
            .decode(text.as_bytes())
            .map(Arc::new)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/model.rs"]
mod tests;
