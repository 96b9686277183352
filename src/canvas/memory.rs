use std::{collections::BTreeSet, rc::Rc};

use tracing::debug;

use crate::{
    canvas::{
        editor::{CanvasEditor, ChangeKind, ChangeSource, ListenerId, StoreChange, StoreListener},
        model::{Document, DocumentSnapshot, ImageAsset, NewImageAsset, NewShape, Shape, ShapeKind},
        raster,
    },
    foundation::{
        clock::Clock,
        core::{AssetId, Point, Rect, Rgba8, ShapeId, Size, Vec2},
        error::{EaselError, EaselResult},
    },
};

const FIT_PADDING_PX: f64 = 32.0;
const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 8.0;

/// Page → screen mapping: `screen = (page + offset) * zoom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

/// In-memory [`CanvasEditor`] with a CPU rasterizer.
///
/// Every mutation is stamped with the injected clock and delivered to
/// listeners synchronously.
pub struct MemoryCanvas {
    doc: Document,
    clock: Rc<dyn Clock>,
    viewport: Size,
    camera: Camera,
    background: Rgba8,
    listeners: Vec<(ListenerId, StoreListener)>,
    next_listener: u64,
    next_id: u64,
}

impl std::fmt::Debug for MemoryCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCanvas")
            .field("shapes", &self.doc.shapes.len())
            .field("assets", &self.doc.assets.len())
            .field("viewport", &self.viewport)
            .field("camera", &self.camera)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl MemoryCanvas {
    pub fn new(viewport: Size, clock: Rc<dyn Clock>) -> Self {
        Self {
            doc: Document::default(),
            clock,
            viewport,
            camera: Camera::default(),
            background: Rgba8::WHITE,
            listeners: Vec::new(),
            next_listener: 0,
            next_id: 0,
        }
    }

    pub fn from_document(doc: Document, viewport: Size, clock: Rc<dyn Clock>) -> EaselResult<Self> {
        doc.validate()?;
        let mut canvas = Self::new(viewport, clock);
        canvas.doc = doc;
        Ok(canvas)
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn emit(&mut self, source: ChangeSource, kind: ChangeKind) {
        let change = StoreChange {
            source,
            at: self.clock.now(),
            kind,
        };
        for (_, listener) in &mut self.listeners {
            listener(&change);
        }
    }

    fn fresh_shape_id(&mut self) -> ShapeId {
        loop {
            self.next_id += 1;
            let id = ShapeId(format!("shape:{}", self.next_id));
            if !self.doc.shapes.contains_key(&id) {
                return id;
            }
        }
    }

    fn fresh_asset_id(&mut self) -> AssetId {
        loop {
            self.next_id += 1;
            let id = AssetId(format!("asset:{}", self.next_id));
            if !self.doc.assets.contains_key(&id) {
                return id;
            }
        }
    }

    fn next_sibling_index(&self, parent: Option<&ShapeId>) -> u64 {
        self.doc
            .shapes
            .values()
            .filter(|s| s.parent.as_ref() == parent)
            .map(|s| s.index + 1)
            .max()
            .unwrap_or(0)
    }

    fn collect_subtree(&self, id: &ShapeId, out: &mut BTreeSet<ShapeId>) {
        if !self.doc.shapes.contains_key(id) || !out.insert(id.clone()) {
            return;
        }
        for child in self.doc.children_of(id) {
            self.collect_subtree(&child.id, out);
        }
    }
}

impl CanvasEditor for MemoryCanvas {
    fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.doc.shapes.get(id)
    }

    fn page_shape_ids(&self) -> Vec<ShapeId> {
        self.doc.shapes.keys().cloned().collect()
    }

    fn sorted_child_ids(&self, parent: &ShapeId) -> Vec<ShapeId> {
        self.doc
            .children_of(parent)
            .into_iter()
            .map(|s| s.id.clone())
            .collect()
    }

    fn create_shape(&mut self, shape: NewShape) -> EaselResult<ShapeId> {
        if let Some(parent) = &shape.parent
            && !self.doc.shapes.contains_key(parent)
        {
            return Err(EaselError::not_ready(format!("parent shape '{parent}' not found")));
        }
        let finite = [shape.x, shape.y, shape.w, shape.h]
            .iter()
            .all(|v| v.is_finite());
        if !finite || shape.w < 0.0 || shape.h < 0.0 {
            return Err(EaselError::validation("shape geometry must be finite and non-negative"));
        }
        if let ShapeKind::Image { asset } = &shape.kind
            && !self.doc.assets.contains_key(asset)
        {
            return Err(EaselError::validation(format!("asset '{asset}' not found")));
        }

        let id = self.fresh_shape_id();
        let index = self.next_sibling_index(shape.parent.as_ref());
        self.doc.shapes.insert(
            id.clone(),
            Shape {
                id: id.clone(),
                parent: shape.parent,
                index,
                x: shape.x,
                y: shape.y,
                w: shape.w,
                h: shape.h,
                locked: shape.locked,
                kind: shape.kind,
            },
        );
        self.emit(ChangeSource::User, ChangeKind::ShapeCreated(id.clone()));
        Ok(id)
    }

    fn delete_shapes(&mut self, ids: &[ShapeId]) {
        let mut doomed = BTreeSet::new();
        for id in ids {
            self.collect_subtree(id, &mut doomed);
        }
        for id in doomed {
            self.doc.shapes.remove(&id);
            self.emit(ChangeSource::User, ChangeKind::ShapeDeleted(id));
        }
    }

    fn set_locked(&mut self, id: &ShapeId, locked: bool) -> EaselResult<()> {
        let shape = self
            .doc
            .shapes
            .get_mut(id)
            .ok_or_else(|| EaselError::not_ready(format!("shape '{id}' not found")))?;
        if shape.locked == locked {
            return Ok(());
        }
        shape.locked = locked;
        self.emit(ChangeSource::User, ChangeKind::ShapeUpdated(id.clone()));
        Ok(())
    }

    fn asset(&self, id: &AssetId) -> Option<&ImageAsset> {
        self.doc.assets.get(id)
    }

    fn create_asset(&mut self, asset: NewImageAsset) -> EaselResult<AssetId> {
        if asset.bytes.is_empty() {
            return Err(EaselError::encoding("asset bytes are empty"));
        }
        let id = self.fresh_asset_id();
        self.doc.assets.insert(
            id.clone(),
            ImageAsset {
                id: id.clone(),
                name: asset.name,
                mime_type: asset.mime_type,
                width: asset.width,
                height: asset.height,
                bytes: asset.bytes,
            },
        );
        self.emit(ChangeSource::User, ChangeKind::AssetCreated(id.clone()));
        Ok(id)
    }

    fn delete_assets(&mut self, ids: &[AssetId]) {
        for id in ids {
            if self.doc.assets.remove(id).is_some() {
                self.emit(ChangeSource::User, ChangeKind::AssetDeleted(id.clone()));
            }
        }
    }

    fn page_bounds(&self, id: &ShapeId) -> Option<Rect> {
        self.doc.page_bounds(id)
    }

    fn viewport_page_bounds(&self) -> Rect {
        let zoom = self.camera.zoom;
        let origin = Point::new(-self.camera.offset.x, -self.camera.offset.y);
        Rect::from_origin_size(
            origin,
            Size::new(self.viewport.width / zoom, self.viewport.height / zoom),
        )
    }

    fn page_to_screen(&self, point: Point) -> Point {
        let z = self.camera.zoom;
        Point::new(
            (point.x + self.camera.offset.x) * z,
            (point.y + self.camera.offset.y) * z,
        )
    }

    fn zoom_to_fit(&mut self) {
        let bounds = self
            .doc
            .shapes
            .values()
            .filter(|s| s.parent.is_none())
            .filter_map(|s| self.doc.page_bounds(&s.id))
            .reduce(|a, b| a.union(b));
        let Some(bounds) = bounds else {
            self.camera = Camera::default();
            return;
        };
        if bounds.width() <= 0.0 || bounds.height() <= 0.0 {
            return;
        }

        let (vw, vh) = (self.viewport.width, self.viewport.height);
        let (avail_w, avail_h) = if vw > 2.0 * FIT_PADDING_PX && vh > 2.0 * FIT_PADDING_PX {
            (vw - 2.0 * FIT_PADDING_PX, vh - 2.0 * FIT_PADDING_PX)
        } else {
            (vw, vh)
        };
        let zoom = (avail_w / bounds.width())
            .min(avail_h / bounds.height())
            .clamp(MIN_ZOOM, MAX_ZOOM);
        let center = bounds.center();
        self.camera = Camera {
            offset: Vec2::new(vw / 2.0 / zoom - center.x, vh / 2.0 / zoom - center.y),
            zoom,
        };
        debug!(zoom, "zoomed to fit");
    }

    fn export_png(&self, ids: &[ShapeId]) -> EaselResult<Vec<u8>> {
        raster::render_shapes(&self.doc, ids, self.background)?.encode_png()
    }

    fn listen(&mut self, listener: StoreListener) -> ListenerId {
        self.next_listener += 1;
        let id = ListenerId(self.next_listener);
        self.listeners.push((id, listener));
        id
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.listeners.retain(|(lid, _)| *lid != id);
    }

    fn serialize_document(&self) -> EaselResult<DocumentSnapshot> {
        self.doc.to_snapshot()
    }

    fn load_remote(&mut self, snapshot: &DocumentSnapshot) -> EaselResult<()> {
        self.doc = Document::from_snapshot(snapshot)?;
        self.emit(ChangeSource::Remote, ChangeKind::DocumentLoaded);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/canvas/memory.rs"]
mod tests;
