//! Shared fixtures for in-crate unit tests.

use std::{cell::Cell, io::Cursor, rc::Rc};

use crate::{
    canvas::{
        editor::{CanvasEditor, ListenerId, StoreListener},
        memory::MemoryCanvas,
        model::{DocumentSnapshot, ImageAsset, NewImageAsset, NewShape, Shape},
    },
    foundation::{
        clock::ManualClock,
        config::FrameConfig,
        core::{AssetId, Millis, Point, Rect, ShapeId, Size},
        error::{EaselError, EaselResult},
    },
    session::region::{Region, find_or_create_frame},
};

pub fn png(w: u32, h: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

/// Canvas whose viewport yields an 800x600 drawing frame.
pub fn canvas_with_frame() -> (MemoryCanvas, ManualClock, Region) {
    let clock = ManualClock::new(Millis(0));
    let mut canvas = MemoryCanvas::new(Size::new(1400.0, 1000.0), Rc::new(clock.clone()));
    let region = find_or_create_frame(&mut canvas, &FrameConfig::default()).unwrap();
    (canvas, clock, region)
}

/// [`MemoryCanvas`] wrapper with switchable failures.
pub struct FlakyCanvas {
    pub inner: MemoryCanvas,
    pub fail_exports: Cell<bool>,
    pub fail_shape_creation: Cell<bool>,
}

impl FlakyCanvas {
    pub fn new(inner: MemoryCanvas) -> Self {
        Self {
            inner,
            fail_exports: Cell::new(false),
            fail_shape_creation: Cell::new(false),
        }
    }
}

impl CanvasEditor for FlakyCanvas {
    fn shape(&self, id: &ShapeId) -> Option<&Shape> {
        self.inner.shape(id)
    }

    fn page_shape_ids(&self) -> Vec<ShapeId> {
        self.inner.page_shape_ids()
    }

    fn sorted_child_ids(&self, parent: &ShapeId) -> Vec<ShapeId> {
        self.inner.sorted_child_ids(parent)
    }

    fn create_shape(&mut self, shape: NewShape) -> EaselResult<ShapeId> {
        if self.fail_shape_creation.get() {
            return Err(EaselError::validation("shape creation disabled"));
        }
        self.inner.create_shape(shape)
    }

    fn delete_shapes(&mut self, ids: &[ShapeId]) {
        self.inner.delete_shapes(ids)
    }

    fn set_locked(&mut self, id: &ShapeId, locked: bool) -> EaselResult<()> {
        self.inner.set_locked(id, locked)
    }

    fn asset(&self, id: &AssetId) -> Option<&ImageAsset> {
        self.inner.asset(id)
    }

    fn create_asset(&mut self, asset: NewImageAsset) -> EaselResult<AssetId> {
        self.inner.create_asset(asset)
    }

    fn delete_assets(&mut self, ids: &[AssetId]) {
        self.inner.delete_assets(ids)
    }

    fn page_bounds(&self, id: &ShapeId) -> Option<Rect> {
        self.inner.page_bounds(id)
    }

    fn viewport_page_bounds(&self) -> Rect {
        self.inner.viewport_page_bounds()
    }

    fn page_to_screen(&self, point: Point) -> Point {
        self.inner.page_to_screen(point)
    }

    fn zoom_to_fit(&mut self) {
        self.inner.zoom_to_fit()
    }

    fn export_png(&self, ids: &[ShapeId]) -> EaselResult<Vec<u8>> {
        if self.fail_exports.get() {
            return Err(EaselError::encoding("encoder unavailable"));
        }
        self.inner.export_png(ids)
    }

    fn listen(&mut self, listener: StoreListener) -> ListenerId {
        self.inner.listen(listener)
    }

    fn unlisten(&mut self, id: ListenerId) {
        self.inner.unlisten(id)
    }

    fn serialize_document(&self) -> EaselResult<DocumentSnapshot> {
        self.inner.serialize_document()
    }

    fn load_remote(&mut self, snapshot: &DocumentSnapshot) -> EaselResult<()> {
        self.inner.load_remote(snapshot)
    }
}
