use crate::{
    canvas::model::{DocumentSnapshot, ImageAsset, NewImageAsset, NewShape, Shape},
    foundation::{
        core::{AssetId, Millis, Point, Rect, ShapeId},
        error::EaselResult,
    },
};

/// Who caused a store change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeSource {
    /// Local edits, including programmatic ones made on the user's behalf.
    User,
    /// Changes merged in from persistence; never re-saved.
    Remote,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    ShapeCreated(ShapeId),
    ShapeUpdated(ShapeId),
    ShapeDeleted(ShapeId),
    AssetCreated(AssetId),
    AssetDeleted(AssetId),
    DocumentLoaded,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreChange {
    pub source: ChangeSource,
    pub at: Millis,
    pub kind: ChangeKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerId(pub u64);

pub type StoreListener = Box<dyn FnMut(&StoreChange)>;

/// Capabilities the session core needs from a vector-canvas editor.
///
/// Shape positions are local to the parent; `page_bounds` resolves them to
/// page space. Listeners are invoked synchronously for every mutation and
/// must not call back into the editor.
pub trait CanvasEditor {
    fn shape(&self, id: &ShapeId) -> Option<&Shape>;
    /// All shapes on the current page.
    fn page_shape_ids(&self) -> Vec<ShapeId>;
    /// Direct children of `parent` in draw order.
    fn sorted_child_ids(&self, parent: &ShapeId) -> Vec<ShapeId>;
    fn create_shape(&mut self, shape: NewShape) -> EaselResult<ShapeId>;
    /// Delete shapes and their descendants. Unknown ids are ignored.
    fn delete_shapes(&mut self, ids: &[ShapeId]);
    fn set_locked(&mut self, id: &ShapeId, locked: bool) -> EaselResult<()>;

    fn asset(&self, id: &AssetId) -> Option<&ImageAsset>;
    fn create_asset(&mut self, asset: NewImageAsset) -> EaselResult<AssetId>;
    fn delete_assets(&mut self, ids: &[AssetId]);

    fn page_bounds(&self, id: &ShapeId) -> Option<Rect>;
    fn viewport_page_bounds(&self) -> Rect;
    fn page_to_screen(&self, point: Point) -> Point;
    fn zoom_to_fit(&mut self);

    /// PNG of the union bounds of `ids`, background filled, zero padding.
    /// Only the listed shapes are drawn.
    fn export_png(&self, ids: &[ShapeId]) -> EaselResult<Vec<u8>>;

    /// Block until pending mutations are reflected in exports.
    ///
    /// Editors that render on demand have nothing to wait for.
    fn settle(&mut self) -> EaselResult<()> {
        Ok(())
    }

    fn listen(&mut self, listener: StoreListener) -> ListenerId;
    fn unlisten(&mut self, id: ListenerId);
    fn serialize_document(&self) -> EaselResult<DocumentSnapshot>;
    /// Replace the document with `snapshot`, tagged as a [`ChangeSource::Remote`] change.
    fn load_remote(&mut self, snapshot: &DocumentSnapshot) -> EaselResult<()>;
}
