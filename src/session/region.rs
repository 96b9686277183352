use std::{cell::RefCell, rc::Rc};

use tracing::debug;

use crate::{
    canvas::{editor::CanvasEditor, model::NewShape},
    foundation::{
        config::FrameConfig,
        core::{Rect, ShapeId, Size},
        error::EaselResult,
    },
};

/// Shared handle to the canvas region a session works in.
///
/// Clones observe the same container id, so a rebind after restore reaches
/// every holder before their next export or stage call.
#[derive(Clone, Debug, PartialEq)]
pub struct Region {
    container: Rc<RefCell<ShapeId>>,
}

/// A region evaluated against the live document.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRegion {
    pub container: ShapeId,
    /// Container size in its own local space.
    pub size: Size,
    /// Direct children that are not locked, in draw order.
    pub contents: Vec<ShapeId>,
}

impl ResolvedRegion {
    /// Container followed by its contents; never empty.
    pub fn export_set(&self) -> Vec<ShapeId> {
        let mut ids = Vec::with_capacity(self.contents.len() + 1);
        ids.push(self.container.clone());
        ids.extend(self.contents.iter().cloned());
        ids
    }
}

impl Region {
    pub fn new(container: ShapeId) -> Self {
        Self {
            container: Rc::new(RefCell::new(container)),
        }
    }

    pub fn container(&self) -> ShapeId {
        self.container.borrow().clone()
    }

    /// Point every clone of this handle at `container`.
    pub fn rebind(&self, container: ShapeId) {
        *self.container.borrow_mut() = container;
    }

    /// Evaluate container and unlocked direct children now. `None` when the
    /// container no longer exists.
    pub fn resolve<E: CanvasEditor + ?Sized>(&self, editor: &E) -> Option<ResolvedRegion> {
        let container = self.container();
        let shape = editor.shape(&container)?;
        let size = shape.size();
        let contents = editor
            .sorted_child_ids(&container)
            .into_iter()
            .filter(|id| editor.shape(id).is_some_and(|s| !s.locked))
            .collect();
        Some(ResolvedRegion {
            container,
            size,
            contents,
        })
    }

    /// True when there is no unlocked content to export. A missing container
    /// counts as empty.
    pub fn is_empty<E: CanvasEditor + ?Sized>(&self, editor: &E) -> bool {
        self.resolve(editor).is_none_or(|r| r.contents.is_empty())
    }
}

/// First frame on the page named `label`.
pub fn find_frame<E: CanvasEditor + ?Sized>(editor: &E, label: &str) -> Option<ShapeId> {
    editor
        .page_shape_ids()
        .into_iter()
        .find(|id| editor.shape(id).and_then(|s| s.frame_name()) == Some(label))
}

/// Locate the singleton drawing frame, creating it centred in the viewport
/// when absent. Safe to call repeatedly.
pub fn find_or_create_frame<E: CanvasEditor + ?Sized>(
    editor: &mut E,
    cfg: &FrameConfig,
) -> EaselResult<Region> {
    if let Some(existing) = find_frame(editor, &cfg.label) {
        debug!(frame = %existing, "reusing drawing frame");
        editor.zoom_to_fit();
        return Ok(Region::new(existing));
    }

    let viewport = editor.viewport_page_bounds();
    let w = cfg.max_width.min(viewport.width() * cfg.viewport_ratio);
    let h = cfg.max_height.min(viewport.height() * cfg.viewport_ratio);
    let x = viewport.x0 + (viewport.width() - w) / 2.0;
    let y = viewport.y0 + (viewport.height() - h) / 2.0;
    let id = editor.create_shape(NewShape::frame(
        cfg.label.clone(),
        Rect::new(x, y, x + w, y + h),
    ))?;
    debug!(frame = %id, w, h, "created drawing frame");
    editor.zoom_to_fit();
    Ok(Region::new(id))
}

#[cfg(test)]
#[path = "../../tests/unit/session/region.rs"]
mod tests;
