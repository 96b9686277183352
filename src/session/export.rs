use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    canvas::{editor::CanvasEditor, raster},
    foundation::error::EaselResult,
    session::region::Region,
};

/// Immutable PNG rendering of a region at one instant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    png: Arc<Vec<u8>>,
    width: u32,
    height: u32,
    shape_count: usize,
}

impl Snapshot {
    pub fn png(&self) -> &[u8] {
        &self.png
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of shapes rendered (container included).
    pub fn shape_count(&self) -> usize {
        self.shape_count
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.png.as_slice())
    }

    pub fn to_data_url(&self) -> String {
        format!("data:image/png;base64,{}", self.to_base64())
    }
}

/// Render the region's container plus its unlocked direct children.
///
/// Returns `Ok(None)` when the container no longer exists. Encoder failures
/// surface as [`crate::EaselError::Encoding`] and are not retried.
#[tracing::instrument(skip_all, fields(container = %region.container()))]
pub fn export_snapshot<E: CanvasEditor + ?Sized>(
    editor: &E,
    region: &Region,
) -> EaselResult<Option<Snapshot>> {
    let Some(resolved) = region.resolve(editor) else {
        tracing::debug!("container missing, nothing to export");
        return Ok(None);
    };
    let ids = resolved.export_set();
    let png = editor.export_png(&ids)?;
    let (width, height) = raster::image_dimensions(&png)?;
    Ok(Some(Snapshot {
        png: Arc::new(png),
        width,
        height,
        shape_count: ids.len(),
    }))
}

#[cfg(test)]
#[path = "../../tests/unit/session/export.rs"]
mod tests;
