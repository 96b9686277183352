use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    canvas::{editor::CanvasEditor, model::ShapeKind},
    foundation::{
        config::StagingConfig,
        core::{AssetId, ShapeId},
        error::{EaselError, EaselResult},
    },
    session::{candidate::CandidateImage, placement::insert_fitted, region::Region},
};

const COMMITTED_ASSET_NAME: &str = "generated.png";

/// Replace everything inside the region with `candidate`, fitted and centred.
///
/// All direct children are deleted first, locked ones included, along with
/// any image assets that no remaining shape references. This is not
/// transactional: if decoding or insertion fails after the delete, the region
/// is left empty and the error is returned.
#[tracing::instrument(skip_all, fields(container = %region.container()))]
pub fn commit_candidate<E: CanvasEditor + ?Sized>(
    editor: &mut E,
    region: &Region,
    candidate: &CandidateImage,
    cfg: &StagingConfig,
) -> EaselResult<ShapeId> {
    let container = region.container();
    let size = editor
        .shape(&container)
        .map(|s| s.size())
        .ok_or_else(|| EaselError::not_ready(format!("drawing area '{container}' not found")))?;

    let existing = editor.sorted_child_ids(&container);
    let referenced = image_assets(&*editor);
    editor.delete_shapes(&existing);
    let orphaned: Vec<AssetId> = referenced
        .difference(&image_assets(&*editor))
        .cloned()
        .collect();
    editor.delete_assets(&orphaned);
    debug!(
        removed = existing.len(),
        assets = orphaned.len(),
        "cleared region"
    );

    let (shape, asset) = insert_fitted(
        editor,
        &container,
        size,
        candidate,
        COMMITTED_ASSET_NAME,
        cfg.fit_ratio,
    )?;
    debug!(%shape, %asset, "committed candidate");
    Ok(shape)
}

fn image_assets<E: CanvasEditor + ?Sized>(editor: &E) -> BTreeSet<AssetId> {
    editor
        .page_shape_ids()
        .iter()
        .filter_map(|id| match &editor.shape(id)?.kind {
            ShapeKind::Image { asset } => Some(asset.clone()),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/session/commit.rs"]
mod tests;
