use tracing::debug;

use crate::{
    canvas::editor::CanvasEditor,
    foundation::{config::StagingConfig, error::EaselResult},
    session::{
        candidate::CandidateImage,
        export::{Snapshot, export_snapshot},
        placement::insert_fitted,
        region::Region,
    },
};

const PREVIEW_ASSET_NAME: &str = "preview.png";

/// Capture what the region would look like with `candidate` placed in it,
/// without leaving the candidate on the canvas.
///
/// The temporary image and its asset are removed whether or not the capture
/// succeeded, so visible canvas state is unchanged when this returns.
/// Returns `Ok(None)` when the region's container no longer exists.
#[tracing::instrument(skip_all, fields(container = %region.container()))]
pub fn stage_candidate<E: CanvasEditor + ?Sized>(
    editor: &mut E,
    region: &Region,
    candidate: &CandidateImage,
    cfg: &StagingConfig,
) -> EaselResult<Option<Snapshot>> {
    let Some(resolved) = region.resolve(editor) else {
        debug!("container missing, nothing to stage");
        return Ok(None);
    };

    let (shape, asset) = insert_fitted(
        editor,
        &resolved.container,
        resolved.size,
        candidate,
        PREVIEW_ASSET_NAME,
        cfg.fit_ratio,
    )?;

    let captured = editor
        .settle()
        .and_then(|()| export_snapshot(&*editor, region));

    editor.delete_shapes(&[shape]);
    editor.delete_assets(&[asset]);
    debug!(ok = captured.is_ok(), "staged candidate removed");
    captured
}

#[cfg(test)]
#[path = "../../tests/unit/session/staging.rs"]
mod tests;
