use crate::{
    canvas::editor::CanvasEditor,
    foundation::error::{EaselError, EaselResult},
    service::generation::{GenerateImageRequest, GenerationKind},
    session::{export::export_snapshot, region::Region},
};

/// Build the generation request for `prompt` against the current region.
///
/// A region without unlocked content produces a `generate` request with no
/// image; otherwise the region export is attached and the request is an
/// `edit`.
#[tracing::instrument(skip_all, fields(project_id = %project_id))]
pub fn build_generation_request<E: CanvasEditor + ?Sized>(
    editor: &E,
    region: &Region,
    project_id: &str,
    prompt: &str,
) -> EaselResult<GenerateImageRequest> {
    if prompt.trim().is_empty() {
        return Err(EaselError::validation("please provide a prompt first"));
    }
    if region.resolve(editor).is_none() {
        return Err(EaselError::not_ready("drawing area not found"));
    }

    let (image_data, kind) = if region.is_empty(editor) {
        (None, GenerationKind::Generate)
    } else {
        let snapshot = export_snapshot(editor, region)?
            .ok_or_else(|| EaselError::not_ready("drawing area not found"))?;
        (Some(snapshot.to_base64()), GenerationKind::Edit)
    };

    Ok(GenerateImageRequest {
        prompt: prompt.to_string(),
        image_data,
        project_id: project_id.to_string(),
        kind,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/prompt/request.rs"]
mod tests;
