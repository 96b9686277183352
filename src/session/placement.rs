use crate::{
    canvas::{editor::CanvasEditor, model::NewShape},
    foundation::{
        core::{AssetId, Point, Rect, ShapeId, Size},
        error::{EaselError, EaselResult},
    },
    session::candidate::CandidateImage,
};

/// Where a candidate lands inside its container, in the container's local space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub origin: Point,
    pub size: Size,
    pub scale: f64,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::from_origin_size(self.origin, self.size)
    }
}

/// Uniformly scale `image` to fit `fit_ratio` of `container` on both axes
/// (never upscaling) and centre it.
pub fn fit_and_center(container: Size, image: Size, fit_ratio: f64) -> EaselResult<Placement> {
    if !(image.width > 0.0 && image.height > 0.0) {
        return Err(EaselError::validation("image size must be > 0"));
    }
    if !(container.width > 0.0 && container.height > 0.0) {
        return Err(EaselError::validation("container size must be > 0"));
    }

    let max_w = container.width * fit_ratio;
    let max_h = container.height * fit_ratio;
    let scale = (max_w / image.width).min(max_h / image.height).min(1.0);
    let size = Size::new(image.width * scale, image.height * scale);
    let origin = Point::new(
        (container.width - size.width) / 2.0,
        (container.height - size.height) / 2.0,
    );
    Ok(Placement {
        origin,
        size,
        scale,
    })
}

/// Insert `candidate` as an image shape (plus backing asset) fitted into
/// `container`. The asset is removed again if the shape cannot be created.
pub(crate) fn insert_fitted<E: CanvasEditor + ?Sized>(
    editor: &mut E,
    container: &ShapeId,
    container_size: Size,
    candidate: &CandidateImage,
    asset_name: &str,
    fit_ratio: f64,
) -> EaselResult<(ShapeId, AssetId)> {
    let placement = fit_and_center(container_size, candidate.dimensions()?, fit_ratio)?;
    let asset = editor.create_asset(candidate.to_asset(asset_name)?)?;
    let shape = NewShape::image(container, placement.origin, placement.size, asset.clone());
    match editor.create_shape(shape) {
        Ok(id) => Ok((id, asset)),
        Err(err) => {
            editor.delete_assets(&[asset]);
            Err(err)
        }
    }
}
