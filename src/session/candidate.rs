use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};

use crate::{
    canvas::{model::NewImageAsset, raster},
    foundation::{
        core::Size,
        error::{EaselError, EaselResult},
    },
};

/// Generated image bytes not yet committed to the canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateImage {
    bytes: Arc<Vec<u8>>,
}

impl CandidateImage {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> EaselResult<Self> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(EaselError::encoding("candidate image is empty"));
        }
        Ok(Self {
            bytes: Arc::new(bytes),
        })
    }

    /// Decode the base64 payload returned by the generation service.
    /// A `data:` URL prefix is tolerated.
    pub fn from_base64(encoded: &str) -> EaselResult<Self> {
        let payload = match encoded.split_once(";base64,") {
            Some((_, data)) => data,
            None => encoded,
        };
        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| EaselError::encoding(format!("candidate is not valid base64: {e}")))?;
        Self::from_bytes(bytes)
    }

    pub fn bytes(&self) -> &Arc<Vec<u8>> {
        &self.bytes
    }

    /// Pixel dimensions, read from the encoded header.
    pub fn dimensions(&self) -> EaselResult<Size> {
        let (w, h) = raster::image_dimensions(&self.bytes)?;
        if w == 0 || h == 0 {
            return Err(EaselError::encoding("candidate image has zero size"));
        }
        Ok(Size::new(f64::from(w), f64::from(h)))
    }

    pub fn mime_type(&self) -> &'static str {
        match image::guess_format(&self.bytes) {
            Ok(format) => format.to_mime_type(),
            Err(_) => "application/octet-stream",
        }
    }

    /// Backing-asset request for placing this candidate on the canvas.
    pub fn to_asset(&self, name: &str) -> EaselResult<NewImageAsset> {
        let (width, height) = raster::image_dimensions(&self.bytes)?;
        Ok(NewImageAsset {
            name: name.to_string(),
            mime_type: self.mime_type().to_string(),
            width,
            height,
            bytes: Arc::clone(&self.bytes),
        })
    }
}
