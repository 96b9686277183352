use crate::{foundation::error::EaselResult, session::candidate::CandidateImage};

/// Whether the request creates an image from scratch or edits the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationKind {
    #[default]
    Generate,
    Edit,
}

/// Body of `POST /api/generate-image`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerateImageRequest {
    pub prompt: String,
    /// Base64 PNG of the drawing area; absent when it has no content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<String>,
    pub project_id: String,
    #[serde(rename = "type", default)]
    pub kind: GenerationKind,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GenerateImageResponse {
    /// Base64 encoded generated image.
    pub image_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_response: Option<String>,
}

impl GenerateImageResponse {
    pub fn candidate(&self) -> EaselResult<CandidateImage> {
        let candidate = CandidateImage::from_base64(&self.image_data)?;
        candidate.dimensions()?;
        Ok(candidate)
    }
}

/// Remote image generation collaborator.
pub trait GenerationService {
    fn generate(&self, request: &GenerateImageRequest) -> EaselResult<GenerateImageResponse>;
}
