/// Convenience result type used across easel.
pub type EaselResult<T> = Result<T, EaselError>;

/// Error taxonomy surfaced by canvas session operations.
///
/// Every user-triggered operation (export, stage, commit, save) catches at its
/// boundary and reports a single message via [`EaselError::user_message`].
/// Nothing in this crate retries automatically.
#[derive(thiserror::Error, Debug)]
pub enum EaselError {
    /// The region or its container does not exist (yet, or any more).
    #[error("canvas not ready: {0}")]
    NotReady(String),

    /// Raster export, encode, or image decode failed.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A generation or persistence call failed.
    #[error("network error: {0}")]
    Network(String),

    /// An async result arrived for a reveal session that is no longer current.
    #[error("stale session {0}")]
    StaleSession(u64),

    /// Invalid input, configuration, or state precondition.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing documents and wire payloads.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl EaselError {
    /// Build a [`EaselError::NotReady`] value.
    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady(msg.into())
    }

    /// Build a [`EaselError::Encoding`] value.
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Build a [`EaselError::Network`] value.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Build a [`EaselError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`EaselError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Message to show the user, or `None` when the error must stay silent.
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::StaleSession(_) => None,
            other => Some(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for EaselError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

impl From<image::ImageError> for EaselError {
    fn from(err: image::ImageError) -> Self {
        Self::Encoding(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
