use std::path::Path;

use anyhow::Context;

use crate::{
    animation::ease::Ease,
    foundation::error::{EaselError, EaselResult},
};

/// Environment variable overriding [`ServiceConfig::api_base_url`].
pub const API_URL_ENV: &str = "EASEL_API_URL";

/// Default owner used when no user id is configured.
pub const DEFAULT_USER_ID: &str = "1824ad37-303d-4505-b210-d294295d1f95";

/// All timing and layout constants of a canvas session.
///
/// Every section is `#[serde(default)]`, so a partial JSON file only overrides
/// what it names.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EaselConfig {
    pub reveal: RevealConfig,
    pub staging: StagingConfig,
    pub autosave: AutosaveConfig,
    pub frame: FrameConfig,
    pub prompt: PromptConfig,
    pub service: ServiceConfig,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Length of the automatic 0 → 100 sweep.
    pub duration_ms: u64,
    /// Wait between the sweep reaching 100 and completion.
    pub completion_grace_ms: u64,
    /// Releasing a drag at or above this position completes the reveal.
    pub complete_threshold: f64,
    pub ease: Ease,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            completion_grace_ms: 300,
            complete_threshold: 95.0,
            ease: Ease::InOutQuad,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct StagingConfig {
    /// Fraction of the container each candidate may occupy per axis.
    pub fit_ratio: f64,
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self { fit_ratio: 0.8 }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AutosaveConfig {
    pub debounce_ms: u64,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self { debounce_ms: 2500 }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// Reserved name identifying the singleton drawing frame.
    pub label: String,
    pub max_width: f64,
    pub max_height: f64,
    pub viewport_ratio: f64,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            label: "Drawing Area".to_string(),
            max_width: 800.0,
            max_height: 600.0,
            viewport_ratio: 0.6,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Listening time in agent mode before a generation is triggered.
    pub auto_generate_ms: u64,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            auto_generate_ms: 20_000,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub user_id: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            timeout_secs: 60,
            user_id: DEFAULT_USER_ID.to_string(),
        }
    }
}

impl EaselConfig {
    pub fn from_json_str(json: &str) -> EaselResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> EaselResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Apply environment overrides ([`API_URL_ENV`]).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV)
            && !url.trim().is_empty()
        {
            self.service.api_base_url = url.trim().to_string();
        }
        self
    }

    pub fn validate(&self) -> EaselResult<()> {
        if self.reveal.duration_ms == 0 {
            return Err(EaselError::validation("reveal.duration_ms must be > 0"));
        }
        if !(0.0..=100.0).contains(&self.reveal.complete_threshold) {
            return Err(EaselError::validation(
                "reveal.complete_threshold must be within [0, 100]",
            ));
        }
        if !(self.staging.fit_ratio > 0.0 && self.staging.fit_ratio <= 1.0) {
            return Err(EaselError::validation(
                "staging.fit_ratio must be within (0, 1]",
            ));
        }
        if self.autosave.debounce_ms == 0 {
            return Err(EaselError::validation("autosave.debounce_ms must be > 0"));
        }
        if self.frame.label.trim().is_empty() {
            return Err(EaselError::validation("frame.label must not be empty"));
        }
        if !(self.frame.max_width > 0.0 && self.frame.max_height > 0.0) {
            return Err(EaselError::validation(
                "frame.max_width/max_height must be > 0",
            ));
        }
        if !(self.frame.viewport_ratio > 0.0 && self.frame.viewport_ratio <= 1.0) {
            return Err(EaselError::validation(
                "frame.viewport_ratio must be within (0, 1]",
            ));
        }
        if self.prompt.auto_generate_ms == 0 {
            return Err(EaselError::validation("prompt.auto_generate_ms must be > 0"));
        }
        if self.service.api_base_url.trim().is_empty() {
            return Err(EaselError::validation("service.api_base_url must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
