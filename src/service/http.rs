use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    foundation::{
        config::ServiceConfig,
        error::{EaselError, EaselResult},
    },
    service::{
        generation::{GenerateImageRequest, GenerateImageResponse, GenerationService},
        projects::{NewProject, Project, ProjectList, ProjectStore, ProjectUpdate},
    },
};

/// Blocking HTTP client for the generation and project endpoints.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    pub fn new(cfg: &ServiceConfig) -> EaselResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| EaselError::network(format!("build http client: {e}")))?;
        Ok(Self {
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Decode a JSON body, turning non-2xx responses into [`EaselError::Network`]
    /// carrying the server's `detail` when it sent one.
    fn read<T: DeserializeOwned>(resp: Response, fallback: &str) -> EaselResult<T> {
        let status = resp.status();
        if !status.is_success() {
            let detail = resp
                .json::<serde_json::Value>()
                .ok()
                .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string));
            return Err(EaselError::network(
                detail.unwrap_or_else(|| format!("{fallback} (HTTP {status})")),
            ));
        }
        resp.json::<T>()
            .map_err(|e| EaselError::network(format!("{fallback}: invalid response: {e}")))
    }
}

fn send_error(e: reqwest::Error) -> EaselError {
    EaselError::network(e.to_string())
}

impl GenerationService for HttpBackend {
    fn generate(&self, request: &GenerateImageRequest) -> EaselResult<GenerateImageResponse> {
        debug!(project_id = %request.project_id, kind = ?request.kind, "requesting generation");
        let resp = self
            .client
            .post(self.url("/api/generate-image"))
            .json(request)
            .send()
            .map_err(send_error)?;
        Self::read(resp, "failed to generate image")
    }
}

impl ProjectStore for HttpBackend {
    fn list_projects(&self, user_id: &str) -> EaselResult<Vec<Project>> {
        let resp = self
            .client
            .get(self.url(&format!("/api/projects/{user_id}")))
            .send()
            .map_err(send_error)?;
        let list: ProjectList = Self::read(resp, "failed to fetch projects")?;
        Ok(list.projects)
    }

    fn create_project(&self, project: NewProject) -> EaselResult<Project> {
        let resp = self
            .client
            .post(self.url("/api/projects"))
            .json(&project)
            .send()
            .map_err(send_error)?;
        Self::read(resp, "failed to create project")
    }

    fn update_project(
        &self,
        project_id: &str,
        user_id: &str,
        update: ProjectUpdate,
    ) -> EaselResult<Project> {
        let resp = self
            .client
            .put(self.url(&format!("/api/projects/{project_id}")))
            .query(&[("user_id", user_id)])
            .json(&update)
            .send()
            .map_err(send_error)?;
        Self::read(resp, "failed to update project")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/http.rs"]
mod tests;
