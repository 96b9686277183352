use std::cell::{Cell, RefCell};

use chrono::{DateTime, Utc};

use crate::{
    canvas::model::DocumentSnapshot,
    foundation::error::{EaselError, EaselResult},
};

/// A persisted project. `snapshot` carries the canvas document verbatim.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Project {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub snapshot: Option<DocumentSnapshot>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NewProject {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<DocumentSnapshot>,
}

/// Partial update; `None` fields are left unchanged.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<DocumentSnapshot>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProjectList {
    pub projects: Vec<Project>,
}

/// Project persistence collaborator.
pub trait ProjectStore {
    fn list_projects(&self, user_id: &str) -> EaselResult<Vec<Project>>;

    fn create_project(&self, project: NewProject) -> EaselResult<Project>;

    fn update_project(
        &self,
        project_id: &str,
        user_id: &str,
        update: ProjectUpdate,
    ) -> EaselResult<Project>;

    /// Look a project up through the owner's listing.
    fn get_project(&self, user_id: &str, project_id: &str) -> EaselResult<Project> {
        self.list_projects(user_id)?
            .into_iter()
            .find(|p| p.id == project_id)
            .ok_or_else(|| EaselError::validation("project not found"))
    }

    fn save_snapshot(
        &self,
        project_id: &str,
        user_id: &str,
        snapshot: DocumentSnapshot,
    ) -> EaselResult<Project> {
        self.update_project(
            project_id,
            user_id,
            ProjectUpdate {
                snapshot: Some(snapshot),
                ..ProjectUpdate::default()
            },
        )
    }
}

/// Process-local [`ProjectStore`].
#[derive(Debug, Default)]
pub struct MemoryProjectStore {
    projects: RefCell<Vec<Project>>,
    next_id: Cell<u64>,
    updates: Cell<u64>,
}

impl MemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful updates, snapshot saves included.
    pub fn update_count(&self) -> u64 {
        self.updates.get()
    }
}

impl ProjectStore for MemoryProjectStore {
    fn list_projects(&self, user_id: &str) -> EaselResult<Vec<Project>> {
        Ok(self
            .projects
            .borrow()
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect())
    }

    fn create_project(&self, project: NewProject) -> EaselResult<Project> {
        if project.user_id.trim().is_empty() {
            return Err(EaselError::validation("user_id must be non-empty"));
        }
        self.next_id.set(self.next_id.get() + 1);
        let now = Utc::now();
        let created = Project {
            id: format!("project-{}", self.next_id.get()),
            user_id: project.user_id,
            name: project.name,
            description: project.description,
            snapshot: project.snapshot,
            created_at: now,
            updated_at: now,
        };
        self.projects.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn update_project(
        &self,
        project_id: &str,
        user_id: &str,
        update: ProjectUpdate,
    ) -> EaselResult<Project> {
        let mut projects = self.projects.borrow_mut();
        let project = projects
            .iter_mut()
            .find(|p| p.id == project_id && p.user_id == user_id)
            .ok_or_else(|| EaselError::validation("project not found"))?;
        if let Some(name) = update.name {
            project.name = Some(name);
        }
        if let Some(description) = update.description {
            project.description = Some(description);
        }
        if let Some(snapshot) = update.snapshot {
            project.snapshot = Some(snapshot);
        }
        project.updated_at = Utc::now();
        self.updates.set(self.updates.get() + 1);
        Ok(project.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/projects.rs"]
mod tests;
