//! Published-project store: the public hosting directory used as the only
//! persistence layer, one independently deletable subdirectory per project.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;
use utils::sanitize::is_valid_project_id;

use super::html_preview::is_html_preview;

#[derive(Debug, Error)]
pub enum ProjectStoreError {
    #[error("invalid project id: {0}")]
    InvalidProjectId(String),
    #[error("project not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub preview_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    FlutterBuild,
    HtmlPreview,
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ProjectStatus {
    pub project_id: String,
    pub preview_url: String,
    pub status: String,
    #[serde(rename = "type")]
    pub kind: ProjectKind,
}

/// Lists, looks up and deletes projects published under the hosting root.
pub struct ProjectStore {
    public_root: PathBuf,
}

impl ProjectStore {
    pub fn new(public_root: impl Into<PathBuf>) -> Self {
        Self {
            public_root: public_root.into(),
        }
    }

    /// All published projects, newest first. A missing hosting root is an
    /// empty store, not an error.
    pub async fn list(&self) -> Result<Vec<ProjectSummary>, ProjectStoreError> {
        let mut entries = match tokio::fs::read_dir(&self.public_root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(e.into()),
        };

        let mut projects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            let id = entry.file_name().to_string_lossy().to_string();
            let metadata = entry.metadata().await?;
            let created = metadata
                .created()
                .or_else(|_| metadata.modified())
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            projects.push(ProjectSummary {
                name: id.split('_').next().unwrap_or(&id).to_string(),
                preview_url: format!("/flutter_apps/{id}"),
                id,
                created_at: created,
            });
        }

        projects.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(projects)
    }

    /// Status of one project, including whether it is a real build or a
    /// synthesized HTML preview.
    pub async fn get(&self, project_id: &str) -> Result<ProjectStatus, ProjectStoreError> {
        let dir = self.project_dir(project_id)?;
        let index = tokio::fs::read_to_string(dir.join("index.html"))
            .await
            .map_err(|_| ProjectStoreError::NotFound(project_id.to_string()))?;

        let kind = if is_html_preview(&index) {
            ProjectKind::HtmlPreview
        } else {
            ProjectKind::FlutterBuild
        };

        Ok(ProjectStatus {
            project_id: project_id.to_string(),
            preview_url: format!("/flutter_apps/{project_id}"),
            status: "available".to_string(),
            kind,
        })
    }

    /// Delete a published project. Deleting an absent project succeeds.
    pub async fn delete(&self, project_id: &str) -> Result<(), ProjectStoreError> {
        let dir = self.project_dir(project_id)?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn project_dir(&self, project_id: &str) -> Result<PathBuf, ProjectStoreError> {
        if !is_valid_project_id(project_id) {
            return Err(ProjectStoreError::InvalidProjectId(project_id.to_string()));
        }
        Ok(self.public_root.join(project_id))
    }

    /// Root directory the store serves from.
    pub fn public_root(&self) -> &Path {
        &self.public_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::html_preview::PREVIEW_MARKER;

    async fn publish(root: &Path, id: &str, index: &str) {
        let dir = root.join(id);
        tokio::fs::create_dir_all(&dir).await.unwrap();
        tokio::fs::write(dir.join("index.html"), index).await.unwrap();
    }

    #[tokio::test]
    async fn missing_root_lists_empty() {
        let store = ProjectStore::new("/nonexistent/appio-store-test");
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn lists_published_projects_with_display_name() {
        let root = tempfile::tempdir().unwrap();
        publish(root.path(), "cats_1755000000000", "<html></html>").await;
        publish(root.path(), "dogs_1755000000001", "<html></html>").await;

        let store = ProjectStore::new(root.path());
        let projects = store.list().await.unwrap();
        assert_eq!(projects.len(), 2);
        let cats = projects.iter().find(|p| p.id == "cats_1755000000000").unwrap();
        assert_eq!(cats.name, "cats");
        assert_eq!(cats.preview_url, "/flutter_apps/cats_1755000000000");
    }

    #[tokio::test]
    async fn get_distinguishes_preview_from_build() {
        let root = tempfile::tempdir().unwrap();
        publish(
            root.path(),
            "preview_1",
            &format!("<html><head>{PREVIEW_MARKER}</head></html>"),
        )
        .await;
        publish(root.path(), "build_1", "<html><body>app</body></html>").await;

        let store = ProjectStore::new(root.path());
        assert_eq!(
            store.get("preview_1").await.unwrap().kind,
            ProjectKind::HtmlPreview
        );
        assert_eq!(
            store.get("build_1").await.unwrap().kind,
            ProjectKind::FlutterBuild
        );
    }

    #[tokio::test]
    async fn get_missing_project_is_not_found() {
        let root = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(root.path());
        assert!(matches!(
            store.get("absent_1").await.unwrap_err(),
            ProjectStoreError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn traversal_ids_are_rejected() {
        let root = tempfile::tempdir().unwrap();
        let store = ProjectStore::new(root.path());
        assert!(matches!(
            store.get("../escape").await.unwrap_err(),
            ProjectStoreError::InvalidProjectId(_)
        ));
        assert!(matches!(
            store.delete("../escape").await.unwrap_err(),
            ProjectStoreError::InvalidProjectId(_)
        ));
    }

    #[tokio::test]
    async fn delete_removes_project_and_tolerates_absence() {
        let root = tempfile::tempdir().unwrap();
        publish(root.path(), "gone_1", "<html></html>").await;

        let store = ProjectStore::new(root.path());
        store.delete("gone_1").await.unwrap();
        assert!(!root.path().join("gone_1").exists());
        store.delete("gone_1").await.unwrap();
    }
}
