//! Build & preview service: materialize a file set into a scratch
//! workspace, attempt a flutter web build, publish either the artifact or a
//! synthesized HTML preview, and always clean the workspace up.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{info, warn};
use ts_rs::TS;
use utils::sanitize::{PathError, normalize_relative, sanitize_project_name};

use super::file_set::FileRecord;
use super::html_preview::generate_html_preview;

/// Per-file content cap (5 MiB).
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

const DEFAULT_PROJECT_NAME: &str = "flutter_project";
const DEFAULT_FLUTTER_BIN: &str = "flutter";
const DEFAULT_BUILD_TIMEOUT: Duration = Duration::from_secs(600);

const ALLOWED_DIRECTORIES: [&str; 6] = ["lib/", "assets/", "test/", "web/", "android/", "ios/"];
const ALLOWED_ROOT_FILES: [&str; 6] = [
    "pubspec.yaml",
    "README.md",
    "analysis_options.yaml",
    ".gitignore",
    ".metadata",
    "firebase_options.dart",
];

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("no files provided")]
    EmptyFileSet,
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("file not in allowed directory: {0}")]
    DisallowedPath(String),
    #[error("file too large: {0}")]
    FileTooLarge(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Caller errors (bad input) as opposed to server-side I/O failures.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

#[derive(Debug, Error)]
enum ToolchainError {
    #[error("flutter binary not found")]
    Unavailable,
    #[error("`{command}` timed out after {seconds}s")]
    TimedOut { command: String, seconds: u64 },
    #[error("`{command}` failed: {stderr}")]
    Failed { command: String, stderr: String },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct BuildOutcome {
    pub project_id: String,
    pub preview_url: String,
    pub message: String,
    pub is_html_preview: bool,
}

/// Builds generated projects and publishes them under the public hosting
/// root, one directory per project id.
pub struct ProjectBuilder {
    temp_root: PathBuf,
    public_root: PathBuf,
    flutter_bin: String,
    build_timeout: Duration,
}

impl ProjectBuilder {
    pub fn new(temp_root: impl Into<PathBuf>, public_root: impl Into<PathBuf>) -> Self {
        Self {
            temp_root: temp_root.into(),
            public_root: public_root.into(),
            flutter_bin: DEFAULT_FLUTTER_BIN.to_string(),
            build_timeout: DEFAULT_BUILD_TIMEOUT,
        }
    }

    pub fn with_flutter_bin(mut self, bin: impl Into<String>) -> Self {
        self.flutter_bin = bin.into();
        self
    }

    pub fn with_build_timeout(mut self, build_timeout: Duration) -> Self {
        self.build_timeout = build_timeout;
        self
    }

    /// Run the full build pipeline for one request. Validation failures
    /// abort before anything is written; toolchain failures degrade to an
    /// HTML preview and still count as success.
    pub async fn build(
        &self,
        files: &[FileRecord],
        project_name: Option<&str>,
    ) -> Result<BuildOutcome, BuildError> {
        if files.is_empty() {
            return Err(BuildError::EmptyFileSet);
        }

        // Validate every path and size before the first write.
        let validated = validate_files(files)?;

        let sanitized = sanitize_project_name(project_name.unwrap_or(DEFAULT_PROJECT_NAME));
        let project_id = format!("{sanitized}_{}", chrono::Utc::now().timestamp_millis());

        tokio::fs::create_dir_all(&self.temp_root).await?;
        let workspace = tempfile::Builder::new()
            .prefix(&format!("{project_id}_"))
            .tempdir_in(&self.temp_root)?;

        materialize(workspace.path(), &validated).await?;

        let outcome = match self.run_flutter_build(workspace.path()).await {
            Ok(()) => {
                let hosting_dir = self.public_root.join(&project_id);
                tokio::fs::create_dir_all(&hosting_dir).await?;
                utils::fs::copy_dir_recursive(&workspace.path().join("build/web"), &hosting_dir)
                    .await?;
                info!(project_id = %project_id, "Flutter build published");
                BuildOutcome {
                    preview_url: format!("/flutter_apps/{project_id}"),
                    project_id,
                    message: "Project built successfully".to_string(),
                    is_html_preview: false,
                }
            }
            Err(e) => {
                warn!(project_id = %project_id, error = %e, "Flutter build unavailable, publishing HTML preview");
                let app_name = project_name.unwrap_or("Flutter App");
                let html = generate_html_preview(files, app_name);
                let hosting_dir = self.public_root.join(&project_id);
                tokio::fs::create_dir_all(&hosting_dir).await?;
                tokio::fs::write(hosting_dir.join("index.html"), html).await?;
                BuildOutcome {
                    preview_url: format!("/flutter_apps/{project_id}"),
                    project_id,
                    message: "Project preview created (Flutter SDK not available)".to_string(),
                    is_html_preview: true,
                }
            }
        };

        if let Err(e) = workspace.close() {
            warn!(error = %e, "Failed to remove build workspace");
        }
        Ok(outcome)
    }

    async fn run_flutter_build(&self, project_dir: &Path) -> Result<(), ToolchainError> {
        which::which(&self.flutter_bin).map_err(|_| ToolchainError::Unavailable)?;

        self.run_flutter(&["pub", "get"], project_dir).await?;
        self.run_flutter(&["build", "web", "--release"], project_dir)
            .await
    }

    async fn run_flutter(&self, args: &[&str], cwd: &Path) -> Result<(), ToolchainError> {
        let command = format!("{} {}", self.flutter_bin, args.join(" "));
        info!(command = %command, "Running build step");

        let mut cmd = Command::new(&self.flutter_bin);
        cmd.args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = timeout(self.build_timeout, cmd.output())
            .await
            .map_err(|_| ToolchainError::TimedOut {
                command: command.clone(),
                seconds: self.build_timeout.as_secs(),
            })??;

        if !output.status.success() {
            return Err(ToolchainError::Failed {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// Normalize and check every file before anything touches the filesystem.
fn validate_files(files: &[FileRecord]) -> Result<Vec<(String, &FileRecord)>, BuildError> {
    let mut validated = Vec::with_capacity(files.len());
    for file in files {
        let normalized = normalize_relative(&file.path)?;

        let allowed = ALLOWED_ROOT_FILES.contains(&normalized.as_str())
            || ALLOWED_DIRECTORIES
                .iter()
                .any(|dir| normalized.starts_with(dir));
        if !allowed {
            return Err(BuildError::DisallowedPath(normalized));
        }

        if file.content.len() > MAX_FILE_SIZE {
            return Err(BuildError::FileTooLarge(normalized));
        }

        validated.push((normalized, file));
    }
    Ok(validated)
}

async fn materialize(
    project_dir: &Path,
    files: &[(String, &FileRecord)],
) -> Result<(), BuildError> {
    for (normalized, file) in files {
        let resolved = project_dir.join(normalized);
        if !resolved.starts_with(project_dir) {
            return Err(PathError::Traversal(file.path.clone()).into());
        }
        if let Some(parent) = resolved.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&resolved, &file.content).await?;
    }
    Ok(())
}
