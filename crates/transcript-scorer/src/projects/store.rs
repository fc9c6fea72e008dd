use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::{Project, ProjectId, TranscriptEntry};

/// Storage abstraction so the CLI can be exercised against an in-memory double.
pub trait ProjectRepository: Send + Sync {
    fn list(&self) -> Result<Vec<Project>, StoreError>;
    fn create(&self, name: &str) -> Result<Project, StoreError>;
    fn get(&self, id: &ProjectId) -> Result<Option<Project>, StoreError>;
    fn append_entry(&self, id: &ProjectId, entry: TranscriptEntry) -> Result<Project, StoreError>;
}

/// Error enumeration for project store failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("project name must not be empty")]
    EmptyName,
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),
    #[error("project store io error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to encode project store: {0}")]
    Encode(#[from] serde_json::Error),
}

/// On-disk layout: every project lives under the single `projects` key.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    projects: Vec<Project>,
}

/// Project history persisted as one JSON document on local disk.
#[derive(Debug, Clone)]
pub struct JsonFileProjectStore {
    path: PathBuf,
}

impl JsonFileProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every project. Unreadable content is logged and treated as an empty history.
    pub fn load_all(&self) -> Result<Vec<Project>, StoreError> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_slice::<StoreDocument>(&raw) {
            Ok(document) => Ok(document.projects),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "discarding unreadable project store");
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the stored collection atomically.
    pub fn save_all(&self, projects: Vec<Project>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(source))?;
        }

        let mut file = AtomicWriteFile::open(&self.path).map_err(|source| self.io_error(source))?;
        let document = StoreDocument { projects };
        serde_json::to_writer_pretty(&mut file, &document)?;
        file.commit().map_err(|source| self.io_error(source))?;

        debug!(path = %self.path.display(), projects = document.projects.len(), "project store saved");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProjectRepository for JsonFileProjectStore {
    fn list(&self) -> Result<Vec<Project>, StoreError> {
        self.load_all()
    }

    fn create(&self, name: &str) -> Result<Project, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }

        let mut projects = self.load_all()?;
        let project = Project {
            id: next_project_id(&projects),
            name: name.to_string(),
            transcripts: Vec::new(),
        };
        projects.push(project.clone());
        self.save_all(projects)?;

        Ok(project)
    }

    fn get(&self, id: &ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self
            .load_all()?
            .into_iter()
            .find(|project| &project.id == id))
    }

    fn append_entry(&self, id: &ProjectId, entry: TranscriptEntry) -> Result<Project, StoreError> {
        let mut projects = self.load_all()?;
        let project = projects
            .iter_mut()
            .find(|project| &project.id == id)
            .ok_or_else(|| StoreError::ProjectNotFound(id.clone()))?;
        project.transcripts.push(entry);
        let updated = project.clone();

        self.save_all(projects)?;
        Ok(updated)
    }
}

pub(crate) fn next_project_id(existing: &[Project]) -> ProjectId {
    let mut candidate = Utc::now().timestamp_millis();
    while existing.iter().any(|project| project.id.0 == candidate.to_string()) {
        candidate += 1;
    }
    ProjectId(candidate.to_string())
}
