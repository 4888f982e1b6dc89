//! Builder for creating and configuring [`DrService`] instances.

use std::path::{Path, PathBuf};

use tokio::task;

use super::DrService;
use crate::{
    db::Database,
    error::{DrError, Result},
    pipeline::{Collaborators, HookConfig},
};

/// Builder for creating and configuring [`DrService`] instances.
#[derive(Debug, Clone, Default)]
pub struct DrServiceBuilder {
    database_path: Option<PathBuf>,
    collaborators: Option<Collaborators>,
}

impl DrServiceBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/fleetdr/fleetdr.db` or `~/.local/share/fleetdr/fleetdr.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the collaborators pipelines run against.
    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = Some(collaborators);
        self
    }

    /// Uses shell command hooks for every collaborator.
    pub fn with_hooks(self, config: HookConfig) -> Self {
        self.with_collaborators(Collaborators::from_hooks(config))
    }

    /// Builds the configured service, creating the database if needed.
    ///
    /// Without explicit collaborators the service uses an empty hook
    /// configuration: plan management works, pipeline steps fail with a
    /// configuration error.
    ///
    /// # Errors
    ///
    /// Returns `DrError::FileSystem` if the database directory cannot be
    /// created and `DrError::Database` if schema initialization fails
    pub async fn build(self) -> Result<DrService> {
        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| DrError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), DrError>(())
        })
        .await
        .map_err(|e| DrError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        let collaborators = self
            .collaborators
            .unwrap_or_else(|| Collaborators::from_hooks(HookConfig::default()));

        Ok(DrService::new(db_path, collaborators))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("fleetdr")
            .place_data_file("fleetdr.db")
            .map_err(|e| DrError::XdgDirectory(e.to_string()))
    }
}
