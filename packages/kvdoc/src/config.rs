//! Database configuration.

use std::path::{Path, PathBuf};

/// Environment variable naming the environment that owns the data.
pub const INSTANCE_ID_ENV: &str = "REPL_ID";

/// Options for [`Database::open`](crate::Database::open).
///
/// ```rust
/// use kvdoc::DatabaseConfig;
///
/// let config = DatabaseConfig::new("data/app")
///     .instance_id("deploy-42")
///     .create_if_missing(false);
/// assert_eq!(config.instance_id_ref(), Some("deploy-42"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Data directory. Relative paths resolve against the working directory.
    pub path: PathBuf,
    /// Id of the environment opening the data. When the stored id differs,
    /// the data is wiped on open.
    pub instance_id: Option<String>,
    pub create_if_missing: bool,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            instance_id: None,
            create_if_missing: true,
        }
    }

    /// Config for `path` with the instance id taken from `REPL_ID`.
    ///
    /// An unset or empty variable means no instance id.
    pub fn from_env(path: impl Into<PathBuf>) -> Self {
        let id = std::env::var(INSTANCE_ID_ENV)
            .ok()
            .filter(|id| !id.is_empty());
        Self {
            instance_id: id,
            ..Self::new(path)
        }
    }

    pub fn instance_id(mut self, id: impl Into<String>) -> Self {
        self.instance_id = Some(id.into());
        self
    }

    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn instance_id_ref(&self) -> Option<&str> {
        self.instance_id.as_deref()
    }
}
