//! Config loading, discovery and validation.

use super::model::{Config, DEFAULT_CONFIG_FILE};
use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

impl Config {
    /// Load config from a YAML file.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(Error::Config)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content).map_err(|e| {
            Error::Config(format!("invalid config file '{}': {}", path.display(), e))
        })
    }

    /// Find and load the config file.
    ///
    /// An explicit path must exist. Without one, `.statectl.yaml` in `cwd` is
    /// used if present; otherwise defaults apply.
    pub fn discover(explicit: Option<&Path>, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            debug!(path = %path.display(), "loading config file");
            return Self::load(path);
        }

        let default_path = cwd.join(DEFAULT_CONFIG_FILE);
        if default_path.is_file() {
            debug!(path = %default_path.display(), "loading config file");
            return Self::load(default_path);
        }

        debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as unit rather than an empty map.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| Error::Config(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate config values.
    ///
    /// String fields, when present, must not be blank.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("bucket", self.bucket.as_deref()),
            ("key", self.key.as_deref()),
            ("manifest_key", self.manifest_key.as_deref()),
            ("region", self.region.as_deref()),
            ("endpoint", self.endpoint.as_deref()),
        ];

        for (name, value) in fields {
            if let Some(value) = value
                && value.trim().is_empty()
            {
                return Err(Error::Config(format!(
                    "config validation failed: {} must not be empty",
                    name
                )));
            }
        }

        if let Some(root) = &self.root
            && root.as_os_str().is_empty()
        {
            return Err(Error::Config(
                "config validation failed: root must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
