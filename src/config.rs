//! File-based configuration (`searchql.toml`).
//!
//! ```toml
//! search_type = "tsvector"
//! searchable_columns = ["title", "body"]
//! max_input_length = 4096
//! max_depth = 64
//!
//! [[fields]]
//! name = "price"
//! type = "number"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::parser::{ParseOptions, DEFAULT_MAX_DEPTH, DEFAULT_MAX_INPUT_LENGTH};
use crate::schema::FieldSchema;
use crate::transpiler::{SearchType, SqlOptions};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "searchql.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Search configuration. Every key is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Declared fields. Empty means unrestricted parsing.
    pub fields: Vec<FieldSchema>,

    /// Columns matched by unscoped terms, in order.
    pub searchable_columns: Vec<String>,

    /// Strategy for unscoped terms
    pub search_type: SearchType,

    /// Text search configuration for `tsvector`
    pub ts_config: String,

    pub max_input_length: usize,

    pub max_depth: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            searchable_columns: Vec::new(),
            search_type: SearchType::default(),
            ts_config: SqlOptions::default().ts_config,
            max_input_length: DEFAULT_MAX_INPUT_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl SearchConfig {
    /// Create a new configuration builder
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::default()
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load one config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), fields = config.fields.len(), "loaded config");
        Ok(config)
    }

    /// Load `./searchql.toml`, else `<config_dir>/searchql/config.toml`,
    /// else the defaults.
    pub fn discover() -> Result<Self, ConfigError> {
        for path in Self::candidate_paths() {
            if path.is_file() {
                return Self::load(&path);
            }
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Paths searched by [`SearchConfig::discover`], in order.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("searchql").join("config.toml"));
        }
        paths
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_input_length: self.max_input_length,
            max_depth: self.max_depth,
        }
    }

    pub fn sql_options(&self) -> SqlOptions {
        SqlOptions {
            search_type: self.search_type,
            ts_config: self.ts_config.clone(),
        }
    }
}

/// Builder for SearchConfig
#[derive(Debug, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Declare a field
    pub fn field(mut self, schema: FieldSchema) -> Self {
        self.config.fields.push(schema);
        self
    }

    /// Add a column for unscoped terms
    pub fn searchable(mut self, column: impl Into<String>) -> Self {
        self.config.searchable_columns.push(column.into());
        self
    }

    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.config.search_type = search_type;
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    pub fn max_input_length(mut self, max_input_length: usize) -> Self {
        self.config.max_input_length = max_input_length;
        self
    }

    /// Build the configuration
    pub fn build(self) -> SearchConfig {
        self.config
    }
}
