//! Application configuration
//!
//! Read once at startup from YAML or JSON, then overridden from `COHORT_*`
//! environment variables, one per key:
//!
//! | variable | key |
//! |---|---|
//! | `COHORT_API_TYPE` | `api-type` |
//! | `COHORT_ENABLE_GREEDY_TREE_LOADING` | `enable-greedy-tree-loading` |
//! | `COHORT_ROOT_REQUEST_DEPTH` | `root-request-depth` |

use std::path::Path;
use std::sync::Arc;

use ::config::builder::DefaultState;
use ::config::{Case, Config, ConfigBuilder, Environment, File, FileFormat};
use cohort_query::{ApiType, ExportOptions, InvalidApiType, QueryBackend, QueryTranslator};
use cohort_tree::{
    CatalogOptions, DEFAULT_CHILD_REQUEST_DEPTH, DEFAULT_ROOT_REQUEST_DEPTH, TreeCatalog,
    TreeSource,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix of environment variables overriding config keys
pub const ENV_PREFIX: &str = "COHORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Unsupported config file extension: {0}. Expected .yaml, .yml or .json")]
    UnsupportedFormat(String),

    #[error(transparent)]
    InvalidApiType(#[from] InvalidApiType),

    #[error("{key} must be at least 1")]
    ZeroDepth { key: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    /// `transmart` or `picsure`, case-insensitive
    #[serde(default = "default_api_type")]
    pub api_type: String,
    #[serde(default = "default_true")]
    pub enable_greedy_tree_loading: bool,
    #[serde(default = "default_root_request_depth")]
    pub root_request_depth: u32,
    #[serde(default = "default_child_request_depth")]
    pub child_request_depth: u32,
    #[serde(default = "default_export_data_view")]
    pub export_data_view: String,
    #[serde(default = "default_true")]
    pub include_measurement_date_columns: bool,
}

fn default_api_type() -> String {
    ApiType::default().to_string()
}

fn default_true() -> bool {
    true
}

fn default_root_request_depth() -> u32 {
    DEFAULT_ROOT_REQUEST_DEPTH
}

fn default_child_request_depth() -> u32 {
    DEFAULT_CHILD_REQUEST_DEPTH
}

fn default_export_data_view() -> String {
    ExportOptions::default().data_view
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_type: default_api_type(),
            enable_greedy_tree_loading: true,
            root_request_depth: default_root_request_depth(),
            child_request_depth: default_child_request_depth(),
            export_data_view: default_export_data_view(),
            include_measurement_date_columns: true,
        }
    }
}

impl AppConfig {
    /// Load from an optional file, then apply the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let builder = with_file(Config::builder(), path)?;
        Self::build(builder.add_source(environment()))
    }

    /// Load from an optional file, then apply `vars` as if they were the
    /// process environment
    pub fn load_with_env<I>(path: Option<&Path>, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let builder = with_file(Config::builder(), path)?;
        let env = environment().source(Some(vars.into_iter().collect()));
        Self::build(builder.add_source(env))
    }

    /// Load from a file, detecting the format by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::build(with_file(Config::builder(), Some(path.as_ref()))?)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let source = File::from_str(content, FileFormat::Yaml);
        Self::build(Config::builder().add_source(source))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let source = File::from_str(content, FileFormat::Json);
        Self::build(Config::builder().add_source(source))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Self = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        log::debug!("Loaded config for the {} backend", config.api_type);
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_type()?;
        if self.root_request_depth == 0 {
            return Err(ConfigError::ZeroDepth {
                key: "root-request-depth".to_string(),
            });
        }
        if self.child_request_depth == 0 {
            return Err(ConfigError::ZeroDepth {
                key: "child-request-depth".to_string(),
            });
        }
        Ok(())
    }

    pub fn api_type(&self) -> Result<ApiType, ConfigError> {
        Ok(self.api_type.parse::<ApiType>()?)
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            greedy: self.enable_greedy_tree_loading,
            root_request_depth: self.root_request_depth,
            child_request_depth: self.child_request_depth,
        }
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            data_view: self.export_data_view.clone(),
            include_measurement_date_columns: self.include_measurement_date_columns,
        }
    }

    /// Tree catalog over `source` with the configured loading options
    pub fn catalog(&self, source: Arc<dyn TreeSource>) -> TreeCatalog {
        TreeCatalog::new(source, self.catalog_options())
    }

    /// Query translator for the configured backend
    pub fn translator(
        &self,
        backend: Arc<dyn QueryBackend>,
    ) -> Result<QueryTranslator, ConfigError> {
        Ok(QueryTranslator::new(self.api_type()?, backend)
            .with_export_options(self.export_options()))
    }
}

fn with_file(
    builder: ConfigBuilder<DefaultState>,
    path: Option<&Path>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let Some(path) = path else {
        return Ok(builder);
    };
    let format = match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => FileFormat::Yaml,
        Some("json") => FileFormat::Json,
        Some(ext) => return Err(ConfigError::UnsupportedFormat(format!(".{ext}"))),
        None => return Err(ConfigError::UnsupportedFormat("(none)".to_string())),
    };
    std::fs::metadata(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(builder.add_source(File::from(path).format(format)))
}

// COHORT_ROOT_REQUEST_DEPTH maps to root-request-depth
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .convert_case(Case::Kebab)
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.api_type().unwrap(), ApiType::Transmart);
        assert!(config.catalog_options().greedy);
        assert_eq!(config.catalog_options().root_request_depth, 2);
        assert_eq!(config.catalog_options().child_request_depth, 20);
        assert_eq!(config.export_options(), ExportOptions::default());
    }

    #[test]
    fn test_environment_without_file() {
        let config = AppConfig::load_with_env(
            None,
            vars(&[
                ("COHORT_API_TYPE", "PICSURE"),
                ("COHORT_ENABLE_GREEDY_TREE_LOADING", "false"),
                ("COHORT_CHILD_REQUEST_DEPTH", "7"),
                ("OTHER_API_TYPE", "nope"),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_type().unwrap(), ApiType::PicSure);
        assert!(!config.enable_greedy_tree_loading);
        assert_eq!(config.child_request_depth, 7);
        assert_eq!(config.root_request_depth, DEFAULT_ROOT_REQUEST_DEPTH);
    }

    #[test]
    fn test_unparseable_environment_value() {
        let err = AppConfig::load_with_env(
            None,
            vars(&[("COHORT_ENABLE_GREEDY_TREE_LOADING", "maybe")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
