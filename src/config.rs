//! Configuration for the verification host.
//!
//! Loaded once at startup from TOML, then overlaid with environment
//! variables. Missing credentials are a fatal [`VerityError::Config`]
//! raised before any request is served.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::bridge::framing::Framing;
use crate::error::{Result, VerityError};
use verity_search::{SearchConfig, SearchQueryConfig, page_windows};

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "VERITY_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VerityConfig {
    /// Search provider credentials and fan-out shape.
    pub search: SearchSettings,
    /// LLM provider settings.
    pub llm: LlmSettings,
    /// Per-request pipeline behaviour.
    pub pipeline: PipelineSettings,
    /// Extension bridge transport.
    pub bridge: BridgeSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Search provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub api_key: String,
    /// Engine covering the open web.
    pub engine_id_broad: String,
    /// Engine restricted to curated news and fact-check sites.
    pub engine_id_specific: String,
    pub base_url: String,
    /// Results per call (provider maximum is 10).
    pub page_size: u32,
    /// Results to request from the specific engine, split into page windows.
    pub specific_target_results: u32,
    /// Results to request from the broad engine, split into page windows.
    pub broad_target_results: u32,
    /// Per-call HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            engine_id_broad: String::new(),
            engine_id_specific: String::new(),
            base_url: verity_search::config::DEFAULT_BASE_URL.to_string(),
            page_size: 10,
            specific_target_results: 20,
            broad_target_results: 10,
            timeout_seconds: 8,
        }
    }
}

impl std::fmt::Debug for SearchSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSettings")
            .field("api_key", &redact(&self.api_key))
            .field("engine_id_broad", &self.engine_id_broad)
            .field("engine_id_specific", &self.engine_id_specific)
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("specific_target_results", &self.specific_target_results)
            .field("broad_target_results", &self.broad_target_results)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// LLM provider settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub api_key: String,
    /// Model identifier, e.g. `"gemini-2.0-flash"`.
    pub model: String,
    pub base_url: String,
    /// Per-call HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: crate::llm::gemini::DEFAULT_MODEL.to_string(),
            base_url: crate::llm::gemini::DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 30,
        }
    }
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Pipeline behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Run the second LLM pass that writes a user-facing explanation.
    pub summarize: bool,
    /// Deadline for one whole verification request, in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            summarize: true,
            request_timeout_seconds: 60,
        }
    }
}

/// Extension bridge transport.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    pub framing: Framing,
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset.
    pub level: String,
    /// Also write daily-rotated log files here.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

impl VerityConfig {
    /// Load configuration from a TOML file, falling back to defaults for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| VerityError::Config(e.to_string()))
    }

    /// Returns the default config file path: `~/.config/verity/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("verity").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("verity")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/verity-config/config.toml")
        }
    }

    /// Startup loading: file (if present), then process environment, then validation.
    ///
    /// # Errors
    ///
    /// Returns [`VerityError::Config`] for unreadable files or missing credentials.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_config_path);
        Self::load_with(&path, |key| std::env::var(key).ok())
    }

    /// Same as [`VerityConfig::load`] with an explicit path and variable lookup.
    ///
    /// A missing file is not an error; defaults plus environment are used.
    pub fn load_with(path: &Path, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = if path.is_file() {
            tracing::debug!(path = %path.display(), "loading config file");
            Self::from_file(path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            Self::default()
        };
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Overlay credentials and model from environment variables.
    ///
    /// Recognised: `VERITY_SEARCH_API_KEY`, `VERITY_SEARCH_ENGINE_ID_BROAD`,
    /// `VERITY_SEARCH_ENGINE_ID_SPECIFIC`, `VERITY_LLM_API_KEY`, `VERITY_LLM_MODEL`.
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("VERITY_SEARCH_API_KEY") {
            self.search.api_key = v;
        }
        if let Some(v) = get("VERITY_SEARCH_ENGINE_ID_BROAD") {
            self.search.engine_id_broad = v;
        }
        if let Some(v) = get("VERITY_SEARCH_ENGINE_ID_SPECIFIC") {
            self.search.engine_id_specific = v;
        }
        if let Some(v) = get("VERITY_LLM_API_KEY") {
            self.llm.api_key = v;
        }
        if let Some(v) = get("VERITY_LLM_MODEL") {
            self.llm.model = v;
        }
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - the four credentials are present
    /// - `page_size` is within `1..=10`
    /// - fan-out targets, timeouts and the request deadline are non-zero
    /// - base URLs parse
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("search.api_key", &self.search.api_key),
            ("search.engine_id_broad", &self.search.engine_id_broad),
            ("search.engine_id_specific", &self.search.engine_id_specific),
            ("llm.api_key", &self.llm.api_key),
        ];
        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| *name)
            .collect();
        if !missing.is_empty() {
            return Err(VerityError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )));
        }

        if self.search.page_size == 0
            || self.search.page_size > verity_search::config::MAX_PAGE_SIZE
        {
            return Err(VerityError::Config(format!(
                "search.page_size must be between 1 and {}",
                verity_search::config::MAX_PAGE_SIZE
            )));
        }
        if self.search.specific_target_results == 0 && self.search.broad_target_results == 0 {
            return Err(VerityError::Config(
                "at least one of search.specific_target_results or search.broad_target_results must be greater than 0".into(),
            ));
        }
        if self.llm.model.trim().is_empty() {
            return Err(VerityError::Config("llm.model must not be empty".into()));
        }
        if self.llm.timeout_seconds == 0 {
            return Err(VerityError::Config(
                "llm.timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.pipeline.request_timeout_seconds == 0 {
            return Err(VerityError::Config(
                "pipeline.request_timeout_seconds must be greater than 0".into(),
            ));
        }
        url::Url::parse(&self.llm.base_url)
            .map_err(|e| VerityError::Config(format!("invalid llm.base_url: {e}")))?;
        self.search_config().validate()?;
        Ok(())
    }

    /// Connection settings for the search crate.
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::new(self.search.api_key.clone())
            .with_base_url(self.search.base_url.clone())
            .with_timeout_seconds(self.search.timeout_seconds)
    }

    /// The fan-out for one request: specific-engine windows, then broad-engine windows.
    pub fn query_configs(&self) -> Vec<SearchQueryConfig> {
        let mut configs = page_windows(
            &self.search.engine_id_specific,
            self.search.page_size,
            self.search.specific_target_results,
        );
        configs.extend(page_windows(
            &self.search.engine_id_broad,
            self.search.page_size,
            self.search.broad_target_results,
        ));
        configs
    }
}
