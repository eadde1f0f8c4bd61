//! Configuration loading and discovery.
//!
//! Sources, highest precedence first:
//! - files passed explicitly (`--config`)
//! - `.gitver.<ext>` or `gitver.<ext>` in the search root or any parent,
//!   stopping at the repository boundary (`.git`)
//! - `~/.config/gitver/config.<ext>` (user config)
//! - built-in defaults
//!
//! Where `<ext>` is one of `toml`, `yaml`, `yml`, `json`.
//!
//! ```no_run
//! use camino::Utf8PathBuf;
//! use gitver_core::config::ConfigLoader;
//!
//! let cwd = Utf8PathBuf::try_from(std::env::current_dir().unwrap()).unwrap();
//! let config = ConfigLoader::new().with_project_search(&cwd).load().unwrap();
//! println!("{:?}", config.commit.protected_branches);
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::project::ProjectKind;

/// Default template for the commit recording a bump.
pub const DEFAULT_BUMP_MESSAGE: &str = "Version incremented to {version}";

/// The configuration for gitver.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level when neither flags nor `RUST_LOG` say otherwise.
    pub log_level: LogLevel,
    /// Directory for JSONL log files. No file logging when unset.
    pub log_dir: Option<Utf8PathBuf>,
    /// Project selection overrides.
    pub project: Option<ProjectConfig>,
    /// Commit behavior.
    pub commit: CommitConfig,
}

impl Config {
    /// Declaration search depth from `project.search_depth`.
    pub fn search_depth(&self) -> Option<usize> {
        self.project.as_ref().and_then(|p| p.search_depth)
    }
}

/// Project-level overrides. Normally the kind is detected from marker files.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProjectConfig {
    /// Force a project kind (`"rust"`, `"python"`, `"pyproject"`).
    #[serde(rename = "type")]
    pub project_type: Option<ProjectKind>,
    /// How many directory levels below the root to search for the
    /// declaration file. Unbounded when unset.
    pub search_depth: Option<usize>,
}

/// Commit step configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CommitConfig {
    /// Branches that need confirmation before committing.
    pub protected_branches: Vec<String>,
    /// Ask before committing on a protected branch. `--yes` overrides.
    pub confirm_protected: bool,
    /// Message for the bump commit made by `--separate-commits`.
    /// `{version}` is replaced with the new version.
    pub bump_message: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            protected_branches: vec!["master".to_string(), "main".to_string()],
            confirm_protected: true,
            bump_message: DEFAULT_BUMP_MESSAGE.to_string(),
        }
    }
}

impl CommitConfig {
    /// Whether `branch` is listed in `protected_branches`.
    pub fn is_protected(&self, branch: &str) -> bool {
        self.protected_branches.iter().any(|b| b == branch)
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything, including span enter/exit detail.
    Trace,
    /// Verbose output for debugging.
    Debug,
    /// Standard operational information.
    Info,
    /// Warnings about potential issues (default).
    #[default]
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "gitver";

/// Builder for loading configuration from multiple sources.
#[derive(Debug)]
pub struct ConfigLoader {
    project_search_root: Option<Utf8PathBuf>,
    include_user_config: bool,
    /// Stop walking up once a directory containing this entry has been
    /// searched.
    boundary_marker: Option<String>,
    explicit_files: Vec<Utf8PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// A loader that reads user config and stops at `.git`.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Walk up from `path` looking for a project config file.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/gitver/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Search all the way to the filesystem root.
    pub fn without_boundary_marker(mut self) -> Self {
        self.boundary_marker = None;
        self
    }

    /// Add an explicit config file. Later files take precedence.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.include_user_config
            && let Some(user_config) = find_user_config()
        {
            tracing::debug!(path = %user_config, "merging user config");
            figment = merge_file(figment, &user_config);
        }

        if let Some(ref root) = self.project_search_root
            && let Some(project_config) = self.find_project_config(root)
        {
            tracing::debug!(path = %project_config, "merging project config");
            figment = merge_file(figment, &project_config);
        }

        for file in &self.explicit_files {
            figment = merge_file(figment, file);
        }

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        tracing::debug!(log_level = config.log_level.as_str(), "configuration loaded");
        Ok(config)
    }

    fn find_project_config(&self, start: &Utf8Path) -> Option<Utf8PathBuf> {
        let mut current = Some(start);

        while let Some(dir) = current {
            for ext in CONFIG_EXTENSIONS {
                for name in [format!(".{APP_NAME}.{ext}"), format!("{APP_NAME}.{ext}")] {
                    let candidate = dir.join(name);
                    if candidate.is_file() {
                        return Some(candidate);
                    }
                }
            }

            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
            {
                break;
            }
            current = dir.parent();
        }

        None
    }
}

/// Find user config in the XDG config directory.
fn find_user_config() -> Option<Utf8PathBuf> {
    let config_dir = user_config_dir()?;
    CONFIG_EXTENSIONS
        .iter()
        .map(|ext| config_dir.join(format!("config.{ext}")))
        .find(|path| path.is_file())
}

/// Merge a config file into the figment, detecting format from extension.
fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
    match path.extension() {
        Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
        Some("json") => figment.merge(Json::file_exact(path.as_str())),
        _ => figment.merge(Toml::file_exact(path.as_str())),
    }
}

/// The user config directory: `~/.config/gitver/` on Linux and the platform
/// equivalent elsewhere.
pub fn user_config_dir() -> Option<Utf8PathBuf> {
    let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
    Utf8PathBuf::from_path_buf(proj_dirs.config_dir().to_path_buf()).ok()
}
