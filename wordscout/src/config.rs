use config::{Config as ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// How the join step treats a failed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPolicy {
    /// Return the first failure to complete; partial successes are discarded
    #[default]
    FailFast,
    /// Wait for every task and report each block's outcome separately
    CollectAll,
}

/// Configuration for a search run.
///
/// # Configuration Locations
///
/// The configuration can be loaded from multiple locations in order of precedence:
/// 1. Custom config file specified via `--config` flag
/// 2. Local `.wordscout.yaml` in the current directory
/// 3. Global `$HOME/.config/wordscout/config.yaml`
///
/// # Configuration Format
///
/// ```yaml
/// # Words to search for in every block
/// words: ["cat", "dog"]
///
/// # Text separating a block's title from its body
/// title_delimiter: ":"
///
/// # Worker pool size (default: CPU cores)
/// thread_count: 4
///
/// # fail_fast or collect_all
/// join_policy: "collect_all"
///
/// # Match words regardless of case
/// case_insensitive: false
///
/// # Log level (trace, debug, info, warn, error)
/// log_level: "info"
/// ```
///
/// When using the CLI, command-line arguments take precedence over config file values.
/// The merging behavior is defined in the `merge_with_cli` method.
///
/// Settings that are missing from every file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// The words to find, in reporting order
    pub words: Vec<String>,

    /// Separates the title prefix from the searchable body
    pub title_delimiter: String,

    /// Number of worker threads in the search pool
    pub thread_count: NonZeroUsize,

    /// Failure handling at the join
    pub join_policy: JoinPolicy,

    /// Whether matching ignores case
    pub case_insensitive: bool,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

pub(crate) fn default_thread_count() -> NonZeroUsize {
    NonZeroUsize::new(num_cpus::get()).unwrap_or(NonZeroUsize::MIN)
}

pub(crate) fn default_title_delimiter() -> String {
    ":".to_string()
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            words: Vec::new(),
            title_delimiter: default_title_delimiter(),
            thread_count: default_thread_count(),
            join_policy: JoinPolicy::default(),
            case_insensitive: false,
            log_level: default_log_level(),
        }
    }
}

impl SearchConfig {
    /// Creates a default configuration searching for the given words
    pub fn with_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Loads configuration from a specific file
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        // Default config locations, lowest precedence first
        let config_files = [
            dirs::config_dir().map(|p| p.join("wordscout/config.yaml")),
            Some(PathBuf::from(".wordscout.yaml")),
        ];

        for path in config_files.iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path.as_path()).required(false));
            }
        }

        // An explicitly requested file must exist
        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder.build()?.try_deserialize()
    }

    /// Merges CLI arguments with configuration file values.
    ///
    /// Every value the command line sets wins, including one equal to the default.
    pub fn merge_with_cli(mut self, cli: CliOverrides) -> Self {
        if !cli.words.is_empty() {
            self.words = cli.words;
        }
        if let Some(delimiter) = cli.title_delimiter {
            self.title_delimiter = delimiter;
        }
        if let Some(threads) = cli.thread_count {
            self.thread_count = threads;
        }
        if let Some(policy) = cli.join_policy {
            self.join_policy = policy;
        }
        if let Some(case_insensitive) = cli.case_insensitive {
            self.case_insensitive = case_insensitive;
        }
        if let Some(level) = cli.log_level {
            self.log_level = level;
        }
        self
    }
}

/// Settings given on the command line; `None` leaves the file value in place
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOverrides {
    pub words: Vec<String>,
    pub title_delimiter: Option<String>,
    pub thread_count: Option<NonZeroUsize>,
    pub join_policy: Option<JoinPolicy>,
    pub case_insensitive: Option<bool>,
    pub log_level: Option<String>,
}
