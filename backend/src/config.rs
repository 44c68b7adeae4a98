//! Waitlist configuration loaded via OrthoConfig.
//!
//! Values come from `SUBX_*` environment variables or a configuration file;
//! anything unset falls back to the defaults below.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cap_std::{ambient_authority, fs::Dir};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{
    DEFAULT_BASELINE_SIGNUP_COUNT, IncomeRangeCatalogue, IncomeRangeCatalogueError,
    ReferralBaseUrl, WaitlistOptions,
};

const DEFAULT_STORAGE_DIR: &str = ".subx";
const DEFAULT_SUBMISSION_DELAY_MS: u64 = 1_000;

/// Errors raised while turning settings into runtime values.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The referral base URL does not parse.
    #[error("invalid referral base URL {value:?}: {source}")]
    ReferralBaseUrl {
        /// Configured value.
        value: String,
        /// Parser failure.
        #[source]
        source: url::ParseError,
    },
    /// The income range catalogue file could not be read.
    #[error("failed to read income ranges at {path}: {source}")]
    IncomeRangesRead {
        /// Configured path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The income range catalogue file is not a valid catalogue.
    #[error("invalid income ranges at {path}: {source}")]
    IncomeRanges {
        /// Configured path.
        path: PathBuf,
        /// Catalogue validation failure.
        #[source]
        source: IncomeRangeCatalogueError,
    },
}

/// Configuration for the waitlist engine.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SUBX")]
pub struct WaitlistSettings {
    /// Directory holding the persisted registration state.
    pub storage_dir: Option<PathBuf>,
    /// Signup counter used when no state has been persisted yet.
    #[ortho_config(default = 137_582)]
    pub baseline_count: u64,
    /// JSON file overriding the built-in income range catalogue.
    pub income_ranges_path: Option<PathBuf>,
    /// Latency of the simulated submission round trip, in milliseconds.
    #[ortho_config(default = 1_000)]
    pub submission_delay_ms: u64,
    /// Base URL that referral codes are appended to.
    pub referral_base_url: Option<String>,
}

impl Default for WaitlistSettings {
    fn default() -> Self {
        Self {
            storage_dir: None,
            baseline_count: DEFAULT_BASELINE_SIGNUP_COUNT,
            income_ranges_path: None,
            submission_delay_ms: DEFAULT_SUBMISSION_DELAY_MS,
            referral_base_url: None,
        }
    }
}

impl WaitlistSettings {
    /// Return the configured storage directory, falling back to `./.subx`.
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_DIR))
    }

    /// Return the configured submission latency.
    pub fn submission_delay(&self) -> Duration {
        Duration::from_millis(self.submission_delay_ms)
    }

    /// Parse the configured referral base URL.
    pub fn referral_base(&self) -> Result<ReferralBaseUrl, ConfigError> {
        match self.referral_base_url.as_deref() {
            None => Ok(ReferralBaseUrl::default()),
            Some(value) => {
                ReferralBaseUrl::parse(value).map_err(|source| ConfigError::ReferralBaseUrl {
                    value: value.to_owned(),
                    source,
                })
            }
        }
    }

    /// Load the income range catalogue, or the built-in one when no path is set.
    pub fn income_range_catalogue(&self) -> Result<IncomeRangeCatalogue, ConfigError> {
        let Some(path) = self.income_ranges_path.as_deref() else {
            return Ok(IncomeRangeCatalogue::default());
        };
        let contents = read_text_file(path)?;
        IncomeRangeCatalogue::from_json(&contents).map_err(|source| ConfigError::IncomeRanges {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Assemble the options the waitlist service starts with.
    pub fn waitlist_options(&self) -> Result<WaitlistOptions, ConfigError> {
        Ok(WaitlistOptions::new()
            .with_catalogue(self.income_range_catalogue()?)
            .with_baseline_count(self.baseline_count)
            .with_referral_base(self.referral_base()?))
    }
}

fn read_text_file(path: &Path) -> Result<String, ConfigError> {
    let read_error = |source| ConfigError::IncomeRangesRead {
        path: path.to_path_buf(),
        source,
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        read_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "income ranges path must be a file",
        ))
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
    dir.read_to_string(Path::new(file_name)).map_err(read_error)
}
