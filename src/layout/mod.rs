//! Layout resolution: lexical confinement of layout identifiers to the views
//! root, existence probing, default fallback and the positive-result cache.

pub mod cache;
pub mod probe;
pub mod resolver;
pub mod validator;

pub use cache::LayoutCache;
pub use probe::{FsProbe, LayoutProbe, ProbeResult};
pub use resolver::LayoutResolver;
pub use validator::{validate, LayoutRoot, ValidatedLayoutPath};

use crate::errors::AppError;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Process environment, fixed at startup. Selects caching behaviour only;
/// validation is identical in every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentMode {
    #[default]
    Development,
    Production,
    Other,
}

impl EnvironmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvironmentMode::Development => "development",
            EnvironmentMode::Production => "production",
            EnvironmentMode::Other => "other",
        }
    }

    /// Whether template sources are read once and kept for the process lifetime.
    pub fn caches_sources(&self) -> bool {
        matches!(self, EnvironmentMode::Production)
    }
}

impl FromStr for EnvironmentMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(EnvironmentMode::Development),
            "production" | "prod" => Ok(EnvironmentMode::Production),
            "other" => Ok(EnvironmentMode::Other),
            _ => Err(()),
        }
    }
}

impl fmt::Display for EnvironmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejected {
    PathEscape,
    FilesystemError,
}

impl From<Rejected> for AppError {
    fn from(r: Rejected) -> Self {
        match r {
            Rejected::PathEscape => AppError::PathEscape,
            Rejected::FilesystemError => AppError::FilesystemError,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    UseValidated(ValidatedLayoutPath),
    UseDefault(PathBuf),
    Rejected(Rejected),
}

impl ResolutionOutcome {
    /// Path the renderer should read, or the error the request must fail with.
    pub fn into_path(self) -> Result<PathBuf, AppError> {
        match self {
            ResolutionOutcome::UseValidated(p) => Ok(p.into_path_buf()),
            ResolutionOutcome::UseDefault(p) => Ok(p),
            ResolutionOutcome::Rejected(r) => Err(r.into()),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ResolutionOutcome::UseValidated(_) => "UseValidated",
            ResolutionOutcome::UseDefault(_) => "UseDefault",
            ResolutionOutcome::Rejected(Rejected::PathEscape) => "PathEscape",
            ResolutionOutcome::Rejected(Rejected::FilesystemError) => "FilesystemError",
        }
    }
}
