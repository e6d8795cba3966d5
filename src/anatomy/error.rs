use crate::anatomy::organs::OrganId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnatomyError {
    #[error("failed to load asset for {organ}: {reason}")]
    AssetLoadFailure { organ: OrganId, reason: String },
    #[error("asset '{label}' has a degenerate bounding box (max extent {max_extent})")]
    DegenerateAsset { label: String, max_extent: f32 },
    #[error("target size must be a positive finite number, got {0}")]
    InvalidTargetSize(f32),
    #[error("no render surface available to host the model view")]
    MissingContainer,
    #[error("organ {0} is already registered")]
    DuplicateOrgan(OrganId),
    #[error("unknown dosha '{0}' (expected none, reset, vata, pitta or kapha)")]
    UnknownDosha(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
    #[error("invalid settings in {}: {reason}", path.display())]
    Invalid { path: PathBuf, reason: String },
}
