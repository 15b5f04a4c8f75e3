//! Error type shared by the workflow core.

use crate::state::Step;
use crate::workflow::Action;
use hybridcrypt_contract::GatewayError;
use std::io;
use thiserror::Error;

/// Coarse failure classes, matching how failures are presented to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Detected locally; nothing was sent to the service.
    Validation,
    /// The service refused or failed the operation.
    Rejected,
    /// No usable reply from the service.
    Transport,
    /// Configuration or local I/O problems.
    Internal,
}

#[derive(Debug, Error)]
pub enum HybridError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Transport(String),

    #[error("{} is already in progress", .0.label())]
    Busy(Action),

    #[error("step {} is not unlocked yet", .0.number())]
    StepLocked(Step),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl HybridError {
    pub fn class(&self) -> ErrorClass {
        match self {
            HybridError::Validation(_) | HybridError::Busy(_) | HybridError::StepLocked(_) => {
                ErrorClass::Validation
            }
            HybridError::Rejected(_) => ErrorClass::Rejected,
            HybridError::Transport(_) => ErrorClass::Transport,
            _ => ErrorClass::Internal,
        }
    }

    /// Text shown inline in a result panel.
    pub fn inline_message(&self) -> String {
        match self {
            HybridError::Rejected(message) => format!("Error: {message}"),
            HybridError::Transport(message) => format!("Network error: {message}"),
            other => other.to_string(),
        }
    }
}

impl From<GatewayError> for HybridError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Rejected(message) => HybridError::Rejected(message),
            GatewayError::Transport(message) => HybridError::Transport(message),
            malformed @ GatewayError::Malformed(_) => HybridError::Transport(malformed.to_string()),
            file @ GatewayError::File { .. } => HybridError::Validation(file.to_string()),
        }
    }
}

pub type HybridResult<T> = Result<T, HybridError>;
