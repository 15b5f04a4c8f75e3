#![forbid(unsafe_code)]

//! Request/response contract for the HybridCrypt remote service.
//!
//! Key generation, key exchange, and AES file encryption all run remotely. This
//! crate only fixes the shapes exchanged with that service so the workflow core
//! and operator surfaces can switch transports without touching orchestration.

pub mod crypto;
pub mod envelope;
pub mod telemetry;

pub use crypto::{
    CryptoGateway, DecryptionReceipt, EncryptionMode, EncryptionReceipt, KeyExchange,
    KeyGeneration, UploadFile,
};
pub use envelope::decode_envelope;
pub use telemetry::{
    DecryptionTiming, EncryptionTiming, KeyTiming, LogCategory, LogEntry, LogRecord,
    PerformanceSnapshot, PerformanceStatistics, TelemetryGateway,
};

use thiserror::Error;

/// Failure reported by a gateway call.
///
/// Payloads are plain strings so results can be cloned into UI messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The service understood the request and answered `success: false`.
    #[error("{0}")]
    Rejected(String),
    /// No usable response: the service was unreachable or answered with an HTTP error.
    #[error("{0}")]
    Transport(String),
    /// A response arrived but could not be decoded against the contract.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// The file selected for upload could not be read.
    #[error("unable to read {path}: {message}")]
    File { path: String, message: String },
}

impl GatewayError {
    /// True for failures where no well-formed reply was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(self, GatewayError::Transport(_) | GatewayError::Malformed(_))
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
