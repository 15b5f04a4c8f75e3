//! Contract for the remote key generation, exchange, and file encryption endpoints.

use crate::GatewayResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// AES block mode requested for file encryption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncryptionMode {
    #[default]
    Gcm,
    Cbc,
}

impl EncryptionMode {
    pub const ALL: [EncryptionMode; 2] = [EncryptionMode::Gcm, EncryptionMode::Cbc];

    /// Value sent in the multipart `mode` field.
    pub fn as_str(self) -> &'static str {
        match self {
            EncryptionMode::Gcm => "gcm",
            EncryptionMode::Cbc => "cbc",
        }
    }

    /// Algorithm label the service reports for this mode.
    pub fn algorithm(self) -> &'static str {
        match self {
            EncryptionMode::Gcm => "AES-192-GCM",
            EncryptionMode::Cbc => "AES-192-CBC",
        }
    }
}

impl fmt::Display for EncryptionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.algorithm())
    }
}

impl FromStr for EncryptionMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gcm" | "aes-192-gcm" => Ok(EncryptionMode::Gcm),
            "cbc" | "aes-192-cbc" => Ok(EncryptionMode::Cbc),
            other => Err(format!("unknown encryption mode `{other}` (expected gcm or cbc)")),
        }
    }
}

/// Local file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

impl UploadFile {
    /// Capture name and size of a regular file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size: metadata.len(),
        })
    }

    /// Short label shown next to a file input.
    pub fn describe(&self) -> String {
        format!(
            "Selected: {} ({:.2} KB)",
            self.file_name,
            self.size as f64 / 1024.0
        )
    }
}

/// Reply of `GET /generate_keys`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyGeneration {
    pub alice_public_key: String,
    pub bob_public_key: String,
    pub total_generation_time: f64,
    #[serde(default)]
    pub alice_generation_time: Option<f64>,
    #[serde(default)]
    pub bob_generation_time: Option<f64>,
}

/// Reply of `GET /key_exchange`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyExchange {
    pub keys_match: bool,
    pub shared_secrets_match: bool,
    pub total_alice_time: f64,
    pub total_bob_time: f64,
    #[serde(default)]
    pub alice_aes_key: Option<String>,
    #[serde(default)]
    pub verification_time: Option<f64>,
}

impl KeyExchange {
    /// Combined time both parties spent computing and deriving the shared key.
    pub fn total_time(&self) -> f64 {
        self.total_alice_time + self.total_bob_time
    }
}

/// Reply of `POST /encrypt_file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncryptionReceipt {
    pub original_filename: String,
    pub original_size: u64,
    pub encrypted_filename: String,
    pub encrypted_size: u64,
    pub algorithm: String,
    pub size_increase: i64,
    pub encryption_time: f64,
    #[serde(default)]
    pub size_increase_percent: Option<f64>,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub iv: Option<String>,
}

/// Reply of `POST /decrypt_file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecryptionReceipt {
    pub original_encrypted_filename: String,
    pub original_encrypted_size: u64,
    pub decrypted_filename: String,
    pub decrypted_size: u64,
    pub decryption_time: f64,
}

/// Remote operations backing the four workflow steps plus artifact download and reset.
///
/// Implementations carry no business logic: they translate calls to requests and
/// surface success or failure uniformly through [`crate::GatewayError`].
#[async_trait]
pub trait CryptoGateway: Send + Sync {
    /// Generate fresh keypairs for both parties.
    async fn generate_keys(&self) -> GatewayResult<KeyGeneration>;

    /// Run the key exchange and derive the shared AES key on both sides.
    async fn exchange_keys(&self) -> GatewayResult<KeyExchange>;

    /// Upload `file` and encrypt it with the requested mode.
    async fn encrypt_file(
        &self,
        file: &UploadFile,
        mode: EncryptionMode,
    ) -> GatewayResult<EncryptionReceipt>;

    /// Upload an encrypted package and decrypt it.
    async fn decrypt_file(&self, file: &UploadFile) -> GatewayResult<DecryptionReceipt>;

    /// Fetch a produced artifact by name.
    async fn download_artifact(&self, filename: &str) -> GatewayResult<Vec<u8>>;

    /// Drop all keys, artifacts, and performance logs held by the service.
    async fn reset(&self) -> GatewayResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mode_parsing_accepts_short_and_algorithm_names() {
        assert_eq!("GCM".parse::<EncryptionMode>().unwrap(), EncryptionMode::Gcm);
        assert_eq!(
            "aes-192-cbc".parse::<EncryptionMode>().unwrap(),
            EncryptionMode::Cbc
        );
        assert!("ecb".parse::<EncryptionMode>().is_err());
        assert_eq!(EncryptionMode::Cbc.as_str(), "cbc");
        assert_eq!(EncryptionMode::Gcm.to_string(), "AES-192-GCM");
    }

    #[test]
    fn upload_file_reads_name_and_size() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 2048]).unwrap();

        let upload = UploadFile::from_path(file.path()).unwrap();
        assert_eq!(upload.size, 2048);
        assert!(upload.describe().ends_with("(2.00 KB)"));
    }

    #[test]
    fn upload_file_rejects_directories() {
        let dir = tempfile::tempdir().unwrap();
        let err = UploadFile::from_path(dir.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn exchange_reply_tolerates_missing_optional_fields() {
        let exchange: KeyExchange = serde_json::from_str(
            r#"{"keys_match": true, "shared_secrets_match": false,
                "total_alice_time": 0.01, "total_bob_time": 0.02}"#,
        )
        .unwrap();
        assert!(exchange.alice_aes_key.is_none());
        assert!((exchange.total_time() - 0.03).abs() < 1e-12);
    }
}
