//! Result panels shown under each step.

use crate::display::{elapsed_label, format_bytes, format_size, yes_no};
use hybridcrypt_contract::{DecryptionReceipt, EncryptionReceipt, KeyExchange, KeyGeneration};

/// Text shown in the public key boxes before keys exist.
pub const KEY_PLACEHOLDER: &str = "Belum dibuat";

/// Content of one result area.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<T> {
    Empty,
    Ready(T),
    /// Inline error text, already prefixed.
    Failed(String),
}

impl<T> Default for Panel<T> {
    fn default() -> Self {
        Panel::Empty
    }
}

impl<T> Panel<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Panel::Empty)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Panel::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Public keys shown in the step 2 boxes. Survive failed regenerations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeys {
    pub alice: String,
    pub bob: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeySummary {
    pub total_time: f64,
}

impl KeySummary {
    /// Split a key generation reply into its summary and the published keys.
    pub fn split(reply: KeyGeneration) -> (Self, PublicKeys) {
        (
            Self {
                total_time: reply.total_generation_time,
            },
            PublicKeys {
                alice: reply.alice_public_key,
                bob: reply.bob_public_key,
            },
        )
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            "✓ Kunci Publik Alice dibuat".to_string(),
            "✓ Kunci Publik Bob dibuat".to_string(),
            elapsed_label(self.total_time),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeSummary {
    pub keys_match: bool,
    pub shared_secrets_match: bool,
    pub elapsed: f64,
    pub aes_key: Option<String>,
}

impl From<KeyExchange> for ExchangeSummary {
    fn from(reply: KeyExchange) -> Self {
        Self {
            elapsed: reply.total_time(),
            keys_match: reply.keys_match,
            shared_secrets_match: reply.shared_secrets_match,
            aes_key: reply.alice_aes_key,
        }
    }
}

impl ExchangeSummary {
    pub fn lines(&self) -> Vec<String> {
        vec![
            "✓ Pertukaran kunci berhasil".to_string(),
            "✓ Kunci AES-192 berhasil diturunkan".to_string(),
            format!("Kunci cocok: {}", yes_no(self.keys_match)),
            format!("Shared secrets cocok: {}", yes_no(self.shared_secrets_match)),
            elapsed_label(self.elapsed),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncryptionSummary {
    pub receipt: EncryptionReceipt,
}

impl EncryptionSummary {
    pub const DOWNLOAD_LABEL: &'static str = "Unduh File Terenkripsi";

    pub fn artifact(&self) -> &str {
        &self.receipt.encrypted_filename
    }

    pub fn lines(&self) -> Vec<String> {
        let receipt = &self.receipt;
        vec![
            "✓ File berhasil dienkripsi".to_string(),
            format!(
                "Original: {} ({})",
                receipt.original_filename,
                format_size(receipt.original_size)
            ),
            format!(
                "Terenkripsi: {} ({})",
                receipt.encrypted_filename,
                format_size(receipt.encrypted_size)
            ),
            format!("Algoritma: {}", receipt.algorithm),
            format!("Ukuran File: {}", format_bytes(receipt.size_increase)),
            elapsed_label(receipt.encryption_time),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecryptionSummary {
    pub receipt: DecryptionReceipt,
}

impl DecryptionSummary {
    pub const DOWNLOAD_LABEL: &'static str = "Unduh File Didekripsi";

    pub fn artifact(&self) -> &str {
        &self.receipt.decrypted_filename
    }

    pub fn lines(&self) -> Vec<String> {
        let receipt = &self.receipt;
        vec![
            "✓ File berhasil didekripsi".to_string(),
            format!(
                "Terenkripsi: {} ({})",
                receipt.original_encrypted_filename,
                format_size(receipt.original_encrypted_size)
            ),
            format!(
                "Didekripsi: {} ({})",
                receipt.decrypted_filename,
                format_size(receipt.decrypted_size)
            ),
            elapsed_label(receipt.decryption_time),
        ]
    }
}

/// All four result areas plus the last published key pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panels {
    pub keys: Panel<KeySummary>,
    pub exchange: Panel<ExchangeSummary>,
    pub encryption: Panel<EncryptionSummary>,
    pub decryption: Panel<DecryptionSummary>,
    pub published: Option<PublicKeys>,
}

impl Panels {
    pub fn all_empty(&self) -> bool {
        self.keys.is_empty()
            && self.exchange.is_empty()
            && self.encryption.is_empty()
            && self.decryption.is_empty()
            && self.published.is_none()
    }

    pub fn key_pair(&self) -> Option<&PublicKeys> {
        self.published.as_ref()
    }

    /// Public keys for the step 2 boxes, or the placeholder.
    pub fn public_keys(&self) -> (&str, &str) {
        match &self.published {
            Some(keys) => (&keys.alice, &keys.bob),
            None => (KEY_PLACEHOLDER, KEY_PLACEHOLDER),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encryption_lines_format_sizes() {
        let summary = EncryptionSummary {
            receipt: EncryptionReceipt {
                original_filename: "report.pdf".into(),
                original_size: 1536,
                encrypted_filename: "report.pdf.enc".into(),
                encrypted_size: 1564,
                algorithm: "AES-192-GCM".into(),
                size_increase: 28,
                encryption_time: 0.0042,
                size_increase_percent: None,
                nonce: None,
                tag: None,
                iv: None,
            },
        };
        let lines = summary.lines();
        assert_eq!(lines[1], "Original: report.pdf (1.5 KB)");
        assert_eq!(lines[4], "Ukuran File: 28 B");
        assert_eq!(lines[5], "Waktu: 0.0042s");
        assert_eq!(summary.artifact(), "report.pdf.enc");
    }

    #[test]
    fn missing_keys_show_placeholder() {
        let panels = Panels::default();
        assert_eq!(panels.public_keys(), (KEY_PLACEHOLDER, KEY_PLACEHOLDER));
        assert!(panels.all_empty());
    }
}
