use super::panels::{DecryptionSummary, EncryptionSummary, Panel};
use super::{Action, WorkflowCoordinator};
use crate::error::{HybridError, HybridResult};
use crate::state::Step;
use crate::steps::PendingAdvance;
use hybridcrypt_contract::{
    CryptoGateway, DecryptionReceipt, EncryptionMode, EncryptionReceipt, GatewayResult,
    UploadFile,
};
use log::{debug, info, warn};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

const MISSING_ENCRYPT_FILE: &str = "Silakan pilih file untuk dienkripsi";
const MISSING_DECRYPT_FILE: &str = "Silakan pilih file untuk didekripsi";

/// Which result panel an artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Encrypted,
    Decrypted,
}

/// Artifact written to local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifact {
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

fn select(path: &Path) -> HybridResult<UploadFile> {
    UploadFile::from_path(path)
        .map_err(|err| HybridError::Validation(format!("{}: {err}", path.display())))
}

impl WorkflowCoordinator {
    pub fn encryption_mode(&self) -> EncryptionMode {
        self.mode
    }

    pub fn set_encryption_mode(&mut self, mode: EncryptionMode) {
        self.mode = mode;
    }

    pub fn encrypt_selection(&self) -> Option<&UploadFile> {
        self.encrypt_selection.as_ref()
    }

    pub fn decrypt_selection(&self) -> Option<&UploadFile> {
        self.decrypt_selection.as_ref()
    }

    /// Choose the file to encrypt. An unreadable path leaves no selection.
    pub fn select_encrypt_file(&mut self, path: impl AsRef<Path>) -> HybridResult<&UploadFile> {
        self.encrypt_selection = None;
        let file = select(path.as_ref())?;
        debug!("selected {} for encryption", file.file_name);
        Ok(self.encrypt_selection.insert(file))
    }

    pub fn select_decrypt_file(&mut self, path: impl AsRef<Path>) -> HybridResult<&UploadFile> {
        self.decrypt_selection = None;
        let file = select(path.as_ref())?;
        debug!("selected {} for decryption", file.file_name);
        Ok(self.decrypt_selection.insert(file))
    }

    pub fn clear_selections(&mut self) {
        self.encrypt_selection = None;
        self.decrypt_selection = None;
    }

    /// Artifact produced by the last successful encryption or decryption.
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&str> {
        match kind {
            ArtifactKind::Encrypted => self
                .panels
                .encryption
                .ready()
                .map(EncryptionSummary::artifact),
            ArtifactKind::Decrypted => self
                .panels
                .decryption
                .ready()
                .map(DecryptionSummary::artifact),
        }
    }

    /// Validate the selection and mark encryption in flight. A missing file is
    /// reported without touching the in-flight set or any panel.
    pub fn begin_encrypt(&mut self) -> HybridResult<(UploadFile, EncryptionMode)> {
        let file = self
            .encrypt_selection
            .clone()
            .ok_or_else(|| HybridError::Validation(MISSING_ENCRYPT_FILE.to_string()))?;
        self.start(Action::EncryptFile)?;
        Ok((file, self.mode))
    }

    /// Apply an encryption receipt. On success an auto-advance to step 4 is scheduled.
    pub fn finish_encrypt(
        &mut self,
        result: GatewayResult<EncryptionReceipt>,
    ) -> HybridResult<PendingAdvance> {
        self.settle(Action::EncryptFile);
        match result {
            Ok(receipt) => {
                info!(
                    "{} encrypted with {} into {} ({} -> {} bytes, {:.4}s)",
                    receipt.original_filename,
                    receipt.algorithm,
                    receipt.encrypted_filename,
                    receipt.original_size,
                    receipt.encrypted_size,
                    receipt.encryption_time
                );
                self.panels.encryption = Panel::Ready(EncryptionSummary { receipt });
                Ok(self.schedule(Step::Decrypt))
            }
            Err(err) => {
                let err = HybridError::from(err);
                warn!("file encryption failed: {err}");
                self.panels.encryption = Panel::Failed(err.inline_message());
                Err(err)
            }
        }
    }

    pub async fn encrypt_file<G>(&mut self, gateway: &G) -> HybridResult<PendingAdvance>
    where
        G: CryptoGateway + ?Sized,
    {
        let (file, mode) = self.begin_encrypt()?;
        let result = gateway.encrypt_file(&file, mode).await;
        self.finish_encrypt(result)
    }

    pub fn begin_decrypt(&mut self) -> HybridResult<UploadFile> {
        let file = self
            .decrypt_selection
            .clone()
            .ok_or_else(|| HybridError::Validation(MISSING_DECRYPT_FILE.to_string()))?;
        self.start(Action::DecryptFile)?;
        Ok(file)
    }

    /// Apply a decryption receipt. Decryption is the last step, so nothing is scheduled.
    pub fn finish_decrypt(&mut self, result: GatewayResult<DecryptionReceipt>) -> HybridResult<()> {
        self.settle(Action::DecryptFile);
        match result {
            Ok(receipt) => {
                info!(
                    "{} decrypted into {} ({} bytes, {:.4}s)",
                    receipt.original_encrypted_filename,
                    receipt.decrypted_filename,
                    receipt.decrypted_size,
                    receipt.decryption_time
                );
                self.panels.decryption = Panel::Ready(DecryptionSummary { receipt });
                Ok(())
            }
            Err(err) => {
                let err = HybridError::from(err);
                warn!("file decryption failed: {err}");
                self.panels.decryption = Panel::Failed(err.inline_message());
                Err(err)
            }
        }
    }

    pub async fn decrypt_file<G>(&mut self, gateway: &G) -> HybridResult<()>
    where
        G: CryptoGateway + ?Sized,
    {
        let file = self.begin_decrypt()?;
        let result = gateway.decrypt_file(&file).await;
        self.finish_decrypt(result)
    }
}

/// Write `bytes` under `dir` using only the final component of `name`.
pub fn save_artifact(dir: &Path, name: &str, bytes: &[u8]) -> HybridResult<SavedArtifact> {
    let file_name = Path::new(name)
        .file_name()
        .filter(|candidate| !candidate.is_empty())
        .ok_or_else(|| HybridError::Validation(format!("invalid artifact name `{name}`")))?;

    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    fs::write(&path, bytes)?;

    let sha256 = hex::encode(Sha256::digest(bytes));
    info!("saved {} ({} bytes, sha256 {sha256})", path.display(), bytes.len());
    Ok(SavedArtifact {
        path,
        size: bytes.len() as u64,
        sha256,
    })
}

/// Fetch an artifact from the service and store it under `dir`.
pub async fn download_artifact<G>(
    gateway: &G,
    name: &str,
    dir: &Path,
) -> HybridResult<SavedArtifact>
where
    G: CryptoGateway + ?Sized,
{
    debug!("downloading artifact {name}");
    let bytes = gateway.download_artifact(name).await?;
    save_artifact(dir, name, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn artifacts_keep_only_the_file_name() {
        let dir = tempdir().unwrap();
        let saved = save_artifact(dir.path(), "../../etc/passwd.enc", b"abc").unwrap();
        assert_eq!(saved.path, dir.path().join("passwd.enc"));
        assert_eq!(
            saved.sha256,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(fs::read(&saved.path).unwrap(), b"abc");
    }

    #[test]
    fn artifact_names_must_name_a_file() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            save_artifact(dir.path(), "..", b"x"),
            Err(HybridError::Validation(_))
        ));
    }
}
