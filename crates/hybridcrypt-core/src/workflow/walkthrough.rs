use super::files::{download_artifact, ArtifactKind};
use super::{event, WorkflowCoordinator, WorkflowLevel, WorkflowReport};
use crate::error::{HybridError, HybridResult};
use crate::steps::PendingAdvance;
use hybridcrypt_contract::CryptoGateway;
use std::path::Path;

fn advance_now(
    coordinator: &mut WorkflowCoordinator,
    pending: PendingAdvance,
    events: &mut Vec<super::WorkflowEvent>,
) {
    if let Some(step) = coordinator.fire_auto_advance(pending.ticket) {
        events.push(event(WorkflowLevel::Info, format!("Now at step {step}")));
    }
}

/// Drive all four steps against `gateway` without pausing between them.
///
/// `input` is encrypted, the encrypted artifact is downloaded into `work_dir`,
/// and that download is decrypted. The decrypted artifact lands in `work_dir` too.
pub async fn walkthrough<G>(
    coordinator: &mut WorkflowCoordinator,
    gateway: &G,
    input: &Path,
    work_dir: &Path,
) -> HybridResult<WorkflowReport>
where
    G: CryptoGateway + ?Sized,
{
    let mut events = Vec::new();

    let pending = coordinator.generate_keys(gateway).await?;
    if let Some(keys) = coordinator.panels().keys.ready() {
        events.push(event(
            WorkflowLevel::Success,
            format!("Keypairs generated ({:.4}s)", keys.total_time),
        ));
    }
    advance_now(coordinator, pending, &mut events);

    let pending = coordinator.perform_key_exchange(gateway).await?;
    if let Some(exchange) = coordinator.panels().exchange.ready() {
        let level = if exchange.keys_match && exchange.shared_secrets_match {
            WorkflowLevel::Success
        } else {
            WorkflowLevel::Warn
        };
        events.push(event(
            level,
            format!(
                "Key exchange done: keys match {}, shared secrets match {} ({:.4}s)",
                exchange.keys_match, exchange.shared_secrets_match, exchange.elapsed
            ),
        ));
    }
    advance_now(coordinator, pending, &mut events);

    coordinator.select_encrypt_file(input)?;
    let pending = coordinator.encrypt_file(gateway).await?;
    let encrypted = coordinator
        .artifact(ArtifactKind::Encrypted)
        .map(str::to_string)
        .ok_or_else(|| HybridError::Rejected("service returned no encrypted artifact".into()))?;
    events.push(event(
        WorkflowLevel::Success,
        format!(
            "Encrypted {} with {} into {encrypted}",
            input.display(),
            coordinator.encryption_mode()
        ),
    ));
    advance_now(coordinator, pending, &mut events);

    let saved = download_artifact(gateway, &encrypted, work_dir).await?;
    events.push(event(
        WorkflowLevel::Info,
        format!(
            "Downloaded {} ({} bytes, sha256 {})",
            saved.path.display(),
            saved.size,
            saved.sha256
        ),
    ));

    coordinator.select_decrypt_file(&saved.path)?;
    coordinator.decrypt_file(gateway).await?;
    let decrypted = coordinator
        .artifact(ArtifactKind::Decrypted)
        .map(str::to_string)
        .ok_or_else(|| HybridError::Rejected("service returned no decrypted artifact".into()))?;
    let restored = download_artifact(gateway, &decrypted, work_dir).await?;
    events.push(event(
        WorkflowLevel::Success,
        format!(
            "Decrypted into {} (sha256 {})",
            restored.path.display(),
            restored.sha256
        ),
    ));

    Ok(WorkflowReport {
        title: format!("Walkthrough for {}", input.display()),
        events,
    })
}
