use super::*;
use hybridcrypt_contract::GatewayError;
use std::fs;
use std::path::Path;

fn deck() -> HybridDeck {
    HybridDeck::with_config(ClientConfig::default())
}

fn key_reply() -> KeyGeneration {
    KeyGeneration {
        alice_public_key: "-----BEGIN PUBLIC KEY-----\nALICE\n-----END PUBLIC KEY-----".into(),
        bob_public_key: "-----BEGIN PUBLIC KEY-----\nBOB\n-----END PUBLIC KEY-----".into(),
        total_generation_time: 0.012,
        alice_generation_time: None,
        bob_generation_time: None,
    }
}

fn latest_alert(deck: &HybridDeck) -> (&str, AlertKind) {
    let alert = deck.alerts.alerts().last().expect("an alert was raised");
    (alert.message.as_str(), alert.kind)
}

#[test]
fn normalized_path_strips_whitespace_and_quotes() {
    assert_eq!(
        normalized_path("  \"/tmp/my report.pdf\"  "),
        Some(PathBuf::from("/tmp/my report.pdf"))
    );
    assert_eq!(
        normalized_path("'notes.txt'"),
        Some(PathBuf::from("notes.txt"))
    );
    assert_eq!(normalized_path("plain.bin"), Some(PathBuf::from("plain.bin")));
    assert_eq!(normalized_path("   "), None);
    assert_eq!(normalized_path("\"\""), None);
}

#[test]
fn selection_hint_describes_the_current_selection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.csv");
    fs::write(&path, vec![0u8; 2048]).unwrap();
    let file = UploadFile::from_path(&path).unwrap();

    assert_eq!(
        selection_hint(Some(&file), "ledger.csv"),
        "Selected: ledger.csv (2.00 KB)"
    );
    assert_eq!(selection_hint(None, ""), NO_FILE_SELECTED);
    assert_eq!(selection_hint(None, "/missing"), "File tidak ditemukan");
}

#[test]
fn failure_alert_separates_local_and_remote_failures() {
    let (message, kind) = failure_alert(
        Action::EncryptFile,
        &HybridError::Validation("Silakan pilih file untuk dienkripsi".into()),
    );
    assert_eq!(message, "Silakan pilih file untuk dienkripsi");
    assert_eq!(kind, AlertKind::Warning);

    let (message, kind) = failure_alert(
        Action::GenerateKeys,
        &HybridError::Transport("connection refused".into()),
    );
    assert_eq!(message, "key generation failed: Network error: connection refused");
    assert_eq!(kind, AlertKind::Error);

    let (message, _) = failure_alert(Action::Reset, &HybridError::Rejected("locked".into()));
    assert_eq!(message, "system reset failed: Error: locked");
}

#[test]
fn generated_keys_unlock_exchange_and_auto_advance() {
    let mut deck = deck();
    let _ = deck.update(Message::KeysGenerated(Ok(key_reply())));

    assert!(deck.coordinator.state().keys_generated());
    assert_eq!(latest_alert(&deck).1, AlertKind::Success);
    let pending = deck.coordinator.pending_advance().expect("advance scheduled");
    assert_eq!(pending.target, Step::Exchange);

    let _ = deck.update(Message::AutoAdvance(pending.ticket));
    assert_eq!(deck.coordinator.current_step(), Step::Exchange);
    assert!(deck.coordinator.pending_advance().is_none());
}

#[test]
fn clicking_a_step_cancels_the_pending_advance() {
    let mut deck = deck();
    let _ = deck.update(Message::KeysGenerated(Ok(key_reply())));
    let pending = deck.coordinator.pending_advance().unwrap();

    let _ = deck.update(Message::StepClicked(Step::Generate));
    let _ = deck.update(Message::AutoAdvance(pending.ticket));
    assert_eq!(deck.coordinator.current_step(), Step::Generate);
}

#[test]
fn failed_generation_shows_inline_error_and_alert() {
    let mut deck = deck();
    let _ = deck.update(Message::KeysGenerated(Err(GatewayError::Rejected(
        "curve unavailable".into(),
    ))));

    assert!(!deck.coordinator.state().keys_generated());
    assert_eq!(
        deck.coordinator.panels().keys.error(),
        Some("Error: curve unavailable")
    );
    assert_eq!(
        latest_alert(&deck),
        ("key generation failed: Error: curve unavailable", AlertKind::Error)
    );
}

#[test]
fn encrypt_without_a_file_warns_and_stays_idle() {
    let mut deck = deck();
    let _ = deck.update(Message::EncryptPressed);

    assert!(!deck.coordinator.is_in_flight(Action::EncryptFile));
    assert!(deck.coordinator.panels().encryption.is_empty());
    assert_eq!(
        latest_alert(&deck),
        ("Silakan pilih file untuk dienkripsi", AlertKind::Warning)
    );
}

#[test]
fn typing_a_path_selects_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("payload.bin");
    fs::write(&path, b"hybrid").unwrap();

    let mut deck = deck();
    let _ = deck.update(Message::EncryptPathChanged(format!("\"{}\"", path.display())));
    assert_eq!(
        deck.coordinator.encrypt_selection().map(|file| file.path.as_path()),
        Some(path.as_path())
    );

    let _ = deck.update(Message::EncryptPathChanged(String::new()));
    assert!(deck.coordinator.encrypt_selection().is_none());

    let _ = deck.update(Message::DecryptPathChanged(
        dir.path().join("absent.enc").display().to_string(),
    ));
    assert!(deck.coordinator.decrypt_selection().is_none());
    assert!(Path::new(&deck.decrypt_input).ends_with("absent.enc"));
}

#[test]
fn reset_overlay_flow_clears_the_session() {
    let mut deck = deck();
    let _ = deck.update(Message::KeysGenerated(Ok(key_reply())));
    deck.encrypt_input = "ledger.csv".into();

    let _ = deck.update(Message::ResetPressed);
    assert!(deck.reset_open);
    let _ = deck.update(Message::ResetCancel);
    assert!(!deck.reset_open);
    assert!(deck.coordinator.state().keys_generated());

    let _ = deck.update(Message::ResetPressed);
    let _ = deck.update(Message::ResetConfirm);
    assert!(!deck.reset_open);
    assert!(deck.coordinator.is_in_flight(Action::Reset));

    let _ = deck.update(Message::ResetFinished(Ok(())));
    assert!(!deck.coordinator.state().keys_generated());
    assert!(deck.coordinator.panels().all_empty());
    assert_eq!(deck.coordinator.current_step(), Step::Generate);
    assert!(deck.encrypt_input.is_empty());
    assert_eq!(latest_alert(&deck), (RESET_DONE, AlertKind::Success));
}

#[test]
fn rejected_reset_keeps_progress() {
    let mut deck = deck();
    let _ = deck.update(Message::KeysGenerated(Ok(key_reply())));
    let _ = deck.update(Message::ResetConfirm);
    let _ = deck.update(Message::ResetFinished(Err(GatewayError::Rejected("locked".into()))));

    assert!(deck.coordinator.state().keys_generated());
    assert!(!deck.coordinator.panels().keys.is_empty());
    assert_eq!(latest_alert(&deck).1, AlertKind::Error);
}

#[test]
fn copying_a_key_requires_generated_keys() {
    let mut deck = deck();
    let _ = deck.update(Message::CopyKey(Party::Alice));
    assert_eq!(
        latest_alert(&deck),
        ("Kunci belum dibuat", AlertKind::Warning)
    );

    let _ = deck.update(Message::KeysGenerated(Ok(key_reply())));
    let _ = deck.update(Message::CopyKey(Party::Bob));
    assert_eq!(latest_alert(&deck), (COPY_CONFIRMATION, AlertKind::Success));
}

#[test]
fn failed_regeneration_keeps_keys_copyable() {
    let mut deck = deck();
    let _ = deck.update(Message::KeysGenerated(Ok(key_reply())));
    let _ = deck.update(Message::GeneratePressed);
    let _ = deck.update(Message::KeysGenerated(Err(GatewayError::Transport(
        "connection reset".into(),
    ))));

    assert!(deck.coordinator.state().keys_generated());
    let (alice, _) = deck.coordinator.panels().public_keys();
    assert!(alice.contains("ALICE"));

    let _ = deck.update(Message::CopyKey(Party::Alice));
    assert_eq!(latest_alert(&deck), (COPY_CONFIRMATION, AlertKind::Success));
}

#[test]
fn alerts_can_be_dismissed_individually() {
    let mut deck = deck();
    let _ = deck.update(Message::EncryptPressed);
    let _ = deck.update(Message::DecryptPressed);
    assert_eq!(deck.alerts.alerts().len(), 2);

    let first = deck.alerts.alerts()[0].id;
    let _ = deck.update(Message::DismissAlert(first));
    assert_eq!(deck.alerts.alerts().len(), 1);
    assert_eq!(
        deck.alerts.alerts()[0].message,
        "Silakan pilih file untuk didekripsi"
    );
}

#[test]
fn failed_performance_load_is_shown_in_the_tab() {
    let mut deck = deck();
    let _ = deck.update(Message::PerformanceLoaded(Err(
        "Network error: connection refused".into(),
    )));
    assert!(matches!(
        &deck.performance,
        PerformancePane::Failed(message) if message == "Network error: connection refused"
    ));

    // Export needs a loaded report.
    let _ = deck.update(Message::ExportPerformance);
    assert!(!deck.exporting);
}
