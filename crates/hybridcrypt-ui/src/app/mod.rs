//! Application wiring for the HybridCrypt Control Deck.

mod style;
mod view;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use hybridcrypt_contract::{
    CryptoGateway, DecryptionReceipt, EncryptionMode, EncryptionReceipt, GatewayResult,
    KeyExchange, KeyGeneration, UploadFile,
};
use hybridcrypt_core::config::ClientConfig;
use hybridcrypt_core::perf::{self, PerformanceReport};
use hybridcrypt_core::workflow::{
    download_artifact, ArtifactKind, SavedArtifact, RESET_DONE,
};
use hybridcrypt_core::{
    Action, AdvanceTicket, AlertId, AlertKind, AlertPresenter, HybridError, HybridResult,
    PendingAdvance, Step, WorkflowCoordinator, WorkflowSettings,
};
use hybridcrypt_http::HttpGateway;
use iced::window;
use iced::{application, Size, Task, Theme};
use log::{info, warn};
use tokio::time as tokio_time;

const COPY_CONFIRMATION: &str = "Kunci disalin ke clipboard";
const NO_FILE_SELECTED: &str = "Belum ada file dipilih";

/// Launch the Control Deck.
pub fn run() -> iced::Result {
    hybridcrypt_core::logging::init("info");
    application("HybridCrypt Control Deck", HybridDeck::update, HybridDeck::view)
        .antialiasing(true)
        .window(window::Settings {
            size: Size::new(1180.0, 820.0),
            ..window::Settings::default()
        })
        .theme(HybridDeck::theme)
        .run_with(HybridDeck::init)
}

/// Top-level tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Tab {
    Process,
    Analysis,
}

/// Whose public key a copy request refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Party {
    Alice,
    Bob,
}

/// Load state of the performance tab.
#[derive(Debug, Clone, Default)]
pub(super) enum PerformancePane {
    #[default]
    Idle,
    Loading,
    Loaded(PerformanceReport),
    Failed(String),
}

/// Messages produced by Iced interactions and background tasks.
#[derive(Debug, Clone)]
pub(super) enum Message {
    TabSelected(Tab),
    StepClicked(Step),
    GeneratePressed,
    KeysGenerated(GatewayResult<KeyGeneration>),
    ExchangePressed,
    KeysExchanged(GatewayResult<KeyExchange>),
    EncryptPathChanged(String),
    DecryptPathChanged(String),
    ModeSelected(EncryptionMode),
    EncryptPressed,
    Encrypted(GatewayResult<EncryptionReceipt>),
    DecryptPressed,
    Decrypted(GatewayResult<DecryptionReceipt>),
    DownloadPressed(ArtifactKind),
    DownloadFinished(Result<SavedArtifact, String>),
    CopyKey(Party),
    AutoAdvance(AdvanceTicket),
    AlertsTick,
    DismissAlert(AlertId),
    ResetPressed,
    ResetCancel,
    ResetConfirm,
    ResetFinished(GatewayResult<()>),
    RefreshPerformance,
    PerformanceLoaded(Result<PerformanceReport, String>),
    ExportPerformance,
    ExportFinished(Result<PathBuf, String>),
}

pub(super) struct HybridDeck {
    config: ClientConfig,
    gateway: Result<Arc<HttpGateway>, String>,
    coordinator: WorkflowCoordinator,
    alerts: AlertPresenter,
    tab: Tab,
    encrypt_input: String,
    decrypt_input: String,
    reset_open: bool,
    performance: PerformancePane,
    exporting: bool,
    downloading: Option<ArtifactKind>,
}

impl HybridDeck {
    fn init() -> (Self, Task<Message>) {
        let requested = ClientConfig::resolve_path(None);
        let (config, load_error) = match ClientConfig::load_or_bootstrap(&requested) {
            Ok(config) => (config, None),
            Err(err) => {
                warn!("falling back to default configuration: {err}");
                (
                    ClientConfig::default(),
                    Some(format!("Failed to load configuration: {err}")),
                )
            }
        };

        let mut deck = Self::with_config(config);
        info!("Control Deck online against {}", deck.service_label());

        let mut tasks = Vec::new();
        if let Some(message) = load_error {
            tasks.push(deck.notify(message, AlertKind::Error));
        }
        if let Err(message) = &deck.gateway {
            let message = message.clone();
            tasks.push(deck.notify(message, AlertKind::Error));
        }
        for issue in deck.config.validate() {
            tasks.push(deck.notify(issue, AlertKind::Warning));
        }
        (deck, Task::batch(tasks))
    }

    fn with_config(config: ClientConfig) -> Self {
        let gateway = HttpGateway::new(&config.service.base_url, config.service_timeout())
            .map(Arc::new)
            .map_err(|err| HybridError::from(err).inline_message());
        Self {
            coordinator: WorkflowCoordinator::new(WorkflowSettings::from(&config)),
            alerts: AlertPresenter::new(config.alert_lifetime()),
            gateway,
            config,
            tab: Tab::Process,
            encrypt_input: String::new(),
            decrypt_input: String::new(),
            reset_open: false,
            performance: PerformancePane::Idle,
            exporting: false,
            downloading: None,
        }
    }

    fn service_label(&self) -> String {
        match &self.gateway {
            Ok(gateway) => gateway.base_url().to_string(),
            Err(_) => self.config.service.base_url.clone(),
        }
    }

    fn notify(&mut self, message: impl Into<String>, kind: AlertKind) -> Task<Message> {
        self.alerts.notify(message, kind);
        let lifetime = self.alerts.lifetime();
        Task::future(async move {
            tokio_time::sleep(lifetime).await;
            Message::AlertsTick
        })
    }

    fn schedule_advance(pending: PendingAdvance) -> Task<Message> {
        Task::future(async move {
            tokio_time::sleep(pending.delay).await;
            Message::AutoAdvance(pending.ticket)
        })
    }

    /// Clone the gateway handle or raise an alert explaining why there is none.
    fn gateway_or_alert(&mut self) -> Result<Arc<HttpGateway>, Task<Message>> {
        match &self.gateway {
            Ok(gateway) => Ok(Arc::clone(gateway)),
            Err(message) => {
                let message = message.clone();
                Err(self.notify(message, AlertKind::Error))
            }
        }
    }

    fn settle_action<T>(
        &mut self,
        action: Action,
        outcome: HybridResult<T>,
    ) -> (Option<T>, Task<Message>) {
        match outcome {
            Ok(value) => (Some(value), Task::none()),
            Err(err) => {
                let (message, kind) = failure_alert(action, &err);
                (None, self.notify(message, kind))
            }
        }
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.tab = tab;
                if tab == Tab::Analysis {
                    return self.update(Message::RefreshPerformance);
                }
                Task::none()
            }
            Message::StepClicked(step) => match self.coordinator.navigate_to(step) {
                Ok(()) => Task::none(),
                Err(err) => self.notify(err.to_string(), AlertKind::Warning),
            },
            Message::GeneratePressed => {
                if let Err(err) = self.coordinator.begin_generate_keys() {
                    return self.notify(err.to_string(), AlertKind::Warning);
                }
                match self.gateway_or_alert() {
                    Ok(gateway) => Task::perform(
                        async move { gateway.generate_keys().await },
                        Message::KeysGenerated,
                    ),
                    Err(task) => {
                        let _ = self.coordinator.finish_generate_keys(Err(unavailable()));
                        task
                    }
                }
            }
            Message::KeysGenerated(result) => {
                let outcome = self.coordinator.finish_generate_keys(result);
                match self.settle_action(Action::GenerateKeys, outcome) {
                    (Some(pending), _) => Task::batch([
                        Self::schedule_advance(pending),
                        self.notify("Keypair Alice dan Bob berhasil dibuat", AlertKind::Success),
                    ]),
                    (None, task) => task,
                }
            }
            Message::ExchangePressed => {
                if let Err(err) = self.coordinator.begin_key_exchange() {
                    return self.notify(err.to_string(), AlertKind::Warning);
                }
                match self.gateway_or_alert() {
                    Ok(gateway) => Task::perform(
                        async move { gateway.exchange_keys().await },
                        Message::KeysExchanged,
                    ),
                    Err(task) => {
                        let _ = self.coordinator.finish_key_exchange(Err(unavailable()));
                        task
                    }
                }
            }
            Message::KeysExchanged(result) => {
                let outcome = self.coordinator.finish_key_exchange(result);
                match self.settle_action(Action::ExchangeKeys, outcome) {
                    (Some(pending), _) => Task::batch([
                        Self::schedule_advance(pending),
                        self.notify("Pertukaran kunci selesai", AlertKind::Success),
                    ]),
                    (None, task) => task,
                }
            }
            Message::EncryptPathChanged(value) => {
                self.encrypt_input = value;
                // An unreadable path simply leaves nothing selected.
                let path = normalized_path(&self.encrypt_input).unwrap_or_default();
                let _ = self.coordinator.select_encrypt_file(path);
                Task::none()
            }
            Message::DecryptPathChanged(value) => {
                self.decrypt_input = value;
                let path = normalized_path(&self.decrypt_input).unwrap_or_default();
                let _ = self.coordinator.select_decrypt_file(path);
                Task::none()
            }
            Message::ModeSelected(mode) => {
                self.coordinator.set_encryption_mode(mode);
                Task::none()
            }
            Message::EncryptPressed => {
                let (file, mode) = match self.coordinator.begin_encrypt() {
                    Ok(request) => request,
                    Err(err) => return self.notify(err.to_string(), AlertKind::Warning),
                };
                match self.gateway_or_alert() {
                    Ok(gateway) => Task::perform(
                        async move { gateway.encrypt_file(&file, mode).await },
                        Message::Encrypted,
                    ),
                    Err(task) => {
                        let _ = self.coordinator.finish_encrypt(Err(unavailable()));
                        task
                    }
                }
            }
            Message::Encrypted(result) => {
                let outcome = self.coordinator.finish_encrypt(result);
                match self.settle_action(Action::EncryptFile, outcome) {
                    (Some(pending), _) => Task::batch([
                        Self::schedule_advance(pending),
                        self.notify("File berhasil dienkripsi", AlertKind::Success),
                    ]),
                    (None, task) => task,
                }
            }
            Message::DecryptPressed => {
                let file = match self.coordinator.begin_decrypt() {
                    Ok(file) => file,
                    Err(err) => return self.notify(err.to_string(), AlertKind::Warning),
                };
                match self.gateway_or_alert() {
                    Ok(gateway) => Task::perform(
                        async move { gateway.decrypt_file(&file).await },
                        Message::Decrypted,
                    ),
                    Err(task) => {
                        let _ = self.coordinator.finish_decrypt(Err(unavailable()));
                        task
                    }
                }
            }
            Message::Decrypted(result) => {
                let outcome = self.coordinator.finish_decrypt(result);
                match self.settle_action(Action::DecryptFile, outcome) {
                    (Some(()), _) => self.notify("File berhasil didekripsi", AlertKind::Success),
                    (None, task) => task,
                }
            }
            Message::DownloadPressed(kind) => {
                if self.downloading.is_some() {
                    return Task::none();
                }
                let Some(name) = self.coordinator.artifact(kind).map(str::to_owned) else {
                    return self.notify("Belum ada file untuk diunduh", AlertKind::Warning);
                };
                let gateway = match self.gateway_or_alert() {
                    Ok(gateway) => gateway,
                    Err(task) => return task,
                };
                self.downloading = Some(kind);
                let dir = self.config.download_dir();
                Task::perform(
                    async move {
                        download_artifact(&*gateway, &name, &dir)
                            .await
                            .map_err(|err| err.inline_message())
                    },
                    Message::DownloadFinished,
                )
            }
            Message::DownloadFinished(result) => {
                self.downloading = None;
                match result {
                    Ok(saved) => self.notify(
                        format!("Tersimpan: {}", saved.path.display()),
                        AlertKind::Success,
                    ),
                    Err(message) => self.notify(message, AlertKind::Error),
                }
            }
            Message::CopyKey(party) => {
                let Some(keys) = self.coordinator.panels().key_pair() else {
                    return self.notify("Kunci belum dibuat", AlertKind::Warning);
                };
                let pem = match party {
                    Party::Alice => keys.alice.clone(),
                    Party::Bob => keys.bob.clone(),
                };
                Task::batch([
                    iced::clipboard::write(pem),
                    self.notify(COPY_CONFIRMATION, AlertKind::Success),
                ])
            }
            Message::AutoAdvance(ticket) => {
                self.coordinator.fire_auto_advance(ticket);
                Task::none()
            }
            Message::AlertsTick => {
                self.alerts.expire(Instant::now());
                Task::none()
            }
            Message::DismissAlert(id) => {
                self.alerts.dismiss(id);
                Task::none()
            }
            Message::ResetPressed => {
                if !self.coordinator.is_in_flight(Action::Reset) {
                    self.reset_open = true;
                }
                Task::none()
            }
            Message::ResetCancel => {
                self.reset_open = false;
                Task::none()
            }
            Message::ResetConfirm => {
                self.reset_open = false;
                match self.coordinator.begin_reset(true) {
                    Ok(true) => {}
                    Ok(false) => return Task::none(),
                    Err(err) => return self.notify(err.to_string(), AlertKind::Warning),
                }
                match self.gateway_or_alert() {
                    Ok(gateway) => Task::perform(
                        async move { gateway.reset().await },
                        Message::ResetFinished,
                    ),
                    Err(task) => {
                        let _ = self.coordinator.finish_reset(Err(unavailable()));
                        task
                    }
                }
            }
            Message::ResetFinished(result) => {
                let outcome = self.coordinator.finish_reset(result);
                match self.settle_action(Action::Reset, outcome) {
                    (Some(()), _) => {
                        self.encrypt_input.clear();
                        self.decrypt_input.clear();
                        self.performance = PerformancePane::Idle;
                        self.notify(RESET_DONE, AlertKind::Success)
                    }
                    (None, task) => task,
                }
            }
            Message::RefreshPerformance => {
                if matches!(self.performance, PerformancePane::Loading) {
                    return Task::none();
                }
                let gateway = match self.gateway_or_alert() {
                    Ok(gateway) => gateway,
                    Err(task) => return task,
                };
                self.performance = PerformancePane::Loading;
                Task::perform(
                    async move {
                        perf::load_performance(&*gateway)
                            .await
                            .map_err(|err| err.inline_message())
                    },
                    Message::PerformanceLoaded,
                )
            }
            Message::PerformanceLoaded(result) => {
                self.performance = match result {
                    Ok(report) => PerformancePane::Loaded(report),
                    Err(message) => {
                        warn!("performance data unavailable: {message}");
                        PerformancePane::Failed(message)
                    }
                };
                Task::none()
            }
            Message::ExportPerformance => {
                let PerformancePane::Loaded(report) = &self.performance else {
                    return Task::none();
                };
                if self.exporting {
                    return Task::none();
                }
                let report = report.clone();
                self.exporting = true;
                Task::perform(
                    async move {
                        perf::bundle_snapshot(&report, None).map_err(|err| err.to_string())
                    },
                    Message::ExportFinished,
                )
            }
            Message::ExportFinished(result) => {
                self.exporting = false;
                match result {
                    Ok(path) => self.notify(
                        format!("Performance bundle saved to {}", path.display()),
                        AlertKind::Success,
                    ),
                    Err(message) => self.notify(
                        format!("Failed to export performance data: {message}"),
                        AlertKind::Error,
                    ),
                }
            }
        }
    }

    fn view(&self) -> iced::Element<'_, Message> {
        view::render(self)
    }

    fn theme(&self) -> Theme {
        Theme::TokyoNight
    }
}

impl Drop for HybridDeck {
    fn drop(&mut self) {
        self.coordinator.teardown();
    }
}

/// Stand-in reply used when no gateway could be built.
fn unavailable() -> hybridcrypt_contract::GatewayError {
    hybridcrypt_contract::GatewayError::Transport("service client unavailable".into())
}

/// Alert text and severity for a failed action.
pub(super) fn failure_alert(action: Action, err: &HybridError) -> (String, AlertKind) {
    match err {
        HybridError::Validation(message) => (message.clone(), AlertKind::Warning),
        HybridError::Busy(_) | HybridError::StepLocked(_) => (err.to_string(), AlertKind::Warning),
        other => (
            format!("{} failed: {}", action.label(), other.inline_message()),
            AlertKind::Error,
        ),
    }
}

/// Trim whitespace and one pair of surrounding quotes from a pasted path.
pub(super) fn normalized_path(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|quote| {
            trimmed
                .strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(trimmed)
        .trim();
    if unquoted.is_empty() {
        None
    } else {
        Some(PathBuf::from(unquoted))
    }
}

/// Text beside a file input.
pub(super) fn selection_hint(selection: Option<&UploadFile>, input: &str) -> String {
    match selection {
        Some(file) => file.describe(),
        None if input.trim().is_empty() => NO_FILE_SELECTED.to_string(),
        None => "File tidak ditemukan".to_string(),
    }
}

#[cfg(test)]
mod tests;
