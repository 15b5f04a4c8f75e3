//! Workflow coordination: ties the five user actions to gateway calls, owns the
//! session state, and drives the step controller.
//!
//! Each action is split into `begin_*` (local validation, marks the action in
//! flight, hands back what the gateway call needs) and `finish_*` (applies the
//! gateway result). Presentation adapters that run calls on their own executor
//! use the split directly; the async convenience methods chain both halves.

mod files;
mod keys;
mod panels;
mod reset;
mod walkthrough;


use crate::config::ClientConfig;
use crate::error::{HybridError, HybridResult};
use crate::state::{ProcessState, Step};
use crate::steps::{AdvanceTicket, PendingAdvance, StepController, StepIndicator};
use hybridcrypt_contract::{EncryptionMode, UploadFile};
use log::debug;
use std::collections::BTreeSet;
use std::time::Duration;

pub use files::{download_artifact, save_artifact, ArtifactKind, SavedArtifact};
pub use panels::{
    DecryptionSummary, EncryptionSummary, ExchangeSummary, KeySummary, Panel, Panels, PublicKeys,
    KEY_PLACEHOLDER,
};
pub use reset::{RESET_CONFIRMATION, RESET_DONE};
pub use walkthrough::walkthrough;

/// User-triggerable actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    GenerateKeys,
    ExchangeKeys,
    EncryptFile,
    DecryptFile,
    Reset,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::GenerateKeys,
        Action::ExchangeKeys,
        Action::EncryptFile,
        Action::DecryptFile,
        Action::Reset,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Action::GenerateKeys => "key generation",
            Action::ExchangeKeys => "key exchange",
            Action::EncryptFile => "file encryption",
            Action::DecryptFile => "file decryption",
            Action::Reset => "system reset",
        }
    }

    /// Button caption while idle and while the call is outstanding.
    pub fn caption(self, busy: bool) -> &'static str {
        match (self, busy) {
            (Action::GenerateKeys, false) => "Buat Keypair",
            (Action::GenerateKeys, true) => "Generating...",
            (Action::ExchangeKeys, false) => "Lakukan Pertukaran Kunci",
            (Action::ExchangeKeys, true) => "Bertukar...",
            (Action::EncryptFile, false) => "Enkripsi File",
            (Action::EncryptFile, true) => "Sedang mengenkripsi...",
            (Action::DecryptFile, false) => "Dekripsi File",
            (Action::DecryptFile, true) => "Sedang mendekripsi...",
            (Action::Reset, false) => "Reset System",
            (Action::Reset, true) => "Resetting...",
        }
    }

    /// Progress prerequisite that enables the control.
    fn gate(self, state: &ProcessState) -> bool {
        match self {
            Action::GenerateKeys | Action::Reset => true,
            Action::ExchangeKeys => state.keys_generated(),
            Action::EncryptFile | Action::DecryptFile => state.key_exchanged(),
        }
    }
}

/// Derived state of one action control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Control {
    pub action: Action,
    pub enabled: bool,
    pub busy: bool,
}

impl Control {
    pub fn caption(&self) -> &'static str {
        self.action.caption(self.busy)
    }
}

/// Severity levels used when reporting workflow events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowLevel {
    Info,
    Success,
    Warn,
}

/// Single line of output produced by a workflow step.
#[derive(Debug, Clone)]
pub struct WorkflowEvent {
    pub level: WorkflowLevel,
    pub message: String,
}

/// Aggregated report returned by multi-step runs.
#[derive(Debug, Clone)]
pub struct WorkflowReport {
    pub title: String,
    pub events: Vec<WorkflowEvent>,
}

pub(crate) fn event(level: WorkflowLevel, message: impl Into<String>) -> WorkflowEvent {
    WorkflowEvent {
        level,
        message: message.into(),
    }
}

/// Coordinator tunables taken from [`ClientConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkflowSettings {
    pub auto_advance: Duration,
    pub default_mode: EncryptionMode,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self::from(&ClientConfig::default())
    }
}

impl From<&ClientConfig> for WorkflowSettings {
    fn from(config: &ClientConfig) -> Self {
        Self {
            auto_advance: config.auto_advance_delay(),
            default_mode: config.workflow.default_mode,
        }
    }
}

/// Owner of the session: progress, current step, in-flight actions, file
/// selections, and result panels.
#[derive(Debug)]
pub struct WorkflowCoordinator {
    settings: WorkflowSettings,
    state: ProcessState,
    steps: StepController,
    in_flight: BTreeSet<Action>,
    encrypt_selection: Option<UploadFile>,
    decrypt_selection: Option<UploadFile>,
    mode: EncryptionMode,
    panels: Panels,
}

impl Default for WorkflowCoordinator {
    fn default() -> Self {
        Self::new(WorkflowSettings::default())
    }
}

impl WorkflowCoordinator {
    pub fn new(settings: WorkflowSettings) -> Self {
        Self {
            mode: settings.default_mode,
            settings,
            state: ProcessState::default(),
            steps: StepController::new(),
            in_flight: BTreeSet::new(),
            encrypt_selection: None,
            decrypt_selection: None,
            panels: Panels::default(),
        }
    }

    pub fn settings(&self) -> &WorkflowSettings {
        &self.settings
    }

    pub fn state(&self) -> &ProcessState {
        &self.state
    }

    pub fn current_step(&self) -> Step {
        self.steps.current()
    }

    pub fn pending_advance(&self) -> Option<PendingAdvance> {
        self.steps.pending()
    }

    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    pub fn indicators(&self) -> [StepIndicator; 4] {
        self.steps.indicators(&self.state)
    }

    pub fn can_navigate_to(&self, step: Step) -> bool {
        self.steps.can_navigate_to(step, &self.state)
    }

    pub fn is_in_flight(&self, action: Action) -> bool {
        self.in_flight.contains(&action)
    }

    pub fn control(&self, action: Action) -> Control {
        let busy = self.is_in_flight(action);
        Control {
            action,
            enabled: action.gate(&self.state) && !busy,
            busy,
        }
    }

    pub fn is_enabled(&self, action: Action) -> bool {
        self.control(action).enabled
    }

    pub fn controls(&self) -> [Control; 5] {
        Action::ALL.map(|action| self.control(action))
    }

    /// Click-driven navigation. Cancels any pending auto-advance when it succeeds.
    pub fn navigate_to(&mut self, step: Step) -> HybridResult<()> {
        if self.steps.navigate_to(step, &self.state) {
            debug!("navigated to step {}", step.number());
            Ok(())
        } else {
            Err(HybridError::StepLocked(step))
        }
    }

    /// Called by the adapter once a scheduled delay has elapsed.
    pub fn fire_auto_advance(&mut self, ticket: AdvanceTicket) -> Option<Step> {
        let shown = self.steps.fire_auto_advance(ticket);
        match shown {
            Some(step) => debug!("auto-advanced to step {}", step.number()),
            None => debug!("auto-advance ticket {} is stale", ticket.value()),
        }
        shown
    }

    /// End of session: nothing scheduled may fire afterwards.
    pub fn teardown(&mut self) {
        if self.steps.cancel_pending().is_some() {
            debug!("pending auto-advance cancelled on teardown");
        }
    }

    fn start(&mut self, action: Action) -> HybridResult<()> {
        if !self.in_flight.insert(action) {
            return Err(HybridError::Busy(action));
        }
        debug!("{} started", action.label());
        Ok(())
    }

    fn settle(&mut self, action: Action) {
        self.in_flight.remove(&action);
    }

    fn schedule(&mut self, target: Step) -> PendingAdvance {
        self.steps
            .schedule_auto_advance(target, self.settings.auto_advance)
    }
}
