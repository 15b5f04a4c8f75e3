//! Core building blocks shared by HybridCrypt clients.
//!
//! Session state, the step state machine, the workflow coordinator, and the
//! performance view live here so the terminal and desktop front ends only
//! translate state into output.

pub mod alerts;
pub mod config;
pub mod display;
pub mod error;
pub mod logging;
pub mod perf;
pub mod state;
pub mod steps;
pub mod workflow;

pub use alerts::{Alert, AlertId, AlertKind, AlertPresenter};
pub use config::{AlertCfg, ClientConfig, ServiceCfg, WorkflowCfg};
pub use error::{ErrorClass, HybridError, HybridResult};
pub use perf::{PerformanceReport, PerformanceView, StatCard, TableRow};
pub use state::{ProcessState, Step};
pub use steps::{AdvanceTicket, PendingAdvance, StepController, StepIndicator};
pub use workflow::{Action, Control, WorkflowCoordinator, WorkflowSettings};
