//! Step state machine: which step is shown, which steps may be opened, and the
//! single pending auto-advance.
//!
//! Auto-advance is modelled as a ticket. Scheduling hands back a
//! [`PendingAdvance`]; the presentation adapter waits `delay` and then calls
//! [`StepController::fire_auto_advance`] with the ticket. A ticket only applies
//! while it is the most recent one and has not been cancelled, so manual
//! navigation, reset, or teardown make an outstanding timer harmless.

use crate::state::{ProcessState, Step};
use std::time::Duration;

/// Identifies one scheduled auto-advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AdvanceTicket(u64);

impl AdvanceTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Auto-advance waiting for its timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAdvance {
    pub ticket: AdvanceTicket,
    pub target: Step,
    pub delay: Duration,
}

/// Presentation state of one stepper bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepIndicator {
    pub step: Step,
    /// Steps up to and including the current one render as active.
    pub active: bool,
    pub current: bool,
    /// Whether clicking the bubble would navigate.
    pub reachable: bool,
}

#[derive(Debug, Clone)]
pub struct StepController {
    current: Step,
    pending: Option<PendingAdvance>,
    next_ticket: u64,
}

impl Default for StepController {
    fn default() -> Self {
        Self::new()
    }
}

impl StepController {
    pub fn new() -> Self {
        Self {
            current: Step::Generate,
            pending: None,
            next_ticket: 1,
        }
    }

    pub fn current(&self) -> Step {
        self.current
    }

    pub fn pending(&self) -> Option<PendingAdvance> {
        self.pending
    }

    /// Make `step` current. Presentation only; no gate applies.
    pub fn show_step(&mut self, step: Step) {
        self.current = step;
    }

    pub fn indicators(&self, state: &ProcessState) -> [StepIndicator; 4] {
        Step::ALL.map(|step| StepIndicator {
            step,
            active: step <= self.current,
            current: step == self.current,
            reachable: self.can_navigate_to(step, state),
        })
    }

    /// Sole gate for click-driven navigation.
    pub fn can_navigate_to(&self, step: Step, state: &ProcessState) -> bool {
        step <= self.current || state.unlocks(step)
    }

    /// Manual navigation. Returns whether the move happened; a successful move
    /// cancels any pending auto-advance.
    pub fn navigate_to(&mut self, step: Step, state: &ProcessState) -> bool {
        if !self.can_navigate_to(step, state) {
            return false;
        }
        self.pending = None;
        self.show_step(step);
        true
    }

    /// Schedule a one-shot move to `target`, replacing any earlier pending advance.
    pub fn schedule_auto_advance(&mut self, target: Step, delay: Duration) -> PendingAdvance {
        let ticket = AdvanceTicket(self.next_ticket);
        self.next_ticket += 1;
        let pending = PendingAdvance {
            ticket,
            target,
            delay,
        };
        self.pending = Some(pending);
        pending
    }

    /// Apply the advance for `ticket` if it is still pending. Returns the step shown.
    pub fn fire_auto_advance(&mut self, ticket: AdvanceTicket) -> Option<Step> {
        match self.pending {
            Some(pending) if pending.ticket == ticket => {
                self.pending = None;
                self.show_step(pending.target);
                Some(pending.target)
            }
            _ => None,
        }
    }

    pub fn cancel_pending(&mut self) -> Option<PendingAdvance> {
        self.pending.take()
    }

    /// Back to step 1 with nothing pending. Ticket numbering keeps increasing so
    /// timers scheduled before the reset can never match.
    pub fn reset(&mut self) {
        self.pending = None;
        self.current = Step::Generate;
    }
}
