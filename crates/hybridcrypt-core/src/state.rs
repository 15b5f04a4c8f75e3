//! Session progress: which prerequisites have completed and where the user is.

use std::fmt;

/// One of the four sequential workflow stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Step {
    Generate = 1,
    Exchange = 2,
    Encrypt = 3,
    Decrypt = 4,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Generate, Step::Exchange, Step::Encrypt, Step::Decrypt];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Step::Generate),
            2 => Some(Step::Exchange),
            3 => Some(Step::Encrypt),
            4 => Some(Step::Decrypt),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Generate => "Generate Keys",
            Step::Exchange => "Key Exchange",
            Step::Encrypt => "Encrypt File",
            Step::Decrypt => "Decrypt File",
        }
    }

    /// Step that follows this one, if any.
    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.title())
    }
}

/// Single source of truth for workflow progress.
///
/// Only the coordinator mutates it, and only after a successful remote call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessState {
    keys_generated: bool,
    key_exchanged: bool,
}

impl ProcessState {
    pub fn keys_generated(&self) -> bool {
        self.keys_generated
    }

    pub fn key_exchanged(&self) -> bool {
        self.key_exchanged
    }

    /// Whether the prerequisites for `step` have completed.
    pub fn unlocks(&self, step: Step) -> bool {
        match step {
            Step::Generate => true,
            Step::Exchange => self.keys_generated,
            Step::Encrypt | Step::Decrypt => self.key_exchanged,
        }
    }

    pub(crate) fn mark_keys_generated(&mut self) {
        self.keys_generated = true;
    }

    pub(crate) fn mark_key_exchanged(&mut self) {
        self.key_exchanged = true;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
