//! Transient notification queue.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AlertId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Success,
    Warning,
    Error,
}

impl AlertKind {
    pub fn tag(self) -> &'static str {
        match self {
            AlertKind::Info => "[INFO]",
            AlertKind::Success => "[ OK ]",
            AlertKind::Warning => "[WARN]",
            AlertKind::Error => "[FAIL]",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub id: AlertId,
    pub kind: AlertKind,
    pub message: String,
    pub raised_at: Instant,
}

/// Stack of visible notifications, oldest first.
#[derive(Debug, Clone)]
pub struct AlertPresenter {
    lifetime: Duration,
    alerts: Vec<Alert>,
    next_id: u64,
}

impl AlertPresenter {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            alerts: Vec::new(),
            next_id: 1,
        }
    }

    /// How long an alert stays before [`Self::expire`] drops it.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: AlertKind) -> AlertId {
        self.notify_at(message, kind, Instant::now())
    }

    pub fn notify_at(
        &mut self,
        message: impl Into<String>,
        kind: AlertKind,
        now: Instant,
    ) -> AlertId {
        let id = AlertId(self.next_id);
        self.next_id += 1;
        self.alerts.push(Alert {
            id,
            kind,
            message: message.into(),
            raised_at: now,
        });
        id
    }

    /// Remove one alert. Returns false when it was already gone.
    pub fn dismiss(&mut self, id: AlertId) -> bool {
        let before = self.alerts.len();
        self.alerts.retain(|alert| alert.id != id);
        self.alerts.len() != before
    }

    /// Drop every alert older than the lifetime and return how many went away.
    pub fn expire(&mut self, now: Instant) -> usize {
        let lifetime = self.lifetime;
        let before = self.alerts.len();
        self.alerts
            .retain(|alert| now.saturating_duration_since(alert.raised_at) < lifetime);
        before - self.alerts.len()
    }

    pub fn clear(&mut self) {
        self.alerts.clear();
    }
}
