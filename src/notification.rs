use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub level: ToastLevel,
    pub title: String,
    pub description: String,
    pub created_at: Instant,
    pub duration: Duration,
}

impl Toast {
    pub fn new(
        level: ToastLevel,
        title: impl Into<String>,
        description: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            level,
            title: title.into(),
            description: description.into(),
            created_at: Instant::now(),
            duration,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.created_at.elapsed() > self.duration
    }
}

/// Transient banners raised around login and logout
#[derive(Debug)]
pub struct Notifications {
    toasts: VecDeque<Toast>,
    duration: Duration,
}

impl Notifications {
    pub fn new(duration: Duration) -> Self {
        Self {
            toasts: VecDeque::new(),
            duration,
        }
    }

    pub fn push_success(&mut self, title: &str, description: &str) {
        self.push(ToastLevel::Success, title, description);
    }

    pub fn push_error(&mut self, title: &str, description: &str) {
        self.push(ToastLevel::Error, title, description);
    }

    fn push(&mut self, level: ToastLevel, title: &str, description: &str) {
        tracing::debug!("Toast {:?}: {} - {}", level, title, description);
        self.toasts
            .push_back(Toast::new(level, title, description, self.duration));
    }

    pub fn prune(&mut self) {
        self.toasts.retain(|t| !t.is_expired());
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.toasts.back()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new(Duration::from_secs(3))
    }
}
