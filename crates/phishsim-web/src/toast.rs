//! Transient notifications
//!
//! A page shows at most one toast. Showing a new one replaces the current
//! toast and cancels its dismissal timer; every toast gets its own timer.

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Toast flavour, drives its colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
}

/// A visible notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub kind: ToastKind,
}

#[derive(Default)]
struct NotifierState {
    current: Option<Toast>,
    next_id: u64,
    timer: Option<JoinHandle<()>>,
}

/// Per-page toast holder
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Mutex<NotifierState>>,
    ttl: Duration,
}

impl Notifier {
    /// Create a notifier whose toasts live for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(NotifierState::default())),
            ttl,
        }
    }

    /// Lifetime of each toast
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn success(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastKind::Success).await
    }

    pub async fn error(&self, message: impl Into<String>) -> u64 {
        self.show(message, ToastKind::Error).await
    }

    /// Show a toast, replacing any visible one. Returns the toast id.
    pub async fn show(&self, message: impl Into<String>, kind: ToastKind) -> u64 {
        let mut state = self.inner.lock().await;

        if let Some(timer) = state.timer.take() {
            timer.abort();
        }

        state.next_id += 1;
        let id = state.next_id;
        state.current = Some(Toast {
            id,
            message: message.into(),
            kind,
        });

        let inner = Arc::clone(&self.inner);
        let ttl = self.ttl;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = inner.lock().await;
            if state.current.as_ref().map(|t| t.id) == Some(id) {
                state.current = None;
                state.timer = None;
            }
        }));

        id
    }

    /// Hide the current toast
    pub async fn dismiss(&self) {
        let mut state = self.inner.lock().await;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.current = None;
    }

    /// The visible toast, if any
    pub async fn current(&self) -> Option<Toast> {
        self.inner.lock().await.current.clone()
    }
}
