//! Targets and their engagement history
//!
//! Besides the target list this page hosts the email preview. Links inside a
//! previewed email point back at the console; following one records the
//! engagement and opens the "caught" dialog with an AI explanation of the
//! red flags the operator missed.

use crate::preview::{caught_url, sanitize_email, LinkPolicy};
use crate::toast::Notifier;
use phishsim_client::Backend;
use phishsim_common::types::{
    AnalyzeRequest, EngagementStatus, HistoryEntry, NewTarget, ResultId, Target, TargetId,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::short_date;

/// Shown when no explanation could be produced
pub const ANALYSIS_FALLBACK: &str =
    "Could not load specific analysis. Remember to check the sender and urgency.";

/// History entries listed per target row
const HISTORY_PREVIEW_LEN: usize = 2;

/// Teachable-moment dialog
#[derive(Debug, Clone, PartialEq)]
pub struct CaughtDialog {
    pub loading: bool,
    pub points: Vec<String>,
}

/// Email preview of one history entry
#[derive(Debug, Clone, PartialEq)]
pub struct EmailPreview {
    pub target_id: TargetId,
    pub entry: HistoryEntry,
    pub caught: Option<CaughtDialog>,
}

#[derive(Debug, Clone)]
pub struct TargetsState {
    pub loading: bool,
    pub targets: Vec<Target>,
    pub create_open: bool,
    pub preview: Option<EmailPreview>,
}

impl Default for TargetsState {
    fn default() -> Self {
        Self {
            loading: true,
            targets: Vec::new(),
            create_open: false,
            preview: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum TargetAction {
    Loaded(Vec<Target>),
    LoadFailed,
    OpenCreate,
    CloseCreate,
    Created,
    Removed(TargetId),
    OpenPreview { result_id: ResultId },
    ClosePreview,
    LinkClicked,
    AnalysisResolved {
        result_id: ResultId,
        points: Vec<String>,
    },
    CloseCaught,
}

impl TargetsState {
    fn find_entry(&self, result_id: ResultId) -> Option<(TargetId, &HistoryEntry)> {
        self.targets
            .iter()
            .find_map(|t| t.history_entry(result_id).map(|entry| (t.id, entry)))
    }

    pub fn reduce(&mut self, action: TargetAction) {
        match action {
            TargetAction::Loaded(targets) => {
                self.loading = false;
                self.targets = targets;
            }
            TargetAction::LoadFailed => self.loading = false,
            TargetAction::OpenCreate => self.create_open = true,
            TargetAction::CloseCreate | TargetAction::Created => self.create_open = false,
            TargetAction::Removed(id) => {
                self.targets.retain(|t| t.id != id);
                if self.preview.as_ref().map(|p| p.target_id) == Some(id) {
                    self.preview = None;
                }
            }
            TargetAction::OpenPreview { result_id } => {
                let found = self
                    .find_entry(result_id)
                    .map(|(target_id, entry)| (target_id, entry.clone()));
                if let Some((target_id, entry)) = found {
                    self.preview = Some(EmailPreview {
                        target_id,
                        entry,
                        caught: None,
                    });
                }
            }
            TargetAction::ClosePreview => self.preview = None,
            TargetAction::LinkClicked => {
                if let Some(preview) = &mut self.preview {
                    preview.caught = Some(CaughtDialog {
                        loading: true,
                        points: Vec::new(),
                    });
                }
            }
            TargetAction::AnalysisResolved { result_id, points } => {
                // Stale results for a closed or replaced preview are dropped.
                let Some(preview) = &mut self.preview else {
                    return;
                };
                if preview.entry.result_id != result_id {
                    return;
                }
                if let Some(caught) = &mut preview.caught {
                    caught.loading = false;
                    caught.points = if points.is_empty() {
                        vec![ANALYSIS_FALLBACK.to_string()]
                    } else {
                        points
                    };
                }
            }
            TargetAction::CloseCaught => {
                if let Some(preview) = &mut self.preview {
                    preview.caught = None;
                }
            }
        }
    }

    pub fn view(&self) -> TargetsView {
        let targets = self
            .targets
            .iter()
            .map(|t| TargetRow {
                id: t.id,
                name: t.display_name(),
                email: t.email.clone(),
                department: t
                    .department
                    .clone()
                    .filter(|d| !d.trim().is_empty())
                    .unwrap_or_else(|| "N/A".to_string()),
                history: t
                    .history
                    .iter()
                    .take(HISTORY_PREVIEW_LEN)
                    .map(|h| HistoryRow {
                        result_id: h.result_id,
                        subject: h.email_subject.clone(),
                        status: h.status,
                    })
                    .collect(),
                more_history: t.history.len().saturating_sub(HISTORY_PREVIEW_LEN),
            })
            .collect();

        let preview = self.preview.as_ref().map(|p| PreviewView {
            result_id: p.entry.result_id,
            campaign_name: p.entry.campaign_name.clone(),
            subject: p.entry.email_subject.clone(),
            sent_at: short_date(&p.entry.sent_at),
            status: p.entry.status,
            body_html: sanitize_email(
                &p.entry.email_body,
                LinkPolicy::Intercept(caught_url(p.entry.result_id)),
            ),
            caught: p.caught.as_ref().map(|c| CaughtView {
                loading: c.loading,
                points: c.points.clone(),
            }),
        });

        TargetsView {
            loading: self.loading,
            targets,
            create_open: self.create_open,
            preview,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetsView {
    pub loading: bool,
    pub targets: Vec<TargetRow>,
    pub create_open: bool,
    pub preview: Option<PreviewView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetRow {
    pub id: TargetId,
    pub name: String,
    pub email: String,
    pub department: String,
    pub history: Vec<HistoryRow>,
    pub more_history: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryRow {
    pub result_id: ResultId,
    pub subject: String,
    pub status: EngagementStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct PreviewView {
    pub result_id: ResultId,
    pub campaign_name: String,
    pub subject: String,
    pub sent_at: String,
    pub status: EngagementStatus,
    pub body_html: String,
    pub caught: Option<CaughtView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CaughtView {
    pub loading: bool,
    pub points: Vec<String>,
}

/// Targets controller
pub struct TargetsPage {
    backend: Arc<dyn Backend>,
    state: Mutex<TargetsState>,
    notifier: Notifier,
}

impl TargetsPage {
    pub fn new(backend: Arc<dyn Backend>, toast_ttl: Duration) -> Self {
        Self {
            backend,
            state: Mutex::new(TargetsState::default()),
            notifier: Notifier::new(toast_ttl),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub async fn dispatch(&self, action: TargetAction) {
        self.state.lock().await.reduce(action);
    }

    pub async fn snapshot(&self) -> TargetsState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self) -> TargetsView {
        self.state.lock().await.view()
    }

    /// Whether the caught dialog is waiting for its analysis
    pub async fn analysis_pending(&self) -> bool {
        self.state
            .lock()
            .await
            .preview
            .as_ref()
            .and_then(|p| p.caught.as_ref())
            .map(|c| c.loading)
            .unwrap_or(false)
    }

    pub async fn refresh(&self) {
        match self.backend.list_targets().await {
            Ok(targets) => self.dispatch(TargetAction::Loaded(targets)).await,
            Err(e) => {
                error!("Failed to load targets: {}", e);
                self.dispatch(TargetAction::LoadFailed).await;
            }
        }
    }

    pub async fn create(&self, target: NewTarget) {
        if target.email.trim().is_empty() {
            warn!("Rejected target without email");
            self.notifier.error("Failed to add target").await;
            return;
        }

        match self.backend.create_target(&target).await {
            Ok(created) => {
                info!("Added target {} ({})", created.id, target.email);
                self.dispatch(TargetAction::Created).await;
                self.notifier.success("Target added successfully!").await;
                self.refresh().await;
            }
            Err(e) => {
                warn!("Failed to add target {}: {}", target.email, e);
                self.notifier.error(e.user_message("Failed to add target")).await;
            }
        }
    }

    pub async fn delete(&self, id: TargetId) {
        match self.backend.delete_target(id).await {
            Ok(()) => {
                self.dispatch(TargetAction::Removed(id)).await;
                self.notifier.success("Target deleted").await;
            }
            Err(e) => {
                warn!("Failed to delete target {}: {}", id, e);
                self.notifier.error("Failed to delete target").await;
            }
        }
    }

    /// Show a history entry and record the open
    pub async fn open_preview(&self, result_id: ResultId) {
        self.dispatch(TargetAction::OpenPreview { result_id }).await;
        if let Err(e) = self.backend.track_open(result_id).await {
            warn!("Failed to track open for result {}: {}", result_id, e);
        }
    }

    /// Handle a click on a link inside the previewed email.
    ///
    /// Records one open, shows the caught dialog in its loading state and
    /// requests the explanation in the background. Returns the analysis task,
    /// or `None` when `result_id` is not the previewed entry.
    pub async fn link_clicked(self: &Arc<Self>, result_id: ResultId) -> Option<JoinHandle<()>> {
        let request = {
            let mut state = self.state.lock().await;
            let entry = match &state.preview {
                Some(preview) if preview.entry.result_id == result_id => preview.entry.clone(),
                _ => {
                    debug!("Ignoring click for result {} outside the preview", result_id);
                    return None;
                }
            };
            state.reduce(TargetAction::LinkClicked);
            AnalyzeRequest {
                subject: entry.email_subject,
                body: entry.email_body,
            }
        };

        if let Err(e) = self.backend.track_open(result_id).await {
            warn!("Failed to track click for result {}: {}", result_id, e);
        }

        let page = Arc::clone(self);
        Some(tokio::spawn(async move {
            let points = match page.backend.analyze_template(&request).await {
                Ok(points) => points,
                Err(e) => {
                    warn!("Failed to analyze result {}: {}", result_id, e);
                    vec![ANALYSIS_FALLBACK.to_string()]
                }
            };
            page.dispatch(TargetAction::AnalysisResolved { result_id, points })
                .await;
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeBackend};
    use crate::toast::ToastKind;
    use pretty_assertions::assert_eq;

    const TTL: Duration = Duration::from_secs(3);

    fn seeded() -> Arc<FakeBackend> {
        let backend = Arc::new(FakeBackend::new());
        let mut alice = testing::target(1, "Alice", "alice@corp.example");
        alice.history = vec![
            testing::history(10, "Password expires today"),
            testing::history(11, "Invoice overdue"),
            testing::history(12, "Package held"),
        ];
        let mut bob = testing::target(2, "Bob", "bob@corp.example");
        bob.department = None;
        bob.history = vec![testing::history(20, "Policy update")];
        *backend.targets.lock().unwrap() = vec![alice, bob];
        backend
    }

    async fn loaded_page(backend: &Arc<FakeBackend>) -> Arc<TargetsPage> {
        let page = Arc::new(TargetsPage::new(backend.clone(), TTL));
        page.refresh().await;
        page
    }

    #[tokio::test]
    async fn test_rows_show_department_and_two_history_entries() {
        let backend = seeded();
        let page = loaded_page(&backend).await;

        let view = page.view().await;
        assert_eq!(view.targets[0].name, "Alice Doe");
        assert_eq!(view.targets[0].department, "Sales");
        assert_eq!(view.targets[0].history.len(), 2);
        assert_eq!(view.targets[0].more_history, 1);
        assert_eq!(view.targets[1].department, "N/A");
        assert_eq!(view.targets[1].history[0].subject, "Policy update");
    }

    #[tokio::test]
    async fn test_open_preview_tracks_open_and_rewrites_links() {
        let backend = seeded();
        let page = loaded_page(&backend).await;

        page.open_preview(11).await;
        assert_eq!(backend.count("track_open:11"), 1);

        let preview = page.view().await.preview.unwrap();
        assert_eq!(preview.subject, "Invoice overdue");
        assert!(preview.body_html.contains("href=\"/history/11/caught\""));
        assert!(!preview.body_html.contains("phishing-link"));
    }

    #[tokio::test]
    async fn test_link_click_tracks_once_and_analyzes_once() {
        let backend = seeded();
        *backend.analysis.lock().unwrap() = vec![
            "Urgent deadline".to_string(),
            "Generic greeting".to_string(),
        ];
        let page = loaded_page(&backend).await;
        page.open_preview(10).await;

        let task = page.link_clicked(10).await.unwrap();
        task.await.unwrap();

        // One open on preview, one on the click.
        assert_eq!(backend.count("track_open:10"), 2);
        assert_eq!(backend.count("analyze_template"), 1);
        assert_eq!(
            backend.calls().last().map(String::as_str),
            Some("analyze_template:Password expires today")
        );

        let caught = page.snapshot().await.preview.unwrap().caught.unwrap();
        assert!(!caught.loading);
        assert_eq!(caught.points, vec!["Urgent deadline", "Generic greeting"]);
    }

    #[tokio::test]
    async fn test_click_outside_preview_is_ignored() {
        let backend = seeded();
        let page = loaded_page(&backend).await;

        assert!(page.link_clicked(10).await.is_none());
        page.open_preview(20).await;
        assert!(page.link_clicked(10).await.is_none());
        assert_eq!(backend.count("analyze_template"), 0);
        assert_eq!(backend.count("track_open:10"), 0);
    }

    #[tokio::test]
    async fn test_failed_analysis_uses_fallback() {
        let backend = seeded();
        backend.fail("analyze_template", Some("Gemini unavailable"));
        let page = loaded_page(&backend).await;
        page.open_preview(10).await;

        page.link_clicked(10).await.unwrap().await.unwrap();
        let caught = page.snapshot().await.preview.unwrap().caught.unwrap();
        assert_eq!(caught.points, vec![ANALYSIS_FALLBACK]);
    }

    #[tokio::test]
    async fn test_failed_tracking_still_opens_dialog() {
        let backend = seeded();
        backend.fail("track_open", None);
        let page = loaded_page(&backend).await;
        page.open_preview(10).await;

        page.link_clicked(10).await.unwrap().await.unwrap();
        assert!(!page.analysis_pending().await);
        assert!(page.notifier().current().await.is_none());
    }

    #[test]
    fn test_empty_analysis_uses_fallback() {
        let mut state = TargetsState::default();
        let mut target = testing::target(1, "Alice", "alice@corp.example");
        target.history = vec![testing::history(10, "Password expires today")];
        state.reduce(TargetAction::Loaded(vec![target]));
        state.reduce(TargetAction::OpenPreview { result_id: 10 });
        state.reduce(TargetAction::LinkClicked);
        assert!(state.view().preview.unwrap().caught.unwrap().loading);

        state.reduce(TargetAction::AnalysisResolved {
            result_id: 10,
            points: Vec::new(),
        });
        let caught = state.view().preview.unwrap().caught.unwrap();
        assert!(!caught.loading);
        assert_eq!(caught.points, vec![ANALYSIS_FALLBACK]);
    }

    #[test]
    fn test_stale_analysis_is_discarded() {
        let mut state = TargetsState::default();
        let mut target = testing::target(1, "Alice", "alice@corp.example");
        target.history = vec![
            testing::history(10, "Password expires today"),
            testing::history(11, "Invoice overdue"),
        ];
        state.reduce(TargetAction::Loaded(vec![target]));
        state.reduce(TargetAction::OpenPreview { result_id: 10 });
        state.reduce(TargetAction::LinkClicked);
        state.reduce(TargetAction::OpenPreview { result_id: 11 });

        state.reduce(TargetAction::AnalysisResolved {
            result_id: 10,
            points: vec!["late".to_string()],
        });
        let preview = state.preview.unwrap();
        assert_eq!(preview.entry.result_id, 11);
        assert!(preview.caught.is_none());
    }

    #[tokio::test]
    async fn test_create_target_surfaces_backend_message() {
        let backend = seeded();
        let page = loaded_page(&backend).await;

        page.dispatch(TargetAction::OpenCreate).await;
        page.create(NewTarget {
            first_name: "Carol".to_string(),
            email: "carol@corp.example".to_string(),
            ..Default::default()
        })
        .await;
        assert!(!page.snapshot().await.create_open);
        assert_eq!(page.snapshot().await.targets.len(), 3);
        assert_eq!(
            page.notifier().current().await.unwrap().message,
            "Target added successfully!"
        );

        backend.fail("create_target", Some("Email already exists"));
        page.create(NewTarget {
            email: "carol@corp.example".to_string(),
            ..Default::default()
        })
        .await;
        let toast = page.notifier().current().await.unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.message, "Email already exists");
    }

    #[tokio::test]
    async fn test_delete_closes_preview_of_that_target() {
        let backend = seeded();
        let page = loaded_page(&backend).await;
        page.open_preview(20).await;

        page.delete(2).await;
        let state = page.snapshot().await;
        assert!(state.preview.is_none());
        assert_eq!(state.targets.len(), 1);
        assert_eq!(page.notifier().current().await.unwrap().message, "Target deleted");

        backend.fail("delete_target", None);
        page.delete(1).await;
        assert_eq!(page.snapshot().await.targets.len(), 1);
        assert_eq!(
            page.notifier().current().await.unwrap().message,
            "Failed to delete target"
        );
    }
}
