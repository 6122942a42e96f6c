//! AI template generator and saved-template management
//!
//! Generation and saving are separate steps: a generated subject/body pair
//! sits in the draft until the operator saves it under a name.

use crate::preview::{sanitize_email, LinkPolicy};
use crate::toast::Notifier;
use chrono::NaiveDateTime;
use phishsim_client::Backend;
use phishsim_common::types::{
    GenerateRequest, GeneratedTemplate, NewTemplate, Template, TemplateId, TemplateUpdate,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::short_date;

/// Attack scenarios offered by the generator form
pub const ATTACK_TYPES: [&str; 5] = [
    "CEO Fraud",
    "IT Password Reset",
    "Package Delivery",
    "HR Policy Update",
    "Invoice Payment",
];

/// Generator form input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateForm {
    pub attack_type: String,
    pub sender_name: String,
    pub context: String,
}

impl Default for GenerateForm {
    fn default() -> Self {
        Self {
            attack_type: "CEO Fraud".to_string(),
            sender_name: "John CEO".to_string(),
            context: "Urgent wire transfer request for a confidential project.".to_string(),
        }
    }
}

impl From<&GenerateForm> for GenerateRequest {
    fn from(form: &GenerateForm) -> Self {
        Self {
            attack_type: form.attack_type.clone(),
            sender_name: form.sender_name.clone(),
            context: form.context.clone(),
        }
    }
}

/// Unsaved template shown in the preview pane
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub subject: String,
    pub body: String,
    pub is_ai_generated: bool,
    pub name: String,
}

/// Inline rename of a saved template
#[derive(Debug, Clone, PartialEq)]
pub struct Rename {
    pub id: TemplateId,
    pub name: String,
}

#[derive(Debug, Clone, Default)]
pub struct GeneratorState {
    pub form: GenerateForm,
    pub generating: bool,
    pub saving: bool,
    pub draft: Option<Draft>,
    pub templates: Vec<Template>,
    pub editing: Option<Rename>,
}

#[derive(Debug, Clone)]
pub enum GeneratorAction {
    GenerationStarted(GenerateForm),
    Generated {
        generated: GeneratedTemplate,
        name: String,
    },
    GenerationFailed,
    SaveStarted { name: String },
    Saved,
    SaveFailed,
    Discard,
    Loaded(Vec<Template>),
    Removed(TemplateId),
    LoadTemplate(TemplateId),
    StartRename(TemplateId),
    CancelRename,
    Renamed { id: TemplateId, name: String },
}

impl GeneratorState {
    pub fn reduce(&mut self, action: GeneratorAction) {
        match action {
            GeneratorAction::GenerationStarted(form) => {
                self.form = form;
                self.generating = true;
            }
            GeneratorAction::Generated { generated, name } => {
                self.generating = false;
                self.draft = Some(Draft {
                    subject: generated.subject,
                    body: generated.body,
                    is_ai_generated: true,
                    name,
                });
            }
            GeneratorAction::GenerationFailed => self.generating = false,
            GeneratorAction::SaveStarted { name } => {
                self.saving = true;
                if let Some(draft) = &mut self.draft {
                    draft.name = name;
                }
            }
            GeneratorAction::Saved => {
                self.saving = false;
                self.draft = None;
            }
            GeneratorAction::SaveFailed => self.saving = false,
            GeneratorAction::Discard => self.draft = None,
            GeneratorAction::Loaded(templates) => self.templates = templates,
            GeneratorAction::Removed(id) => {
                self.templates.retain(|t| t.id != id);
                if self.editing.as_ref().map(|e| e.id) == Some(id) {
                    self.editing = None;
                }
            }
            GeneratorAction::LoadTemplate(id) => {
                if let Some(template) = self.templates.iter().find(|t| t.id == id) {
                    self.draft = Some(Draft {
                        subject: template.subject.clone(),
                        body: template.body_content.clone(),
                        is_ai_generated: template.is_ai_generated,
                        name: template.name.clone(),
                    });
                }
            }
            GeneratorAction::StartRename(id) => {
                if let Some(template) = self.templates.iter().find(|t| t.id == id) {
                    self.editing = Some(Rename {
                        id,
                        name: template.name.clone(),
                    });
                }
            }
            GeneratorAction::CancelRename => self.editing = None,
            GeneratorAction::Renamed { id, name } => {
                if let Some(template) = self.templates.iter_mut().find(|t| t.id == id) {
                    template.name = name;
                }
                self.editing = None;
            }
        }
    }

    pub fn view(&self) -> GeneratorView {
        GeneratorView {
            form: self.form.clone(),
            attack_types: ATTACK_TYPES.to_vec(),
            generating: self.generating,
            saving: self.saving,
            draft: self.draft.as_ref().map(|draft| DraftView {
                name: draft.name.clone(),
                subject: draft.subject.clone(),
                body_html: sanitize_email(&draft.body, LinkPolicy::Inert),
                is_ai_generated: draft.is_ai_generated,
            }),
            templates: self
                .templates
                .iter()
                .map(|t| TemplateRow {
                    id: t.id,
                    name: t.name.clone(),
                    subject: t.subject.clone(),
                    is_ai_generated: t.is_ai_generated,
                    editing: self.editing.as_ref().map(|e| e.id) == Some(t.id),
                })
                .collect(),
            edit_name: self.editing.as_ref().map(|e| e.name.clone()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GeneratorView {
    pub form: GenerateForm,
    pub attack_types: Vec<&'static str>,
    pub generating: bool,
    pub saving: bool,
    pub draft: Option<DraftView>,
    pub templates: Vec<TemplateRow>,
    pub edit_name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DraftView {
    pub name: String,
    pub subject: String,
    pub body_html: String,
    pub is_ai_generated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateRow {
    pub id: TemplateId,
    pub name: String,
    pub subject: String,
    pub is_ai_generated: bool,
    pub editing: bool,
}

/// Proposed name for a freshly generated template, e.g.
/// `CEO Fraud - 7/1/2024 9:30:05 AM`
pub fn default_name(attack_type: &str, now: &NaiveDateTime) -> String {
    format!(
        "{} - {} {}",
        attack_type,
        short_date(now),
        now.format("%-I:%M:%S %p")
    )
}

/// Name used when the operator clears the proposed one
pub fn fallback_name(attack_type: &str, now: &NaiveDateTime) -> String {
    format!("{} - {}", attack_type, short_date(now))
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Generator controller
pub struct GeneratorPage {
    backend: Arc<dyn Backend>,
    state: Mutex<GeneratorState>,
    notifier: Notifier,
}

impl GeneratorPage {
    pub fn new(backend: Arc<dyn Backend>, toast_ttl: Duration) -> Self {
        Self {
            backend,
            state: Mutex::new(GeneratorState::default()),
            notifier: Notifier::new(toast_ttl),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub async fn dispatch(&self, action: GeneratorAction) {
        self.state.lock().await.reduce(action);
    }

    pub async fn snapshot(&self) -> GeneratorState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self) -> GeneratorView {
        self.state.lock().await.view()
    }

    pub async fn refresh(&self) {
        match self.backend.list_templates().await {
            Ok(templates) => self.dispatch(GeneratorAction::Loaded(templates)).await,
            Err(e) => error!("Failed to load templates: {}", e),
        }
    }

    pub async fn generate(&self, form: GenerateForm) {
        self.generate_at(form, local_now()).await
    }

    /// Generate with an explicit clock reading for the proposed name
    pub async fn generate_at(&self, form: GenerateForm, now: NaiveDateTime) {
        let request = GenerateRequest::from(&form);
        self.dispatch(GeneratorAction::GenerationStarted(form)).await;

        match self.backend.generate_template(&request).await {
            Ok(generated) => {
                info!("Generated {} template", request.attack_type);
                let name = default_name(&request.attack_type, &now);
                self.dispatch(GeneratorAction::Generated { generated, name })
                    .await;
                self.notifier.success("Template generated successfully!").await;
            }
            Err(e) => {
                warn!("Template generation failed: {}", e);
                self.dispatch(GeneratorAction::GenerationFailed).await;
                self.notifier
                    .error(e.user_message("Failed to generate template"))
                    .await;
            }
        }
    }

    pub async fn save(&self, name: &str) {
        self.save_at(name, local_now()).await
    }

    /// Persist the draft under `name`, or the dated fallback when blank
    pub async fn save_at(&self, name: &str, now: NaiveDateTime) {
        let request = {
            let mut state = self.state.lock().await;
            let name = match name.trim() {
                "" => fallback_name(&state.form.attack_type, &now),
                given => given.to_string(),
            };
            let Some(draft) = state.draft.clone() else {
                return;
            };
            state.reduce(GeneratorAction::SaveStarted { name: name.clone() });
            NewTemplate {
                name,
                subject: draft.subject,
                body_content: draft.body,
                is_ai_generated: draft.is_ai_generated,
            }
        };

        match self.backend.create_template(&request).await {
            Ok(created) => {
                info!("Saved template {} ({})", created.id, request.name);
                self.dispatch(GeneratorAction::Saved).await;
                self.notifier.success("Template saved!").await;
                self.refresh().await;
            }
            Err(e) => {
                warn!("Failed to save template: {}", e);
                self.dispatch(GeneratorAction::SaveFailed).await;
                self.notifier
                    .error(e.user_message("Failed to save template"))
                    .await;
            }
        }
    }

    pub async fn delete(&self, id: TemplateId) {
        match self.backend.delete_template(id).await {
            Ok(()) => {
                self.dispatch(GeneratorAction::Removed(id)).await;
                self.notifier.success("Template deleted").await;
            }
            Err(e) => {
                warn!("Failed to delete template {}: {}", id, e);
                self.notifier.error("Failed to delete template").await;
            }
        }
    }

    pub async fn rename(&self, id: TemplateId, name: &str) {
        let update = TemplateUpdate {
            name: Some(name.trim().to_string()),
            ..Default::default()
        };

        match self.backend.update_template(id, &update).await {
            Ok(()) => {
                self.dispatch(GeneratorAction::Renamed {
                    id,
                    name: name.trim().to_string(),
                })
                .await;
                self.notifier.success("Template renamed").await;
            }
            Err(e) => {
                warn!("Failed to rename template {}: {}", id, e);
                self.notifier.error("Failed to rename").await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{self, FakeBackend};
    use crate::toast::ToastKind;
    use pretty_assertions::assert_eq;

    const TTL: Duration = Duration::from_secs(3);

    fn page(backend: &Arc<FakeBackend>) -> GeneratorPage {
        GeneratorPage::new(backend.clone(), TTL)
    }

    #[test]
    fn test_default_name_format() {
        let now = testing::at("2024-07-01 14:05:09");
        assert_eq!(default_name("CEO Fraud", &now), "CEO Fraud - 7/1/2024 2:05:09 PM");
        assert_eq!(fallback_name("CEO Fraud", &now), "CEO Fraud - 7/1/2024");
    }

    #[tokio::test]
    async fn test_generate_populates_draft() {
        let backend = Arc::new(FakeBackend::new());
        *backend.generated.lock().unwrap() = Some(GeneratedTemplate {
            subject: "Confidential: wire needed today".to_string(),
            body: "<p>Please <a href=\"http://x\">approve</a></p>".to_string(),
        });
        let page = page(&backend);

        let form = GenerateForm {
            context: "Quarter-end acquisition".to_string(),
            ..Default::default()
        };
        page.generate_at(form, testing::at("2024-07-01 09:30:05")).await;

        let state = page.snapshot().await;
        assert!(!state.generating);
        let draft = state.draft.unwrap();
        assert_eq!(draft.subject, "Confidential: wire needed today");
        assert_eq!(draft.body, "<p>Please <a href=\"http://x\">approve</a></p>");
        assert_eq!(draft.name, "CEO Fraud - 7/1/2024 9:30:05 AM");
        assert!(draft.is_ai_generated);
        assert_eq!(state.form.context, "Quarter-end acquisition");

        // Generation alone never persists anything.
        assert_eq!(backend.count("create_template"), 0);
        assert_eq!(
            page.notifier().current().await.unwrap().message,
            "Template generated successfully!"
        );
    }

    #[tokio::test]
    async fn test_generate_failure_surfaces_backend_message() {
        let backend = Arc::new(FakeBackend::new());
        backend.fail(
            "generate_template",
            Some("Gemini API not configured. Please set GEMINI_API_KEY environment variable."),
        );
        let page = page(&backend);

        page.generate(GenerateForm::default()).await;
        let toast = page.notifier().current().await.unwrap();
        assert_eq!(toast.kind, ToastKind::Error);
        assert!(toast.message.starts_with("Gemini API not configured"));
        assert!(page.snapshot().await.draft.is_none());
    }

    #[tokio::test]
    async fn test_generate_failure_without_message_uses_fallback() {
        let backend = Arc::new(FakeBackend::new());
        backend.fail("generate_template", None);
        let page = page(&backend);

        page.generate(GenerateForm::default()).await;
        assert_eq!(
            page.notifier().current().await.unwrap().message,
            "Failed to generate template"
        );
    }

    #[tokio::test]
    async fn test_save_uses_edited_name() {
        let backend = Arc::new(FakeBackend::new());
        let page = page(&backend);
        page.generate(GenerateForm::default()).await;

        page.save("Wire fraud v1").await;

        let created = backend.created_templates.lock().unwrap().clone();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].name, "Wire fraud v1");
        assert!(created[0].is_ai_generated);
        assert_eq!(created[0].subject, "CEO Fraud from John CEO");

        let state = page.snapshot().await;
        assert!(state.draft.is_none());
        assert_eq!(state.templates.len(), 1);
        assert_eq!(page.notifier().current().await.unwrap().message, "Template saved!");
    }

    #[tokio::test]
    async fn test_save_blank_name_falls_back_to_dated_name() {
        let backend = Arc::new(FakeBackend::new());
        let page = page(&backend);
        page.generate(GenerateForm::default()).await;

        page.save_at("  ", testing::at("2024-12-12 08:00:00")).await;
        let created = backend.created_templates.lock().unwrap().clone();
        assert_eq!(created[0].name, "CEO Fraud - 12/12/2024");
    }

    #[tokio::test]
    async fn test_failed_save_keeps_draft() {
        let backend = Arc::new(FakeBackend::new());
        backend.fail("create_template", Some("Failed to save template: disk full"));
        let page = page(&backend);
        page.generate(GenerateForm::default()).await;

        page.save("Keep me").await;
        let state = page.snapshot().await;
        assert!(!state.saving);
        assert_eq!(state.draft.unwrap().name, "Keep me");
        assert_eq!(
            page.notifier().current().await.unwrap().message,
            "Failed to save template: disk full"
        );
    }

    #[tokio::test]
    async fn test_save_without_draft_is_noop() {
        let backend = Arc::new(FakeBackend::new());
        let page = page(&backend);
        page.save("Nothing").await;
        assert_eq!(backend.count("create_template"), 0);
    }

    #[tokio::test]
    async fn test_rename_and_delete_saved_templates() {
        let backend = Arc::new(FakeBackend::new());
        *backend.templates.lock().unwrap() = vec![
            testing::template(1, "Urgent Password Reset"),
            testing::template(2, "HR Policy Update"),
        ];
        let page = page(&backend);
        page.refresh().await;

        page.dispatch(GeneratorAction::StartRename(2)).await;
        assert_eq!(page.view().await.edit_name.as_deref(), Some("HR Policy Update"));

        page.rename(2, "HR Policy v2 ").await;
        let state = page.snapshot().await;
        assert!(state.editing.is_none());
        assert_eq!(state.templates[1].name, "HR Policy v2");
        assert_eq!(page.notifier().current().await.unwrap().message, "Template renamed");

        page.delete(1).await;
        assert_eq!(page.snapshot().await.templates.len(), 1);
        assert_eq!(page.notifier().current().await.unwrap().message, "Template deleted");

        backend.fail("update_template", None);
        page.rename(2, "Nope").await;
        assert_eq!(page.notifier().current().await.unwrap().message, "Failed to rename");
        assert_eq!(page.snapshot().await.templates[0].name, "HR Policy v2");
    }

    #[tokio::test]
    async fn test_load_saved_template_into_preview() {
        let backend = Arc::new(FakeBackend::new());
        *backend.templates.lock().unwrap() = vec![testing::template(1, "Urgent Password Reset")];
        let page = page(&backend);
        page.refresh().await;

        page.dispatch(GeneratorAction::LoadTemplate(1)).await;
        let view = page.view().await;
        let draft = view.draft.unwrap();
        assert_eq!(draft.subject, "Urgent Password Reset subject");
        assert!(draft.body_html.contains("verify"));
        assert!(!draft.body_html.contains("phishing-link"));
    }
}
