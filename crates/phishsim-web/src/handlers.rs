//! Web UI Handlers
//!
//! Request handlers for the console. Page actions are form posts that run
//! the page controller and redirect back to the page (post/redirect/get).

use crate::toast::Toast;
use crate::views::campaigns::CampaignAction;
use crate::views::education;
use crate::views::generator::{GenerateForm, GeneratorAction};
use crate::views::targets::TargetAction;
use crate::{AppState, StaticAssets};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use phishsim_common::types::{CampaignId, NewTarget, ResultId, TargetId, TemplateId};
use serde::{Deserialize, Serialize};

/// Health check handler
pub async fn health() -> impl IntoResponse {
    "OK"
}

/// Serve static files
pub async fn static_file(Path(path): Path<String>) -> impl IntoResponse {
    match StaticAssets::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref())],
                content.data.into_owned(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Render `template` inside the layout. The template name doubles as the
/// active navigation entry.
fn render<V: Serialize>(
    state: &AppState,
    template: &str,
    title: &str,
    toast: Option<Toast>,
    refresh_secs: Option<u64>,
    view: &V,
) -> Response {
    let context = serde_json::json!({
        "app_title": state.config.title,
        "operator": state.config.operator_label,
        "title": title,
        "active_page": template,
        "toast": toast,
        "toast_ttl_ms": state.config.toast_ttl().as_millis() as u64,
        "refresh_secs": refresh_secs,
        "view": view,
    });

    match state.templates.render(template, &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("Template error: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Dashboard page
pub async fn dashboard(State(state): State<AppState>) -> Response {
    let page = &state.pages.dashboard;
    page.refresh().await;
    let view = page.view().await;
    render(&state, "dashboard", "Dashboard", None, None, &view)
}

/// Education page
pub async fn education(State(state): State<AppState>) -> Response {
    render(&state, "education", "Education", None, None, &education::view())
}

// ---- Campaigns ----

/// Campaign manager page
pub async fn campaigns(State(state): State<AppState>) -> Response {
    let page = &state.pages.campaigns;
    page.refresh().await;
    let view = page.view().await;
    let toast = page.notifier().current().await;
    render(&state, "campaigns", "Campaigns", toast, None, &view)
}

/// Create campaign form data
#[derive(Debug, Deserialize)]
pub struct CampaignForm {
    #[serde(default)]
    pub name: String,
    /// Empty when no template was picked
    #[serde(default)]
    pub template_id: String,
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Form(form): Form<CampaignForm>,
) -> Redirect {
    state
        .pages
        .campaigns
        .create(&form.name, form.template_id.trim().parse().ok())
        .await;
    Redirect::to("/campaigns")
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<CampaignId>,
) -> Redirect {
    state.pages.campaigns.delete(id).await;
    Redirect::to("/campaigns")
}

pub async fn open_campaign_form(State(state): State<AppState>) -> Redirect {
    state.pages.campaigns.dispatch(CampaignAction::OpenCreate).await;
    Redirect::to("/campaigns")
}

pub async fn close_campaign_form(State(state): State<AppState>) -> Redirect {
    state.pages.campaigns.dispatch(CampaignAction::CloseCreate).await;
    Redirect::to("/campaigns")
}

pub async fn open_launch(State(state): State<AppState>, Path(id): Path<CampaignId>) -> Redirect {
    state
        .pages
        .campaigns
        .dispatch(CampaignAction::OpenLaunch(id))
        .await;
    Redirect::to("/campaigns")
}

pub async fn toggle_launch_target(
    State(state): State<AppState>,
    Path(target_id): Path<TargetId>,
) -> Redirect {
    state
        .pages
        .campaigns
        .dispatch(CampaignAction::ToggleTarget(target_id))
        .await;
    Redirect::to("/campaigns")
}

pub async fn confirm_launch(State(state): State<AppState>) -> Redirect {
    state.pages.campaigns.confirm_launch().await;
    Redirect::to("/campaigns")
}

pub async fn cancel_launch(State(state): State<AppState>) -> Redirect {
    state.pages.campaigns.dispatch(CampaignAction::CloseLaunch).await;
    Redirect::to("/campaigns")
}

// ---- Templates ----

/// Generator and saved templates page
pub async fn templates(State(state): State<AppState>) -> Response {
    let page = &state.pages.generator;
    page.refresh().await;
    let view = page.view().await;
    let toast = page.notifier().current().await;
    render(&state, "templates", "Templates", toast, None, &view)
}

/// Template name form data
#[derive(Debug, Deserialize)]
pub struct NameForm {
    #[serde(default)]
    pub name: String,
}

pub async fn generate_template(
    State(state): State<AppState>,
    Form(form): Form<GenerateForm>,
) -> Redirect {
    state.pages.generator.generate(form).await;
    Redirect::to("/templates")
}

pub async fn save_template(State(state): State<AppState>, Form(form): Form<NameForm>) -> Redirect {
    state.pages.generator.save(&form.name).await;
    Redirect::to("/templates")
}

pub async fn discard_draft(State(state): State<AppState>) -> Redirect {
    state.pages.generator.dispatch(GeneratorAction::Discard).await;
    Redirect::to("/templates")
}

pub async fn delete_template(
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
) -> Redirect {
    state.pages.generator.delete(id).await;
    Redirect::to("/templates")
}

pub async fn load_template(State(state): State<AppState>, Path(id): Path<TemplateId>) -> Redirect {
    state
        .pages
        .generator
        .dispatch(GeneratorAction::LoadTemplate(id))
        .await;
    Redirect::to("/templates")
}

pub async fn start_rename(State(state): State<AppState>, Path(id): Path<TemplateId>) -> Redirect {
    state
        .pages
        .generator
        .dispatch(GeneratorAction::StartRename(id))
        .await;
    Redirect::to("/templates")
}

pub async fn rename_template(
    State(state): State<AppState>,
    Path(id): Path<TemplateId>,
    Form(form): Form<NameForm>,
) -> Redirect {
    state.pages.generator.rename(id, &form.name).await;
    Redirect::to("/templates")
}

pub async fn cancel_rename(State(state): State<AppState>) -> Redirect {
    state
        .pages
        .generator
        .dispatch(GeneratorAction::CancelRename)
        .await;
    Redirect::to("/templates")
}

// ---- Targets ----

/// Targets page; polls while the caught dialog waits for its analysis
pub async fn targets(State(state): State<AppState>) -> Response {
    let page = &state.pages.targets;
    page.refresh().await;
    let view = page.view().await;
    let toast = page.notifier().current().await;
    let refresh = if page.analysis_pending().await {
        Some(state.config.analysis_poll_secs)
    } else {
        None
    };
    render(&state, "targets", "Targets", toast, refresh, &view)
}

pub async fn create_target(State(state): State<AppState>, Form(form): Form<NewTarget>) -> Redirect {
    state.pages.targets.create(form).await;
    Redirect::to("/targets")
}

pub async fn delete_target(State(state): State<AppState>, Path(id): Path<TargetId>) -> Redirect {
    state.pages.targets.delete(id).await;
    Redirect::to("/targets")
}

pub async fn open_target_form(State(state): State<AppState>) -> Redirect {
    state.pages.targets.dispatch(TargetAction::OpenCreate).await;
    Redirect::to("/targets")
}

pub async fn close_target_form(State(state): State<AppState>) -> Redirect {
    state.pages.targets.dispatch(TargetAction::CloseCreate).await;
    Redirect::to("/targets")
}

pub async fn open_preview(
    State(state): State<AppState>,
    Path(result_id): Path<ResultId>,
) -> Redirect {
    state.pages.targets.open_preview(result_id).await;
    Redirect::to("/targets")
}

/// Destination of every link inside a previewed email
pub async fn caught(State(state): State<AppState>, Path(result_id): Path<ResultId>) -> Redirect {
    if let Some(analysis) = state.pages.targets.link_clicked(result_id).await {
        // Detached: the targets page polls until the analysis lands
        drop(analysis);
    }
    Redirect::to("/targets")
}

pub async fn close_preview(State(state): State<AppState>) -> Redirect {
    state.pages.targets.dispatch(TargetAction::ClosePreview).await;
    Redirect::to("/targets")
}

pub async fn close_caught(State(state): State<AppState>) -> Redirect {
    state.pages.targets.dispatch(TargetAction::CloseCaught).await;
    Redirect::to("/targets")
}

// ---- Toasts ----

pub async fn dismiss_toast(State(state): State<AppState>, Path(page): Path<String>) -> Response {
    match state.pages.notifier(&page) {
        Some(notifier) => {
            notifier.dismiss().await;
            Redirect::to(&format!("/{}", page)).into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
