//! Campaign manager
//!
//! Lists campaigns, creates and deletes them, and runs the launch dialog in
//! which the operator picks the targets that receive a draft campaign.

use crate::selection::Selection;
use crate::toast::Notifier;
use phishsim_client::Backend;
use phishsim_common::types::{
    Campaign, CampaignId, CampaignStatus, NewCampaign, Target, TargetId, Template, TemplateId,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use super::short_date;

/// Launch dialog of one draft campaign
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchDialog {
    pub campaign_id: CampaignId,
    pub campaign_name: String,
    pub selection: Selection<TargetId>,
}

/// State of the campaign manager
#[derive(Debug, Clone)]
pub struct CampaignsState {
    pub loading: bool,
    pub campaigns: Vec<Campaign>,
    pub templates: Vec<Template>,
    pub targets: Vec<Target>,
    pub create_open: bool,
    pub launch: Option<LaunchDialog>,
}

impl Default for CampaignsState {
    fn default() -> Self {
        Self {
            loading: true,
            campaigns: Vec::new(),
            templates: Vec::new(),
            targets: Vec::new(),
            create_open: false,
            launch: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CampaignAction {
    Loaded {
        campaigns: Vec<Campaign>,
        templates: Vec<Template>,
        targets: Vec<Target>,
    },
    LoadFailed,
    OpenCreate,
    CloseCreate,
    Created,
    Removed(CampaignId),
    OpenLaunch(CampaignId),
    ToggleTarget(TargetId),
    CloseLaunch,
}

impl CampaignsState {
    pub fn reduce(&mut self, action: CampaignAction) {
        match action {
            CampaignAction::Loaded {
                campaigns,
                templates,
                targets,
            } => {
                self.loading = false;
                self.campaigns = campaigns;
                self.templates = templates;
                self.targets = targets;
                if let Some(dialog) = &mut self.launch {
                    let known = &self.targets;
                    dialog
                        .selection
                        .retain(|id| known.iter().any(|t| t.id == *id));
                }
            }
            CampaignAction::LoadFailed => self.loading = false,
            CampaignAction::OpenCreate => self.create_open = true,
            CampaignAction::CloseCreate | CampaignAction::Created => self.create_open = false,
            CampaignAction::Removed(id) => {
                self.campaigns.retain(|c| c.id != id);
                if self.launch.as_ref().map(|d| d.campaign_id) == Some(id) {
                    self.launch = None;
                }
            }
            CampaignAction::OpenLaunch(id) => {
                let Some(campaign) = self.campaigns.iter().find(|c| c.id == id) else {
                    return;
                };
                if !campaign.status.is_launchable() {
                    return;
                }
                // Every known target starts out selected.
                self.launch = Some(LaunchDialog {
                    campaign_id: campaign.id,
                    campaign_name: campaign.name.clone(),
                    selection: Selection::all_of(self.targets.iter().map(|t| t.id)),
                });
            }
            CampaignAction::ToggleTarget(target_id) => {
                if let Some(dialog) = &mut self.launch {
                    dialog.selection.toggle(target_id);
                }
            }
            CampaignAction::CloseLaunch => self.launch = None,
        }
    }

    /// Render model
    pub fn view(&self) -> CampaignsView {
        let campaigns = self
            .campaigns
            .iter()
            .map(|c| CampaignRow {
                id: c.id,
                name: c.name.clone(),
                status: c.status,
                created_at: short_date(&c.created_at),
                template_name: self
                    .templates
                    .iter()
                    .find(|t| t.id == c.template_id)
                    .map(|t| t.name.clone()),
                can_launch: c.status.is_launchable(),
            })
            .collect();

        let templates = self
            .templates
            .iter()
            .map(|t| TemplateOption {
                id: t.id,
                name: t.name.clone(),
            })
            .collect();

        let launch = self.launch.as_ref().map(|dialog| LaunchView {
            campaign_id: dialog.campaign_id,
            campaign_name: dialog.campaign_name.clone(),
            targets: self
                .targets
                .iter()
                .map(|t| LaunchTargetRow {
                    id: t.id,
                    name: t.display_name(),
                    email: t.email.clone(),
                    selected: dialog.selection.contains(&t.id),
                })
                .collect(),
            selected_count: dialog.selection.len(),
            can_confirm: dialog.selection.can_confirm(),
        });

        CampaignsView {
            loading: self.loading,
            campaigns,
            templates,
            create_open: self.create_open,
            launch,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignsView {
    pub loading: bool,
    pub campaigns: Vec<CampaignRow>,
    pub templates: Vec<TemplateOption>,
    pub create_open: bool,
    pub launch: Option<LaunchView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignRow {
    pub id: CampaignId,
    pub name: String,
    pub status: CampaignStatus,
    pub created_at: String,
    pub template_name: Option<String>,
    pub can_launch: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct TemplateOption {
    pub id: TemplateId,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchView {
    pub campaign_id: CampaignId,
    pub campaign_name: String,
    pub targets: Vec<LaunchTargetRow>,
    pub selected_count: usize,
    pub can_confirm: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LaunchTargetRow {
    pub id: TargetId,
    pub name: String,
    pub email: String,
    pub selected: bool,
}

/// Campaign manager controller
pub struct CampaignsPage {
    backend: Arc<dyn Backend>,
    state: Mutex<CampaignsState>,
    notifier: Notifier,
}

impl CampaignsPage {
    pub fn new(backend: Arc<dyn Backend>, toast_ttl: Duration) -> Self {
        Self {
            backend,
            state: Mutex::new(CampaignsState::default()),
            notifier: Notifier::new(toast_ttl),
        }
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub async fn dispatch(&self, action: CampaignAction) {
        self.state.lock().await.reduce(action);
    }

    pub async fn snapshot(&self) -> CampaignsState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self) -> CampaignsView {
        self.state.lock().await.view()
    }

    /// Fetch campaigns, templates and targets together
    pub async fn refresh(&self) {
        let result = tokio::try_join!(
            self.backend.list_campaigns(),
            self.backend.list_templates(),
            self.backend.list_targets(),
        );

        match result {
            Ok((campaigns, templates, targets)) => {
                self.dispatch(CampaignAction::Loaded {
                    campaigns,
                    templates,
                    targets,
                })
                .await
            }
            Err(e) => {
                error!("Failed to load campaign data: {}", e);
                self.dispatch(CampaignAction::LoadFailed).await;
            }
        }
    }

    pub async fn create(&self, name: &str, template_id: Option<TemplateId>) {
        let name = name.trim();
        let Some(template_id) = template_id.filter(|_| !name.is_empty()) else {
            warn!("Rejected campaign without name or template");
            self.notifier.error("Failed to create campaign").await;
            return;
        };

        let request = NewCampaign {
            name: name.to_string(),
            template_id,
        };

        match self.backend.create_campaign(&request).await {
            Ok(created) => {
                info!("Created campaign {} ({})", created.id, request.name);
                self.dispatch(CampaignAction::Created).await;
                self.refresh().await;
                self.notifier.success("Campaign created successfully!").await;
            }
            Err(e) => {
                warn!("Failed to create campaign: {}", e);
                self.notifier.error("Failed to create campaign").await;
            }
        }
    }

    pub async fn delete(&self, id: CampaignId) {
        match self.backend.delete_campaign(id).await {
            Ok(()) => {
                self.dispatch(CampaignAction::Removed(id)).await;
                self.notifier.success("Campaign deleted").await;
            }
            Err(e) => {
                warn!("Failed to delete campaign {}: {}", id, e);
                self.notifier.error("Failed to delete campaign").await;
            }
        }
    }

    /// Submit the launch dialog's selection.
    ///
    /// An empty selection never reaches the backend. On failure the dialog
    /// and its selection stay as they were.
    pub async fn confirm_launch(&self) {
        let (campaign_id, target_ids) = {
            let state = self.state.lock().await;
            match &state.launch {
                Some(dialog) if dialog.selection.can_confirm() => {
                    (dialog.campaign_id, dialog.selection.ids())
                }
                Some(_) => {
                    warn!("Ignoring launch confirmation with empty selection");
                    return;
                }
                None => return,
            }
        };

        match self.backend.launch_campaign(campaign_id, &target_ids).await {
            Ok(message) => {
                info!("Launched campaign {}: {}", campaign_id, message);
                self.refresh().await;
                self.notifier
                    .success(format!("Campaign launched to {} targets!", target_ids.len()))
                    .await;
                self.dispatch(CampaignAction::CloseLaunch).await;
            }
            Err(e) => {
                warn!("Failed to launch campaign {}: {}", campaign_id, e);
                self.notifier.error("Failed to launch campaign").await;
            }
        }
    }
}
