//! Backend trait

use async_trait::async_trait;
use phishsim_common::types::{
    AnalyzeRequest, Campaign, CampaignId, CampaignStats, Created, GenerateRequest,
    GeneratedTemplate, NewCampaign, NewTarget, NewTemplate, ResultId, Target, TargetId, Template,
    TemplateId, TemplateUpdate,
};
use phishsim_common::Result;

/// Operations offered by the PhishSim REST backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /campaigns/`
    async fn list_campaigns(&self) -> Result<Vec<Campaign>>;

    /// `POST /campaigns/`
    async fn create_campaign(&self, campaign: &NewCampaign) -> Result<Created>;

    /// `DELETE /campaigns/{id}`
    async fn delete_campaign(&self, id: CampaignId) -> Result<()>;

    /// `POST /campaigns/{id}/launch`, returns the backend's confirmation message
    async fn launch_campaign(&self, id: CampaignId, target_ids: &[TargetId]) -> Result<String>;

    /// `GET /campaigns/{id}/stats`
    async fn campaign_stats(&self, id: CampaignId) -> Result<CampaignStats>;

    /// `POST /campaigns/{result_id}/track/open`
    async fn track_open(&self, result_id: ResultId) -> Result<()>;

    /// `GET /templates/`
    async fn list_templates(&self) -> Result<Vec<Template>>;

    /// `POST /templates/`
    async fn create_template(&self, template: &NewTemplate) -> Result<Created>;

    /// `PUT /templates/{id}`
    async fn update_template(&self, id: TemplateId, update: &TemplateUpdate) -> Result<()>;

    /// `DELETE /templates/{id}`
    async fn delete_template(&self, id: TemplateId) -> Result<()>;

    /// `POST /templates/generate`
    async fn generate_template(&self, request: &GenerateRequest) -> Result<GeneratedTemplate>;

    /// `POST /templates/analyze`, returns the red-flag points
    async fn analyze_template(&self, request: &AnalyzeRequest) -> Result<Vec<String>>;

    /// `GET /targets/`
    async fn list_targets(&self) -> Result<Vec<Target>>;

    /// `POST /targets/`
    async fn create_target(&self, target: &NewTarget) -> Result<Created>;

    /// `DELETE /targets/{id}`
    async fn delete_target(&self, id: TargetId) -> Result<()>;
}
