//! In-memory backend for view and route tests

use async_trait::async_trait;
use chrono::NaiveDateTime;
use phishsim_client::Backend;
use phishsim_common::types::{
    AnalyzeRequest, Campaign, CampaignId, CampaignStats, CampaignStatus, Created,
    EngagementStatus, GenerateRequest, GeneratedTemplate, HistoryEntry, NewCampaign, NewTarget,
    NewTemplate, ResultId, Target, TargetId, Template, TemplateId, TemplateUpdate,
};
use phishsim_common::{Error, Result};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct FakeBackend {
    pub campaigns: Mutex<Vec<Campaign>>,
    pub templates: Mutex<Vec<Template>>,
    pub targets: Mutex<Vec<Target>>,
    pub stats: Mutex<HashMap<CampaignId, CampaignStats>>,
    pub generated: Mutex<Option<GeneratedTemplate>>,
    pub analysis: Mutex<Vec<String>>,
    pub launches: Mutex<Vec<(CampaignId, Vec<TargetId>)>>,
    pub created_templates: Mutex<Vec<NewTemplate>>,
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, Option<String>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `operation` fail, optionally with a backend message
    pub fn fail(&self, operation: &'static str, message: Option<&str>) {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, message.map(str::to_string));
    }

    /// Recorded calls, e.g. `track_open:7`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, operation: &'static str, detail: impl std::fmt::Display) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("{}:{}", operation, detail));

        match self.failures.lock().unwrap().get(operation) {
            Some(message) => Err(Error::Api {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(()),
        }
    }
}

pub fn at(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").unwrap()
}

pub fn campaign(id: CampaignId, name: &str, status: CampaignStatus) -> Campaign {
    Campaign {
        id,
        name: name.to_string(),
        template_id: 1,
        status,
        created_at: at("2024-07-01 09:30:00"),
    }
}

pub fn template(id: TemplateId, name: &str) -> Template {
    Template {
        id,
        name: name.to_string(),
        subject: format!("{} subject", name),
        body_content: "<p>Please <a href=\"http://phishing-link\">verify</a></p>".to_string(),
        is_ai_generated: false,
        created_by: Some(1),
    }
}

pub fn target(id: TargetId, first: &str, email: &str) -> Target {
    Target {
        id,
        first_name: Some(first.to_string()),
        last_name: Some("Doe".to_string()),
        email: email.to_string(),
        department: Some("Sales".to_string()),
        history: Vec::new(),
    }
}

pub fn history(result_id: ResultId, subject: &str) -> HistoryEntry {
    HistoryEntry {
        result_id,
        campaign_name: "Q3 Payroll".to_string(),
        email_subject: subject.to_string(),
        email_body: "<p>Reset now: <a href=\"http://phishing-link\">Click here</a></p>".to_string(),
        sent_at: at("2024-07-02 10:00:00"),
        status: EngagementStatus::Sent,
    }
}

pub fn stats(name: &str, sent: u64, opened: u64, clicked: u64, submitted: u64) -> CampaignStats {
    CampaignStats {
        campaign: name.to_string(),
        status: CampaignStatus::Active,
        total_sent: sent,
        opened,
        clicked,
        submitted,
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_campaigns(&self) -> Result<Vec<Campaign>> {
        self.record("list_campaigns", "")?;
        Ok(self.campaigns.lock().unwrap().clone())
    }

    async fn create_campaign(&self, new: &NewCampaign) -> Result<Created> {
        self.record("create_campaign", &new.name)?;
        let mut campaigns = self.campaigns.lock().unwrap();
        let id = campaigns.len() as i64 + 1;
        let mut created = campaign(id, &new.name, CampaignStatus::Draft);
        created.template_id = new.template_id;
        campaigns.push(created);
        Ok(Created { message: None, id })
    }

    async fn delete_campaign(&self, id: CampaignId) -> Result<()> {
        self.record("delete_campaign", id)?;
        self.campaigns.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }

    async fn launch_campaign(&self, id: CampaignId, target_ids: &[TargetId]) -> Result<String> {
        self.record("launch_campaign", id)?;
        self.launches.lock().unwrap().push((id, target_ids.to_vec()));
        for campaign in self.campaigns.lock().unwrap().iter_mut() {
            if campaign.id == id {
                campaign.status = CampaignStatus::Active;
            }
        }
        Ok(format!("Campaign launched to {} targets", target_ids.len()))
    }

    async fn campaign_stats(&self, id: CampaignId) -> Result<CampaignStats> {
        self.record("campaign_stats", id)?;
        self.stats
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::Api {
                status: 404,
                message: Some("Campaign not found".to_string()),
            })
    }

    async fn track_open(&self, result_id: ResultId) -> Result<()> {
        self.record("track_open", result_id)
    }

    async fn list_templates(&self) -> Result<Vec<Template>> {
        self.record("list_templates", "")?;
        Ok(self.templates.lock().unwrap().clone())
    }

    async fn create_template(&self, new: &NewTemplate) -> Result<Created> {
        self.record("create_template", &new.name)?;
        self.created_templates.lock().unwrap().push(new.clone());
        let mut templates = self.templates.lock().unwrap();
        let id = templates.len() as i64 + 1;
        templates.push(Template {
            id,
            name: new.name.clone(),
            subject: new.subject.clone(),
            body_content: new.body_content.clone(),
            is_ai_generated: new.is_ai_generated,
            created_by: None,
        });
        Ok(Created { message: None, id })
    }

    async fn update_template(&self, id: TemplateId, update: &TemplateUpdate) -> Result<()> {
        self.record("update_template", id)?;
        let mut templates = self.templates.lock().unwrap();
        let template = templates
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::NotFound(format!("template {}", id)))?;
        if let Some(name) = &update.name {
            template.name = name.clone();
        }
        Ok(())
    }

    async fn delete_template(&self, id: TemplateId) -> Result<()> {
        self.record("delete_template", id)?;
        self.templates.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn generate_template(&self, request: &GenerateRequest) -> Result<GeneratedTemplate> {
        self.record("generate_template", &request.attack_type)?;
        Ok(self.generated.lock().unwrap().clone().unwrap_or(GeneratedTemplate {
            subject: format!("{} from {}", request.attack_type, request.sender_name),
            body: format!("<p>{}</p>", request.context),
        }))
    }

    async fn analyze_template(&self, request: &AnalyzeRequest) -> Result<Vec<String>> {
        self.record("analyze_template", &request.subject)?;
        Ok(self.analysis.lock().unwrap().clone())
    }

    async fn list_targets(&self) -> Result<Vec<Target>> {
        self.record("list_targets", "")?;
        Ok(self.targets.lock().unwrap().clone())
    }

    async fn create_target(&self, new: &NewTarget) -> Result<Created> {
        self.record("create_target", &new.email)?;
        let mut targets = self.targets.lock().unwrap();
        let id = targets.len() as i64 + 1;
        let mut created = target(id, &new.first_name, &new.email);
        created.last_name = Some(new.last_name.clone());
        targets.push(created);
        Ok(Created { message: None, id })
    }

    async fn delete_target(&self, id: TargetId) -> Result<()> {
        self.record("delete_target", id)?;
        self.targets.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }
}
