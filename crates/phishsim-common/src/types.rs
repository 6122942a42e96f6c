//! Common types for PhishSim
//!
//! Records exchanged with the REST backend. Everything the backend sends is
//! decoded into these types at the client boundary, so a malformed payload
//! becomes a decode error instead of a half-filled record.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Unique identifier for targets
pub type TargetId = i64;

/// Unique identifier for templates
pub type TemplateId = i64;

/// Unique identifier for campaigns
pub type CampaignId = i64;

/// Unique identifier for a single send result (one email to one target)
pub type ResultId = i64;

/// Campaign lifecycle status. Transitions happen server-side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Completed,
}

impl CampaignStatus {
    /// Only drafts may be launched
    pub fn is_launchable(&self) -> bool {
        matches!(self, CampaignStatus::Draft)
    }
}

impl std::fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CampaignStatus::Draft => write!(f, "draft"),
            CampaignStatus::Active => write!(f, "active"),
            CampaignStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Engagement recorded for one sent email
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngagementStatus {
    #[serde(alias = "sent")]
    Sent,
    #[serde(alias = "opened")]
    Opened,
    #[serde(alias = "clicked")]
    Clicked,
}

impl std::fmt::Display for EngagementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngagementStatus::Sent => write!(f, "Sent"),
            EngagementStatus::Opened => write!(f, "Opened"),
            EngagementStatus::Clicked => write!(f, "Clicked"),
        }
    }
}

/// An employee eligible to receive simulated phishing emails
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: TargetId,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub email: String,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Target {
    /// "First Last", or the email address when no name is known
    pub fn display_name(&self) -> String {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if name.is_empty() {
            self.email.clone()
        } else {
            name
        }
    }

    /// Find a history entry by its result id
    pub fn history_entry(&self, result_id: ResultId) -> Option<&HistoryEntry> {
        self.history.iter().find(|h| h.result_id == result_id)
    }
}

/// A specific email sent to a specific target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub result_id: ResultId,
    pub campaign_name: String,
    pub email_subject: String,
    #[serde(default)]
    pub email_body: String,
    #[serde(with = "timestamp")]
    pub sent_at: NaiveDateTime,
    pub status: EngagementStatus,
}

/// A reusable subject/body pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub subject: String,
    #[serde(alias = "body")]
    pub body_content: String,
    #[serde(default)]
    pub is_ai_generated: bool,
    #[serde(default)]
    pub created_by: Option<i64>,
}

/// A named, templated phishing simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub template_id: TemplateId,
    pub status: CampaignStatus,
    #[serde(with = "timestamp")]
    pub created_at: NaiveDateTime,
}

/// Aggregate counts for one campaign
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignStats {
    pub campaign: String,
    pub status: CampaignStatus,
    pub total_sent: u64,
    pub opened: u64,
    pub clicked: u64,
    pub submitted: u64,
}

/// Body of `POST /campaigns/`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCampaign {
    pub name: String,
    pub template_id: TemplateId,
}

/// Body of `POST /campaigns/{id}/launch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRequest {
    pub target_ids: Vec<TargetId>,
}

/// Body of `POST /targets/`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTarget {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub department: String,
}

/// Body of `POST /templates/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub subject: String,
    pub body_content: String,
    pub is_ai_generated: bool,
}

/// Body of `PUT /templates/{id}`; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_content: Option<String>,
}

/// Body of `POST /templates/generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "type")]
    pub attack_type: String,
    pub sender_name: String,
    pub context: String,
}

/// Subject/body pair proposed by the generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedTemplate {
    pub subject: String,
    pub body: String,
}

/// Body of `POST /templates/analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub subject: String,
    pub body: String,
}

/// Response of `POST /templates/analyze`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub analysis: Vec<String>,
}

/// Response of the create endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Created {
    #[serde(default)]
    pub message: Option<String>,
    pub id: i64,
}

/// Response of endpoints that only confirm an action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acknowledged {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error payload returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Backend timestamps: RFC 3339 with an offset, or a naive ISO-8601 stamp.
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const NAIVE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    /// Parse either accepted representation
    pub fn parse(value: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
            return Some(dt.naive_utc());
        }
        NaiveDateTime::parse_from_str(value, NAIVE_FORMAT).ok()
    }

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(NAIVE_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}
