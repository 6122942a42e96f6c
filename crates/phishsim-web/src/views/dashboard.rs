//! Dashboard: aggregate engagement metrics across campaigns

use phishsim_client::Backend;
use phishsim_common::types::CampaignStats;
use phishsim_common::Result;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::error;

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub loading: bool,
    pub stats: Vec<CampaignStats>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            loading: true,
            stats: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum DashboardAction {
    Loaded(Vec<CampaignStats>),
    LoadFailed,
}

impl DashboardState {
    pub fn reduce(&mut self, action: DashboardAction) {
        match action {
            DashboardAction::Loaded(stats) => {
                self.loading = false;
                self.stats = stats;
            }
            DashboardAction::LoadFailed => self.loading = false,
        }
    }

    pub fn view(&self) -> DashboardView {
        let totals = Totals {
            sent: self.stats.iter().map(|s| s.total_sent).sum(),
            opened: self.stats.iter().map(|s| s.opened).sum(),
            clicked: self.stats.iter().map(|s| s.clicked).sum(),
            compromised: self.stats.iter().map(|s| s.submitted).sum(),
        };

        let peak = self
            .stats
            .iter()
            .flat_map(|s| [s.opened, s.clicked, s.submitted])
            .max()
            .unwrap_or(0);

        let chart = self
            .stats
            .iter()
            .map(|s| ChartRow {
                campaign: s.campaign.clone(),
                opened: Bar::scaled(s.opened, peak),
                clicked: Bar::scaled(s.clicked, peak),
                submitted: Bar::scaled(s.submitted, peak),
            })
            .collect();

        DashboardView {
            loading: self.loading,
            empty: self.stats.is_empty(),
            totals,
            chart,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub loading: bool,
    pub empty: bool,
    pub totals: Totals,
    pub chart: Vec<ChartRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub sent: u64,
    pub opened: u64,
    pub clicked: u64,
    pub compromised: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartRow {
    pub campaign: String,
    pub opened: Bar,
    pub clicked: Bar,
    pub submitted: Bar,
}

/// One bar: raw value and width relative to the tallest bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bar {
    pub value: u64,
    pub percent: u8,
}

impl Bar {
    fn scaled(value: u64, peak: u64) -> Self {
        let percent = if peak == 0 {
            0
        } else {
            ((value * 100) / peak).min(100) as u8
        };
        Self { value, percent }
    }
}

/// Dashboard controller
pub struct DashboardPage {
    backend: Arc<dyn Backend>,
    state: Mutex<DashboardState>,
}

impl DashboardPage {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            state: Mutex::new(DashboardState::default()),
        }
    }

    pub async fn view(&self) -> DashboardView {
        self.state.lock().await.view()
    }

    /// Fetch every campaign's stats concurrently
    pub async fn refresh(&self) {
        let action = match self.load().await {
            Ok(stats) => DashboardAction::Loaded(stats),
            Err(e) => {
                error!("Failed to fetch dashboard data: {}", e);
                DashboardAction::LoadFailed
            }
        };
        self.state.lock().await.reduce(action);
    }

    async fn load(&self) -> Result<Vec<CampaignStats>> {
        let campaigns = self.backend.list_campaigns().await?;

        let mut tasks = JoinSet::new();
        for (index, campaign) in campaigns.into_iter().enumerate() {
            let backend = Arc::clone(&self.backend);
            tasks.spawn(async move { (index, backend.campaign_stats(campaign.id).await) });
        }

        let mut collected = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (index, stats) = joined
                .map_err(|e| phishsim_common::Error::Internal(format!("stats task: {}", e)))?;
            collected.push((index, stats?));
        }

        collected.sort_by_key(|(index, _)| *index);
        Ok(collected.into_iter().map(|(_, stats)| stats).collect())
    }
}
