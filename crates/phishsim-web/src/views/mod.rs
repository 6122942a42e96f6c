//! Page view states
//!
//! Every page owns a private state container. Browser interactions become
//! actions that the page's `reduce` applies; I/O happens in the page
//! controller, which dispatches the outcome. No state is shared between
//! pages.

pub mod campaigns;
pub mod dashboard;
pub mod education;
pub mod generator;
pub mod targets;

use crate::toast::Notifier;
use phishsim_client::Backend;
use std::sync::Arc;
use std::time::Duration;

pub use campaigns::CampaignsPage;
pub use dashboard::DashboardPage;
pub use generator::GeneratorPage;
pub use targets::TargetsPage;

/// All stateful pages of the console
pub struct Pages {
    pub dashboard: Arc<DashboardPage>,
    pub campaigns: Arc<CampaignsPage>,
    pub generator: Arc<GeneratorPage>,
    pub targets: Arc<TargetsPage>,
}

impl Pages {
    /// Create every page against the same backend
    pub fn new(backend: Arc<dyn Backend>, toast_ttl: Duration) -> Self {
        Self {
            dashboard: Arc::new(DashboardPage::new(Arc::clone(&backend))),
            campaigns: Arc::new(CampaignsPage::new(Arc::clone(&backend), toast_ttl)),
            generator: Arc::new(GeneratorPage::new(Arc::clone(&backend), toast_ttl)),
            targets: Arc::new(TargetsPage::new(backend, toast_ttl)),
        }
    }

    /// Notifier of the named page
    pub fn notifier(&self, page: &str) -> Option<&Notifier> {
        match page {
            "campaigns" => Some(self.campaigns.notifier()),
            "templates" => Some(self.generator.notifier()),
            "targets" => Some(self.targets.notifier()),
            _ => None,
        }
    }
}

/// Date as the console shows it, e.g. `7/1/2024`
pub(crate) fn short_date(at: &chrono::NaiveDateTime) -> String {
    at.format("%-m/%-d/%Y").to_string()
}
