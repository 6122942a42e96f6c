//! Security awareness training page. Content is static.

use serde::Serialize;

/// Current security score of the operator
pub const SECURITY_SCORE: u8 = 85;

#[derive(Debug, Clone, Serialize)]
pub struct TrainingModule {
    pub id: u32,
    pub title: &'static str,
    pub description: &'static str,
    pub completed: bool,
    pub score: Option<u8>,
}

/// One missed red flag, e.g. `Urgency`: "The subject line demanded..."
#[derive(Debug, Clone, Serialize)]
pub struct RedFlag {
    pub label: &'static str,
    pub detail: &'static str,
}

/// Worked example of a caught click
#[derive(Debug, Clone, Serialize)]
pub struct TeachableMoment {
    pub headline: &'static str,
    pub summary: &'static str,
    pub red_flags: Vec<RedFlag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EducationView {
    pub score: u8,
    pub remaining: usize,
    pub modules: Vec<TrainingModule>,
    pub example: TeachableMoment,
}

pub fn modules() -> Vec<TrainingModule> {
    vec![
        TrainingModule {
            id: 1,
            title: "Identifying Suspicious Senders",
            description: "Learn how to spot mismatched email addresses and display names.",
            completed: true,
            score: Some(100),
        },
        TrainingModule {
            id: 2,
            title: "Urgency and Threats",
            description: "Understanding how social engineering uses panic to trick you.",
            completed: false,
            score: None,
        },
        TrainingModule {
            id: 3,
            title: "Safe Browsing Habits",
            description: "Best practices for checking links before clicking.",
            completed: false,
            score: None,
        },
    ]
}

fn teachable_moment() -> TeachableMoment {
    TeachableMoment {
        headline: "You clicked a simulated phishing link!",
        summary: "On Dec 12, ran \"CEO Fraud\" simulation. You clicked the link \"Update Account Now\".",
        red_flags: vec![
            RedFlag {
                label: "Sender Address",
                detail: "The email came from ceo-office@gmaill.com instead of the company domain.",
            },
            RedFlag {
                label: "Urgency",
                detail: "The subject line demanded \"Immediate Action\" to bypass critical thinking.",
            },
            RedFlag {
                label: "Generic Greeting",
                detail: "It used \"Dear Employee\" instead of your name.",
            },
        ],
    }
}

pub fn view() -> EducationView {
    let modules = modules();
    EducationView {
        score: SECURITY_SCORE,
        remaining: modules.iter().filter(|m| !m.completed).count(),
        modules,
        example: teachable_moment(),
    }
}
