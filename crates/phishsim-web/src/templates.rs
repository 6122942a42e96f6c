//! Template Engine
//!
//! Handles HTML template rendering using minijinja.

use minijinja::{AutoEscape, Environment, Error as MiniJinjaError};
use phishsim_common::{Error, Result};

const SOURCES: [(&str, &str); 6] = [
    ("base", include_str!("../templates/base.html")),
    ("dashboard", include_str!("../templates/dashboard.html")),
    ("campaigns", include_str!("../templates/campaigns.html")),
    ("templates", include_str!("../templates/templates.html")),
    ("targets", include_str!("../templates/targets.html")),
    ("education", include_str!("../templates/education.html")),
];

/// Template manager
pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Create a new template manager
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();

        // Names carry no extension, so escaping must be forced on.
        env.set_auto_escape_callback(|_| AutoEscape::Html);

        for (name, source) in SOURCES {
            env.add_template(name, source)
                .map_err(|e| Error::Template(format!("{}: {}", name, e)))?;
        }

        Ok(Self { env })
    }

    /// Render a template with context
    pub fn render(
        &self,
        name: &str,
        context: &serde_json::Value,
    ) -> std::result::Result<String, MiniJinjaError> {
        let template = self.env.get_template(name)?;
        template.render(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(view: serde_json::Value) -> serde_json::Value {
        json!({
            "app_title": "PhishSim",
            "title": "Test",
            "active_page": "dashboard",
            "operator": "Admin",
            "toast": null,
            "view": view,
        })
    }

    #[test]
    fn test_all_templates_compile() {
        let templates = Templates::new().unwrap();
        for (name, _) in SOURCES {
            assert!(templates.env.get_template(name).is_ok(), "{}", name);
        }
    }

    #[test]
    fn test_output_is_escaped() {
        let templates = Templates::new().unwrap();
        let mut ctx = context(json!({
            "loading": false,
            "empty": false,
            "totals": {"sent": 0, "opened": 0, "clicked": 0, "compromised": 0},
            "chart": [{
                "campaign": "<script>x</script>",
                "opened": {"value": 0, "percent": 0},
                "clicked": {"value": 0, "percent": 0},
                "submitted": {"value": 0, "percent": 0},
            }],
        }));
        ctx["operator"] = json!("<b>root</b>");

        let html = templates.render("dashboard", &ctx).unwrap();
        assert!(!html.contains("<script>x</script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("Authenticated as &lt;b&gt;root"));
    }
}
