//! Email preview rendering
//!
//! Email bodies come from the backend (and ultimately from an AI model), so
//! they are untrusted. They are cleaned with an allow-list sanitizer and
//! every anchor is rewritten so the browser can never follow the original
//! link. Images keep their alt text but lose `src`, so opening a preview
//! never fetches a remote tracking pixel.

/// What to do with anchors that survive sanitizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkPolicy {
    /// Drop `href` so links render but go nowhere
    Inert,
    /// Point every link at the given console URL
    Intercept(String),
}

/// Interception URL for a history entry of a sent email
pub fn caught_url(result_id: i64) -> String {
    format!("/history/{}/caught", result_id)
}

/// Sanitize `html` and apply `links` to every anchor
pub fn sanitize_email(html: &str, links: LinkPolicy) -> String {
    let mut builder = ammonia::Builder::default();

    // The original href never survives, whatever its scheme
    builder.rm_tag_attributes("a", &["href"]);
    builder.rm_tag_attributes("img", &["src", "srcset"]);

    // Forced values apply to every anchor, including ones that had no href
    if let LinkPolicy::Intercept(url) = &links {
        builder.set_tag_attribute_value("a", "href", url.as_str());
    }

    builder.clean(html).to_string()
}
